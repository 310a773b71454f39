mod component;
mod details;
mod error;
pub mod export;
pub mod layout;
mod render;
pub mod scale;
mod state;
pub mod types;

pub use component::FishboneCanvas;
pub use error::DataError;
pub use layout::{Align, Badge, CategoryKey, Element, Label, LineSegment, Scene, layout};
pub use types::{Attribute, Category, Cause, IssueTree};
