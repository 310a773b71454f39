use leptos::prelude::*;

use super::layout::Element;
use super::types::IssueTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
	Root,
	Category,
	Cause,
}

impl ElementKind {
	pub fn label(self) -> &'static str {
		match self {
			ElementKind::Root => "Issue",
			ElementKind::Category => "Category",
			ElementKind::Cause => "Cause",
		}
	}
}

/// Everything the popover and side panel show about one scene element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementDetails {
	pub kind: ElementKind,
	pub title: String,
	/// Parent category name, for causes.
	pub category: Option<String>,
	pub link: Option<String>,
	pub status: Option<String>,
	pub priority: Option<String>,
	pub points: Option<f64>,
	/// Number of causes, for categories.
	pub cause_count: Option<usize>,
}

impl ElementDetails {
	fn bare(kind: ElementKind, title: &str, link: &Option<String>) -> Self {
		Self {
			kind,
			title: title.to_string(),
			category: None,
			link: link.clone(),
			status: None,
			priority: None,
			points: None,
			cause_count: None,
		}
	}

	/// Look an element up in the tree it was laid out from.
	pub fn from_element(tree: &IssueTree, element: Element) -> Option<Self> {
		match element {
			Element::Root => Some(Self::bare(ElementKind::Root, &tree.issue, &tree.link)),
			Element::Category { category } => {
				let c = tree.categories.get(category)?;
				Some(Self {
					cause_count: Some(c.causes.len()),
					..Self::bare(ElementKind::Category, &c.name, &c.link)
				})
			}
			Element::Cause { category, cause } => {
				let c = tree.categories.get(category)?;
				let cause = c.causes.get(cause)?;
				Some(Self {
					category: Some(c.name.clone()),
					status: cause.status.as_ref().map(ToString::to_string),
					priority: cause.priority.as_ref().map(ToString::to_string),
					points: cause.points,
					..Self::bare(ElementKind::Cause, &cause.name, &cause.link)
				})
			}
		}
	}
}

/// Hover popover anchored at a canvas position.
#[derive(Clone, Debug, PartialEq)]
pub struct Popover {
	pub x: f64,
	pub y: f64,
	pub details: ElementDetails,
}

fn details_body(details: ElementDetails) -> impl IntoView {
	view! {
		<h3>{details.title}</h3>
		<p class="fishbone-kind">{details.kind.label()}</p>
		{details.category.map(|c| view! { <p>"Category: " {c}</p> })}
		{details.status.map(|s| view! { <p>"Status: " {s}</p> })}
		{details.points.map(|p| view! { <p>"Points: " {p.to_string()}</p> })}
		{details.priority.map(|p| view! { <p>"Priority: " {p}</p> })}
		{details.cause_count.map(|n| view! { <p>"Causes: " {n}</p> })}
		{details
			.link
			.map(|href| {
				let text = href.clone();
				view! {
					<a href=href target="_blank" rel="noopener noreferrer">
						{text}
					</a>
				}
			})}
	}
}

#[component]
pub fn HoverPopover(popover: RwSignal<Option<Popover>>) -> impl IntoView {
	move || {
		popover.get().map(|p| {
			view! {
				<div
					class="fishbone-popover"
					style=format!("left: {}px; top: {}px;", p.x + 12.0, p.y + 12.0)
				>
					{details_body(p.details)}
				</div>
			}
		})
	}
}

#[component]
pub fn DetailsPanel(selected: RwSignal<Option<ElementDetails>>) -> impl IntoView {
	move || {
		selected.get().map(|details| {
			view! {
				<aside class="fishbone-details">
					<button class="fishbone-close" on:click=move |_| selected.set(None)>
						"×"
					</button>
					{details_body(details)}
				</aside>
			}
		})
	}
}
