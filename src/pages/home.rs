use leptos::prelude::*;
use log::{error, info};

use crate::components::fishbone::{DataError, FishboneCanvas, IssueTree};

const EXAMPLE_DATA: &str = include_str!("../data/example.json");

/// Parse the bundled issue document.
fn load_example() -> Result<IssueTree, DataError> {
	let tree = IssueTree::from_json(EXAMPLE_DATA)
		.inspect_err(|e| error!("Bundled issue document rejected: {}", e))?;
	info!(
		"Loaded '{}' with {} categories",
		tree.issue,
		tree.categories.len()
	);
	Ok(tree)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{load_example()
				.map(|tree| {
					view! {
						<div class="fullscreen-graph">
							<FishboneCanvas data=tree fullscreen=true />
							<div class="graph-overlay">
								<h1>"Fishbone Diagram"</h1>
								<p class="subtitle">
									"Click a category to collapse it. Click the issue or a cause for details. Drag to pan, scroll to zoom."
								</p>
							</div>
						</div>
					}
				})}
		</ErrorBoundary>
	}
}
