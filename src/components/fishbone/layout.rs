//! Fishbone layout: issue tree in, flat scene of lines, labels and badges out.
//!
//! Pure and deterministic. Element order is draw order, so renderers can rely
//! on later elements painting over earlier ones.

use std::collections::HashSet;

use serde::Serialize;

use super::types::IssueTree;

/// Horizontal space reserved for margins around the category bones.
pub const MARGIN: f64 = 200.0;
pub const SPINE_START: f64 = 50.0;
/// Distance from the right canvas edge to the spine's end.
pub const SPINE_END_INSET: f64 = 100.0;
/// Horizontal run of a category bone, from spine to tip.
pub const BONE_OFFSET: f64 = 50.0;
/// Vertical rise of a category bone.
pub const BONE_LENGTH: f64 = 80.0;
pub const CAUSE_SPACING: f64 = 20.0;
pub const CAUSE_LENGTH: f64 = 50.0;
pub const LABEL_GAP: f64 = 5.0;
/// Offset of a score badge from the end of its cause line that meets the
/// category's bone column, away from the right-aligned cause label.
pub const BADGE_GAP: f64 = 12.0;
/// Keeps neighbouring bones apart: must exceed `2 * BONE_OFFSET`.
pub const MIN_CATEGORY_SPACING: f64 = 140.0;

/// Color key of a scene element. Categories are keyed by their position in
/// the tree, which is also their index into the ordinal color scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
	Spine,
	Category(usize),
}

/// What a label stands for, with indices back into the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
	Root,
	Category { category: usize },
	Cause { category: usize, cause: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
	Left,
	Right,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineSegment {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub key: CategoryKey,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Label {
	pub x: f64,
	pub y: f64,
	pub text: String,
	pub key: CategoryKey,
	pub align: Align,
	pub element: Element,
	pub link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Badge {
	pub x: f64,
	pub y: f64,
	pub points: f64,
	pub key: CategoryKey,
	pub element: Element,
}

/// Renderer-agnostic output of one layout pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub lines: Vec<LineSegment>,
	pub labels: Vec<Label>,
	pub badges: Vec<Badge>,
}

/// Smallest canvas width that keeps `category_count` bones from overlapping.
pub fn min_layout_width(category_count: usize) -> f64 {
	MARGIN + category_count.max(1) as f64 * MIN_CATEGORY_SPACING
}

/// Smallest canvas height that fits the longest cause column above and below the spine.
pub fn min_layout_height(tree: &IssueTree) -> f64 {
	let deepest = tree.categories.iter().map(|c| c.causes.len()).max().unwrap_or(0);
	2.0 * (BONE_LENGTH + (deepest + 1) as f64 * CAUSE_SPACING)
}

/// Lay out `tree` on a `width` x `height` canvas.
///
/// Categories named in `collapsed` keep their bone and label but emit no
/// cause lines, labels or badges. `width` is expected to exceed [`MARGIN`].
pub fn layout(tree: &IssueTree, width: f64, height: f64, collapsed: &HashSet<String>) -> Scene {
	let mid_y = height / 2.0;
	let spacing = (width - MARGIN) / tree.categories.len() as f64;

	let mut scene = Scene {
		width,
		height,
		..Scene::default()
	};

	scene.lines.push(LineSegment {
		x1: SPINE_START,
		y1: mid_y,
		x2: width - SPINE_END_INSET,
		y2: mid_y,
		key: CategoryKey::Spine,
	});
	scene.labels.push(Label {
		x: width - SPINE_END_INSET + 10.0,
		y: mid_y - 10.0,
		text: tree.issue.clone(),
		key: CategoryKey::Spine,
		align: Align::Left,
		element: Element::Root,
		link: tree.link.clone(),
	});

	for (i, category) in tree.categories.iter().enumerate() {
		let key = CategoryKey::Category(i);
		// Even bones point up, odd bones down.
		let dir = if i % 2 == 0 { -1.0 } else { 1.0 };
		let base_x = SPINE_START + (i + 1) as f64 * spacing;
		let (tip_x, tip_y) = (base_x, mid_y + dir * BONE_LENGTH);

		scene.lines.push(LineSegment {
			x1: base_x - BONE_OFFSET,
			y1: mid_y,
			x2: tip_x,
			y2: tip_y,
			key,
		});
		scene.labels.push(Label {
			x: tip_x + LABEL_GAP,
			y: tip_y,
			text: category.name.clone(),
			key,
			align: Align::Left,
			element: Element::Category { category: i },
			link: category.link.clone(),
		});

		if collapsed.contains(&category.name) {
			continue;
		}

		for (j, cause) in category.causes.iter().enumerate() {
			let y = tip_y + dir * (j + 1) as f64 * CAUSE_SPACING;
			let x1 = tip_x - CAUSE_LENGTH;
			let element = Element::Cause {
				category: i,
				cause: j,
			};
			scene.lines.push(LineSegment {
				x1,
				y1: y,
				x2: tip_x,
				y2: y,
				key,
			});
			scene.labels.push(Label {
				x: x1 - LABEL_GAP,
				y,
				text: cause.name.clone(),
				key,
				align: Align::Right,
				element,
				link: cause.link.clone(),
			});
			if let Some(points) = cause.points {
				scene.badges.push(Badge {
					x: tip_x + BADGE_GAP,
					y,
					points,
					key,
					element,
				});
			}
		}
	}

	scene
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::fishbone::types::{Category, Cause};

	fn cause(name: &str, points: Option<f64>) -> Cause {
		Cause {
			name: name.into(),
			link: None,
			points,
			status: None,
			priority: None,
		}
	}

	fn category(name: &str, causes: Vec<Cause>) -> Category {
		Category {
			name: name.into(),
			link: None,
			causes,
		}
	}

	fn outage() -> IssueTree {
		IssueTree {
			issue: "Outage".into(),
			link: None,
			categories: vec![
				category("Network", vec![cause("DNS", Some(3.0))]),
				category("Disk", vec![cause("Full", None)]),
			],
		}
	}

	fn wide() -> IssueTree {
		IssueTree {
			issue: "Wide".into(),
			link: Some("https://example.com".into()),
			categories: (0..4)
				.map(|i| {
					category(
						&format!("C{}", i),
						(0..=i).map(|j| cause(&format!("c{}{}", i, j), Some(j as f64))).collect(),
					)
				})
				.collect(),
		}
	}

	#[test]
	fn outage_example_counts() {
		let scene = layout(&outage(), 800.0, 400.0, &HashSet::new());
		assert_eq!(scene.labels.len(), 5);
		assert_eq!(scene.lines.len(), 5);
		assert_eq!(scene.badges.len(), 1);
		assert_eq!(scene.badges[0].points, 3.0);
		assert_eq!(
			scene.badges[0].element,
			Element::Cause {
				category: 0,
				cause: 0
			}
		);
	}

	#[test]
	fn spine_spans_canvas() {
		let scene = layout(&outage(), 800.0, 400.0, &HashSet::new());
		let spine = &scene.lines[0];
		assert_eq!((spine.x1, spine.y1, spine.x2, spine.y2), (50.0, 200.0, 700.0, 200.0));
		assert_eq!(spine.key, CategoryKey::Spine);
		assert_eq!(scene.labels[0].element, Element::Root);
		assert_eq!(scene.labels[0].align, Align::Left);
	}

	#[test]
	fn line_count_matches_visible_causes() {
		let tree = wide();
		let scene = layout(&tree, 1000.0, 600.0, &HashSet::new());
		let expected = 1 + tree
			.categories
			.iter()
			.map(|c| 1 + c.causes.len())
			.sum::<usize>();
		assert_eq!(scene.lines.len(), expected);
	}

	#[test]
	fn bones_alternate_up_and_down() {
		let scene = layout(&wide(), 1000.0, 600.0, &HashSet::new());
		let bones: Vec<_> = scene
			.labels
			.iter()
			.filter(|label| matches!(label.element, Element::Category { .. }))
			.collect();
		assert_eq!(bones.len(), 4);
		for label in bones {
			let Element::Category { category } = label.element else {
				unreachable!()
			};
			if category % 2 == 0 {
				assert!(label.y < 300.0, "category {} should point up", category);
			} else {
				assert!(label.y > 300.0, "category {} should point down", category);
			}
		}
	}

	#[test]
	fn category_bone_geometry() {
		let scene = layout(&outage(), 800.0, 400.0, &HashSet::new());
		// spacing = 600 / 2 = 300
		let first = &scene.lines[1];
		assert_eq!((first.x1, first.y1, first.x2, first.y2), (300.0, 200.0, 350.0, 120.0));
		let second = scene
			.lines
			.iter()
			.find(|l| l.key == CategoryKey::Category(1))
			.unwrap();
		assert_eq!((second.x1, second.y1, second.x2, second.y2), (600.0, 200.0, 650.0, 280.0));
	}

	#[test]
	fn causes_step_away_from_tip() {
		let scene = layout(&wide(), 1000.0, 600.0, &HashSet::new());
		let causes: Vec<_> = scene
			.labels
			.iter()
			.filter(|l| matches!(l.element, Element::Cause { category: 3, .. }))
			.collect();
		assert_eq!(causes.len(), 4);
		// category 3 points down: each cause sits further below the previous one
		for pair in causes.windows(2) {
			assert_eq!(pair[1].y - pair[0].y, CAUSE_SPACING);
		}
		assert!(causes.iter().all(|l| l.align == Align::Right));
	}

	#[test]
	fn collapse_removes_only_that_category() {
		let tree = wide();
		let open = layout(&tree, 1000.0, 600.0, &HashSet::new());
		let collapsed = layout(&tree, 1000.0, 600.0, &HashSet::from(["C2".to_string()]));

		assert_eq!(open.lines.len() - collapsed.lines.len(), 3);
		assert_eq!(open.labels.len() - collapsed.labels.len(), 3);
		assert_eq!(open.badges.len() - collapsed.badges.len(), 3);

		let keep = |key: &CategoryKey| *key != CategoryKey::Category(2);
		let open_lines: Vec<_> = open.lines.iter().filter(|l| keep(&l.key)).collect();
		let closed_lines: Vec<_> = collapsed.lines.iter().filter(|l| keep(&l.key)).collect();
		assert_eq!(open_lines, closed_lines);
		let open_labels: Vec<_> = open.labels.iter().filter(|l| keep(&l.key)).collect();
		let closed_labels: Vec<_> = collapsed.labels.iter().filter(|l| keep(&l.key)).collect();
		assert_eq!(open_labels, closed_labels);
		let open_badges: Vec<_> = open.badges.iter().filter(|b| keep(&b.key)).collect();
		let closed_badges: Vec<_> = collapsed.badges.iter().filter(|b| keep(&b.key)).collect();
		assert_eq!(open_badges, closed_badges);
		assert!(collapsed.badges.iter().all(|b| b.key != CategoryKey::Category(2)));

		// the collapsed category itself keeps its bone and label
		assert!(collapsed.labels.iter().any(|l| l.element == Element::Category { category: 2 }));
	}

	#[test]
	fn layout_is_deterministic() {
		let tree = wide();
		let collapsed = HashSet::from(["C1".to_string()]);
		assert_eq!(
			layout(&tree, 1000.0, 600.0, &collapsed),
			layout(&tree, 1000.0, 600.0, &collapsed)
		);
	}

	#[test]
	fn badges_follow_points() {
		let tree = IssueTree {
			issue: "x".into(),
			link: None,
			categories: vec![category(
				"A",
				vec![cause("scored", Some(5.0)), cause("unscored", None)],
			)],
		};
		let scene = layout(&tree, 800.0, 400.0, &HashSet::new());
		assert_eq!(scene.badges.len(), 1);
		assert_eq!(scene.badges[0].points, 5.0);
		let scored = scene.labels.iter().find(|l| l.text == "scored").unwrap();
		assert_eq!(scene.badges[0].y, scored.y);
	}

	#[test]
	fn badge_sits_at_bone_end_of_cause_line() {
		let scene = layout(&outage(), 800.0, 400.0, &HashSet::new());
		let badge = &scene.badges[0];
		let line = scene
			.lines
			.iter()
			.find(|l| l.key == CategoryKey::Category(0) && l.y1 == l.y2 && l.y1 == badge.y)
			.unwrap();
		let label = scene.labels.iter().find(|l| l.text == "DNS").unwrap();
		assert_eq!(badge.x, line.x2 + BADGE_GAP);
		assert!(label.x < line.x1);
	}

	#[test]
	fn empty_tree_is_spine_only() {
		let tree = IssueTree {
			issue: "Nothing".into(),
			link: None,
			categories: vec![],
		};
		let scene = layout(&tree, 800.0, 400.0, &HashSet::new());
		assert_eq!(scene.lines.len(), 1);
		assert_eq!(scene.labels.len(), 1);
		assert!(scene.badges.is_empty());
	}

	#[test]
	fn links_are_carried() {
		let scene = layout(&wide(), 1000.0, 600.0, &HashSet::new());
		assert_eq!(scene.labels[0].link.as_deref(), Some("https://example.com"));
	}

	#[test]
	fn minimum_width_keeps_bones_apart() {
		for n in 1..12 {
			let spacing = (min_layout_width(n) - MARGIN) / n as f64;
			assert!(spacing > 2.0 * BONE_OFFSET);
		}
		assert!(min_layout_width(0) > MARGIN);
	}

	#[test]
	fn minimum_height_fits_deepest_column() {
		let tree = wide();
		let scene = layout(&tree, 1000.0, min_layout_height(&tree), &HashSet::new());
		assert!(scene.labels.iter().all(|l| l.y > 0.0 && l.y < scene.height));
	}
}
