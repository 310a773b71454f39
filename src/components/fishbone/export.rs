//! Vega v5 rendition of a scene, for any renderer that speaks the grammar.

use serde_json::{Value, json};

use super::layout::{Align, CategoryKey, Scene};
use super::scale::{NEUTRAL, OrdinalScale};

const FONT_SIZE: f64 = 12.0;

fn align_str(align: Align) -> &'static str {
	match align {
		Align::Left => "left",
		Align::Right => "right",
	}
}

fn color_encoding() -> Value {
	json!([
		{ "test": "datum.spine", "value": NEUTRAL },
		{ "scale": "color", "field": "category" }
	])
}

pub fn vega_spec(scene: &Scene, scale: &OrdinalScale) -> Value {
	let spine = |key: CategoryKey| key == CategoryKey::Spine;

	let lines: Vec<Value> = scene
		.lines
		.iter()
		.map(|l| {
			json!({
				"x1": l.x1, "y1": l.y1, "x2": l.x2, "y2": l.y2,
				"category": scale.name(l.key), "spine": spine(l.key),
			})
		})
		.collect();
	let labels: Vec<Value> = scene
		.labels
		.iter()
		.map(|l| {
			json!({
				"x": l.x, "y": l.y, "text": l.text,
				"align": align_str(l.align),
				"category": scale.name(l.key), "spine": spine(l.key),
				"element": l.element, "link": l.link,
			})
		})
		.collect();
	let badges: Vec<Value> = scene
		.badges
		.iter()
		.map(|b| {
			json!({
				"x": b.x, "y": b.y, "points": b.points,
				"category": scale.name(b.key), "spine": spine(b.key),
			})
		})
		.collect();

	json!({
		"$schema": "https://vega.github.io/schema/vega/v5.json",
		"width": scene.width,
		"height": scene.height,
		"padding": 5,
		"data": [
			{ "name": "lines", "values": lines },
			{ "name": "labels", "values": labels },
			{ "name": "badges", "values": badges }
		],
		"scales": [{
			"name": "color",
			"type": "ordinal",
			"domain": scale.domain(),
			"range": { "scheme": "category10" }
		}],
		"marks": [
			{
				"type": "rule",
				"from": { "data": "lines" },
				"encode": { "update": {
					"x": { "field": "x1" }, "y": { "field": "y1" },
					"x2": { "field": "x2" }, "y2": { "field": "y2" },
					"strokeWidth": { "value": 2 },
					"stroke": color_encoding()
				}}
			},
			{
				"type": "symbol",
				"from": { "data": "badges" },
				"encode": { "update": {
					"x": { "field": "x" }, "y": { "field": "y" },
					"shape": { "value": "circle" },
					"size": { "value": 200 },
					"fill": color_encoding()
				}}
			},
			{
				"type": "text",
				"from": { "data": "badges" },
				"encode": { "update": {
					"x": { "field": "x" }, "y": { "field": "y" },
					"align": { "value": "center" },
					"baseline": { "value": "middle" },
					"fill": { "value": "white" },
					"fontSize": { "value": FONT_SIZE - 3.0 },
					"text": { "field": "points" }
				}}
			},
			{
				"type": "text",
				"from": { "data": "labels" },
				"encode": { "update": {
					"x": { "field": "x" }, "y": { "field": "y" },
					"align": { "field": "align" },
					"baseline": { "value": "middle" },
					"fill": color_encoding(),
					"fontSize": { "value": FONT_SIZE },
					"text": { "field": "text" },
					"href": { "field": "link" }
				}}
			}
		]
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::components::fishbone::layout::layout;
	use crate::components::fishbone::types::IssueTree;

	fn outage() -> IssueTree {
		IssueTree::from_json(
			r#"{"issue":"Outage","categories":[
				{"name":"Network","causes":[{"name":"DNS","points":3}]},
				{"name":"Disk","causes":[{"name":"Full"}]}
			]}"#,
		)
		.unwrap()
	}

	#[test]
	fn data_tables_mirror_scene() {
		let tree = outage();
		let scene = layout(&tree, 800.0, 400.0, &HashSet::new());
		let spec = vega_spec(&scene, &OrdinalScale::new(tree.category_names()));

		assert_eq!(spec["width"], 800.0);
		assert_eq!(spec["data"][0]["values"].as_array().unwrap().len(), 5);
		assert_eq!(spec["data"][1]["values"].as_array().unwrap().len(), 5);
		assert_eq!(spec["data"][2]["values"].as_array().unwrap().len(), 1);
		assert_eq!(spec["data"][2]["values"][0]["points"], 3.0);
	}

	#[test]
	fn categories_named_in_rows_and_domain() {
		let tree = outage();
		let scene = layout(&tree, 800.0, 400.0, &HashSet::new());
		let spec = vega_spec(&scene, &OrdinalScale::new(tree.category_names()));

		assert_eq!(spec["scales"][0]["domain"], json!(["Network", "Disk"]));
		let lines = &spec["data"][0]["values"];
		assert_eq!(lines[0]["category"], "main");
		assert_eq!(lines[0]["spine"], true);
		assert_eq!(lines[1]["category"], "Network");
		assert_eq!(lines[1]["spine"], false);
		assert_eq!(spec["data"][1]["values"][0]["element"]["type"], "root");
		assert_eq!(spec["data"][1]["values"][2]["align"], "right");
	}
}
