use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DataError;

/// Free-form cause attribute (`status`, `priority`). Never read by the layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
	Flag(bool),
	Number(f64),
	Text(String),
}

impl fmt::Display for Attribute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Attribute::Flag(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
			Attribute::Number(n) => write!(f, "{}", n),
			Attribute::Text(s) => f.write_str(s),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cause {
	pub name: String,
	#[serde(default)]
	pub link: Option<String>,
	#[serde(default)]
	pub points: Option<f64>,
	#[serde(default)]
	pub status: Option<Attribute>,
	#[serde(default)]
	pub priority: Option<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
	pub name: String,
	#[serde(default)]
	pub link: Option<String>,
	pub causes: Vec<Cause>,
}

/// Root of the diagram. Category order decides placement and bone direction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueTree {
	pub issue: String,
	#[serde(default)]
	pub link: Option<String>,
	pub categories: Vec<Category>,
}

impl IssueTree {
	/// Parse and validate an issue document.
	///
	/// `categories` and every `causes` list are required; an absent list is a
	/// load error rather than an empty bone.
	pub fn from_json(source: &str) -> Result<Self, DataError> {
		let tree: IssueTree = serde_json::from_str(source)?;
		tree.validate()?;
		Ok(tree)
	}

	fn validate(&self) -> Result<(), DataError> {
		if self.issue.trim().is_empty() {
			return Err(DataError::EmptyIssue);
		}
		let mut seen = HashSet::new();
		for (i, category) in self.categories.iter().enumerate() {
			if category.name.trim().is_empty() {
				return Err(DataError::EmptyCategoryName(i));
			}
			if !seen.insert(category.name.as_str()) {
				return Err(DataError::DuplicateCategory(category.name.clone()));
			}
		}
		Ok(())
	}

	pub fn category_names(&self) -> Vec<String> {
		self.categories.iter().map(|c| c.name.clone()).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_minimal_document() {
		let tree = IssueTree::from_json(
			r#"{"issue":"Outage","categories":[{"name":"Network","causes":[{"name":"DNS","points":3}]}]}"#,
		)
		.unwrap();
		assert_eq!(tree.issue, "Outage");
		assert_eq!(tree.categories[0].causes[0].points, Some(3.0));
		assert_eq!(tree.categories[0].causes[0].status, None);
		assert_eq!(tree.link, None);
	}

	#[test]
	fn missing_causes_fails_at_load() {
		let err = IssueTree::from_json(r#"{"issue":"Outage","categories":[{"name":"Network"}]}"#)
			.unwrap_err();
		assert!(matches!(err, DataError::Malformed(_)));
		assert!(err.to_string().contains("causes"));
	}

	#[test]
	fn missing_categories_fails_at_load() {
		let err = IssueTree::from_json(r#"{"issue":"Outage"}"#).unwrap_err();
		assert!(err.to_string().contains("categories"));
	}

	#[test]
	fn german_field_names_are_rejected() {
		assert!(IssueTree::from_json(r#"{"fehler":"Ausfall","kategorien":[]}"#).is_err());
	}

	#[test]
	fn duplicate_category_is_rejected() {
		let err = IssueTree::from_json(
			r#"{"issue":"x","categories":[{"name":"A","causes":[]},{"name":"A","causes":[]}]}"#,
		)
		.unwrap_err();
		assert!(matches!(err, DataError::DuplicateCategory(ref n) if n == "A"));
	}

	#[test]
	fn blank_issue_is_rejected() {
		let err = IssueTree::from_json(r#"{"issue":"  ","categories":[]}"#).unwrap_err();
		assert!(matches!(err, DataError::EmptyIssue));
	}

	#[test]
	fn free_form_attributes() {
		let tree = IssueTree::from_json(
			r#"{"issue":"x","categories":[{"name":"A","causes":[
				{"name":"a","status":"open","priority":2},
				{"name":"b","status":true}
			]}]}"#,
		)
		.unwrap();
		let causes = &tree.categories[0].causes;
		assert_eq!(causes[0].status.as_ref().unwrap().to_string(), "open");
		assert_eq!(causes[0].priority.as_ref().unwrap().to_string(), "2");
		assert_eq!(causes[1].status.as_ref().unwrap().to_string(), "yes");
	}

	#[test]
	fn bundled_example_loads() {
		let tree = IssueTree::from_json(include_str!("../../data/example.json")).unwrap();
		assert!(!tree.categories.is_empty());
		assert_eq!(tree.category_names().len(), tree.categories.len());
	}
}
