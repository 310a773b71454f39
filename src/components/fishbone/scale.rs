use super::layout::CategoryKey;

/// d3 `category10`.
pub const CATEGORY10: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Fixed color of the spine and root label.
pub const NEUTRAL: &str = "#e0e0e0";

/// Ordinal color scale over the category names, in tree order.
///
/// Colors are looked up by the key's index, so lookups never touch the names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrdinalScale {
	domain: Vec<String>,
}

impl OrdinalScale {
	pub fn new(domain: Vec<String>) -> Self {
		Self { domain }
	}

	pub fn domain(&self) -> &[String] {
		&self.domain
	}

	pub fn color(&self, key: CategoryKey) -> &'static str {
		match key {
			CategoryKey::Spine => NEUTRAL,
			CategoryKey::Category(i) => CATEGORY10[i % CATEGORY10.len()],
		}
	}

	pub fn name(&self, key: CategoryKey) -> &str {
		match key {
			CategoryKey::Spine => "main",
			CategoryKey::Category(i) => self.domain.get(i).map(String::as_str).unwrap_or(""),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn spine_is_neutral() {
		let scale = OrdinalScale::new(vec!["main".into()]);
		assert_eq!(scale.color(CategoryKey::Spine), NEUTRAL);
		assert_ne!(scale.color(CategoryKey::Category(0)), NEUTRAL);
	}

	#[test]
	fn colors_cycle_past_ten() {
		let scale = OrdinalScale::new((0..12).map(|i| i.to_string()).collect());
		assert_eq!(scale.color(CategoryKey::Category(0)), "#1f77b4");
		assert_eq!(
			scale.color(CategoryKey::Category(10)),
			scale.color(CategoryKey::Category(0))
		);
		assert_eq!(scale.name(CategoryKey::Category(11)), "11");
	}

	#[test]
	fn names_resolve_by_index() {
		let scale = OrdinalScale::new(vec!["Network".into(), "Disk".into()]);
		assert_eq!(scale.name(CategoryKey::Category(1)), "Disk");
		assert_eq!(scale.name(CategoryKey::Spine), "main");
		assert_eq!(scale.name(CategoryKey::Category(7)), "");
	}
}
