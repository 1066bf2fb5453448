//! Search result entries and their conversion into host values.
use std::collections::BTreeMap;

use ldap3::SearchEntry;
use serde_json::{Map, Value};

/// One directory entry returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
	/// Distinguished name of the entry
	pub dn: String,
	/// Attribute values by attribute name, in the order the library returned
	/// them
	pub attributes: BTreeMap<String, Vec<String>>,
}

impl Entry {
	/// Create an entry without attributes.
	#[must_use]
	pub fn new(dn: impl Into<String>) -> Self {
		Self { dn: dn.into(), attributes: BTreeMap::new() }
	}

	/// Add an attribute with its values, replacing any previous values.
	#[must_use]
	pub fn with_attribute<V: Into<String>>(
		mut self,
		name: impl Into<String>,
		values: impl IntoIterator<Item = V>,
	) -> Self {
		self.attributes.insert(name.into(), values.into_iter().map(Into::into).collect());
		self
	}

	/// Convert to the host representation: an object with a `dn` string and
	/// one array of strings per attribute.
	#[must_use]
	pub fn to_value(&self) -> Value {
		let mut object = Map::new();
		for (name, values) in &self.attributes {
			object.insert(name.clone(), values.iter().cloned().map(Value::String).collect());
		}
		object.insert("dn".to_owned(), Value::String(self.dn.clone()));
		Value::Object(object)
	}
}

impl From<SearchEntry> for Entry {
	fn from(entry: SearchEntry) -> Self {
		let mut attributes = entry.attrs.into_iter().collect::<BTreeMap<_, _>>();
		for (name, values) in entry.bin_attrs {
			let values = values.iter().map(|value| String::from_utf8_lossy(value).into_owned());
			attributes.entry(name).or_default().extend(values);
		}
		Self { dn: entry.dn, attributes }
	}
}

/// Convert a whole result set to the host representation.
#[must_use]
pub fn to_value(entries: &[Entry]) -> Value {
	Value::Array(entries.iter().map(Entry::to_value).collect())
}
