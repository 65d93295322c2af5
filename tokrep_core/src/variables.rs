//! Variable store construction.
//!
//! Raw variable trees are `serde_json::Value`s (objects, arrays, scalars).
//! They are flattened into a single case-insensitive lookup table whose keys
//! are the uppercased, separator-joined paths of every leaf.
//!
//! Two composition modes exist and intentionally differ:
//!
//! - [`VariableMap::from_trees`] merges the raw trees structurally first and
//!   flattens the result once. When two sources disagree on the shape at a
//!   path (say an array in one and a longer array in the other), the later
//!   source replaces the whole value.
//! - [`VariableMap::from_each`] flattens every tree independently and merges
//!   the flat maps last-key-wins. It is indifferent to structure, which is
//!   what mixed sources (inline JSON, files, environment) need.

use std::collections::HashMap;

use derive_more::Deref;
use serde_json::Value;

/// A flattened variable: the original-case path (kept for logging) and the
/// stringified leaf value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedEntry {
	pub name: String,
	pub value: String,
}

/// Uppercased-key lookup table built once per run.
#[derive(Debug, Clone, Default, Deref)]
pub struct VariableMap {
	entries: HashMap<String, String>,
}

impl VariableMap {
	/// Composition mode (a): merge the raw trees structurally, then flatten
	/// once.
	pub fn from_trees<I>(trees: I, separator: &str) -> Self
	where
		I: IntoIterator<Item = Value>,
	{
		Self::from_entries(flatten(&merge(trees), separator))
	}

	/// Composition mode (b): flatten each tree independently, then merge the
	/// flat maps last-key-wins.
	pub fn from_each<I>(trees: I, separator: &str) -> Self
	where
		I: IntoIterator<Item = Value>,
	{
		let mut map = Self::default();
		for tree in trees {
			map.extend_from(flatten(&tree, separator));
		}
		map
	}

	/// Build the table from already-flattened entries, uppercasing keys.
	pub fn from_entries<I>(entries: I) -> Self
	where
		I: IntoIterator<Item = FlattenedEntry>,
	{
		let mut map = Self::default();
		map.extend_from(entries);
		map
	}

	fn extend_from<I>(&mut self, entries: I)
	where
		I: IntoIterator<Item = FlattenedEntry>,
	{
		for entry in entries {
			self.entries.insert(entry.name.to_uppercase(), entry.value);
		}
	}

	/// Case-insensitive lookup by variable name.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.get(&name.to_uppercase()).map(String::as_str)
	}
}

/// Combine raw trees left to right. At each shared key where both sides are
/// objects the merge recurses; for any other combination the later value
/// replaces the earlier one outright — arrays are never concatenated.
pub fn merge<I>(trees: I) -> Value
where
	I: IntoIterator<Item = Value>,
{
	let mut result = Value::Object(serde_json::Map::new());
	for tree in trees {
		merge_into(&mut result, tree);
	}
	result
}

fn merge_into(target: &mut Value, incoming: Value) {
	match (target, incoming) {
		(Value::Object(target_map), Value::Object(incoming_map)) => {
			for (key, value) in incoming_map {
				match target_map.get_mut(&key) {
					Some(existing) => merge_into(existing, value),
					None => {
						target_map.insert(key, value);
					}
				}
			}
		}
		(target, incoming) => *target = incoming,
	}
}

/// Flatten a tree depth-first into separator-joined leaf entries.
///
/// Arrays contribute numeric path segments. `null` leaves become the empty
/// string and other scalars are stringified. A top-level scalar produces no
/// entries. Keys keep their original case here; [`VariableMap`] uppercases
/// them for lookup.
pub fn flatten(tree: &Value, separator: &str) -> Vec<FlattenedEntry> {
	let mut entries = Vec::new();
	walk(tree, "", separator, &mut entries);
	entries
}

fn walk(value: &Value, path: &str, separator: &str, entries: &mut Vec<FlattenedEntry>) {
	match value {
		Value::Object(map) => {
			for (key, child) in map {
				descend(child, &join(path, key, separator), separator, entries);
			}
		}
		Value::Array(items) => {
			for (index, child) in items.iter().enumerate() {
				descend(
					child,
					&join(path, &index.to_string(), separator),
					separator,
					entries,
				);
			}
		}
		_ => {}
	}
}

fn descend(value: &Value, path: &str, separator: &str, entries: &mut Vec<FlattenedEntry>) {
	match value {
		Value::Object(_) | Value::Array(_) => walk(value, path, separator, entries),
		leaf => entries.push(FlattenedEntry {
			name: path.to_string(),
			value: leaf_to_string(leaf),
		}),
	}
}

fn join(parent: &str, key: &str, separator: &str) -> String {
	if parent.is_empty() {
		key.to_string()
	} else {
		format!("{parent}{separator}{key}")
	}
}

/// Stringify a scalar the way the lookup table stores it: `null` is empty,
/// booleans are `true`/`false`, and integral numbers render without a
/// trailing fraction.
fn leaf_to_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				i.to_string()
			} else if let Some(u) = n.as_u64() {
				u.to_string()
			} else {
				match n.as_f64() {
					// only drop the fraction when the value fits an i64
					Some(f)
						if f.is_finite()
							&& f.fract() == 0.0 && f >= i64::MIN as f64
							&& f < i64::MAX as f64 =>
					{
						format!("{}", f as i64)
					}
					Some(f) => f.to_string(),
					None => n.to_string(),
				}
			}
		}
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
