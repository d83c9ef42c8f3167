//! Flattening algorithm.
//!
//! Rewrites an expanded tree into a mapping from subject IRI to subject,
//! with every embedded subject promoted to the top level and replaced by
//! an IRI reference at its original position. Blank nodes must have been
//! named before flattening.
use crate::error::Error;
use crate::keyword;
use crate::object;
use indexmap::IndexMap;
use json_syntax::{Object, Value};

/// Flattens `value` into `subjects`, appending reference stand-ins to
/// `parent` when one is given.
pub(crate) fn flatten(
	parent: Option<&mut Vec<Value>>,
	parent_property: Option<&str>,
	value: &Value,
	subjects: &mut IndexMap<String, Value>,
) -> Result<(), Error> {
	let flattened = match value {
		// null values are dropped
		Value::Null => None,
		Value::Array(items) => {
			let mut parent = parent;
			for item in items {
				flatten(parent.as_mut().map(|p| &mut **p), parent_property, item, subjects)?;
			}
			return Ok(());
		}
		Value::Object(map) => {
			if object::contains(map, keyword::VALUE) || parent_property == Some(keyword::TYPE) {
				// literals and type references are kept as-is
				Some(value.clone())
			} else if let Some(Value::Array(graph)) = object::get(map, keyword::ID) {
				if parent.is_some() {
					return Err(Error::GraphLiteralFlatten);
				}
				for item in graph {
					flatten(None, parent_property, item, subjects)?;
				}
				None
			} else {
				let id = match object::subject_id(map) {
					Some(id) => id.to_owned(),
					// unnamed subjects cannot occur: nodes are named first
					None => return Ok(()),
				};
				flatten_subject(map, &id, subjects)?;
				let mut reference = Object::new();
				reference.insert(keyword::ID.into(), Value::String(id.as_str().into()));
				Some(Value::Object(reference))
			}
		}
		scalar => Some(Value::String(object::primitive_string(scalar).into())),
	};

	if let (Some(flattened), Some(parent)) = (flattened, parent) {
		// duplicate references to one subject collapse to a single entry
		let duplicate = match &flattened {
			Value::Object(o) => match object::subject_id(o) {
				Some(id) => parent.iter().any(|existing| match existing {
					Value::Object(e) => object::subject_id(e) == Some(id),
					_ => false,
				}),
				None => false,
			},
			_ => false,
		};
		if !duplicate {
			parent.push(flattened);
		}
	}
	Ok(())
}

/// Merges one occurrence of a subject into the pool, flattening each of
/// its property values in turn.
fn flatten_subject(
	map: &Object,
	id: &str,
	subjects: &mut IndexMap<String, Value>,
) -> Result<(), Error> {
	if !subjects.contains_key(id) {
		let mut subject = Object::new();
		subject.insert(keyword::ID.into(), Value::String(id.into()));
		subjects.insert(id.to_owned(), Value::Object(subject));
	}

	for entry in map.iter() {
		let key = entry.key.as_str();
		if key == keyword::ID || entry.value.is_null() {
			continue;
		}

		// pull the accumulated values out, extend, and store back; a
		// single value collapses out of its sequence
		let mut items = match subjects
			.get(id)
			.and_then(|s| s.as_object())
			.and_then(|o| object::get(o, key))
		{
			Some(Value::Array(items)) => items.clone(),
			Some(other) => vec![other.clone()],
			None => Vec::new(),
		};
		flatten(Some(&mut items), Some(key), &entry.value, subjects)?;
		let stored = if items.len() == 1 {
			items.pop().unwrap()
		} else {
			Value::Array(items)
		};
		if let Some(Value::Object(subject)) = subjects.get_mut(id) {
			object::set_key(subject, key, stored);
		}
	}
	Ok(())
}
