//! Predicates and comparisons over JSON-LD value shapes.
use crate::id::is_blank_node_iri;
use crate::keyword;
use json_syntax::{Object, Value};
use std::cmp::Ordering;

/// First value stored under `key`, if any.
///
/// Duplicate keys can only come from hostile input; they read as absent.
pub fn get<'a>(object: &'a Object, key: &str) -> Option<&'a Value> {
	object.get_unique(key).ok().flatten()
}

pub fn get_mut<'a>(object: &'a mut Object, key: &str) -> Option<&'a mut Value> {
	object.get_unique_mut(key).ok().flatten()
}

pub fn contains(object: &Object, key: &str) -> bool {
	get(object, key).is_some()
}

/// Sets `key` to `value`, replacing in place so the entry keeps its
/// position; new keys are appended.
pub fn set_key(object: &mut Object, key: &str, value: Value) {
	match get_mut(object, key) {
		Some(slot) => *slot = value,
		None => {
			object.insert(key.into(), value);
		}
	}
}

/// Adds a property value, turning the slot into a sequence when a value is
/// already present.
pub fn push_value(object: &mut Object, key: &str, value: Value) {
	match get_mut(object, key) {
		Some(slot) => {
			let mut items = match std::mem::replace(slot, Value::Null) {
				Value::Array(items) => items,
				other => vec![other],
			};
			items.push(value);
			*slot = Value::Array(items);
		}
		None => {
			object.insert(key.into(), value);
		}
	}
}

/// The subject IRI of a mapping, when present as a string.
pub fn subject_id(object: &Object) -> Option<&str> {
	match get(object, keyword::ID) {
		Some(Value::String(s)) => Some(s.as_str()),
		_ => None,
	}
}

/// A subject: a mapping with no `@value` that either has no `@id` or has
/// at least one other key.
pub fn is_subject(value: &Value) -> bool {
	match value {
		Value::Object(o) => {
			!contains(o, keyword::VALUE) && (o.len() > 1 || !contains(o, keyword::ID))
		}
		_ => false,
	}
}

/// An IRI reference: a mapping whose only key is `@id`.
pub fn is_reference(value: &Value) -> bool {
	match value {
		Value::Object(o) => o.len() == 1 && contains(o, keyword::ID),
		_ => false,
	}
}

/// A mapping carrying a blank node IRI under `@id`.
pub fn is_named_blank_node(value: &Value) -> bool {
	match value {
		Value::Object(o) => subject_id(o).is_some_and(is_blank_node_iri),
		_ => false,
	}
}

/// A subject that is anonymous or named in a blank node namespace.
pub fn is_blank_node(value: &Value) -> bool {
	is_subject(value)
		&& match value {
			Value::Object(o) => !contains(o, keyword::ID) || is_named_blank_node(value),
			_ => false,
		}
}

/// Views any value as a slice of values.
pub fn as_array(value: &Value) -> &[Value] {
	match value {
		Value::Array(items) => items,
		other => std::slice::from_ref(other),
	}
}

/// The string form of an expanded scalar.
pub fn primitive_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.as_str().to_owned(),
		Value::Boolean(true) => "true".to_owned(),
		Value::Boolean(false) => "false".to_owned(),
		Value::Number(n) => n.as_str().to_owned(),
		Value::Null => "null".to_owned(),
		_ => String::new(),
	}
}

/// Formats a double in the six-digit scientific wire form, e.g.
/// `1.23` ⇒ `1.230000e+00`.
pub fn format_double(value: f64) -> String {
	let s = format!("{:.6e}", value);
	match s.split_once('e') {
		Some((mantissa, exponent)) => {
			let (sign, digits) = match exponent.strip_prefix('-') {
				Some(digits) => ('-', digits),
				None => ('+', exponent),
			};
			format!("{mantissa}e{sign}{digits:0>2}")
		}
		None => s,
	}
}

fn kind_rank(value: &Value) -> u8 {
	match value {
		Value::Null => 0,
		Value::Boolean(_) => 1,
		Value::Number(_) => 2,
		Value::String(_) => 3,
		Value::Array(_) => 4,
		Value::Object(_) => 5,
	}
}

/// Generic value ordering: sequences element-wise, scalars by their
/// lexical form, mixed kinds by kind.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::String(x), Value::String(y)) => x.as_str().cmp(y.as_str()),
		(Value::Array(x), Value::Array(y)) => {
			for (va, vb) in x.iter().zip(y.iter()) {
				let r = compare_values(va, vb);
				if r != Ordering::Equal {
					return r;
				}
			}
			x.len().cmp(&y.len())
		}
		(Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
		(Value::Number(x), Value::Number(y)) => x.as_str().cmp(y.as_str()),
		_ => kind_rank(a).cmp(&kind_rank(b)),
	}
}

fn compare_object_keys(a: &Object, b: &Object, key: &str) -> Ordering {
	match (get(a, key), get(b, key)) {
		(Some(va), Some(vb)) => compare_values(va, vb),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

/// Orders expanded object values: strings first, then literals by
/// `@value`/`@type`/`@language`, then references by `@id`.
pub fn compare_objects(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::String(x), Value::String(y)) => x.as_str().cmp(y.as_str()),
		(Value::String(_), _) => Ordering::Less,
		(_, Value::String(_)) => Ordering::Greater,
		(Value::Object(oa), Value::Object(ob)) => {
			let r = compare_object_keys(oa, ob, keyword::VALUE);
			if r != Ordering::Equal {
				return r;
			}
			if contains(oa, keyword::VALUE) {
				let r = compare_object_keys(oa, ob, keyword::TYPE);
				if r != Ordering::Equal {
					return r;
				}
				compare_object_keys(oa, ob, keyword::LANGUAGE)
			} else {
				compare_object_keys(oa, ob, keyword::ID)
			}
		}
		_ => compare_values(a, b),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use json_syntax::Parse;

	fn value(s: &str) -> Value {
		Value::parse_str(s).unwrap().0
	}

	#[test]
	fn doubles_use_the_wire_form() {
		assert_eq!(format_double(1.23), "1.230000e+00");
		assert_eq!(format_double(0.0), "0.000000e+00");
		assert_eq!(format_double(0.0025), "2.500000e-03");
		assert_eq!(format_double(-1.0e100), "-1.000000e+100");
	}

	#[test]
	fn subject_shapes() {
		assert!(is_subject(&value(r#"{"@id": "a", "b": "c"}"#)));
		assert!(is_subject(&value(r#"{"b": "c"}"#)));
		assert!(!is_subject(&value(r#"{"@id": "a"}"#)));
		assert!(!is_subject(&value(r#"{"@value": "v"}"#)));
		assert!(is_reference(&value(r#"{"@id": "a"}"#)));
		assert!(is_blank_node(&value(r#"{"@id": "_:b0", "p": "v"}"#)));
		assert!(!is_blank_node(&value(r#"{"@id": "http://a/", "p": "v"}"#)));
	}

	#[test]
	fn strings_order_before_literal_objects() {
		let s = value(r#""z""#);
		let v = value(r#"{"@value": "a"}"#);
		assert_eq!(compare_objects(&s, &v), Ordering::Less);
		assert_eq!(compare_objects(&v, &s), Ordering::Greater);
	}
}
