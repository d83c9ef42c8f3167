//! Expansion algorithm.
//!
//! Expansion rewrites a document into a context-free form: every property
//! key becomes an absolute IRI, every coerced scalar becomes a structured
//! literal. Inline `@context` entries are merged into the active context
//! and stripped from the output.
use crate::context::Context;
use crate::error::Error;
use crate::keyword;
use crate::object;
use crate::vocab;
use iref::Iri;
use json_syntax::{Object, Value};
use mown::Mown;

/// Recursively expands `value` under `property` (`None` at the root).
pub(crate) fn expand(
	ctx: &Context,
	property: Option<&str>,
	value: &Value,
	base: Option<&Iri>,
) -> Result<Value, Error> {
	match value {
		Value::Null => Ok(Value::Null),
		// a string with no property is a property itself
		Value::String(s) if property.is_none() => {
			Ok(Value::String(ctx.expand_term(s.as_str(), None, base).into()))
		}
		Value::Array(items) => {
			let mut expanded = Vec::with_capacity(items.len());
			for item in items {
				expanded.push(expand(ctx, property, item, base)?);
			}
			Ok(Value::Array(expanded))
		}
		Value::Object(map) => expand_object(ctx, map, base),
		scalar => Ok(expand_scalar(ctx, property, scalar, base)),
	}
}

fn expand_object(ctx: &Context, map: &Object, base: Option<&Iri>) -> Result<Value, Error> {
	let ctx = match object::get(map, keyword::CONTEXT) {
		Some(Value::Object(local)) => Mown::Owned(ctx.merged(local)),
		_ => Mown::Borrowed(ctx),
	};

	let mut out = Object::new();
	for entry in map.iter() {
		let key = entry.key.as_str();
		if keyword::FRAME_KEYWORDS.contains(&key) {
			object::push_value(&mut out, key, entry.value.clone());
		} else if key != keyword::CONTEXT {
			let expanded = expand(&ctx, Some(key), &entry.value, base)?;
			let expanded_key = ctx.expand_term(key, None, base);
			object::push_value(&mut out, &expanded_key, expanded);
		}
	}
	Ok(Value::Object(out))
}

/// Expands a scalar under a property, applying declared or automatic type
/// coercion.
fn expand_scalar(ctx: &Context, property: Option<&str>, value: &Value, base: Option<&Iri>) -> Value {
	let keywords = ctx.keywords();
	let mut coerce = property.and_then(|p| ctx.coerce_type(p, None));

	// automatic coercion for native scalar types
	if coerce.is_none() {
		coerce = match value {
			Value::Boolean(_) => Some(vocab::XSD_BOOLEAN.as_str().to_owned()),
			Value::Number(n) if is_integer(n.as_str()) => {
				Some(vocab::XSD_INTEGER.as_str().to_owned())
			}
			Value::Number(_) => Some(vocab::XSD_DOUBLE.as_str().to_owned()),
			_ => None,
		};
	}

	// `@id` and `@type` (or their aliases) take bare expanded IRIs
	if let Some(p) = property {
		if keywords.matches(keyword::ID, p) || keywords.matches(keyword::TYPE, p) {
			let term = object::primitive_string(value);
			return Value::String(ctx.expand_term(&term, None, base).into());
		}
	}

	match coerce {
		Some(target) if target == keyword::ID => {
			let term = object::primitive_string(value);
			let mut out = Object::new();
			out.insert(
				keyword::ID.into(),
				Value::String(ctx.expand_term(&term, None, base).into()),
			);
			Value::Object(out)
		}
		Some(target) => {
			let literal = if target == vocab::XSD_DOUBLE.as_str() {
				match value {
					Value::Number(n) => object::format_double(n.as_f64_lossy()),
					other => object::primitive_string(other),
				}
			} else {
				object::primitive_string(value)
			};
			let mut out = Object::new();
			out.insert(keyword::TYPE.into(), Value::String(target.into()));
			out.insert(keyword::VALUE.into(), Value::String(literal.into()));
			Value::Object(out)
		}
		None => Value::String(object::primitive_string(value).into()),
	}
}

fn is_integer(lexical: &str) -> bool {
	!lexical.contains(['.', 'e', 'E'])
}
