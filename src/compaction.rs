//! Compaction algorithm.
//!
//! Compaction is the inverse of expansion against a target context: IRIs
//! are renamed to terms or `prefix:suffix` forms and structured literals
//! collapse back to native scalars where the context declares (or the
//! datatype implies) a coercion. Only the context entries actually used
//! are reported back to the caller.
use crate::context::Context;
use crate::error::Error;
use crate::keyword::{self, Keywords};
use crate::object;
use crate::vocab;
use json_syntax::{NumberBuf, Object, Value};

/// Recursively compacts an expanded `value` under `property`, recording
/// every context entry it relies on into `used`.
pub(crate) fn compact(
	ctx: &Context,
	property: Option<&str>,
	value: &Value,
	used: &mut Object,
) -> Result<Value, Error> {
	let keywords = ctx.keywords();
	match value {
		Value::Null => {
			// nothing to emit, but the coercion entry still counts as used
			if let Some(p) = property {
				ctx.coerce_type(p, Some(&mut *used));
			}
			Ok(Value::Null)
		}
		Value::Array(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(compact(ctx, property, item, used)?);
			}
			Ok(Value::Array(out))
		}
		Value::Object(map) if matches!(object::get(map, keyword::ID), Some(Value::Array(_))) => {
			// graph literal: compact the inner sequence under the aliased @id
			let inner = object::get(map, keyword::ID).cloned().unwrap_or(Value::Null);
			let compacted = compact(ctx, property, &inner, used)?;
			let mut out = Object::new();
			out.insert(keywords.alias(keyword::ID).into(), compacted);
			Ok(Value::Object(out))
		}
		Value::Object(map) if object::is_subject(value) => {
			let mut out = Object::new();
			for entry in map.iter() {
				let key = entry.key.as_str();
				if key == keyword::CONTEXT {
					continue;
				}
				let compacted = compact(ctx, Some(key), &entry.value, used)?;
				let p = ctx.compact_iri(key, Some(&mut *used), &keywords);
				// an uncompacted key never overwrites an existing entry
				if p != key || !object::contains(&out, &p) {
					object::set_key(&mut out, &p, compacted);
				}
			}
			Ok(Value::Object(out))
		}
		other => compact_literal(ctx, property, other, used, &keywords),
	}
}

/// Literal type as seen by reverse coercion: `@type`, `@id` for
/// references, or inherited from the declared coercion. `None` when a
/// language tag forbids coercion altogether.
fn literal_type(value: &Value, coerce: &Option<String>) -> Option<String> {
	match value {
		Value::Object(map) => {
			if object::contains(map, keyword::LANGUAGE) {
				return None;
			}
			if let Some(Value::String(ty)) = object::get(map, keyword::TYPE) {
				Some(ty.as_str().to_owned())
			} else if object::contains(map, keyword::ID) {
				Some(keyword::ID.to_owned())
			} else {
				coerce.clone()
			}
		}
		Value::String(_) => coerce.clone(),
		_ => None,
	}
}

fn compact_literal(
	ctx: &Context,
	property: Option<&str>,
	value: &Value,
	used: &mut Object,
	keywords: &Keywords,
) -> Result<Value, Error> {
	let mut coerce = property.and_then(|p| ctx.coerce_type(p, Some(&mut *used)));
	let ty = literal_type(value, &coerce);

	// native datatypes coerce without a declaration
	if coerce.is_none() {
		if let Some(t) = &ty {
			if vocab::is_native_type(t) {
				coerce = Some(t.clone());
			}
		}
	}

	if let Some(target) = coerce {
		let ty = match ty {
			// only a language tag leaves the type undetermined here
			None => return Err(Error::CoerceLanguage),
			Some(ty) => ty,
		};
		if ty != target {
			return Err(Error::InvalidCoerceType {
				found: ty,
				expected: target,
			});
		}

		let raw = match value {
			Value::Object(map) => match object::get(map, keyword::ID) {
				Some(id) => id.clone(),
				None => object::get(map, keyword::VALUE).cloned().unwrap_or(Value::Null),
			},
			other => other.clone(),
		};

		if target == keyword::ID {
			let iri = object::primitive_string(&raw);
			return Ok(Value::String(
				ctx.compact_iri(&iri, Some(&mut *used), keywords).into(),
			));
		}

		let lexical = object::primitive_string(&raw);
		if target == vocab::XSD_BOOLEAN.as_str() {
			Ok(Value::Boolean(lexical == "true"))
		} else if target == vocab::XSD_INTEGER.as_str() {
			match lexical.parse::<i64>() {
				Ok(n) => Ok(Value::Number(NumberBuf::from(n))),
				Err(_) => Err(Error::InvalidCoerceType {
					found: lexical,
					expected: target,
				}),
			}
		} else if target == vocab::XSD_DOUBLE.as_str() {
			let number = lexical
				.parse::<f64>()
				.ok()
				.and_then(|f| NumberBuf::try_from(f).ok());
			match number {
				Some(n) => Ok(Value::Number(n)),
				None => Err(Error::InvalidCoerceType {
					found: lexical,
					expected: target,
				}),
			}
		} else {
			Ok(raw)
		}
	} else {
		match value {
			Value::Object(map) => {
				// no coercion: re-emit the literal under keyword aliases
				let mut out = Object::new();
				for entry in map.iter() {
					out.insert(
						keywords.alias(entry.key.as_str()).into(),
						entry.value.clone(),
					);
				}
				if ty.as_deref() == Some(keyword::ID) {
					let alias = keywords.alias(keyword::ID);
					if let Some(slot) = object::get_mut(&mut out, alias) {
						let iri = object::primitive_string(slot);
						*slot = Value::String(ctx.compact_iri(&iri, Some(&mut *used), keywords).into());
					}
				}
				Ok(Value::Object(out))
			}
			other => Ok(other.clone()),
		}
	}
}
