//! Context operations: merging, term expansion, IRI compaction and
//! coercion lookup.
//!
//! A context maps short names to IRIs. An entry is either a plain IRI
//! string or a mapping with an `@id` IRI and an optional `@type` coercion
//! target. Entries whose key starts with `@` are reserved.
use crate::keyword::{self, Keywords};
use crate::object;
use iref::{Iri, IriRefBuf};
use json_syntax::{Object, Value};

#[derive(Debug, Clone, Default)]
pub struct Context {
	definitions: Object,
}

/// The IRI associated with a context entry.
fn term_iri(entry: &Value) -> Option<&str> {
	match entry {
		Value::String(s) => Some(s.as_str()),
		Value::Object(o) => match object::get(o, keyword::ID) {
			Some(Value::String(s)) => Some(s.as_str()),
			_ => None,
		},
		_ => None,
	}
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps a user-provided `@context` value. Anything but a mapping
	/// reads as the empty context.
	pub fn from_value(value: &Value) -> Self {
		match value {
			Value::Object(o) => Self {
				definitions: o.clone(),
			},
			_ => Self::default(),
		}
	}

	pub fn keywords(&self) -> Keywords {
		Keywords::of(&self.definitions)
	}

	fn entry(&self, key: &str) -> Option<&Value> {
		object::get(&self.definitions, key)
	}

	/// Merges `other` onto this context. Entries of this context whose IRI
	/// is redefined by `other` are dropped first, so an IRI never ends up
	/// with two aliases; `other` wins on key conflicts.
	pub fn merged(&self, other: &Object) -> Self {
		let mut definitions = Object::new();
		for entry in self.definitions.iter() {
			let evicted = other.iter().any(|b| {
				!b.key.as_str().starts_with('@')
					&& term_iri(&b.value).is_some()
					&& term_iri(&b.value) == term_iri(&entry.value)
			});
			if !evicted {
				definitions.insert(entry.key.clone(), entry.value.clone());
			}
		}
		for entry in other.iter() {
			object::set_key(&mut definitions, entry.key.as_str(), entry.value.clone());
		}
		Self { definitions }
	}

	/// Expands a term into an absolute IRI.
	///
	/// The term may be a declared term, a `prefix:suffix` form, a keyword
	/// alias, or already an IRI; unresolved terms pass through. A relative
	/// IRI reference resolves against `base` when one is given.
	pub fn expand_term(&self, term: &str, used: Option<&mut Object>, base: Option<&Iri>) -> String {
		if let Some((prefix, suffix)) = term.split_once(':') {
			if let Some(entry) = self.entry(prefix) {
				if let Some(iri) = term_iri(entry) {
					if let Some(used) = used {
						object::set_key(used, prefix, entry.clone());
					}
					return format!("{iri}{suffix}");
				}
			}
			return term.to_owned();
		}
		if let Some(entry) = self.entry(term) {
			if let Some(iri) = term_iri(entry) {
				if let Some(used) = used {
					object::set_key(used, term, Value::String(iri.into()));
				}
				return iri.to_owned();
			}
		}
		if let Some(kw) = self.keywords().expand(term) {
			return kw.to_owned();
		}
		if let Some(base) = base {
			if !term.starts_with('@') {
				if let Ok(reference) = IriRefBuf::new(term.to_owned()) {
					return reference.resolved(base).into_string();
				}
			}
		}
		term.to_owned()
	}

	/// Compacts an IRI into a term or `prefix:suffix` form, preferring
	/// term matches over prefix matches. A used entry is recorded into the
	/// `used` accumulator.
	pub fn compact_iri(&self, iri: &str, used: Option<&mut Object>, keywords: &Keywords) -> String {
		for entry in self.definitions.iter() {
			let key = entry.key.as_str();
			if !key.starts_with('@') && term_iri(&entry.value) == Some(iri) {
				if let Some(used) = used {
					object::set_key(used, key, entry.value.clone());
				}
				return key.to_owned();
			}
		}
		if iri == keyword::TYPE {
			return keywords.alias(keyword::TYPE).to_owned();
		}
		for entry in self.definitions.iter() {
			let key = entry.key.as_str();
			if key.starts_with('@') {
				continue;
			}
			if let Some(ctx_iri) = term_iri(&entry.value) {
				if iri.len() > ctx_iri.len() && iri.starts_with(ctx_iri) {
					if let Some(used) = used {
						object::set_key(used, key, entry.value.clone());
					}
					return format!("{key}:{}", &iri[ctx_iri.len()..]);
				}
			}
		}
		iri.to_owned()
	}

	/// The coercion target declared for a property: the property's `@type`
	/// entry, or `@id` when the property itself expands to `@id`/`@type`.
	pub fn coerce_type(&self, property: &str, mut used: Option<&mut Object>) -> Option<String> {
		let expanded = self.expand_term(property, None, None);
		if expanded == keyword::ID || expanded == keyword::TYPE {
			return Some(keyword::ID.to_owned());
		}
		let keywords = self.keywords();
		let compacted = self.compact_iri(&expanded, None, &keywords);
		if let Some(Value::Object(entry)) = self.entry(&compacted) {
			if let Some(Value::String(ty)) = object::get(entry, keyword::TYPE) {
				let target = self.expand_term(ty.as_str(), used.as_mut().map(|u| &mut **u), None);
				if let Some(used) = used {
					object::set_key(used, &compacted, Value::Object(entry.clone()));
				}
				return Some(target);
			}
		}
		None
	}
}
