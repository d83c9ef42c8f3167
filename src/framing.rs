//! Framing algorithm.
//!
//! A frame is a shape template matched against the normalized graph.
//! Matched subjects are re-embedded at the position they matched; a
//! subject can only be embedded once, so later embeds demote earlier
//! automatic ones to plain IRI references. Matching is by `@type`
//! overlap, or by duck-typing on the frame's properties when the frame
//! declares no type.
use crate::context::Context;
use crate::error::Error;
use crate::keyword;
use crate::normalization;
use crate::object;
use crate::{expansion, Options};
use indexmap::IndexMap;
use json_syntax::{Object, Value};

/// Default framing flags, each overridable per subframe with `@embed`,
/// `@explicit` and `@omitDefault`.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
	/// Embed matched subjects instead of referencing them.
	pub embed: bool,
	/// Drop subject keys the frame does not mention.
	pub explicit: bool,
	/// Leave keys missing from the graph absent instead of filling in
	/// `@default` values.
	pub omit_default: bool,
}

impl Default for Defaults {
	fn default() -> Self {
		Self {
			embed: true,
			explicit: false,
			omit_default: false,
		}
	}
}

pub(crate) fn frame(input: &Value, frame: &Value, options: &Options) -> Result<Value, Error> {
	// save the frame context, then strip it by expanding the frame
	let mut ctx = None;
	let expanded_frame = match frame {
		Value::Object(map) if object::contains(map, keyword::CONTEXT) => {
			ctx = object::get(map, keyword::CONTEXT).cloned();
			expansion::expand(&Context::new(), None, frame, options.base.as_deref())?
		}
		Value::Array(items) => {
			if let Some(Value::Object(first)) = items.first() {
				ctx = object::get(first, keyword::CONTEXT).cloned();
			}
			let mut expanded = Vec::with_capacity(items.len());
			for item in items {
				expanded.push(expansion::expand(
					&Context::new(),
					None,
					item,
					options.base.as_deref(),
				)?);
			}
			Value::Array(expanded)
		}
		other => other.clone(),
	};

	let normalized = normalization::normalize(input, options)?;
	let mut subjects = IndexMap::new();
	let mut input_list = Vec::new();
	if let Value::Array(items) = &normalized {
		for item in items {
			if let Some(id) = item.as_object().and_then(object::subject_id) {
				subjects.insert(id.to_owned(), item.clone());
			}
			input_list.push(item.clone());
		}
	}

	let mut framer = Framer {
		subjects,
		embeds: IndexMap::new(),
		defaults: options.framing,
	};
	let framed = framer.frame_value(&input_list, &expanded_frame, false, None)?;
	let assembled = framer.assemble_value(framed, None);

	match &ctx {
		Some(ctx) if !assembled.is_null() => match &assembled {
			Value::Array(items) => {
				let mut compacted = Vec::with_capacity(items.len());
				for item in items {
					compacted.push(crate::compact(item, ctx, options)?);
				}
				Ok(Value::Array(compacted))
			}
			other => crate::compact(other, ctx, options),
		},
		_ => Ok(assembled),
	}
}

/// An embedding decision for one subject: where it lives (`None` for the
/// top level) and whether it was embedded by a catch-all subframe.
struct Embed {
	parent: Option<(String, String)>,
	auto: bool,
}

struct Framer {
	/// Subject pool; framing rewrites entries in place as it descends.
	subjects: IndexMap<String, Value>,
	embeds: IndexMap<String, Embed>,
	defaults: Defaults,
}

impl Framer {
	/// Frames `input` against `frame`, which is either a single map
	/// (yielding a single value, first match wins) or a sequence of maps
	/// (yielding a sequence; empty means match-all).
	fn frame_value(
		&mut self,
		input: &[Value],
		frame: &Value,
		auto: bool,
		parent: Option<(&str, &str)>,
	) -> Result<Value, Error> {
		let empty_frame = Value::Object(Object::new());
		let (frames, sequence): (Vec<&Value>, bool) = match frame {
			Value::Array(items) if items.is_empty() => (vec![&empty_frame], true),
			Value::Array(items) => (items.iter().collect(), true),
			single => (vec![single], false),
		};
		let mut limit: i32 = if sequence { -1 } else { 1 };

		// collect the matches of every subframe
		let mut matches: Vec<Vec<Value>> = Vec::with_capacity(frames.len());
		for f in &frames {
			if limit == 0 {
				break;
			}
			let frame_map = match f {
				Value::Object(map) => map,
				_ => return Err(Error::InvalidFrameFormat),
			};
			let mut list = Vec::new();
			for next in input {
				if limit == 0 {
					break;
				}
				let next = self.dereference(next);
				if is_type_match(&next, frame_map) || is_duck_type(&next, frame_map) {
					list.push(next);
					limit -= 1;
				}
			}
			matches.push(list);
		}

		let mut out: Vec<Value> = Vec::new();
		for (i, list) in matches.into_iter().enumerate() {
			for value in list {
				let frame_map = match frames[i] {
					Value::Object(map) => map,
					_ => return Err(Error::InvalidFrameFormat),
				};
				if object::is_subject(&value) {
					let id = value
						.as_object()
						.and_then(object::subject_id)
						.map(str::to_owned);
					if let Some(id) = id {
						let marker = self.subframe(&id, frame_map, auto, parent)?;
						out.push(marker);
						continue;
					}
				}
				// non-subject matches pass through, except parentless
				// references to subjects already embedded elsewhere
				let skip = parent.is_none()
					&& object::is_reference(&value)
					&& value
						.as_object()
						.and_then(object::subject_id)
						.is_some_and(|id| self.embeds.contains_key(id));
				if !skip {
					out.push(value);
				}
			}
		}

		if sequence {
			Ok(Value::Array(out))
		} else {
			Ok(out.into_iter().next().unwrap_or(Value::Null))
		}
	}

	/// Replaces a reference by the full subject it points at.
	fn dereference(&self, value: &Value) -> Value {
		if let Some(id) = value.as_object().and_then(object::subject_id) {
			if let Some(subject) = self.subjects.get(id) {
				return subject.clone();
			}
		}
		value.clone()
	}

	/// Frames one subject in place and returns a reference marker for its
	/// position; the marker is resolved into the full framed subject
	/// during assembly if this position stays its embedding site.
	fn subframe(
		&mut self,
		id: &str,
		frame: &Object,
		auto: bool,
		parent: Option<(&str, &str)>,
	) -> Result<Value, Error> {
		let embed_on = frame_flag(frame, keyword::EMBED, self.defaults.embed)
			&& match self.embeds.get(id) {
				None => true,
				Some(embed) => embed.auto && !auto,
			};
		if !embed_on {
			return Ok(reference(id));
		}

		// a demoted embed drags its dangling dependents along
		if let Some(prev) = self.embeds.get(id) {
			if prev.parent.is_some() {
				self.remove_dependent_embeds(id);
			}
		}
		self.embeds.insert(
			id.to_owned(),
			Embed {
				parent: parent.map(|(p, k)| (p.to_owned(), k.to_owned())),
				auto,
			},
		);

		let mut value = match self.subjects.get(id) {
			Some(Value::Object(map)) => map.clone(),
			_ => match reference(id) {
				Value::Object(map) => map,
				_ => Object::new(),
			},
		};

		if frame_flag(frame, keyword::EXPLICIT, self.defaults.explicit) {
			let mut kept = Object::new();
			for entry in value.iter() {
				let key = entry.key.as_str();
				if key == keyword::ID || object::contains(frame, key) {
					kept.insert(entry.key.clone(), entry.value.clone());
				}
			}
			value = kept;
		}

		let property_keys: Vec<String> = value
			.iter()
			.map(|e| e.key.as_str().to_owned())
			.filter(|k| !k.starts_with('@'))
			.collect();
		for key in property_keys {
			let (subf, sub_auto) = match object::get(frame, &key) {
				Some(f) => (f.clone(), false),
				None => {
					// catch-all subframe preserves unframed data
					let shape = match object::get(&value, &key) {
						Some(Value::Array(_)) => Value::Array(Vec::new()),
						_ => Value::Object(Object::new()),
					};
					(shape, true)
				}
			};
			let input: Vec<Value> = object::get(&value, &key)
				.map(|v| object::as_array(v).to_vec())
				.unwrap_or_default();
			let framed = self.frame_value(&input, &subf, sub_auto, Some((id, key.as_str())))?;
			object::set_key(&mut value, &key, framed);
		}

		// fill in what the frame asks for but the graph lacks
		for entry in frame.iter() {
			let key = entry.key.as_str();
			if key.starts_with('@') {
				continue;
			}
			let missing = match object::get(&value, key) {
				None => true,
				Some(Value::Null) => true,
				_ => false,
			};
			if !missing {
				continue;
			}
			if let Value::Array(_) = entry.value {
				object::set_key(&mut value, key, Value::Array(Vec::new()));
			} else {
				let subframe = entry.value.as_object();
				let omit = subframe
					.map(|f| frame_flag(f, keyword::OMIT_DEFAULT, self.defaults.omit_default))
					.unwrap_or(self.defaults.omit_default);
				if omit {
					remove_key(&mut value, key);
				} else {
					let default = subframe
						.and_then(|f| object::get(f, keyword::DEFAULT))
						.cloned()
						.unwrap_or(Value::Null);
					object::set_key(&mut value, key, default);
				}
			}
		}

		self.subjects.insert(id.to_owned(), Value::Object(value));
		Ok(reference(id))
	}

	fn remove_dependent_embeds(&mut self, id: &str) {
		let children: Vec<String> = self
			.embeds
			.iter()
			.filter(|(_, e)| e.parent.as_ref().is_some_and(|(p, _)| p == id))
			.map(|(k, _)| k.clone())
			.collect();
		for child in children {
			self.embeds.shift_remove(&child);
			self.remove_dependent_embeds(&child);
		}
	}

	/// Resolves reference markers into framed subjects wherever the
	/// recorded embedding site matches, leaving plain references behind
	/// everywhere else.
	fn assemble_value(&self, value: Value, parent: Option<(&str, &str)>) -> Value {
		match value {
			Value::Array(items) => Value::Array(
				items
					.into_iter()
					.map(|v| self.assemble_value(v, parent))
					.collect(),
			),
			Value::Object(map) => {
				if let Some(id) = object::subject_id(&map) {
					if map.len() == 1 {
						if let Some(embed) = self.embeds.get(id) {
							let site_matches = match (&embed.parent, parent) {
								(None, None) => true,
								(Some((pi, pk)), Some((qi, qk))) => pi == qi && pk == qk,
								_ => false,
							};
							if site_matches {
								return self.assemble_subject(id);
							}
						}
					}
				}
				Value::Object(map)
			}
			other => other,
		}
	}

	fn assemble_subject(&self, id: &str) -> Value {
		let Some(Value::Object(map)) = self.subjects.get(id) else {
			return reference(id);
		};
		let mut out = Object::new();
		for entry in map.iter() {
			let key = entry.key.as_str();
			let assembled = if key.starts_with('@') {
				entry.value.clone()
			} else {
				self.assemble_value(entry.value.clone(), Some((id, key)))
			};
			out.insert(entry.key.clone(), assembled);
		}
		Value::Object(out)
	}
}

fn reference(id: &str) -> Value {
	let mut map = Object::new();
	map.insert(keyword::ID.into(), Value::String(id.into()));
	Value::Object(map)
}

fn frame_flag(frame: &Object, key: &str, default: bool) -> bool {
	match object::get(frame, key) {
		Some(Value::Boolean(b)) => *b,
		Some(_) => default,
		None => default,
	}
}

fn remove_key(object: &mut Object, key: &str) {
	let mut kept = Object::new();
	for entry in object.iter() {
		if entry.key.as_str() != key {
			kept.insert(entry.key.clone(), entry.value.clone());
		}
	}
	*object = kept;
}

/// `@type` overlap between a frame and a subject.
fn is_type_match(value: &Value, frame: &Object) -> bool {
	let Some(frame_types) = object::get(frame, keyword::TYPE) else {
		return false;
	};
	let Some(map) = value.as_object() else {
		return false;
	};
	let Some(value_types) = object::get(map, keyword::TYPE) else {
		return false;
	};
	object::as_array(frame_types).iter().any(|ft| {
		object::as_array(value_types)
			.iter()
			.any(|vt| object::compare_values(ft, vt) == std::cmp::Ordering::Equal)
	})
}

/// Duck-typing: a frame with no `@type` matches a subject carrying every
/// non-`@` key of the frame; a frame with no keys matches anything.
fn is_duck_type(value: &Value, frame: &Object) -> bool {
	if object::contains(frame, keyword::TYPE) {
		return false;
	}
	let props: Vec<&str> = frame
		.iter()
		.map(|e| e.key.as_str())
		.filter(|k| !k.starts_with('@'))
		.collect();
	if props.is_empty() {
		return true;
	}
	match value {
		Value::Object(map) if object::contains(map, keyword::ID) => {
			props.iter().all(|p| object::contains(map, p))
		}
		_ => false,
	}
}
