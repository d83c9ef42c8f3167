//! A JSON-LD processor with canonical blank node naming.
//!
//! Four operations transform Linked Data documents between their
//! canonical shapes:
//!
//! - [`expand`] removes the context: every property becomes an absolute
//!   IRI, every coerced scalar a structured literal.
//! - [`compact`] applies a context to expanded data: IRIs shorten to
//!   terms and prefixes, literals collapse back to native scalars.
//! - [`normalize`] produces an isomorphism-invariant form: anonymous
//!   subjects receive deterministic `_:c14n<n>` names and the graph is
//!   emitted as a sorted, flat sequence of subjects. Two documents
//!   describing the same graph normalize to the same bytes regardless of
//!   key order or blank node labeling.
//! - [`frame`] reshapes a graph to match a template, re-embedding
//!   referenced subjects and resolving reference cycles.
//!
//! Documents are [`json_syntax::Value`] trees; mapping keys keep their
//! insertion order and integers stay distinct from doubles, which the
//! algorithms rely on. Doubles travel in the six-digit scientific form
//! `1.230000e+00`.
//!
//! # Example
//!
//! ```
//! use json_syntax::{Parse, Value};
//!
//! let (doc, _) = Value::parse_str(r#"{
//!     "@context": {"ex": "http://example.org/vocab#"},
//!     "ex:knows": {"ex:name": "Jane"}
//! }"#).unwrap();
//!
//! let normalized = canonld::normalize(&doc, &canonld::Options::default()).unwrap();
//! # assert!(matches!(normalized, Value::Array(_)));
//! ```
use iref::IriBuf;
use json_syntax::Object;

mod compaction;
mod context;
mod error;
mod expansion;
mod flattening;
mod framing;
mod id;
pub mod keyword;
mod normalization;
mod object;
pub mod vocab;

pub use error::{Error, ErrorCode};
pub use framing::Defaults as FramingDefaults;
pub use json_syntax::Value;

use context::Context;
use keyword::Keywords;

/// Processing options shared by the four operations.
#[derive(Debug, Clone, Default)]
pub struct Options {
	/// Base IRI against which relative IRI references resolve. Without
	/// one, unresolved terms pass through verbatim.
	pub base: Option<IriBuf>,

	/// Accepted for compatibility; no surviving optimization is gated on
	/// it, since reusing cached serialization hints can change canonical
	/// output.
	pub optimize: bool,

	/// Default framing flags, used by [`frame`].
	pub framing: FramingDefaults,
}

/// Expands `input`, removing all context information.
///
/// Every property key of the result is an absolute IRI or a reserved
/// `@` key, and every coerced literal is a `@value` object. The result
/// is a sequence unless the input was `null`.
pub fn expand(input: &Value, options: &Options) -> Result<Value, Error> {
	if input.is_null() {
		return Ok(Value::Null);
	}
	let expanded = expansion::expand(&Context::new(), None, input, options.base.as_deref())?;
	Ok(match expanded {
		Value::Array(_) => expanded,
		other => Value::Array(vec![other]),
	})
}

/// Compacts `input` against `context`.
///
/// The input is expanded first, so any shape is accepted. The output
/// carries a `@context` holding exactly the subset of `context` the
/// compacted body refers to; when nothing was used the body is returned
/// bare.
pub fn compact(input: &Value, context: &Value, options: &Options) -> Result<Value, Error> {
	if input.is_null() {
		return Ok(Value::Null);
	}
	let expanded = expansion::expand(&Context::new(), None, input, options.base.as_deref())?;
	let ctx = Context::from_value(context);
	let mut used = Object::new();
	let result = compaction::compact(&ctx, None, &expanded, &mut used)?;

	if used.is_empty() {
		return Ok(result);
	}
	let keywords = Keywords::of(&used);
	let mut out = Object::new();
	out.insert(keyword::CONTEXT.into(), Value::Object(used));
	match result {
		// a top-level sequence compacts into the aliased @id slot
		Value::Array(_) => {
			out.insert(keywords.alias(keyword::ID).into(), result);
		}
		Value::Object(map) => {
			for entry in map.iter() {
				out.insert(entry.key.clone(), entry.value.clone());
			}
		}
		other => {
			return Ok(other);
		}
	}
	Ok(Value::Object(out))
}

/// Normalizes `input` into its canonical form.
///
/// The result is a flat sequence of subjects sorted by `@id`; every
/// blank node is named `_:c14n<n>`, contiguously from zero, such that
/// any two isomorphic graphs yield identical output.
pub fn normalize(input: &Value, options: &Options) -> Result<Value, Error> {
	normalization::normalize(input, options)
}

/// Frames the normalized form of `input` with the shape template
/// `frame`, then compacts the result against the frame's context.
pub fn frame(input: &Value, frame: &Value, options: &Options) -> Result<Value, Error> {
	framing::frame(input, frame, options)
}
