//! Relation serialization of blank nodes.
//!
//! A blank node is described by a string derived from its surroundings:
//! its own properties and references plus, recursively, the adjacent
//! blank nodes under every possible assignment of serialization labels.
//! The least serialization is kept; equal graphs produce equal strings no
//! matter how their blank nodes were labeled on input.
use super::edges::{Direction, Edges};
use crate::id::{is_blank_node_iri, C14N_NAMESPACE};
use crate::keyword;
use crate::object;
use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use json_syntax::Value;
use std::cmp::Ordering;

/// A finished relation serialization: the string and the mapping from
/// blank node IRI to the serialization label it was given.
#[derive(Debug, Clone)]
pub(crate) struct Serialization {
	pub s: String,
	pub m: HashMap<String, String>,
}

/// Cached serializations of one blank node, per direction.
#[derive(Debug, Default)]
pub(crate) struct NodeSerializations {
	pub props: Option<Serialization>,
	pub refs: Option<Serialization>,
}

impl NodeSerializations {
	pub fn get(&self, dir: Direction) -> Option<&Serialization> {
		match dir {
			Direction::Props => self.props.as_ref(),
			Direction::Refs => self.refs.as_ref(),
		}
	}

	pub fn cell_mut(&mut self, dir: Direction) -> &mut Option<Serialization> {
		match dir {
			Direction::Props => &mut self.props,
			Direction::Refs => &mut self.refs,
		}
	}
}

#[derive(Debug, Clone)]
struct KeyStackFrame {
	keys: Vec<String>,
	idx: usize,
}

/// Adjacency record of one serialized node: its IRI, the sorted labels of
/// its adjacent blank nodes, and the label-to-IRI mapping behind them.
#[derive(Debug, Clone)]
struct Adjacency {
	iri: String,
	keys: Vec<String>,
	mapped: HashMap<String, String>,
}

/// Incrementally builds one candidate serialization.
#[derive(Debug, Clone)]
pub(crate) struct MappingBuilder {
	count: usize,
	processed: HashSet<String>,
	pub mapping: HashMap<String, String>,
	adj: HashMap<String, Adjacency>,
	key_stack: Vec<KeyStackFrame>,
	done: HashSet<String>,
	s: String,
}

impl MappingBuilder {
	pub fn new() -> Self {
		Self {
			count: 1,
			processed: HashSet::new(),
			mapping: HashMap::new(),
			adj: HashMap::new(),
			key_stack: vec![KeyStackFrame {
				keys: vec!["s1".to_owned()],
				idx: 0,
			}],
			done: HashSet::new(),
			s: String::new(),
		}
	}

	/// Continues a serialization whose labels extend an earlier mapping.
	pub fn extending(mapping: HashMap<String, String>) -> Self {
		let mut mb = Self::new();
		mb.count = mapping.len() + 1;
		mb.mapping = mapping;
		mb
	}

	/// Maps `iri` to its serialization label, assigning the next `s<n>`
	/// label on first sight. Canonically named nodes keep a shortened
	/// form of their name instead.
	fn map_node(&mut self, iri: &str) -> String {
		if !self.mapping.contains_key(iri) {
			let label = if let Some(suffix) = iri.strip_prefix(C14N_NAMESPACE) {
				format!("c{suffix}")
			} else {
				let label = format!("s{}", self.count);
				self.count += 1;
				label
			};
			self.mapping.insert(iri.to_owned(), label);
		}
		self.mapping[iri].clone()
	}
}

/// Compares a candidate against a stored serialization as far as both
/// go; a candidate that is still a prefix of the best compares equal.
pub(crate) fn compare_serializations(candidate: &str, best: &str) -> Ordering {
	let n = candidate.len().min(best.len());
	candidate.as_bytes()[..n].cmp(&best.as_bytes()[..n])
}

/// Serializes the property side of a blank node: sorted properties, each
/// with its objects in sorted serialized form.
fn serialize_properties(subject: &Value) -> String {
	let Some(map) = subject.as_object() else {
		return String::new();
	};

	let mut keys: Vec<&str> = map
		.iter()
		.map(|e| e.key.as_str())
		.filter(|k| *k != keyword::ID)
		.collect();
	keys.sort_unstable();

	let mut out = String::new();
	let mut first = true;
	for key in keys {
		if first {
			first = false;
		} else {
			out.push('|');
		}
		out.push('<');
		out.push_str(key);
		out.push('>');

		let values = object::get(map, key).unwrap_or(&Value::Null);
		let mut serialized: Vec<String> = object::as_array(values)
			.iter()
			.map(serialize_object)
			.collect();
		serialized.sort_unstable();
		for s in serialized {
			out.push_str(&s);
		}
	}
	out
}

fn serialize_object(value: &Value) -> String {
	match value {
		Value::Object(map) => {
			if let Some(id) = object::subject_id(map) {
				if is_blank_node_iri(id) {
					"_:".to_owned()
				} else {
					format!("<{id}>")
				}
			} else {
				let mut out = String::new();
				let literal = object::get(map, keyword::VALUE)
					.map(object::primitive_string)
					.unwrap_or_default();
				out.push('"');
				out.push_str(&literal);
				out.push('"');
				if let Some(Value::String(ty)) = object::get(map, keyword::TYPE) {
					out.push_str("^^<");
					out.push_str(ty.as_str());
					out.push('>');
				} else if let Some(Value::String(lang)) = object::get(map, keyword::LANGUAGE) {
					out.push('@');
					out.push_str(lang.as_str());
				}
				out
			}
		}
		other => format!("\"{}\"", object::primitive_string(other)),
	}
}

/// Serializes the incoming edges of a blank node.
fn serialize_references(edges: &Edges, iri: &str) -> String {
	let mut out = String::new();
	let mut first = true;
	for edge in edges.all(Direction::Refs, iri) {
		if first {
			first = false;
		} else {
			out.push('|');
		}
		out.push('<');
		out.push_str(&edge.property);
		out.push('>');
		if is_blank_node_iri(&edge.subject) {
			out.push_str("_:");
		} else {
			out.push('<');
			out.push_str(&edge.subject);
			out.push('>');
		}
	}
	out
}

/// Extends the serialization string for every adjacency that has become
/// available, suspending on labels not yet mapped. Revisited labels emit
/// a `_<label>` cycle marker.
fn serialize_mapping(subjects: &IndexMap<String, Value>, edges: &Edges, mb: &mut MappingBuilder) {
	let Some(mut frame) = mb.key_stack.pop() else {
		return;
	};
	while frame.idx < frame.keys.len() {
		let k = frame.keys[frame.idx].clone();
		if !mb.adj.contains_key(&k) {
			mb.key_stack.push(frame);
			return;
		}
		frame.idx += 1;

		if mb.done.contains(&k) {
			mb.s.push('_');
			mb.s.push_str(&k);
		} else {
			mb.done.insert(k.clone());

			let (adj_iri, adj_keys) = {
				let adj = &mb.adj[&k];
				(adj.iri.clone(), adj.keys.clone())
			};

			let mut s = k.clone();
			if let Some(subject) = subjects.get(&adj_iri) {
				s.push('[');
				s.push_str(&serialize_properties(subject));
				s.push(']');
				s.push('[');
				s.push_str(&serialize_references(edges, &adj_iri));
				s.push(']');
			}
			for key in &adj_keys {
				s.push_str(key);
			}

			mb.s.push_str(&s);
			mb.key_stack.push(KeyStackFrame {
				keys: adj_keys,
				idx: 0,
			});
			serialize_mapping(subjects, edges, mb);
		}
	}
}

/// Computes the relation serialization of `iri` in direction `dir`,
/// keeping the least candidate in `cell`.
pub(crate) fn serialize_blank_node(
	subjects: &IndexMap<String, Value>,
	edges: &Edges,
	cell: &mut Option<Serialization>,
	iri: &str,
	mb: &mut MappingBuilder,
	dir: Direction,
) {
	if mb.processed.contains(iri) {
		return;
	}
	mb.processed.insert(iri.to_owned());
	let siri = mb.map_node(iri);

	// split adjacent blank nodes into already-mapped and unmapped
	let mut mapped = HashMap::new();
	let mut not_mapped: Vec<super::edges::Edge> = Vec::new();
	for edge in edges.bnodes(dir, iri) {
		match mb.mapping.get(&edge.subject) {
			Some(label) => {
				mapped.insert(label.clone(), edge.subject.clone());
			}
			None => not_mapped.push(edge.clone()),
		}
	}

	let original = mb.clone();
	let rotations = not_mapped.len().max(1);
	for r in 0..rotations {
		if r == 0 {
			serialize_combos(
				subjects,
				edges,
				cell,
				iri,
				&siri,
				mb,
				dir,
				mapped.clone(),
				not_mapped.clone(),
			);
		} else {
			let mut m = original.clone();
			serialize_combos(
				subjects,
				edges,
				cell,
				iri,
				&siri,
				&mut m,
				dir,
				mapped.clone(),
				not_mapped.clone(),
			);
		}
		not_mapped.rotate_left(1);
	}
}

/// Tries every label assignment of the unmapped adjacent nodes, one
/// rotation at a time, and updates `cell` with the least serialization
/// found. Branches that can no longer undercut the best are pruned.
#[allow(clippy::too_many_arguments)]
fn serialize_combos(
	subjects: &IndexMap<String, Value>,
	edges: &Edges,
	cell: &mut Option<Serialization>,
	iri: &str,
	siri: &str,
	mb: &mut MappingBuilder,
	dir: Direction,
	mapped: HashMap<String, String>,
	not_mapped: Vec<super::edges::Edge>,
) {
	if let Some((first, rest)) = not_mapped.split_first() {
		let mut mapped = mapped;
		mapped.insert(mb.map_node(&first.subject), first.subject.clone());

		let original = mb.clone();
		let mut rest: Vec<super::edges::Edge> = rest.to_vec();
		let rotations = rest.len().max(1);
		for r in 0..rotations {
			if r == 0 {
				serialize_combos(
					subjects, edges, cell, iri, siri, mb, dir, mapped.clone(), rest.clone(),
				);
			} else {
				let mut m = original.clone();
				serialize_combos(
					subjects, edges, cell, iri, siri, &mut m, dir, mapped.clone(), rest.clone(),
				);
			}
			rest.rotate_left(1);
		}
	} else {
		let mut keys: Vec<String> = mapped.keys().cloned().collect();
		keys.sort_unstable();
		mb.adj.insert(
			siri.to_owned(),
			Adjacency {
				iri: iri.to_owned(),
				keys: keys.clone(),
				mapped: mapped.clone(),
			},
		);
		serialize_mapping(subjects, edges, mb);

		let viable = match cell.as_ref() {
			None => true,
			Some(best) => compare_serializations(&mb.s, &best.s) != Ordering::Greater,
		};
		if viable {
			for k in &keys {
				let next = mapped[k].clone();
				serialize_blank_node(subjects, edges, cell, &next, mb, dir);
			}
			serialize_mapping(subjects, edges, mb);

			let replace = match cell.as_ref() {
				None => true,
				Some(best) => {
					compare_serializations(&mb.s, &best.s) != Ordering::Greater
						&& mb.s.len() >= best.s.len()
				}
			};
			if replace {
				*cell = Some(Serialization {
					s: mb.s.clone(),
					m: mb.mapping.clone(),
				});
			}
		}
	}
}
