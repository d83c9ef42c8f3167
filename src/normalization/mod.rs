//! Normalization: canonical naming of blank nodes.
//!
//! Normalize expands its input, names every anonymous subject, flattens
//! the result into a subject pool, then renames all blank nodes into the
//! `_:c14n` namespace so that structurally equivalent graphs come out
//! byte-for-byte identical. The output is the pool as a sequence sorted
//! by `@id`, with every subject's keys and multi-values sorted.
mod edges;
mod serialize;

use crate::context::Context;
use crate::error::Error;
use crate::expansion;
use crate::flattening;
use crate::id::{in_c14n_namespace, is_blank_node_iri, NameGenerator, C14N_NAMESPACE, TMP_NAMESPACE};
use crate::keyword;
use crate::object;
use crate::Options;
use edges::{collect_edges, shallow_compare, Direction, Edges, DIRECTIONS};
use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use json_syntax::{Object, Value};
use log::{debug, trace};
use serialize::{serialize_blank_node, MappingBuilder, NodeSerializations};
use std::cmp::Ordering;

pub(crate) fn normalize(input: &Value, options: &Options) -> Result<Value, Error> {
	if input.is_null() {
		return Ok(Value::Array(Vec::new()));
	}

	let expanded = expansion::expand(&Context::new(), None, input, options.base.as_deref())?;

	let mut state = State::new();
	let expanded = state.name_blank_nodes(&expanded);

	let mut subjects = IndexMap::new();
	flattening::flatten(None, None, &expanded, &mut subjects)?;
	state.subjects = subjects;

	state.canonicalize();

	let mut out: Vec<Value> = state
		.subjects
		.into_values()
		.map(sorted_subject)
		.collect();
	out.sort_by(|a, b| {
		let ida = a.as_object().and_then(object::subject_id).unwrap_or("");
		let idb = b.as_object().and_then(object::subject_id).unwrap_or("");
		ida.cmp(idb)
	});
	Ok(Value::Array(out))
}

/// Rebuilds a subject with sorted keys and sorted multi-values.
fn sorted_subject(subject: Value) -> Value {
	let Value::Object(map) = subject else {
		return subject;
	};
	let mut entries: Vec<(String, Value)> = map
		.iter()
		.map(|e| (e.key.as_str().to_owned(), e.value.clone()))
		.collect();
	entries.sort_by(|a, b| a.0.cmp(&b.0));

	let mut out = Object::new();
	for (key, mut value) in entries {
		if let Value::Array(items) = &mut value {
			items.sort_by(object::compare_objects);
		}
		out.insert(key.as_str().into(), value);
	}
	Value::Object(out)
}

/// Normalization state: the subject pool, the edge tables, the relation
/// serialization cache and the two name generators.
struct State {
	subjects: IndexMap<String, Value>,
	edges: Edges,
	serializations: HashMap<String, NodeSerializations>,
	ng_tmp: NameGenerator,
	ng_c14n: NameGenerator,
	canonicalizing: bool,
}

impl State {
	fn new() -> Self {
		Self {
			subjects: IndexMap::new(),
			edges: Edges::default(),
			serializations: HashMap::new(),
			ng_tmp: NameGenerator::new(TMP_NAMESPACE),
			ng_c14n: NameGenerator::new(C14N_NAMESPACE),
			canonicalizing: false,
		}
	}

	/// Gives every anonymous subject of the expanded tree a fresh
	/// temporary name, unique among all subject IRIs.
	fn name_blank_nodes(&mut self, expanded: &Value) -> Value {
		let mut names = HashSet::new();
		collect_subject_names(expanded, &mut names);
		self.named(expanded, &mut names)
	}

	fn named(&mut self, value: &Value, names: &mut HashSet<String>) -> Value {
		match value {
			Value::Array(items) => {
				Value::Array(items.iter().map(|v| self.named(v, names)).collect())
			}
			Value::Object(map) => {
				let mut out = Object::new();
				if object::is_blank_node(value) && !object::contains(map, keyword::ID) {
					let name = loop {
						let candidate = self.ng_tmp.next_name();
						if !names.contains(candidate.as_str()) {
							break candidate;
						}
					};
					names.insert(name.as_str().to_owned());
					out.insert(keyword::ID.into(), Value::String(name.as_str().into()));
				}
				for entry in map.iter() {
					out.insert(entry.key.clone(), self.named(&entry.value, names));
				}
				Value::Object(out)
			}
			other => other.clone(),
		}
	}

	/// Renames a blank node, rewriting the subject pool, both edge tables
	/// and every reference held by adjacent subjects. `id` must be fresh.
	fn rename_blank_node(&mut self, old: &str, id: &str) {
		if let Some(mut subject) = self.subjects.swap_remove(old) {
			if let Some(map) = subject.as_object_mut() {
				object::set_key(map, keyword::ID, Value::String(id.into()));
			}
			self.subjects.insert(id.to_owned(), subject);
		}

		for table in [&mut self.edges.props, &mut self.edges.refs] {
			if let Some(list) = table.remove(old) {
				table.insert(id.to_owned(), list);
			}
		}

		// rewrite property edges and reference values of every referrer
		let referrers: Vec<String> = self
			.edges
			.refs
			.get(id)
			.map(|l| {
				l.all
					.iter()
					.map(|e| {
						if e.subject == old {
							id.to_owned()
						} else {
							e.subject.clone()
						}
					})
					.collect()
			})
			.unwrap_or_default();

		for referrer in referrers {
			let mut touched: Vec<String> = Vec::new();
			if let Some(list) = self.edges.props.get_mut(&referrer) {
				for edge in list.all.iter_mut().chain(list.bnodes.iter_mut()) {
					if edge.subject == old {
						edge.subject = id.to_owned();
						if !touched.contains(&edge.property) {
							touched.push(edge.property.clone());
						}
					}
				}
			}
			if let Some(Value::Object(subject)) = self.subjects.get_mut(&referrer) {
				for property in touched {
					if let Some(slot) = object::get_mut(subject, &property) {
						match slot {
							Value::Array(items) => {
								for item in items {
									rename_reference(item, old, id);
								}
							}
							single => rename_reference(single, old, id),
						}
					}
				}
			}
		}

		// rewrite incoming edges of every target this node points at
		let targets: Vec<String> = self
			.edges
			.props
			.get(id)
			.map(|l| l.all.iter().map(|e| e.subject.clone()).collect())
			.unwrap_or_default();
		for target in targets {
			if let Some(list) = self.edges.refs.get_mut(&target) {
				for edge in list.all.iter_mut().chain(list.bnodes.iter_mut()) {
					if edge.subject == old {
						edge.subject = id.to_owned();
					}
				}
			}
		}
	}

	/// Drops a cached serialization whose mapping mentions a renamed IRI.
	fn mark_serialization_dirty(&mut self, iri: &str, changed: &str, dir: Direction) -> bool {
		let Some(ser) = self.serializations.get_mut(iri) else {
			return false;
		};
		let cell = ser.cell_mut(dir);
		if cell.as_ref().is_some_and(|s| s.m.contains_key(changed)) {
			trace!("serialization of {iri} invalidated by rename of {changed}");
			*cell = None;
			true
		} else {
			false
		}
	}

	/// Ensures both relation serializations of `iri` are cached; the
	/// references pass continues the labeling of the properties pass.
	fn compute_serializations(&mut self, iri: &str) {
		let entry = self.serializations.entry(iri.to_owned()).or_default();
		if entry.props.is_none() {
			let mut mb = MappingBuilder::new();
			serialize_blank_node(
				&self.subjects,
				&self.edges,
				&mut self
					.serializations
					.get_mut(iri)
					.expect("serialization entry exists")
					.props,
				iri,
				&mut mb,
				Direction::Props,
			);
		}
		if self.serializations[iri].refs.is_none() {
			let inherited = self.serializations[iri]
				.props
				.as_ref()
				.map(|p| p.m.clone())
				.unwrap_or_default();
			let mut mb = MappingBuilder::extending(inherited);
			serialize_blank_node(
				&self.subjects,
				&self.edges,
				&mut self
					.serializations
					.get_mut(iri)
					.expect("serialization entry exists")
					.refs,
				iri,
				&mut mb,
				Direction::Refs,
			);
		}
	}

	fn deep_compare(&self, a: &str, b: &str) -> Ordering {
		if a == b {
			return Ordering::Equal;
		}
		let rval = shallow_compare(&self.subjects, &self.edges, a, b, self.canonicalizing);
		if rval != Ordering::Equal {
			return rval;
		}
		for dir in DIRECTIONS {
			let sa = self
				.serializations
				.get(a)
				.and_then(|s| s.get(dir))
				.map(|s| s.s.as_str())
				.unwrap_or("");
			let sb = self
				.serializations
				.get(b)
				.and_then(|s| s.get(dir))
				.map(|s| s.s.as_str())
				.unwrap_or("");
			let rval = sa.cmp(sb);
			if rval != Ordering::Equal {
				return rval;
			}
		}
		Ordering::Equal
	}

	/// The canonicalization loop: sort the remaining blank nodes, name
	/// the first (and everything its serialization mapping pins down),
	/// propagate the renames, repeat.
	fn canonicalize(&mut self) {
		let mut bnodes: Vec<String> = self
			.subjects
			.keys()
			.filter(|iri| is_blank_node_iri(iri))
			.cloned()
			.collect();

		self.edges = collect_edges(&self.subjects);

		// evict squatters from the canonical namespace
		for i in 0..bnodes.len() {
			if in_c14n_namespace(&bnodes[i]) {
				let fresh = loop {
					let candidate = self.ng_tmp.next_name();
					if !self.subjects.contains_key(candidate.as_str()) {
						break candidate;
					}
				};
				let old = std::mem::replace(&mut bnodes[i], fresh.as_str().to_owned());
				self.rename_blank_node(&old, fresh.as_str());
			}
		}
		for iri in &bnodes {
			self.serializations
				.insert(iri.clone(), NodeSerializations::default());
		}

		self.canonicalizing = true;
		debug!("canonicalizing {} blank nodes", bnodes.len());

		let mut resort = true;
		while !bnodes.is_empty() {
			if resort {
				resort = false;
				for iri in &bnodes {
					self.compute_serializations(iri);
				}
				bnodes.sort_by(|a, b| self.deep_compare(a, b));
			}

			let iri = bnodes.remove(0);
			resort = self
				.serializations
				.get(&iri)
				.is_some_and(|s| s.props.is_some());

			for dir in DIRECTIONS {
				let mapping: HashMap<String, String> = match self
					.serializations
					.get(&iri)
					.and_then(|s| s.get(dir))
				{
					Some(ser) => ser.m.clone(),
					None => {
						let mut mapping = HashMap::new();
						mapping.insert(iri.clone(), "s1".to_owned());
						mapping
					}
				};

				let mut keys: Vec<String> = mapping.keys().cloned().collect();
				keys.sort_by(|a, b| mapping[a].cmp(&mapping[b]));

				let mut renamed = Vec::new();
				for key in keys {
					if !in_c14n_namespace(&key) && self.subjects.contains_key(&key) {
						let name = self.ng_c14n.next_name();
						self.rename_blank_node(&key, name.as_str());
						renamed.push(key);
					}
				}
				debug!("named {} blank nodes from one serialization", renamed.len());

				bnodes.retain(|b| !renamed.contains(b));
				for b in &bnodes {
					for changed in &renamed {
						if self.mark_serialization_dirty(b, changed, dir) {
							resort = true;
						}
					}
				}
			}
		}
	}
}

fn rename_reference(value: &mut Value, old: &str, id: &str) {
	if let Value::Object(map) = value {
		if object::subject_id(map) == Some(old) {
			object::set_key(map, keyword::ID, Value::String(id.into()));
		}
	}
}

/// Collects the IRIs of all named subjects in an expanded tree.
fn collect_subject_names(value: &Value, names: &mut HashSet<String>) {
	match value {
		Value::Array(items) => {
			for item in items {
				collect_subject_names(item, names);
			}
		}
		Value::Object(map) => {
			match object::get(map, keyword::ID) {
				Some(Value::Array(graph)) => {
					for item in graph {
						collect_subject_names(item, names);
					}
				}
				Some(Value::String(id)) if object::is_subject(value) => {
					names.insert(id.as_str().to_owned());
				}
				_ => (),
			}
			for entry in map.iter() {
				collect_subject_names(&entry.value, names);
			}
		}
		_ => (),
	}
}
