//! Edge tables and blank node comparison.
//!
//! For every subject the canonicalizer keeps the outgoing edges (`props`)
//! and incoming edges (`refs`) whose other end is itself a subject of the
//! graph. Each direction additionally caches the subset of edges whose
//! other end is a blank node.
use crate::id::{in_c14n_namespace, is_blank_node_iri};
use crate::keyword;
use crate::object;
use hashbrown::HashMap;
use indexmap::IndexMap;
use json_syntax::Value;
use smallvec::SmallVec;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
	Props,
	Refs,
}

pub(crate) const DIRECTIONS: [Direction; 2] = [Direction::Props, Direction::Refs];

/// One edge of the graph, seen from one of its endpoints: the IRI at the
/// other end and the property relating the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edge {
	pub subject: String,
	pub property: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeList {
	pub all: SmallVec<[Edge; 4]>,
	pub bnodes: SmallVec<[Edge; 4]>,
}

#[derive(Debug, Default)]
pub(crate) struct Edges {
	pub props: HashMap<String, EdgeList>,
	pub refs: HashMap<String, EdgeList>,
}

impl Edges {
	pub fn table(&self, dir: Direction) -> &HashMap<String, EdgeList> {
		match dir {
			Direction::Props => &self.props,
			Direction::Refs => &self.refs,
		}
	}

	pub fn list(&self, dir: Direction, iri: &str) -> Option<&EdgeList> {
		self.table(dir).get(iri)
	}

	pub fn all(&self, dir: Direction, iri: &str) -> &[Edge] {
		self.list(dir, iri).map(|l| &l.all[..]).unwrap_or(&[])
	}

	pub fn bnodes(&self, dir: Direction, iri: &str) -> &[Edge] {
		self.list(dir, iri).map(|l| &l.bnodes[..]).unwrap_or(&[])
	}
}

/// Total edge order: non-blank IRIs first (by IRI, then property); blank
/// edges by property alone, their labels being meaningless — except that
/// once canonical naming has begun, `_:c14n` names order after the
/// remaining temporary ones and among themselves lexicographically.
pub(crate) fn compare_edges(a: &Edge, b: &Edge, canonicalizing: bool) -> Ordering {
	let bnode_a = is_blank_node_iri(&a.subject);
	let bnode_b = is_blank_node_iri(&b.subject);
	if bnode_a != bnode_b {
		return if bnode_a { Ordering::Greater } else { Ordering::Less };
	}

	let mut rval = Ordering::Equal;
	if !bnode_a {
		rval = a.subject.cmp(&b.subject);
	}
	if rval == Ordering::Equal {
		rval = a.property.cmp(&b.property);
	}

	if rval == Ordering::Equal && canonicalizing {
		let c14n_a = in_c14n_namespace(&a.subject);
		let c14n_b = in_c14n_namespace(&b.subject);
		if c14n_a != c14n_b {
			return if c14n_a { Ordering::Greater } else { Ordering::Less };
		}
		if c14n_a {
			rval = a.subject.cmp(&b.subject);
		}
	}
	rval
}

/// Builds both edge tables from the subject pool. Every subject gets an
/// entry, even when it has no edges.
pub(crate) fn collect_edges(subjects: &IndexMap<String, Value>) -> Edges {
	let mut edges = Edges::default();
	for iri in subjects.keys() {
		edges.props.insert(iri.clone(), EdgeList::default());
		edges.refs.insert(iri.clone(), EdgeList::default());
	}

	for (iri, subject) in subjects {
		let Some(map) = subject.as_object() else {
			continue;
		};
		for entry in map.iter() {
			let key = entry.key.as_str();
			if key == keyword::ID {
				continue;
			}
			for o in object::as_array(&entry.value) {
				let Some(target) = o.as_object().and_then(object::subject_id) else {
					continue;
				};
				if !subjects.contains_key(target) {
					continue;
				}
				if let Some(list) = edges.refs.get_mut(target) {
					list.all.push(Edge {
						subject: iri.clone(),
						property: key.to_owned(),
					});
				}
				if let Some(list) = edges.props.get_mut(iri) {
					list.all.push(Edge {
						subject: target.to_owned(),
						property: key.to_owned(),
					});
				}
			}
		}
	}

	for table in [&mut edges.props, &mut edges.refs] {
		for list in table.values_mut() {
			list.all.sort_by(|a, b| compare_edges(a, b, false));
			list.bnodes = list
				.all
				.iter()
				.filter(|e| is_blank_node_iri(&e.subject))
				.cloned()
				.collect();
		}
	}
	edges
}

/// Compares the property values of two blank nodes, ignoring references
/// to other blank nodes (their names carry no information yet).
fn compare_blank_node_objects(a: &Value, b: &Value) -> Ordering {
	let (Some(oa), Some(ob)) = (a.as_object(), b.as_object()) else {
		return Ordering::Equal;
	};

	let mut keys: Vec<&str> = oa
		.iter()
		.map(|e| e.key.as_str())
		.filter(|k| *k != keyword::ID)
		.collect();
	keys.sort_unstable();

	for key in keys {
		let va = object::get(oa, key).unwrap_or(&Value::Null);
		let vb = object::get(ob, key).unwrap_or(&Value::Null);

		let rval = object::as_array(va).len().cmp(&object::as_array(vb).len());
		if rval != Ordering::Equal {
			return rval;
		}

		let filter = |v: &&Value| !object::is_named_blank_node(v);
		let mut objs_a: Vec<&Value> = object::as_array(va).iter().filter(filter).collect();
		let mut objs_b: Vec<&Value> = object::as_array(vb).iter().filter(filter).collect();

		let rval = objs_a.len().cmp(&objs_b.len());
		if rval != Ordering::Equal {
			return rval;
		}

		objs_a.sort_by(|x, y| object::compare_objects(x, y));
		objs_b.sort_by(|x, y| object::compare_objects(x, y));
		for (x, y) in objs_a.iter().zip(objs_b.iter()) {
			let rval = object::compare_objects(x, y);
			if rval != Ordering::Equal {
				return rval;
			}
		}
	}
	Ordering::Equal
}

/// Shallow comparison of two blank nodes: property count, sorted property
/// names, property values, then incoming edge count and incoming edges.
pub(crate) fn shallow_compare(
	subjects: &IndexMap<String, Value>,
	edges: &Edges,
	a: &str,
	b: &str,
	canonicalizing: bool,
) -> Ordering {
	let (Some(sa), Some(sb)) = (subjects.get(a), subjects.get(b)) else {
		return Ordering::Equal;
	};
	let (Some(oa), Some(ob)) = (sa.as_object(), sb.as_object()) else {
		return Ordering::Equal;
	};

	let rval = oa.len().cmp(&ob.len());
	if rval != Ordering::Equal {
		return rval;
	}

	let mut keys_a: Vec<&str> = oa.iter().map(|e| e.key.as_str()).collect();
	let mut keys_b: Vec<&str> = ob.iter().map(|e| e.key.as_str()).collect();
	keys_a.sort_unstable();
	keys_b.sort_unstable();
	let rval = keys_a.cmp(&keys_b);
	if rval != Ordering::Equal {
		return rval;
	}

	let rval = compare_blank_node_objects(sa, sb);
	if rval != Ordering::Equal {
		return rval;
	}

	let refs_a = edges.all(Direction::Refs, a);
	let refs_b = edges.all(Direction::Refs, b);
	let rval = refs_a.len().cmp(&refs_b.len());
	if rval != Ordering::Equal {
		return rval;
	}
	for (ea, eb) in refs_a.iter().zip(refs_b.iter()) {
		let rval = compare_edges(ea, eb, canonicalizing);
		if rval != Ordering::Equal {
			return rval;
		}
	}
	Ordering::Equal
}

#[cfg(test)]
mod tests {
	use super::*;

	fn edge(subject: &str, property: &str) -> Edge {
		Edge {
			subject: subject.to_owned(),
			property: property.to_owned(),
		}
	}

	#[test]
	fn named_edges_order_before_blank_ones() {
		let named = edge("http://example.org/a", "http://example.org/p");
		let blank = edge("_:tmp0", "http://example.org/p");
		assert_eq!(compare_edges(&named, &blank, false), Ordering::Less);
		assert_eq!(compare_edges(&blank, &named, false), Ordering::Greater);
	}

	#[test]
	fn blank_labels_are_ignored_until_canonicalized() {
		let a = edge("_:tmp0", "http://example.org/p");
		let b = edge("_:tmp99", "http://example.org/p");
		assert_eq!(compare_edges(&a, &b, false), Ordering::Equal);

		// canonical names do order, and after temporary ones
		let c = edge("_:c14n0", "http://example.org/p");
		let d = edge("_:c14n1", "http://example.org/p");
		assert_eq!(compare_edges(&c, &d, true), Ordering::Less);
		assert_eq!(compare_edges(&a, &c, true), Ordering::Less);
	}
}
