//! Blank node identifiers.
use rdf_types::BlankIdBuf;

/// Namespace of temporary names assigned before canonicalization.
pub const TMP_NAMESPACE: &str = "_:tmp";

/// Namespace of canonical names.
pub const C14N_NAMESPACE: &str = "_:c14n";

pub fn is_blank_node_iri(iri: &str) -> bool {
	iri.starts_with("_:")
}

/// Returns `true` if `iri` carries a canonical name.
pub fn in_c14n_namespace(iri: &str) -> bool {
	iri.starts_with(C14N_NAMESPACE)
}

/// Sequential blank node name generator over a fixed namespace.
pub struct NameGenerator {
	base: &'static str,
	count: usize,
}

impl NameGenerator {
	pub fn new(base: &'static str) -> Self {
		Self { base, count: 0 }
	}

	pub fn next_name(&mut self) -> BlankIdBuf {
		let name = format!("{}{}", self.base, self.count);
		self.count += 1;
		BlankIdBuf::new(name).unwrap()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generates_sequential_names() {
		let mut ng = NameGenerator::new(C14N_NAMESPACE);
		assert_eq!(ng.next_name().as_str(), "_:c14n0");
		assert_eq!(ng.next_name().as_str(), "_:c14n1");
		assert!(in_c14n_namespace("_:c14n7"));
		assert!(!in_c14n_namespace("_:tmp0"));
	}
}
