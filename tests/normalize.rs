use canonld::{normalize, Error, ErrorCode, Options};
use json_syntax::{Parse, Print, Value};

fn parse(s: &str) -> Value {
	Value::parse_str(s).unwrap().0
}

fn opts() -> Options {
	Options::default()
}

#[test]
fn normalizes_a_single_subject() {
	let input = parse(r#"{"@id": "http://example.org/test#example"}"#);
	let expected = parse(r#"[{"@id": "http://example.org/test#example"}]"#);
	assert_eq!(normalize(&input, &opts()).unwrap(), expected);
}

#[test]
fn doubles_take_the_wire_form() {
	let input = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"@id": "ex:t",
			"ex:n": 1.23
		}"#,
	);
	let expected = parse(
		r#"[{
			"@id": "http://example.org/vocab#t",
			"http://example.org/vocab#n": {
				"@type": "http://www.w3.org/2001/XMLSchema#double",
				"@value": "1.230000e+00"
			}
		}]"#,
	);
	assert_eq!(normalize(&input, &opts()).unwrap(), expected);
}

#[test]
fn isomorphic_cycles_normalize_identically() {
	let a = parse(
		r#"[
			{"@id": "_:a", "http://example.org/vocab#next": {"@id": "_:b"}},
			{"@id": "_:b", "http://example.org/vocab#next": {"@id": "_:a"}}
		]"#,
	);
	let b = parse(
		r#"[
			{"@id": "_:x", "http://example.org/vocab#next": {"@id": "_:y"}},
			{"@id": "_:y", "http://example.org/vocab#next": {"@id": "_:x"}}
		]"#,
	);
	let na = normalize(&a, &opts()).unwrap();
	let nb = normalize(&b, &opts()).unwrap();
	assert_eq!(na, nb);

	let expected = parse(
		r#"[
			{"@id": "_:c14n0", "http://example.org/vocab#next": {"@id": "_:c14n1"}},
			{"@id": "_:c14n1", "http://example.org/vocab#next": {"@id": "_:c14n0"}}
		]"#,
	);
	assert_eq!(na, expected);
}

#[test]
fn anonymous_subjects_receive_contiguous_canonical_names() {
	let input = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"@id": "http://example.org/test#root",
			"ex:child": [
				{"ex:name": "one"},
				{"ex:name": "two"}
			]
		}"#,
	);
	let normalized = normalize(&input, &opts()).unwrap();

	let mut blank = Vec::new();
	if let Value::Array(items) = &normalized {
		for item in items {
			if let Value::Object(map) = item {
				for entry in map.iter() {
					if entry.key.as_str() == "@id" {
						if let Value::String(id) = &entry.value {
							if id.starts_with("_:") {
								blank.push(id.as_str().to_owned());
							}
						}
					}
				}
			}
		}
	}
	blank.sort();
	assert_eq!(blank, vec!["_:c14n0", "_:c14n1"]);
}

// normalize ∘ normalize is normalize
#[test]
fn normalization_is_idempotent() {
	let input = parse(
		r#"[
			{"@id": "_:a", "http://example.org/vocab#next": {"@id": "_:b"}},
			{"@id": "_:b", "http://example.org/vocab#next": {"@id": "_:a"}},
			{"@id": "http://example.org/test#s", "http://example.org/vocab#ref": {"@id": "_:a"}}
		]"#,
	);
	let once = normalize(&input, &opts()).unwrap();
	let twice = normalize(&once, &opts()).unwrap();
	assert_eq!(twice, once);
}

// key insertion order never shows in canonical output
#[test]
fn key_order_is_irrelevant() {
	let a = parse(
		r#"{
			"@id": "http://example.org/test#s",
			"http://example.org/vocab#p": "v",
			"http://example.org/vocab#q": "w"
		}"#,
	);
	let b = parse(
		r#"{
			"http://example.org/vocab#q": "w",
			"http://example.org/vocab#p": "v",
			"@id": "http://example.org/test#s"
		}"#,
	);
	assert_eq!(normalize(&a, &opts()).unwrap(), normalize(&b, &opts()).unwrap());
}

#[test]
fn key_order_is_irrelevant_for_blank_nodes() {
	let a = parse(
		r#"[
			{"@id": "_:a", "http://example.org/vocab#p": "v", "http://example.org/vocab#next": {"@id": "_:b"}},
			{"@id": "_:b", "http://example.org/vocab#next": {"@id": "_:a"}}
		]"#,
	);
	let b = parse(
		r#"[
			{"http://example.org/vocab#next": {"@id": "_:b"}, "http://example.org/vocab#p": "v", "@id": "_:a"},
			{"http://example.org/vocab#next": {"@id": "_:a"}, "@id": "_:b"}
		]"#,
	);
	assert_eq!(normalize(&a, &opts()).unwrap(), normalize(&b, &opts()).unwrap());
}

#[test]
fn multiple_values_sort_lexicographically() {
	let input = parse(
		r#"{
			"@id": "http://example.org/test#s",
			"http://example.org/vocab#p": ["b", "a"]
		}"#,
	);
	let expected = parse(
		r#"[{
			"@id": "http://example.org/test#s",
			"http://example.org/vocab#p": ["a", "b"]
		}]"#,
	);
	assert_eq!(normalize(&input, &opts()).unwrap(), expected);
}

#[test]
fn embedded_subjects_are_promoted_and_referenced() {
	let input = parse(
		r#"{
			"@id": "http://example.org/test#parent",
			"http://example.org/vocab#child": {
				"@id": "http://example.org/test#child",
				"http://example.org/vocab#name": "c"
			}
		}"#,
	);
	let expected = parse(
		r#"[
			{
				"@id": "http://example.org/test#child",
				"http://example.org/vocab#name": "c"
			},
			{
				"@id": "http://example.org/test#parent",
				"http://example.org/vocab#child": {"@id": "http://example.org/test#child"}
			}
		]"#,
	);
	assert_eq!(normalize(&input, &opts()).unwrap(), expected);
}

#[test]
fn duplicate_subjects_merge() {
	let input = parse(
		r#"[
			{"@id": "http://example.org/test#s", "http://example.org/vocab#p": "v"},
			{"@id": "http://example.org/test#s", "http://example.org/vocab#q": "w"}
		]"#,
	);
	let expected = parse(
		r#"[{
			"@id": "http://example.org/test#s",
			"http://example.org/vocab#p": "v",
			"http://example.org/vocab#q": "w"
		}]"#,
	);
	assert_eq!(normalize(&input, &opts()).unwrap(), expected);
}

#[test]
fn top_level_graph_literals_flatten() {
	let input = parse(
		r#"{"@id": [
			{"@id": "http://example.org/test#b", "http://example.org/vocab#p": "v"},
			{"@id": "http://example.org/test#a", "http://example.org/vocab#p": "w"}
		]}"#,
	);
	let expected = parse(
		r#"[
			{"@id": "http://example.org/test#a", "http://example.org/vocab#p": "w"},
			{"@id": "http://example.org/test#b", "http://example.org/vocab#p": "v"}
		]"#,
	);
	assert_eq!(normalize(&input, &opts()).unwrap(), expected);
}

#[test]
fn embedded_graph_literals_are_rejected() {
	let input = parse(
		r#"{
			"@id": "http://example.org/test#s",
			"http://example.org/vocab#p": {"@id": [{"@id": "http://example.org/test#x"}]}
		}"#,
	);
	let err = normalize(&input, &opts()).unwrap_err();
	assert!(matches!(err, Error::GraphLiteralFlatten));
	assert_eq!(err.code(), ErrorCode::GraphLiteralFlattenError);
}

// equal canonical values print to equal canonical text, which is digest
// equality for any fixed hash
#[test]
fn canonical_text_agrees_for_isomorphic_inputs() {
	let a = parse(
		r#"{"http://example.org/vocab#owner": {"http://example.org/vocab#name": "J"}}"#,
	);
	let b = parse(
		r#"{"http://example.org/vocab#owner": {"@id": "_:z", "http://example.org/vocab#name": "J"}}"#,
	);
	let ta = normalize(&a, &opts()).unwrap().compact_print().to_string();
	let tb = normalize(&b, &opts()).unwrap().compact_print().to_string();
	assert_eq!(ta, tb);
	assert!(ta.contains("_:c14n0"));
}

#[test]
fn canonical_names_do_not_collide_with_input_names() {
	let input = parse(
		r#"[
			{"@id": "_:c14n0", "http://example.org/vocab#p": "v"},
			{"@id": "_:c14n7", "http://example.org/vocab#p": "v"}
		]"#,
	);
	let normalized = normalize(&input, &opts()).unwrap();
	let expected = parse(
		r#"[
			{"@id": "_:c14n0", "http://example.org/vocab#p": "v"},
			{"@id": "_:c14n1", "http://example.org/vocab#p": "v"}
		]"#,
	);
	assert_eq!(normalized, expected);
}
