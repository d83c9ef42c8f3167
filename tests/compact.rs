use canonld::{compact, expand, Error, ErrorCode, Options};
use json_syntax::{Parse, Value};

fn parse(s: &str) -> Value {
	Value::parse_str(s).unwrap().0
}

fn opts() -> Options {
	Options::default()
}

#[test]
fn compacts_iris_to_prefixes() {
	let input = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"@id": "http://example.org/test#t",
			"ex:name": "Book"
		}"#,
	);
	let ctx = parse(r#"{"ex": "http://example.org/vocab#"}"#);
	let expected = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"@id": "http://example.org/test#t",
			"ex:name": "Book"
		}"#,
	);
	assert_eq!(compact(&input, &ctx, &opts()).unwrap(), expected);
}

#[test]
fn terms_win_over_prefixes() {
	let input = parse(r#"{"http://example.org/vocab#name": "Book"}"#);
	let ctx = parse(
		r#"{
			"ex": "http://example.org/vocab#",
			"name": "http://example.org/vocab#name"
		}"#,
	);
	let expected = parse(
		r#"{
			"@context": {"name": "http://example.org/vocab#name"},
			"name": "Book"
		}"#,
	);
	assert_eq!(compact(&input, &ctx, &opts()).unwrap(), expected);
}

// expand ∘ compact ∘ expand is expand
#[test]
fn round_trips_through_expansion() {
	let input = parse(
		r#"{
			"@context": {
				"ex": "http://example.org/vocab#",
				"dc": "http://purl.org/dc/elements/1.1/"
			},
			"@id": "http://example.org/test#book",
			"@type": "ex:Book",
			"dc:title": "The Republic",
			"ex:pages": 448
		}"#,
	);
	let ctx = parse(
		r#"{
			"ex": "http://example.org/vocab#",
			"dc": "http://purl.org/dc/elements/1.1/"
		}"#,
	);
	let expanded = expand(&input, &opts()).unwrap();
	let compacted = compact(&input, &ctx, &opts()).unwrap();
	let reexpanded = expand(&compacted, &opts()).unwrap();
	assert_eq!(reexpanded, expanded);
}

#[test]
fn reverse_coercion_restores_native_scalars() {
	let ctx = parse(
		r#"{
			"xsd": "http://www.w3.org/2001/XMLSchema#",
			"age": {"@id": "http://example.org/vocab#age", "@type": "xsd:integer"}
		}"#,
	);
	let input = parse(
		r#"{
			"http://example.org/vocab#age": {
				"@type": "http://www.w3.org/2001/XMLSchema#integer",
				"@value": "30"
			}
		}"#,
	);
	let expected = parse(
		r#"{
			"@context": {
				"xsd": "http://www.w3.org/2001/XMLSchema#",
				"age": {"@id": "http://example.org/vocab#age", "@type": "xsd:integer"}
			},
			"age": 30
		}"#,
	);
	assert_eq!(compact(&input, &ctx, &opts()).unwrap(), expected);
}

#[test]
fn undeclared_native_types_still_compact() {
	let input = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"ex:n": 1.23
		}"#,
	);
	let ctx = parse(r#"{"ex": "http://example.org/vocab#"}"#);
	let expected = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"ex:n": 1.23
		}"#,
	);
	assert_eq!(compact(&input, &ctx, &opts()).unwrap(), expected);
}

#[test]
fn language_forbids_coercion() {
	let ctx = parse(
		r#"{
			"xsd": "http://www.w3.org/2001/XMLSchema#",
			"age": {"@id": "http://example.org/vocab#age", "@type": "xsd:integer"}
		}"#,
	);
	let input = parse(
		r#"{
			"http://example.org/vocab#age": {"@value": "x", "@language": "en"}
		}"#,
	);
	let err = compact(&input, &ctx, &opts()).unwrap_err();
	assert!(matches!(err, Error::CoerceLanguage));
	assert_eq!(err.code(), ErrorCode::CoerceLanguageError);
}

#[test]
fn mismatched_types_fail_with_both_types() {
	let ctx = parse(
		r#"{
			"xsd": "http://www.w3.org/2001/XMLSchema#",
			"age": {"@id": "http://example.org/vocab#age", "@type": "xsd:integer"}
		}"#,
	);
	let input = parse(
		r#"{
			"http://example.org/vocab#age": {
				"@type": "http://www.w3.org/2001/XMLSchema#string",
				"@value": "x"
			}
		}"#,
	);
	match compact(&input, &ctx, &opts()).unwrap_err() {
		Error::InvalidCoerceType { found, expected } => {
			assert_eq!(found, "http://www.w3.org/2001/XMLSchema#string");
			assert_eq!(expected, "http://www.w3.org/2001/XMLSchema#integer");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn malformed_integer_lexicals_fail() {
	let ctx = parse(
		r#"{
			"xsd": "http://www.w3.org/2001/XMLSchema#",
			"age": {"@id": "http://example.org/vocab#age", "@type": "xsd:integer"}
		}"#,
	);
	let input = parse(
		r#"{
			"http://example.org/vocab#age": {
				"@type": "http://www.w3.org/2001/XMLSchema#integer",
				"@value": "abc"
			}
		}"#,
	);
	match compact(&input, &ctx, &opts()).unwrap_err() {
		Error::InvalidCoerceType { found, expected } => {
			assert_eq!(found, "abc");
			assert_eq!(expected, "http://www.w3.org/2001/XMLSchema#integer");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn keyword_aliases_apply_on_output() {
	let input = parse(r#"{"@id": "http://example.org/test#t", "http://example.org/vocab#p": "v"}"#);
	let ctx = parse(r#"{"url": "@id", "ex": "http://example.org/vocab#"}"#);
	let compacted = compact(&input, &ctx, &opts()).unwrap();
	// the alias entry reads as a term for "@id", so the key compacts to it
	let expected = parse(
		r#"{
			"@context": {"url": "@id", "ex": "http://example.org/vocab#"},
			"url": "http://example.org/test#t",
			"ex:p": "v"
		}"#,
	);
	assert_eq!(compacted, expected);
}

#[test]
fn emitted_context_is_the_used_subset() {
	let input = parse(r#"{"http://example.org/vocab#name": "Book"}"#);
	let ctx = parse(
		r#"{
			"ex": "http://example.org/vocab#",
			"dc": "http://purl.org/dc/elements/1.1/",
			"xsd": "http://www.w3.org/2001/XMLSchema#"
		}"#,
	);
	let expected = parse(
		r#"{
			"@context": {"ex": "http://example.org/vocab#"},
			"ex:name": "Book"
		}"#,
	);
	assert_eq!(compact(&input, &ctx, &opts()).unwrap(), expected);
}

#[test]
fn compacting_without_matches_emits_no_context() {
	let input = parse(r#"{"@id": "http://other.org/x", "http://other.org/p": "v"}"#);
	let ctx = parse(r#"{"ex": "http://example.org/vocab#"}"#);
	let expected = parse(r#"{"@id": "http://other.org/x", "http://other.org/p": "v"}"#);
	assert_eq!(compact(&input, &ctx, &opts()).unwrap(), expected);
}
