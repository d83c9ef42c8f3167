//! XSD datatype IRIs used by the coercion rules.
use iref::Iri;
use static_iref::iri;

pub const XSD_BOOLEAN: &Iri = iri!("http://www.w3.org/2001/XMLSchema#boolean");
pub const XSD_INTEGER: &Iri = iri!("http://www.w3.org/2001/XMLSchema#integer");
pub const XSD_DOUBLE: &Iri = iri!("http://www.w3.org/2001/XMLSchema#double");

/// Returns `true` if `iri` names one of the three datatypes that map
/// onto native JSON scalars.
pub fn is_native_type(iri: &str) -> bool {
	iri == XSD_BOOLEAN.as_str() || iri == XSD_INTEGER.as_str() || iri == XSD_DOUBLE.as_str()
}
