use std::fmt;

/// Processing error.
///
/// Every error maps to a stable kind through [`Error::code`], suitable for
/// matching at an API boundary without depending on message text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A value carries `@language` while the active context demands a
	/// coerced type; coercing would lose the language information.
	#[error("cannot coerce type when a language is specified")]
	CoerceLanguage,

	/// A value's `@type` does not match the coercion type declared by the
	/// active context.
	#[error("cannot coerce type: found `{found}`, expected `{expected}`")]
	InvalidCoerceType { found: String, expected: String },

	/// A graph literal appeared in a property position.
	#[error("embedded graph literals cannot be flattened")]
	GraphLiteralFlatten,

	/// A frame element is not a map.
	#[error("invalid frame: frame element is not a map or array of maps")]
	InvalidFrameFormat,
}

impl Error {
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::CoerceLanguage => ErrorCode::CoerceLanguageError,
			Self::InvalidCoerceType { .. } => ErrorCode::InvalidCoerceType,
			Self::GraphLiteralFlatten => ErrorCode::GraphLiteralFlattenError,
			Self::InvalidFrameFormat => ErrorCode::InvalidFrameFormat,
		}
	}
}

/// Stable error kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorCode {
	CoerceLanguageError,
	InvalidCoerceType,
	GraphLiteralFlattenError,
	InvalidFrameFormat,
}

impl ErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::CoerceLanguageError => "CoerceLanguageError",
			Self::InvalidCoerceType => "InvalidCoerceType",
			Self::GraphLiteralFlattenError => "GraphLiteralFlattenError",
			Self::InvalidFrameFormat => "InvalidFrameFormat",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
