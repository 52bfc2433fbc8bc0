use thiserror::Error;

/// Input that cannot be converted at all.
///
/// `location` is a JSON-pointer-like path to the offending value, e.g.
/// `/dataset/2/publisher`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("{location}: expected a JSON object, found {found}")]
    ExpectedObject { location: String, found: &'static str },

    #[error("{location}: expected an array, found {found}")]
    ExpectedArray { location: String, found: &'static str },

    #[error("{location}: expected a string, found {found}")]
    ExpectedString { location: String, found: &'static str },
}

impl ConvertError {
    pub fn location(&self) -> &str {
        match self {
            ConvertError::ExpectedObject { location, .. }
            | ConvertError::ExpectedArray { location, .. }
            | ConvertError::ExpectedString { location, .. } => location,
        }
    }
}
