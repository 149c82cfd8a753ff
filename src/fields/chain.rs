use crate::framework::ApiError;

/// Separator between field names in a chain path segment.
pub const CHAIN_SEPARATOR: char = '+';

/// An ordered sequence of field names, decoded from `a+b+c`.
///
/// The raw segment is kept for error messages only; dispatch works on the
/// decoded names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChain {
    raw: String,
    names: Vec<String>,
}

impl FieldChain {
    /// Decodes a chain. Empty names are dropped; a chain with no names at all
    /// is not found.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let names: Vec<String> = raw
            .split(CHAIN_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(ApiError::field_not_found(raw));
        }

        Ok(Self {
            raw: raw.to_string(),
            names,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
