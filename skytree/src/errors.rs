//! Error types for the spatial index.

use thiserror::Error;

/// Errors that can occur while configuring or querying the index.
///
/// Structural mutations (`insert`, `remove`) never fail for valid input;
/// every error in this enum is raised at a construction or query boundary,
/// before any tree state is touched.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid tree configuration: {0}")]
    InvalidConfiguration(String),

    #[error("malformed bounding box: {0}")]
    MalformedBox(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for index operations.
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TreeError::InvalidConfiguration("min_entries must not exceed max_entries / 2".into());
        assert!(err.to_string().contains("invalid tree configuration"));

        let err = TreeError::MalformedBox("min exceeds max".into());
        assert!(err.to_string().contains("malformed bounding box"));

        let err = TreeError::InvalidQuery("nested nearest".into());
        assert!(err.to_string().contains("invalid query"));
    }
}
