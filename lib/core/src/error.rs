use crate::ElementType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Value {value} out of domain in {context} at index {index}")]
    Domain {
        context: String,
        index: usize,
        value: i64,
    },

    #[error("Element type mismatch in {context}: expected {expected}, got {actual}")]
    ElementTypeMismatch {
        context: String,
        expected: ElementType,
        actual: ElementType,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Prefix the error's context with the caller's location (family, row).
    pub fn within(self, outer: impl std::fmt::Display) -> Self {
        match self {
            Error::ShapeMismatch { context, expected, actual } => Error::ShapeMismatch {
                context: format!("{outer}: {context}"),
                expected,
                actual,
            },
            Error::Domain { context, index, value } => Error::Domain {
                context: format!("{outer}: {context}"),
                index,
                value,
            },
            Error::ElementTypeMismatch { context, expected, actual } => Error::ElementTypeMismatch {
                context: format!("{outer}: {context}"),
                expected,
                actual,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_prefixes_context() {
        let err = Error::Domain {
            context: "log compress".to_string(),
            index: 2,
            value: -1,
        }
        .within("txtlen row 7");

        assert_eq!(
            err.to_string(),
            "Value -1 out of domain in txtlen row 7: log compress at index 2"
        );
    }

    #[test]
    fn test_within_leaves_cancellation_alone() {
        assert_eq!(Error::Cancelled.within("anything"), Error::Cancelled);
    }
}
