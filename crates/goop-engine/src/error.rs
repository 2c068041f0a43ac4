//! Error types for blob lifecycle operations.

use std::fmt;

use crate::api::types::BlobId;

/// Errors returned by lifecycle calls that reference state the engine does
/// not hold. Physics and queries never fail; they degrade instead.
#[derive(Debug, Clone, PartialEq)]
pub enum GoopError {
    /// No falling blob is active.
    NoFallingBlob,
    /// The id does not name the active falling blob (stale sync).
    StaleFallingId { expected: BlobId, got: BlobId },
    /// No blob with this id exists.
    UnknownBlob(BlobId),
}

impl fmt::Display for GoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoopError::NoFallingBlob => write!(f, "no falling blob is active"),
            GoopError::StaleFallingId { expected, got } => {
                write!(f, "stale falling id {} (active piece is {})", got, expected)
            }
            GoopError::UnknownBlob(id) => write!(f, "unknown blob {}", id),
        }
    }
}

impl std::error::Error for GoopError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_ids() {
        let err = GoopError::StaleFallingId {
            expected: BlobId::falling(2),
            got: BlobId::falling(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("falling-1"));
        assert!(msg.contains("falling-2"));
        assert_eq!(
            GoopError::UnknownBlob(BlobId::locked("a")).to_string(),
            "unknown blob goop-a"
        );
    }
}
