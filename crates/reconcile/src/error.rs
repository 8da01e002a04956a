//! Error types for reconciliation workflows.

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the reconciliation workflows.
///
/// None of these are retried internally. Collaborator failures keep their
/// whole context chain in `message`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A product slug did not match anything in the staged inventory.
    #[error("product {slug} not found")]
    ResourceNotFound {
        /// The slug that failed to resolve.
        slug: String,
    },

    /// Inventory, manifest or errand list could not be fetched.
    #[error("failed to load {what}: {message}")]
    SnapshotLoad {
        /// What was being loaded.
        what: String,
        /// Underlying error message.
        message: String,
    },

    /// A snapshot could not be canonicalized.
    #[error("failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A state-changing request failed.
    #[error("{operation} failed: {message}")]
    Transport {
        /// The mutation that was attempted.
        operation: String,
        /// Underlying error message.
        message: String,
    },
}

impl Error {
    pub(crate) fn snapshot_load(what: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::SnapshotLoad {
            what: what.into(),
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn transport(operation: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_message() {
        let err = Error::ResourceNotFound {
            slug: "product3".to_string(),
        };
        assert_eq!(err.to_string(), "product product3 not found");
    }

    #[test]
    fn test_transport_keeps_context_chain() {
        let inner = anyhow::anyhow!("connection reset").context("POST /api/v0/installations");
        let err = Error::transport("apply changes", &inner);
        assert_eq!(
            err.to_string(),
            "apply changes failed: POST /api/v0/installations: connection reset"
        );
    }
}
