//! Error surface of the document-store boundary shared by every repository
//! trait. Individual collections add their own conflict/not-found variants
//! on top of this.

/// Failure reported by the underlying store for any collection operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store request timed out")]
    Timeout,
}
