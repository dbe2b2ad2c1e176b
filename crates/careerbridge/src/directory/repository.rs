use crate::store::StoreError;

use super::domain::UserRecord;

/// Storage seam for the `users` collection so the service can be exercised
/// in isolation. Records are keyed by the identity-provider id, which is
/// how uid uniqueness is enforced.
pub trait UserRepository: Send + Sync {
    fn insert(&self, record: UserRecord) -> Result<UserRecord, UserRepositoryError>;
    fn fetch(&self, uid: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Every account, newest first.
    fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
}

/// Error enumeration for `users` collection failures.
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("user already exists")]
    Conflict,
    #[error(transparent)]
    Store(#[from] StoreError),
}
