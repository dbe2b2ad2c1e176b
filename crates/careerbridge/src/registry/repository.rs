use crate::store::StoreError;

use super::domain::{JobId, JobRecord};

/// Storage seam for the `jobs` collection. List methods return complete,
/// newest-first vectors; the store is the only serialization point, so
/// implementations must be safe to call from concurrent requests.
pub trait JobRepository: Send + Sync {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, JobRepositoryError>;
    fn update(&self, record: JobRecord) -> Result<(), JobRepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError>;
    fn delete(&self, id: &JobId) -> Result<(), JobRepositoryError>;
    /// Approved postings visible to the public listing.
    fn approved(&self) -> Result<Vec<JobRecord>, StoreError>;
    /// Postings awaiting admin review.
    fn pending(&self) -> Result<Vec<JobRecord>, StoreError>;
    /// Every posting owned by the employer, regardless of status.
    fn by_employer(&self, employer_id: &str) -> Result<Vec<JobRecord>, StoreError>;
}

/// Error enumeration for `jobs` collection failures.
#[derive(Debug, thiserror::Error)]
pub enum JobRepositoryError {
    #[error("job already exists")]
    Conflict,
    #[error("job not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
