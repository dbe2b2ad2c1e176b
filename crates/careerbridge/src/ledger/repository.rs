use crate::registry::JobId;
use crate::store::StoreError;

use super::domain::{ApplicationId, ApplicationRecord};

/// Storage seam for the `applications` collection.
///
/// `insert` owns the one-application-per-(student, job) constraint:
/// implementations must refuse a second record for the same pair inside
/// the same critical section as the write, so two concurrent submissions
/// cannot both land.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord)
        -> Result<ApplicationRecord, ApplicationRepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), ApplicationRepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>;
    /// A student's applications, newest first.
    fn by_student(&self, student_id: &str) -> Result<Vec<ApplicationRecord>, StoreError>;
    /// Applications to any of an employer's jobs, newest first.
    fn by_employer(&self, employer_id: &str) -> Result<Vec<ApplicationRecord>, StoreError>;
    /// Applications to one job, newest first.
    fn by_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, StoreError>;
}

/// Error enumeration for `applications` collection failures.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationRepositoryError {
    #[error("an application for this job already exists")]
    Duplicate,
    #[error("application not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
