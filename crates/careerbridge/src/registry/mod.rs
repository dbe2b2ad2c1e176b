//! Job Registry: posting submission, the admin approval queue, and
//! status-gated visibility.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{JobDecision, JobId, JobRecord, JobStatus, JobSubmission};
pub use repository::{JobRepository, JobRepositoryError};
pub use router::{registry_router, RegistryRouterState};
pub use service::{JobRegistryService, RegistryError};
