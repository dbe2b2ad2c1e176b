//! Application Ledger: records linking a student, a job, and an employer,
//! with the employer-driven accept/reject lifecycle.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationDecision, ApplicationForm, ApplicationId, ApplicationRecord, ApplicationStatus,
};
pub use repository::{ApplicationRepository, ApplicationRepositoryError};
pub use router::{ledger_router, LedgerRouterState};
pub use service::{ApplicationLedgerService, LedgerError};
