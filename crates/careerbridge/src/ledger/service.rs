use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::Caller;
use crate::directory::Role;
use crate::registry::{JobId, JobRepository, JobStatus};
use crate::store::StoreError;

use super::domain::{
    ApplicationDecision, ApplicationForm, ApplicationId, ApplicationRecord, ApplicationStatus,
};
use super::repository::{ApplicationRepository, ApplicationRepositoryError};

/// Owns application records linking a student, a job, and an employer.
pub struct ApplicationLedgerService<A, J> {
    applications: Arc<A>,
    jobs: Arc<J>,
}

impl<A, J> ApplicationLedgerService<A, J>
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    pub fn new(applications: Arc<A>, jobs: Arc<J>) -> Self {
        Self { applications, jobs }
    }

    /// Submit an application to an approved job. Unapproved or missing jobs
    /// both answer "not found" so rejected postings stay undiscoverable.
    /// The duplicate guard lives in the repository insert.
    pub fn submit_application(
        &self,
        caller: &Caller,
        job_id: &JobId,
        form: ApplicationForm,
    ) -> Result<ApplicationRecord, LedgerError> {
        if caller.role != Role::Student {
            return Err(LedgerError::Forbidden);
        }

        let resume = form.resume.trim();
        if resume.is_empty() {
            return Err(LedgerError::MissingField("resume"));
        }
        let cover_letter = form
            .cover_letter
            .as_deref()
            .map(str::trim)
            .filter(|letter| !letter.is_empty())
            .map(str::to_string);

        let job = self.jobs.fetch(job_id)?.ok_or(LedgerError::JobNotFound)?;
        if job.status != JobStatus::Approved {
            return Err(LedgerError::JobNotFound);
        }

        let now = Utc::now();
        let record = ApplicationRecord {
            id: ApplicationId(Uuid::new_v4().to_string()),
            job_id: job.id.clone(),
            student_id: caller.user_id.clone(),
            employer_id: job.employer_id.clone(),
            status: ApplicationStatus::Pending,
            resume: resume.to_string(),
            cover_letter,
            created_at: now,
            updated_at: now,
        };

        Ok(self.applications.insert(record)?)
    }

    /// The calling student's applications, newest first.
    pub fn list_own_applications(
        &self,
        caller: &Caller,
    ) -> Result<Vec<ApplicationRecord>, LedgerError> {
        if caller.role != Role::Student {
            return Err(LedgerError::Forbidden);
        }
        Ok(self.applications.by_student(&caller.user_id)?)
    }

    /// Applications received across all of the calling employer's jobs.
    pub fn list_received_applications(
        &self,
        caller: &Caller,
    ) -> Result<Vec<ApplicationRecord>, LedgerError> {
        if caller.role != Role::Employer {
            return Err(LedgerError::Forbidden);
        }
        Ok(self.applications.by_employer(&caller.user_id)?)
    }

    /// Applications to a single job, restricted to the employer owning it.
    pub fn list_applications_for_job(
        &self,
        caller: &Caller,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationRecord>, LedgerError> {
        if caller.role != Role::Employer {
            return Err(LedgerError::Forbidden);
        }
        let job = self.jobs.fetch(job_id)?.ok_or(LedgerError::JobNotFound)?;
        if job.employer_id != caller.user_id {
            return Err(LedgerError::Forbidden);
        }
        Ok(self.applications.by_job(job_id)?)
    }

    /// Employer decision. Only the identity the application was submitted
    /// to may decide it; admins included, nobody else qualifies.
    pub fn decide_application(
        &self,
        caller: &Caller,
        id: &ApplicationId,
        decision: ApplicationDecision,
    ) -> Result<ApplicationRecord, LedgerError> {
        let mut record = self.applications.fetch(id)?.ok_or(LedgerError::NotFound)?;
        if record.employer_id != caller.user_id {
            return Err(LedgerError::Forbidden);
        }
        record.status = decision.status();
        record.updated_at = Utc::now();
        self.applications.update(record.clone())?;
        Ok(record)
    }
}

/// Error raised by application ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("caller is not permitted to perform this operation")]
    Forbidden,
    #[error("job not found")]
    JobNotFound,
    #[error("application not found")]
    NotFound,
    #[error("an application for this job already exists")]
    Duplicate,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApplicationRepositoryError> for LedgerError {
    fn from(value: ApplicationRepositoryError) -> Self {
        match value {
            ApplicationRepositoryError::Duplicate => LedgerError::Duplicate,
            ApplicationRepositoryError::NotFound => LedgerError::NotFound,
            ApplicationRepositoryError::Store(err) => LedgerError::Store(err),
        }
    }
}
