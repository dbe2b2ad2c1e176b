use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::Caller;
use crate::directory::Role;
use crate::store::StoreError;

use super::domain::{normalize_requirements, JobDecision, JobId, JobRecord, JobStatus, JobSubmission};
use super::repository::{JobRepository, JobRepositoryError};

/// Owns job posting records and their approval-status lifecycle.
pub struct JobRegistryService<J> {
    jobs: Arc<J>,
}

impl<J> JobRegistryService<J>
where
    J: JobRepository + 'static,
{
    pub fn new(jobs: Arc<J>) -> Self {
        Self { jobs }
    }

    /// Submit a new posting on behalf of an employer. The record starts
    /// `pending` and is invisible to students until an admin approves it.
    pub fn submit_job(
        &self,
        caller: &Caller,
        submission: JobSubmission,
    ) -> Result<JobRecord, RegistryError> {
        if caller.role != Role::Employer {
            return Err(RegistryError::Forbidden);
        }

        let title = required(&submission.title, "title")?;
        let company = required(&submission.company, "company")?;
        let location = required(&submission.location, "location")?;
        let description = required(&submission.description, "description")?;
        let salary = required(&submission.salary, "salary")?;
        let employment_type = required(&submission.employment_type, "type")?;
        let requirements = normalize_requirements(&submission.requirements);
        if requirements.is_empty() {
            return Err(RegistryError::MissingField("requirements"));
        }

        let now = Utc::now();
        let record = JobRecord {
            id: JobId(Uuid::new_v4().to_string()),
            title,
            company,
            location,
            description,
            requirements,
            salary,
            employment_type,
            employer_id: caller.user_id.clone(),
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        Ok(self.jobs.insert(record)?)
    }

    /// Approved postings, newest first. The public listing.
    pub fn list_approved(&self) -> Result<Vec<JobRecord>, RegistryError> {
        Ok(self.jobs.approved()?)
    }

    /// The admin review queue: pending postings, newest first.
    pub fn list_pending(&self, caller: &Caller) -> Result<Vec<JobRecord>, RegistryError> {
        if caller.role != Role::Admin {
            return Err(RegistryError::Forbidden);
        }
        Ok(self.jobs.pending()?)
    }

    /// Every posting the calling employer owns, any status.
    pub fn list_own_postings(&self, caller: &Caller) -> Result<Vec<JobRecord>, RegistryError> {
        if caller.role != Role::Employer {
            return Err(RegistryError::Forbidden);
        }
        Ok(self.jobs.by_employer(&caller.user_id)?)
    }

    /// Fetch a single posting. Approved postings are visible to anyone;
    /// pending and rejected ones only to their owner or an admin, and look
    /// absent to everyone else.
    pub fn get_job(
        &self,
        caller: Option<&Caller>,
        id: &JobId,
    ) -> Result<JobRecord, RegistryError> {
        let record = self.jobs.fetch(id)?.ok_or(RegistryError::NotFound)?;
        if record.status == JobStatus::Approved {
            return Ok(record);
        }
        match caller {
            Some(caller)
                if caller.role == Role::Admin
                    || (caller.role == Role::Employer && caller.user_id == record.employer_id) =>
            {
                Ok(record)
            }
            _ => Err(RegistryError::NotFound),
        }
    }

    /// Admin decision on a posting. Repeating a decision rewrites the same
    /// status and refreshes `updatedAt`; there is no re-opening path.
    pub fn set_status(
        &self,
        caller: &Caller,
        id: &JobId,
        decision: JobDecision,
    ) -> Result<JobRecord, RegistryError> {
        if caller.role != Role::Admin {
            return Err(RegistryError::Forbidden);
        }
        let mut record = self.jobs.fetch(id)?.ok_or(RegistryError::NotFound)?;
        record.status = decision.status();
        record.updated_at = Utc::now();
        self.jobs.update(record.clone())?;
        Ok(record)
    }

    /// Remove a posting. Permitted for the owning employer or an admin.
    pub fn delete_job(&self, caller: &Caller, id: &JobId) -> Result<(), RegistryError> {
        let record = self.jobs.fetch(id)?.ok_or(RegistryError::NotFound)?;
        let permitted = caller.role == Role::Admin
            || (caller.role == Role::Employer && caller.user_id == record.employer_id);
        if !permitted {
            return Err(RegistryError::Forbidden);
        }
        Ok(self.jobs.delete(id)?)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Error raised by job registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("caller is not permitted to perform this operation")]
    Forbidden,
    #[error("job not found")]
    NotFound,
    #[error("job already exists")]
    Conflict,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JobRepositoryError> for RegistryError {
    fn from(value: JobRepositoryError) -> Self {
        match value {
            JobRepositoryError::Conflict => RegistryError::Conflict,
            JobRepositoryError::NotFound => RegistryError::NotFound,
            JobRepositoryError::Store(err) => RegistryError::Store(err),
        }
    }
}
