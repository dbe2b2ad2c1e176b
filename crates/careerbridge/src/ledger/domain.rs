use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::JobId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Application lifecycle: `pending` on submission, then `accepted` or
/// `rejected` by the employer who owns the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Employer decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationDecision {
    Accepted,
    Rejected,
}

impl ApplicationDecision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            ApplicationDecision::Accepted => ApplicationStatus::Accepted,
            ApplicationDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

/// Stored record in the `applications` collection. `employerId` is
/// denormalized from the job at submission time for query convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub student_id: String,
    pub employer_id: String,
    pub status: ApplicationStatus,
    pub resume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student-supplied application form. The canonical schema: a resume
/// reference plus an optional cover letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub resume: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
}
