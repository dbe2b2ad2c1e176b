use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Approval lifecycle of a posting. New postings start `pending`; only an
/// administrator moves them to `approved` or `rejected`, and decided
/// postings stay decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Approved,
    Rejected,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Approved => "approved",
            JobStatus::Rejected => "rejected",
        }
    }

    /// Case-insensitive parse; values are normalized to lowercase at write
    /// time so reads never need to be.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "approved" => Some(JobStatus::Approved),
            "rejected" => Some(JobStatus::Rejected),
            _ => None,
        }
    }
}

/// Admin review outcome for a pending posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobDecision {
    Approved,
    Rejected,
}

impl JobDecision {
    pub const fn status(self) -> JobStatus {
        match self {
            JobDecision::Approved => JobStatus::Approved,
            JobDecision::Rejected => JobStatus::Rejected,
        }
    }
}

/// Stored record in the `jobs` collection. Field names and status strings
/// are the wire contract shared with existing stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub employer_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employer-submitted posting fields before review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSubmission {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Free text from the posting form; split on newlines into entries.
    pub requirements: String,
    pub salary: String,
    #[serde(rename = "type")]
    pub employment_type: String,
}

/// Requirements arrive as newline-separated free text and are stored as an
/// ordered sequence of non-empty lines.
pub(crate) fn normalize_requirements(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
