use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::auth::{AuthError, AuthGateway, Caller, Identity, IdentityProvider, Session};
use crate::directory::{DirectoryService, Role, UserRecord, UserRepository, UserRepositoryError};
use crate::registry::domain::{JobId, JobRecord, JobSubmission};
use crate::registry::repository::{JobRepository, JobRepositoryError};
use crate::registry::router::RegistryRouterState;
use crate::registry::service::JobRegistryService;
use crate::store::StoreError;

pub(super) const EMPLOYER_TOKEN: &str = "token-employer";
pub(super) const OTHER_EMPLOYER_TOKEN: &str = "token-employer-2";
pub(super) const STUDENT_TOKEN: &str = "token-student";
pub(super) const ADMIN_TOKEN: &str = "token-admin";

pub(super) fn employer() -> Caller {
    Caller {
        user_id: "emp-1".to_string(),
        role: Role::Employer,
    }
}

pub(super) fn other_employer() -> Caller {
    Caller {
        user_id: "emp-2".to_string(),
        role: Role::Employer,
    }
}

pub(super) fn student() -> Caller {
    Caller {
        user_id: "stu-1".to_string(),
        role: Role::Student,
    }
}

pub(super) fn admin() -> Caller {
    Caller {
        user_id: "admin-1".to_string(),
        role: Role::Admin,
    }
}

pub(super) fn submission() -> JobSubmission {
    JobSubmission {
        title: "Barista".to_string(),
        company: "Cafe X".to_string(),
        location: "Des Moines, IA".to_string(),
        description: "Morning shifts at the espresso bar.".to_string(),
        requirements: "Food handler card\nWeekend availability\n".to_string(),
        salary: "$16/hr".to_string(),
        employment_type: "part-time".to_string(),
    }
}

pub(super) fn build_service() -> (JobRegistryService<MemoryJobs>, Arc<MemoryJobs>) {
    let jobs = Arc::new(MemoryJobs::default());
    (JobRegistryService::new(jobs.clone()), jobs)
}

#[derive(Default)]
pub(super) struct MemoryJobs {
    records: Mutex<HashMap<JobId, JobRecord>>,
}

impl JobRepository for MemoryJobs {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, JobRepositoryError> {
        let mut guard = self.records.lock().expect("jobs mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(JobRepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: JobRecord) -> Result<(), JobRepositoryError> {
        let mut guard = self.records.lock().expect("jobs mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(JobRepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.records.lock().expect("jobs mutex poisoned").get(id).cloned())
    }

    fn delete(&self, id: &JobId) -> Result<(), JobRepositoryError> {
        let mut guard = self.records.lock().expect("jobs mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(JobRepositoryError::NotFound)
    }

    fn approved(&self) -> Result<Vec<JobRecord>, StoreError> {
        self.filtered(|record| record.status == crate::registry::JobStatus::Approved)
    }

    fn pending(&self) -> Result<Vec<JobRecord>, StoreError> {
        self.filtered(|record| record.status == crate::registry::JobStatus::Pending)
    }

    fn by_employer(&self, employer_id: &str) -> Result<Vec<JobRecord>, StoreError> {
        self.filtered(|record| record.employer_id == employer_id)
    }
}

impl MemoryJobs {
    fn filtered(&self, keep: impl Fn(&JobRecord) -> bool) -> Result<Vec<JobRecord>, StoreError> {
        let guard = self.records.lock().expect("jobs mutex poisoned");
        let mut records: Vec<_> = guard.values().filter(|r| keep(r)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

pub(super) struct UnavailableJobs;

impl JobRepository for UnavailableJobs {
    fn insert(&self, _record: JobRecord) -> Result<JobRecord, JobRepositoryError> {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }

    fn update(&self, _record: JobRecord) -> Result<(), JobRepositoryError> {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }

    fn fetch(&self, _id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &JobId) -> Result<(), JobRepositoryError> {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }

    fn approved(&self) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn pending(&self) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn by_employer(&self, _employer_id: &str) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct TimedOutJobs;

impl JobRepository for TimedOutJobs {
    fn insert(&self, _record: JobRecord) -> Result<JobRecord, JobRepositoryError> {
        Err(StoreError::Timeout.into())
    }

    fn update(&self, _record: JobRecord) -> Result<(), JobRepositoryError> {
        Err(StoreError::Timeout.into())
    }

    fn fetch(&self, _id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        Err(StoreError::Timeout)
    }

    fn delete(&self, _id: &JobId) -> Result<(), JobRepositoryError> {
        Err(StoreError::Timeout.into())
    }

    fn approved(&self) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::Timeout)
    }

    fn pending(&self) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::Timeout)
    }

    fn by_employer(&self, _employer_id: &str) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::Timeout)
    }
}

#[derive(Default)]
pub(super) struct MemoryUsers {
    records: Mutex<HashMap<String, UserRecord>>,
}

impl UserRepository for MemoryUsers {
    fn insert(&self, record: UserRecord) -> Result<UserRecord, UserRepositoryError> {
        let mut guard = self.records.lock().expect("users mutex poisoned");
        if guard.contains_key(&record.uid) {
            return Err(UserRepositoryError::Conflict);
        }
        guard.insert(record.uid.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, uid: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records.lock().expect("users mutex poisoned").get(uid).cloned())
    }

    fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let guard = self.records.lock().expect("users mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryProvider {
    sessions: Mutex<HashMap<String, Identity>>,
}

impl MemoryProvider {
    pub(super) fn seed_session(&self, token: &str, identity: Identity) {
        self.sessions
            .lock()
            .expect("sessions mutex poisoned")
            .insert(token.to_string(), identity);
    }
}

impl IdentityProvider for MemoryProvider {
    fn register(
        &self,
        email: &str,
        _password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError> {
        let identity = Identity {
            user_id: format!("uid-{email}"),
            email: email.to_string(),
            display_name: display_name.to_string(),
        };
        let token = format!("token-{email}");
        self.seed_session(&token, identity.clone());
        Ok(Session { identity, token })
    }

    fn authenticate(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard
            .iter()
            .find(|(_, identity)| identity.email == email)
            .map(|(token, identity)| Session {
                identity: identity.clone(),
                token: token.clone(),
            })
            .ok_or(AuthError::InvalidCredentials)
    }

    fn verify(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}

fn user_record(uid: &str, role: Role, company: Option<&str>) -> UserRecord {
    UserRecord {
        uid: uid.to_string(),
        email: format!("{uid}@example.com"),
        name: uid.to_string(),
        phone: "555-0100".to_string(),
        role,
        company: company.map(str::to_string),
        created_at: Utc::now(),
    }
}

fn identity_for(record: &UserRecord) -> Identity {
    Identity {
        user_id: record.uid.clone(),
        email: record.email.clone(),
        display_name: record.name.clone(),
    }
}

/// A gateway seeded with one account per role, each reachable through the
/// fixed tokens above.
pub(super) fn seeded_gate() -> Arc<AuthGateway<MemoryProvider, MemoryUsers>> {
    let users = Arc::new(MemoryUsers::default());
    let provider = Arc::new(MemoryProvider::default());

    let accounts = [
        (EMPLOYER_TOKEN, user_record("emp-1", Role::Employer, Some("Cafe X"))),
        (
            OTHER_EMPLOYER_TOKEN,
            user_record("emp-2", Role::Employer, Some("Bistro Y")),
        ),
        (STUDENT_TOKEN, user_record("stu-1", Role::Student, None)),
        (ADMIN_TOKEN, user_record("admin-1", Role::Admin, None)),
    ];
    for (token, record) in accounts {
        provider.seed_session(token, identity_for(&record));
        users.insert(record).expect("seed user");
    }

    let directory = Arc::new(DirectoryService::new(users));
    Arc::new(AuthGateway::new(provider, directory))
}

pub(super) fn build_state() -> (
    RegistryRouterState<MemoryJobs, MemoryProvider, MemoryUsers>,
    Arc<MemoryJobs>,
) {
    let jobs = Arc::new(MemoryJobs::default());
    let state = RegistryRouterState {
        registry: Arc::new(JobRegistryService::new(jobs.clone())),
        gate: seeded_gate(),
    };
    (state, jobs)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
