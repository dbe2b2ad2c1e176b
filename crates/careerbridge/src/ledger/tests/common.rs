use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::auth::{AuthError, AuthGateway, Caller, Identity, IdentityProvider, Session};
use crate::directory::{DirectoryService, Role, UserRecord, UserRepository, UserRepositoryError};
use crate::ledger::domain::{ApplicationForm, ApplicationId, ApplicationRecord};
use crate::ledger::repository::{ApplicationRepository, ApplicationRepositoryError};
use crate::ledger::router::LedgerRouterState;
use crate::ledger::service::ApplicationLedgerService;
use crate::registry::{JobId, JobRecord, JobRepository, JobRepositoryError, JobStatus};
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

pub(super) fn other_student() -> Caller {
    Caller {
        user_id: "stu-2".to_string(),
        role: Role::Student,
    }
}

pub(super) fn admin() -> Caller {
    Caller {
        user_id: "admin-1".to_string(),
        role: Role::Admin,
    }
}

pub(super) fn form() -> ApplicationForm {
    ApplicationForm {
        resume: "https://files.example.com/resumes/stu-1.pdf".to_string(),
        cover_letter: Some("I open at 5am without complaint.".to_string()),
    }
}

pub(super) fn job(id: &str, employer_id: &str, status: JobStatus) -> JobRecord {
    let now = Utc::now();
    JobRecord {
        id: JobId(id.to_string()),
        title: "Barista".to_string(),
        company: "Cafe X".to_string(),
        location: "Des Moines, IA".to_string(),
        description: "Morning shifts at the espresso bar.".to_string(),
        requirements: vec!["Food handler card".to_string()],
        salary: "$16/hr".to_string(),
        employment_type: "part-time".to_string(),
        employer_id: employer_id.to_string(),
        status,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn build_service() -> (
    ApplicationLedgerService<MemoryApplications, MemoryJobs>,
    Arc<MemoryApplications>,
    Arc<MemoryJobs>,
) {
    let applications = Arc::new(MemoryApplications::default());
    let jobs = Arc::new(MemoryJobs::default());
    let service = ApplicationLedgerService::new(applications.clone(), jobs.clone());
    (service, applications, jobs)
}

#[derive(Default)]
pub(super) struct MemoryJobs {
    records: Mutex<HashMap<JobId, JobRecord>>,
}

impl MemoryJobs {
    pub(super) fn seed(&self, record: JobRecord) {
        self.records
            .lock()
            .expect("jobs mutex poisoned")
            .insert(record.id.clone(), record);
    }
}

impl JobRepository for MemoryJobs {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, JobRepositoryError> {
        self.seed(record.clone());
        Ok(record)
    }

    fn update(&self, record: JobRecord) -> Result<(), JobRepositoryError> {
        self.seed(record);
        Ok(())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.records.lock().expect("jobs mutex poisoned").get(id).cloned())
    }

    fn delete(&self, id: &JobId) -> Result<(), JobRepositoryError> {
        self.records
            .lock()
            .expect("jobs mutex poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or(JobRepositoryError::NotFound)
    }

    fn approved(&self) -> Result<Vec<JobRecord>, StoreError> {
        let guard = self.records.lock().expect("jobs mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == JobStatus::Approved)
            .cloned()
            .collect())
    }

    fn pending(&self) -> Result<Vec<JobRecord>, StoreError> {
        let guard = self.records.lock().expect("jobs mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == JobStatus::Pending)
            .cloned()
            .collect())
    }

    fn by_employer(&self, employer_id: &str) -> Result<Vec<JobRecord>, StoreError> {
        let guard = self.records.lock().expect("jobs mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.employer_id == employer_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, ApplicationRepositoryError> {
        // The (student, job) uniqueness check and the write share one
        // critical section, mirroring what a real store must guarantee.
        let mut guard = self.records.lock().expect("applications mutex poisoned");
        let duplicate = guard
            .values()
            .any(|existing| existing.student_id == record.student_id && existing.job_id == record.job_id);
        if duplicate {
            return Err(ApplicationRepositoryError::Duplicate);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), ApplicationRepositoryError> {
        let mut guard = self.records.lock().expect("applications mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(ApplicationRepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn by_student(&self, student_id: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.filtered(|record| record.student_id == student_id)
    }

    fn by_employer(&self, employer_id: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.filtered(|record| record.employer_id == employer_id)
    }

    fn by_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.filtered(|record| &record.job_id == job_id)
    }
}

impl MemoryApplications {
    fn filtered(
        &self,
        keep: impl Fn(&ApplicationRecord) -> bool,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        let mut records: Vec<_> = guard.values().filter(|r| keep(r)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, ApplicationRepositoryError> {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), ApplicationRepositoryError> {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn by_student(&self, _student_id: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn by_employer(&self, _employer_id: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn by_job(&self, _job_id: &JobId) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
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
    fn seed_session(&self, token: &str, identity: Identity) {
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

pub(super) fn build_state() -> (
    LedgerRouterState<MemoryApplications, MemoryJobs, MemoryProvider, MemoryUsers>,
    Arc<MemoryJobs>,
) {
    let applications = Arc::new(MemoryApplications::default());
    let jobs = Arc::new(MemoryJobs::default());
    let ledger = Arc::new(ApplicationLedgerService::new(applications, jobs.clone()));

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
        provider.seed_session(
            token,
            Identity {
                user_id: record.uid.clone(),
                email: record.email.clone(),
                display_name: record.name.clone(),
            },
        );
        users.insert(record).expect("seed user");
    }
    let directory = Arc::new(DirectoryService::new(users));
    let gate = Arc::new(AuthGateway::new(provider, directory));

    (LedgerRouterState { ledger, gate }, jobs)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
