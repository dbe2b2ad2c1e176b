use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use careerbridge::auth::{AuthError, AuthGateway, Identity, IdentityProvider, Session};
use careerbridge::directory::{UserRecord, UserRepository, UserRepositoryError};
use careerbridge::ledger::{ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationRepositoryError};
use careerbridge::registry::{JobId, JobRecord, JobRepository, JobRepositoryError};
use careerbridge::store::StoreError;
use metrics_exporter_prometheus::PrometheusHandle;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiGateway = AuthGateway<InMemoryIdentityProvider, InMemoryUserRepository>;

#[derive(Default)]
pub(crate) struct InMemoryUserRepository {
    records: Mutex<HashMap<String, UserRecord>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, record: UserRecord) -> Result<UserRecord, UserRepositoryError> {
        let mut guard = self.records.lock().expect("user mutex poisoned");
        if guard.contains_key(&record.uid) {
            return Err(UserRepositoryError::Conflict);
        }
        guard.insert(record.uid.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, uid: &str) -> Result<Option<UserRecord>, StoreError> {
        let guard = self.records.lock().expect("user mutex poisoned");
        Ok(guard.get(uid).cloned())
    }

    fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let guard = self.records.lock().expect("user mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryJobRepository {
    records: Mutex<HashMap<JobId, JobRecord>>,
}

impl InMemoryJobRepository {
    fn filtered(&self, keep: impl Fn(&JobRecord) -> bool) -> Result<Vec<JobRecord>, StoreError> {
        let guard = self.records.lock().expect("job mutex poisoned");
        let mut records: Vec<_> = guard.values().filter(|r| keep(r)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, record: JobRecord) -> Result<JobRecord, JobRepositoryError> {
        let mut guard = self.records.lock().expect("job mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(JobRepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: JobRecord) -> Result<(), JobRepositoryError> {
        let mut guard = self.records.lock().expect("job mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(JobRepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        let guard = self.records.lock().expect("job mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &JobId) -> Result<(), JobRepositoryError> {
        let mut guard = self.records.lock().expect("job mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(JobRepositoryError::NotFound)
    }

    fn approved(&self) -> Result<Vec<JobRecord>, StoreError> {
        self.filtered(|record| record.status == careerbridge::registry::JobStatus::Approved)
    }

    fn pending(&self) -> Result<Vec<JobRecord>, StoreError> {
        self.filtered(|record| record.status == careerbridge::registry::JobStatus::Pending)
    }

    fn by_employer(&self, employer_id: &str) -> Result<Vec<JobRecord>, StoreError> {
        self.filtered(|record| record.employer_id == employer_id)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryApplicationRepository {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl InMemoryApplicationRepository {
    fn filtered(
        &self,
        keep: impl Fn(&ApplicationRecord) -> bool,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        let mut records: Vec<_> = guard.values().filter(|r| keep(r)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, ApplicationRepositoryError> {
        // The uniqueness scan and the write happen under one lock so two
        // concurrent submissions for the same (student, job) pair cannot
        // both land.
        let mut guard = self.records.lock().expect("application mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.student_id == record.student_id && existing.job_id == record.job_id
        });
        if duplicate {
            return Err(ApplicationRepositoryError::Duplicate);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), ApplicationRepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(ApplicationRepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("application mutex poisoned");
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

struct Account {
    password: String,
    identity: Identity,
}

/// Development stand-in for the hosted identity provider. Credentials and
/// sessions live only as long as the process.
#[derive(Default)]
pub(crate) struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, Identity>>,
}

impl InMemoryIdentityProvider {
    fn open_session(&self, identity: Identity) -> Session {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone(), identity.clone());
        Session { identity, token }
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError> {
        let mut accounts = self.accounts.lock().expect("account mutex poisoned");
        if accounts.contains_key(email) {
            return Err(AuthError::EmailTaken);
        }
        let identity = Identity {
            user_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
        };
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        drop(accounts);
        Ok(self.open_session(identity))
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let accounts = self.accounts.lock().expect("account mutex poisoned");
        let account = accounts.get(email).ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        let identity = account.identity.clone();
        drop(accounts);
        Ok(self.open_session(identity))
    }

    fn verify(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}
