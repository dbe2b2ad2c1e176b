use std::sync::Arc;

use chrono::Utc;

use crate::auth::Caller;
use crate::store::StoreError;

use super::domain::{NewUserProfile, Role, UserRecord};
use super::repository::{UserRepository, UserRepositoryError};

/// Maps identities to roles and profile data.
pub struct DirectoryService<U> {
    users: Arc<U>,
}

impl<U> DirectoryService<U>
where
    U: UserRepository + 'static,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Create the directory record for a fresh signup. The uid comes from
    /// the identity provider; the role is whatever the signup form chose.
    pub fn create_user(
        &self,
        uid: &str,
        profile: NewUserProfile,
    ) -> Result<UserRecord, DirectoryError> {
        let record = build_record(uid, profile)?;
        Ok(self.users.insert(record)?)
    }

    /// Admin-only path creating an employer account directly, bypassing
    /// self-signup.
    pub fn create_employer(
        &self,
        caller: &Caller,
        uid: &str,
        profile: NewUserProfile,
    ) -> Result<UserRecord, DirectoryError> {
        if caller.role != Role::Admin {
            return Err(DirectoryError::Forbidden);
        }
        let profile = NewUserProfile {
            role: Role::Employer,
            ..profile
        };
        self.create_user(uid, profile)
    }

    /// Look up a record without a not-found error, for role resolution.
    pub fn find(&self, uid: &str) -> Result<Option<UserRecord>, StoreError> {
        self.users.fetch(uid)
    }

    pub fn get(&self, uid: &str) -> Result<UserRecord, DirectoryError> {
        self.users.fetch(uid)?.ok_or(DirectoryError::NotFound)
    }

    /// Admin-only listing of every account.
    pub fn list_users(&self, caller: &Caller) -> Result<Vec<UserRecord>, DirectoryError> {
        if caller.role != Role::Admin {
            return Err(DirectoryError::Forbidden);
        }
        Ok(self.users.list()?)
    }
}

fn build_record(uid: &str, profile: NewUserProfile) -> Result<UserRecord, DirectoryError> {
    let uid = required(uid, "uid")?;
    let email = required(&profile.email, "email")?;
    let name = required(&profile.name, "name")?;
    let phone = required(&profile.phone, "phone")?;

    // Company travels with employer accounts only.
    let company = match profile.role {
        Role::Employer => Some(required(
            profile.company.as_deref().unwrap_or_default(),
            "company",
        )?),
        Role::Student | Role::Admin => None,
    };

    Ok(UserRecord {
        uid,
        email,
        name,
        phone,
        role: profile.role,
        company,
        created_at: Utc::now(),
    })
}

fn required(value: &str, field: &'static str) -> Result<String, DirectoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DirectoryError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Error raised by directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("caller is not permitted to perform this operation")]
    Forbidden,
    #[error("user not found")]
    NotFound,
    #[error("user already exists")]
    Conflict,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UserRepositoryError> for DirectoryError {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::Conflict => DirectoryError::Conflict,
            UserRepositoryError::Store(err) => DirectoryError::Store(err),
        }
    }
}
