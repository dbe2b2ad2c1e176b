//! User Directory: maps provider identities to roles and profile data.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{NewUserProfile, Role, UserRecord};
pub use repository::{UserRepository, UserRepositoryError};
pub use router::{directory_router, DirectoryRouterState};
pub use service::{DirectoryError, DirectoryService};
