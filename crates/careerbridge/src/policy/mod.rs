//! Pure access policy: a fixed role-to-action table and the decision
//! function applied at every gated route. Ownership checks on individual
//! records stay with the owning service; this module only answers whether
//! a role may attempt the action at all.

use crate::auth::Caller;
use crate::directory::Role;

/// Every operation a route can perform, grouped by audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Public.
    BrowseApprovedJobs,
    ViewHelp,
    Authenticate,
    // Students.
    ApplyToJob,
    ViewOwnApplications,
    // Employers.
    SubmitJob,
    ManageOwnPostings,
    ReviewApplications,
    // Owning employer or admin; ownership is checked by the registry.
    DeleteJob,
    // Admins.
    ListUsers,
    ReviewJobs,
    CreateEmployerAccount,
}

/// Outcome of the route-level gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// Not signed in; callers are redirected to authentication.
    RequiresAuth,
    /// Signed in with a role outside the table; soft-denied to the
    /// landing page, never a hard failure.
    WrongRole,
}

/// Roles permitted to perform an action; `None` marks a public action.
pub fn allowed_roles(action: Action) -> Option<&'static [Role]> {
    match action {
        Action::BrowseApprovedJobs | Action::ViewHelp | Action::Authenticate => None,
        Action::ApplyToJob | Action::ViewOwnApplications => Some(&[Role::Student]),
        Action::SubmitJob | Action::ManageOwnPostings | Action::ReviewApplications => {
            Some(&[Role::Employer])
        }
        Action::DeleteJob => Some(&[Role::Employer, Role::Admin]),
        Action::ListUsers | Action::ReviewJobs | Action::CreateEmployerAccount => {
            Some(&[Role::Admin])
        }
    }
}

pub fn check(caller: Option<&Caller>, action: Action) -> AccessDecision {
    let Some(required) = allowed_roles(action) else {
        return AccessDecision::Granted;
    };
    match caller {
        None => AccessDecision::RequiresAuth,
        Some(caller) if required.contains(&caller.role) => AccessDecision::Granted,
        Some(_) => AccessDecision::WrongRole,
    }
}
