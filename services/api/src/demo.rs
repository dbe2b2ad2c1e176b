use crate::infra::{
    InMemoryApplicationRepository, InMemoryIdentityProvider, InMemoryJobRepository,
    InMemoryUserRepository,
};
use careerbridge::auth::{Caller, IdentityProvider};
use careerbridge::directory::{DirectoryService, NewUserProfile, Role};
use careerbridge::error::AppError;
use careerbridge::ledger::{ApplicationDecision, ApplicationForm, ApplicationLedgerService};
use careerbridge::registry::{JobDecision, JobRegistryService, JobSubmission};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop after the student applies, leaving the application undecided.
    #[arg(long)]
    pub(crate) skip_decision: bool,
}

/// Walk one posting through the whole lifecycle against in-process stores,
/// printing each step.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let users = Arc::new(InMemoryUserRepository::default());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let provider = InMemoryIdentityProvider::default();

    let directory = DirectoryService::new(users);
    let registry = JobRegistryService::new(jobs.clone());
    let ledger = ApplicationLedgerService::new(applications, jobs);

    println!("CareerBridge demo");

    let employer = signup(
        &provider,
        &directory,
        "owner@cafex.example",
        "Casey Owner",
        Role::Employer,
        Some("Cafe X"),
    )?;
    let student = signup(
        &provider,
        &directory,
        "sam@example.edu",
        "Sam Lee",
        Role::Student,
        None,
    )?;
    let admin = signup(
        &provider,
        &directory,
        "admin@careerbridge.example",
        "Administrator",
        Role::Admin,
        None,
    )?;
    println!("- registered an employer, a student, and an administrator");

    let posting = registry
        .submit_job(
            &employer,
            JobSubmission {
                title: "Barista".to_string(),
                company: "Cafe X".to_string(),
                location: "Des Moines, IA".to_string(),
                description: "Morning shifts at the espresso bar.".to_string(),
                requirements: "Food handler card\nWeekend availability".to_string(),
                salary: "$16/hr".to_string(),
                employment_type: "part-time".to_string(),
            },
        )
        .map_err(workflow)?;
    println!(
        "- employer submitted \"{}\" ({}), awaiting review",
        posting.title,
        posting.status.label()
    );
    println!(
        "  public board currently lists {} posting(s)",
        registry.list_approved().map_err(workflow)?.len()
    );

    registry
        .set_status(&admin, &posting.id, JobDecision::Approved)
        .map_err(workflow)?;
    let board = registry.list_approved().map_err(workflow)?;
    println!("- admin approved it; the board now lists {} posting(s)", board.len());

    let application = ledger
        .submit_application(
            &student,
            &posting.id,
            ApplicationForm {
                resume: "https://files.example.com/resumes/sam.pdf".to_string(),
                cover_letter: Some("I open at 5am without complaint.".to_string()),
            },
        )
        .map_err(workflow)?;
    println!(
        "- student applied ({}), employer now holds {} application(s)",
        application.status.label(),
        ledger
            .list_received_applications(&employer)
            .map_err(workflow)?
            .len()
    );

    if args.skip_decision {
        println!("- stopping before the employer decision (--skip-decision)");
        return Ok(());
    }

    let decided = ledger
        .decide_application(&employer, &application.id, ApplicationDecision::Accepted)
        .map_err(workflow)?;
    println!("- employer accepted the application ({})", decided.status.label());

    let mine = ledger.list_own_applications(&student).map_err(workflow)?;
    println!(
        "- student sees {} application(s), first marked {}",
        mine.len(),
        mine.first().map(|record| record.status.label()).unwrap_or("none")
    );

    Ok(())
}

fn signup(
    provider: &InMemoryIdentityProvider,
    directory: &DirectoryService<InMemoryUserRepository>,
    email: &str,
    name: &str,
    role: Role,
    company: Option<&str>,
) -> Result<Caller, AppError> {
    let session = provider
        .register(email, "demo-password", name)
        .map_err(workflow)?;
    let record = directory
        .create_user(
            &session.identity.user_id,
            NewUserProfile {
                email: email.to_string(),
                name: name.to_string(),
                phone: "555-0100".to_string(),
                role,
                company: company.map(str::to_string),
            },
        )
        .map_err(workflow)?;
    Ok(Caller {
        user_id: record.uid,
        role: record.role,
    })
}

fn workflow(err: impl std::fmt::Display) -> AppError {
    AppError::Workflow(err.to_string())
}
