use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, InMemoryIdentityProvider, InMemoryJobRepository,
    InMemoryUserRepository,
};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use careerbridge::auth::{AuthGateway, IdentityProvider};
use careerbridge::config::{AdminSeed, AppConfig};
use careerbridge::directory::{DirectoryService, NewUserProfile, Role, UserRepository};
use careerbridge::error::AppError;
use careerbridge::ledger::ApplicationLedgerService;
use careerbridge::registry::JobRegistryService;
use careerbridge::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let users = Arc::new(InMemoryUserRepository::default());
    let jobs = Arc::new(InMemoryJobRepository::default());
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let provider = Arc::new(InMemoryIdentityProvider::default());

    let directory = Arc::new(DirectoryService::new(users.clone()));
    let gate = Arc::new(AuthGateway::new(provider.clone(), directory.clone()));
    let registry = Arc::new(JobRegistryService::new(jobs.clone()));
    let ledger = Arc::new(ApplicationLedgerService::new(applications, jobs));

    if let Some(seed) = &config.admin_seed {
        seed_admin(provider.as_ref(), directory.as_ref(), seed)?;
    }

    let app = app_router(gate, registry, ledger)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "careerbridge api ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the bootstrap administrator account. The in-process store starts
/// empty on every boot, so this runs unconditionally when configured.
fn seed_admin<P, U>(
    provider: &P,
    directory: &DirectoryService<U>,
    seed: &AdminSeed,
) -> Result<(), AppError>
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let session = provider
        .register(&seed.email, &seed.password, "Administrator")
        .map_err(|err| AppError::Bootstrap(err.to_string()))?;
    directory
        .create_user(
            &session.identity.user_id,
            NewUserProfile {
                email: seed.email.clone(),
                name: "Administrator".to_string(),
                phone: "unlisted".to_string(),
                role: Role::Admin,
                company: None,
            },
        )
        .map_err(|err| AppError::Bootstrap(err.to_string()))?;
    info!(email = %seed.email, "administrator account seeded");
    Ok(())
}
