use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use clap::{Args, Parser, Subcommand};
use crews::config::AppConfig;
use crews::error::AppError;
use crews::telemetry;
use crews::workflows::applicant::{
    ApplicationService, ApplicationSubmission, InMemoryApplications, InMemoryOutbox,
    LoggingEmailGateway, NotificationDispatcher, Outcome, OutcomeAnnouncer,
};
use crews::workflows::auth::{
    AuthService, InMemoryAdministrators, InMemoryApplicants, Role, TokenClaims, TokenError,
    TokenPair, TokenProvider,
};
use crews::workflows::recruitment::{
    recruitment_router, InMemoryRecruitments, InMemoryTitleStore, NarrativeQuestionDraft,
    RecruitmentDraft, RecruitmentService, SectionDraft, SelectiveQuestionDraft, TitleSearchIndex,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Crews",
    about = "Run the club recruitment service or walk a demo lifecycle from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed sample clubs and walk one recruitment through announcement
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Title prefix to autocomplete at the end of the walkthrough
    #[arg(long, default_value = "Back")]
    prefix: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let recruitments = Arc::new(InMemoryRecruitments::default());
    let applications = Arc::new(InMemoryApplications::default());
    let index = Arc::new(TitleSearchIndex::new(InMemoryTitleStore::default()));
    let outbox = Arc::new(InMemoryOutbox::default());
    let gateway = Arc::new(LoggingEmailGateway);

    let recruitment_service = Arc::new(RecruitmentService::new(recruitments.clone(), index));
    let application_service = Arc::new(ApplicationService::new(
        applications.clone(),
        recruitments.clone(),
    ));
    let announcer = Arc::new(OutcomeAnnouncer::new(
        recruitments,
        applications,
        outbox.clone(),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(gateway, outbox));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(recruitment_router(
            recruitment_service,
            config.search.default_limit,
        ))
        .merge(crews::workflows::applicant::application_router(
            application_service,
            announcer,
            dispatcher,
        ))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "club recruitment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Token provider for the CLI walkthrough only; real deployments plug an
/// external signer into [`TokenProvider`].
struct DemoTokens;

impl TokenProvider for DemoTokens {
    fn issue(&self, role: Role, subject: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: format!("demo-access-{role}-{subject}"),
            refresh_token: format!("demo-refresh-{role}-{subject}"),
        })
    }

    fn verify(&self, access_token: &str) -> Result<TokenClaims, TokenError> {
        let rest = access_token
            .strip_prefix("demo-access-")
            .ok_or(TokenError::InvalidAccessToken)?;
        let (role, subject) = rest.split_once('-').ok_or(TokenError::InvalidAccessToken)?;
        let role = match role {
            "admin" => Role::Admin,
            "applicant" => Role::Applicant,
            _ => return Err(TokenError::InvalidAccessToken),
        };
        Ok(TokenClaims {
            subject: subject.to_string(),
            role,
        })
    }

    fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let rest = refresh_token
            .strip_prefix("demo-refresh-")
            .ok_or(TokenError::InvalidRefreshToken)?;
        Ok(format!("demo-access-{rest}"))
    }
}

fn upcoming_deadline(now: NaiveDateTime) -> NaiveDateTime {
    let top_of_hour = now
        .date()
        .and_hms_opt(now.hour(), 0, 0)
        .expect("valid hour");
    top_of_hour + Duration::hours(48)
}

fn demo_sections() -> Vec<SectionDraft> {
    vec![SectionDraft {
        name: "Common".to_string(),
        narrative_questions: vec![NarrativeQuestionDraft {
            content: "Why do you want to join?".to_string(),
            required: true,
            word_limit: Some(300),
        }],
        selective_questions: vec![SelectiveQuestionDraft {
            content: "Which days can you attend?".to_string(),
            required: true,
            minimum_selection: 1,
            maximum_selection: 3,
            choices: vec![
                "Monday".to_string(),
                "Wednesday".to_string(),
                "Friday".to_string(),
            ],
        }],
    }]
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let recruitments = Arc::new(InMemoryRecruitments::default());
    let applications = Arc::new(InMemoryApplications::default());
    let index = Arc::new(TitleSearchIndex::new(InMemoryTitleStore::default()));
    let outbox = Arc::new(InMemoryOutbox::default());

    let recruitment_service = Arc::new(RecruitmentService::new(recruitments.clone(), index));
    let application_service =
        ApplicationService::new(applications.clone(), recruitments.clone());
    let announcer = OutcomeAnnouncer::new(recruitments.clone(), applications.clone(), outbox.clone());
    let dispatcher = NotificationDispatcher::new(Arc::new(LoggingEmailGateway), outbox);

    let auth = AuthService::new(
        Arc::new(InMemoryAdministrators::default()),
        Arc::new(InMemoryApplicants::default()),
        recruitments,
        applications,
        Arc::new(DemoTokens),
    );

    let now = Utc::now().naive_utc();
    let deadline = upcoming_deadline(now);

    println!("Club recruitment demo");

    let mut featured = None;
    for title in ["Backend Club", "Back Office", "Design Club"] {
        let session = auth
            .login_admin(title, "demo-password")
            .map_err(demo_failure)?;
        let recruitment = recruitment_service
            .create(
                session.administrator_id,
                RecruitmentDraft {
                    title: title.to_string(),
                    description: format!("{title} autumn recruitment"),
                    deadline,
                    sections: demo_sections(),
                },
            )
            .map_err(demo_failure)?;
        println!(
            "- published '{}' (code {}, deadline {})",
            recruitment.title, recruitment.code, recruitment.deadline
        );
        if featured.is_none() {
            featured = Some((session.administrator_id, recruitment));
        }
    }

    let (publisher, recruitment) = featured.expect("at least one club seeded");
    let recruitment = recruitment_service
        .start(publisher, recruitment.id)
        .map_err(demo_failure)?;
    println!(
        "\n'{}' is now {}; collecting applications",
        recruitment.title, recruitment.progress
    );

    let mut decided = Vec::new();
    for (email, outcome) in [
        ("jongmee@example.com", Outcome::Pass),
        ("kyungho@example.com", Outcome::Fail),
    ] {
        let session = auth
            .login_applicant(email, "demo-password", &recruitment.code)
            .map_err(demo_failure)?;
        let application = application_service
            .submit(
                session.applicant_id,
                ApplicationSubmission {
                    recruitment_id: recruitment.id,
                    applicant_email: email.to_string(),
                    answers: Vec::new(),
                },
                now,
            )
            .map_err(demo_failure)?;
        let application = application_service
            .decide(publisher, application.id, outcome)
            .map_err(demo_failure)?;
        decided.push(application);
    }
    for application in &decided {
        println!("- {}: {}", application.applicant_email, application.outcome);
    }

    // The demo jumps past the deadline; in production the check runs
    // against the wall clock on demand.
    let after_deadline = deadline + Duration::hours(1);
    let summary = announcer
        .announce(publisher, after_deadline)
        .map_err(demo_failure)?;
    let report = dispatcher.dispatch_pending();
    println!(
        "\nAnnounced recruitment {}: {} applications notified ({} delivered, {} failed)",
        summary.recruitment_id, summary.notified_applications, report.delivered, report.failed
    );

    let titles = recruitment_service
        .search_titles(&args.prefix, 10)
        .map_err(demo_failure)?;
    println!("\nTitles starting with '{}':", args.prefix);
    for title in titles {
        println!("- {title}");
    }

    Ok(())
}

fn demo_failure(err: impl std::error::Error) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        err.to_string(),
    ))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
