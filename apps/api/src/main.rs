use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appointment_cell::{AppointmentState, BookingService};
use auth_cell::{AccountService, AuthState};
use careloop_clinic_api::router;
use doctor_cell::{AvailabilityCache, AvailabilityService, DoctorService, DoctorState};
use notification_cell::MailNotifier;
use patient_cell::{PatientService, PatientState};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareLoop Clinic API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Shared clients, built once and handed to every cell
    let supabase = Arc::new(SupabaseClient::new(&config));
    let notifier = Arc::new(MailNotifier::new(&config));
    let cache = AvailabilityCache::connect(config.redis_url.as_deref()).await;

    let auth_state = AuthState {
        accounts: Arc::new(AccountService::new(
            supabase.clone(),
            config.supabase_jwt_secret.clone(),
        )),
    };
    let appointment_state = AppointmentState {
        config: config.clone(),
        booking: Arc::new(BookingService::new(supabase.clone(), notifier)),
    };
    let doctor_state = DoctorState {
        config: config.clone(),
        doctors: Arc::new(DoctorService::new(supabase.clone(), cache.clone())),
        availability: Arc::new(AvailabilityService::new(supabase.clone(), cache)),
    };
    let patient_state = PatientState {
        config: config.clone(),
        patients: Arc::new(PatientService::new(supabase)),
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(auth_state, appointment_state, doctor_state, patient_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .await
        .unwrap();
}
