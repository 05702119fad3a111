pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export all models and services for external use
pub use models::*;
pub use router::doctor_routes;
pub use services::*;

use shared_config::AppConfig;
use std::sync::Arc;

/// Handles for the doctor cell, built once by the composition root and
/// cloned into each request.
#[derive(Clone)]
pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<DoctorService>,
    pub availability: Arc<AvailabilityService>,
}
