pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::*;
pub use services::PatientService;

use shared_config::AppConfig;
use std::sync::Arc;

/// Handles for the patient cell, built once by the composition root.
#[derive(Clone)]
pub struct PatientState {
    pub config: Arc<AppConfig>,
    pub patients: Arc<PatientService>,
}
