pub mod auth;
pub mod error;
pub mod ids;

pub use auth::*;
pub use error::AppError;
pub use ids::{AppointmentId, DoctorId, PatientId};
