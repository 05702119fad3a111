pub mod availability;
pub mod cache;
pub mod doctor;

pub use availability::AvailabilityService;
pub use cache::{AvailabilityCache, CacheError};
pub use doctor::DoctorService;
