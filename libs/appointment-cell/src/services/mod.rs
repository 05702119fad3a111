// libs/appointment-cell/src/services/mod.rs
pub mod booking;

pub use booking::BookingService;
