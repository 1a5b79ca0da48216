pub mod models;
pub mod pii;

pub use models::contracts::{BookingSummary, CreateBookingRequest, PassengerDetails, SeatAdjustment};
pub use pii::Masked;
