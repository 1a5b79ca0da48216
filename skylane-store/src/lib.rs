pub mod app_config;
pub mod booking_repo;
pub mod flight_repo;

pub use app_config::{BusinessRules, Config};
pub use booking_repo::InMemoryBookingRepository;
pub use flight_repo::InMemoryFlightRepository;
