pub mod bookings;
pub mod seats;
pub mod state;

pub use state::AppState;
