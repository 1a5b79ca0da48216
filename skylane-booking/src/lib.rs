pub mod machine;
pub mod models;
pub mod orchestrator;
pub mod queries;
pub mod reference;
pub mod repository;
pub mod validation;

pub use machine::{BookingState, TransitionError};
pub use models::{Booking, BookingStatus, BookingValidationReport, Passenger};
pub use orchestrator::{BookingError, BookingOrchestrator, MockBehavior, MockPaymentGateway, OrchestratorConfig};
pub use queries::BookingQueryService;
pub use repository::{BookingRepository, StoreError};
