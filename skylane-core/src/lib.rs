pub mod payment;
pub mod repository;
pub mod search_index;

pub use payment::{IntentRequest, PaymentGateway, PaymentIntent, PaymentStatus};
pub use repository::FlightRepository;
pub use search_index::{
    FlightDocument, NoopSearchIndex, RecordingSearchIndex, SearchIndexAdapter, SearchNotifier,
};
