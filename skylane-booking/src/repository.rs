use crate::models::{Booking, BookingStatus, Passenger};
use async_trait::async_trait;
use uuid::Uuid;

/// Errors surfaced by booking persistence.
///
/// `Conflict` and `DuplicateReference` are the retryable shapes the
/// orchestrator reacts to; anything backend-specific is flattened into
/// `Backend`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Booking reference already in use: {0}")]
    DuplicateReference(String),

    #[error("Concurrent status update lost: expected {expected}, found {actual}")]
    Conflict {
        expected: BookingStatus,
        actual: BookingStatus,
    },

    #[error("Store backend failure: {0}")]
    Backend(String),
}

/// Repository trait for booking data access.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a booking together with its passenger records. Rejects a
    /// reference code that is already taken.
    async fn insert_booking(
        &self,
        booking: &Booking,
        passengers: &[Passenger],
    ) -> Result<(), StoreError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Booking>, StoreError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    async fn list_by_flight(&self, flight_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    async fn passengers_for(&self, booking_id: Uuid) -> Result<Vec<Passenger>, StoreError>;

    /// Compare-and-set status update: applies `expected -> new_status` or
    /// fails with `Conflict` carrying what was actually found.
    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<Booking, StoreError>;
}
