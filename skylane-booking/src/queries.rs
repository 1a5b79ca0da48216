use crate::models::{Booking, Passenger};
use crate::repository::{BookingRepository, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Read-side booking lookups. Never mutates; a miss is `None`, not an error.
#[derive(Clone)]
pub struct BookingQueryService {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingQueryService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        self.bookings.get_booking(id).await
    }

    pub async fn booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, StoreError> {
        self.bookings.get_by_reference(reference).await
    }

    pub async fn user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        self.bookings.list_by_user(user_id).await
    }

    pub async fn flight_bookings(&self, flight_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        self.bookings.list_by_flight(flight_id).await
    }

    pub async fn passengers(&self, booking_id: Uuid) -> Result<Vec<Passenger>, StoreError> {
        self.bookings.passengers_for(booking_id).await
    }

    /// Guest lookup: reference plus last name, both exact (last name
    /// case-insensitive). A correct reference with a mismatched last name is
    /// absence, never the booking.
    pub async fn guest_booking(
        &self,
        reference: &str,
        last_name: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let booking = match self.bookings.get_by_reference(reference).await? {
            Some(b) => b,
            None => return Ok(None),
        };

        let passengers = self.bookings.passengers_for(booking.id).await?;
        let matched = passengers
            .iter()
            .any(|p| p.last_name.eq_ignore_ascii_case(last_name));

        Ok(matched.then_some(booking))
    }
}
