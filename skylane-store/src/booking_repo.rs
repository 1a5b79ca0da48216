use async_trait::async_trait;
use parking_lot::Mutex;
use skylane_booking::{Booking, BookingRepository, BookingStatus, Passenger, StoreError};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct BookingTables {
    bookings: HashMap<Uuid, Booking>,
    passengers: HashMap<Uuid, Vec<Passenger>>,
    by_reference: HashMap<String, Uuid>,
}

/// In-memory booking store. A single lock over the tables keeps the
/// booking + passengers insert and the status CAS atomic, matching what a
/// database transaction provides behind the same seam.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    tables: Mutex<BookingTables>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert_booking(
        &self,
        booking: &Booking,
        passengers: &[Passenger],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if tables.by_reference.contains_key(&booking.reference) {
            return Err(StoreError::DuplicateReference(booking.reference.clone()));
        }
        tables
            .by_reference
            .insert(booking.reference.clone(), booking.id);
        tables.bookings.insert(booking.id, booking.clone());
        tables.passengers.insert(booking.id, passengers.to_vec());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.tables.lock().bookings.get(&id).cloned())
    }

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Booking>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .by_reference
            .get(reference)
            .and_then(|id| tables.bookings.get(id))
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .tables
            .lock()
            .bookings
            .values()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_by_flight(&self, flight_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .tables
            .lock()
            .bookings
            .values()
            .filter(|b| b.flight_id == flight_id)
            .cloned()
            .collect())
    }

    async fn passengers_for(&self, booking_id: Uuid) -> Result<Vec<Passenger>, StoreError> {
        Ok(self
            .tables
            .lock()
            .passengers
            .get(&booking_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<Booking, StoreError> {
        let mut tables = self.tables.lock();
        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        if booking.status != expected {
            return Err(StoreError::Conflict {
                expected,
                actual: booking.status,
            });
        }
        booking.update_status(new_status);
        Ok(booking.clone())
    }
}
