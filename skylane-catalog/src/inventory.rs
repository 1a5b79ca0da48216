use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Per-flight seat counters. The single source of truth for seat math.
///
/// Every counter upholds `0 <= reserved <= capacity` after every operation.
/// Updates for one flight serialize on that flight's own lock; flights never
/// contend with each other.
pub struct SeatLedger {
    flights: RwLock<HashMap<Uuid, Arc<Mutex<SeatRecord>>>>,
}

#[derive(Debug, Clone, Copy)]
struct SeatRecord {
    capacity: i32,
    reserved: i32,
}

impl SeatLedger {
    pub fn new() -> Self {
        Self {
            flights: RwLock::new(HashMap::new()),
        }
    }

    /// Start tracking a flight. Capacity is fixed from this point on.
    pub fn register(&self, flight_id: Uuid, capacity: i32) {
        self.flights.write().insert(
            flight_id,
            Arc::new(Mutex::new(SeatRecord {
                capacity,
                reserved: 0,
            })),
        );
    }

    fn record(&self, flight_id: Uuid) -> Result<Arc<Mutex<SeatRecord>>, InventoryError> {
        self.flights
            .read()
            .get(&flight_id)
            .cloned()
            .ok_or(InventoryError::FlightNotFound(flight_id))
    }

    /// True iff `capacity - reserved >= required`. Pure read, reserves nothing.
    pub fn check_available(&self, flight_id: Uuid, required: i32) -> Result<bool, InventoryError> {
        let record = self.record(flight_id)?;
        let record = record.lock();
        Ok(record.capacity - record.reserved >= required)
    }

    /// Atomically apply `reserved += delta` (positive to reserve, negative to
    /// release), but only if the result stays within `0..=capacity`; otherwise
    /// the counter is untouched. Returns the new reserved count.
    pub fn try_reserve(&self, flight_id: Uuid, delta: i32) -> Result<i32, InventoryError> {
        let record = self.record(flight_id)?;
        let mut record = record.lock();

        let updated = record.reserved + delta;
        if updated > record.capacity {
            return Err(InventoryError::InsufficientSeats {
                requested: delta,
                available: record.capacity - record.reserved,
            });
        }
        if updated < 0 {
            // Releasing more than was reserved is a caller bug, never a
            // user-facing condition.
            error!(
                "seat release would underflow: flight={} reserved={} delta={}",
                flight_id, record.reserved, delta
            );
            return Err(InventoryError::InvariantViolation {
                flight_id,
                reserved: record.reserved,
                delta,
            });
        }

        record.reserved = updated;
        Ok(record.reserved)
    }

    /// Release previously reserved seats. Wrapper around `try_reserve` with a
    /// negative delta.
    pub fn release(&self, flight_id: Uuid, seats: i32) -> Result<i32, InventoryError> {
        self.try_reserve(flight_id, -seats)
    }

    /// Seats still open for sale.
    pub fn available(&self, flight_id: Uuid) -> Result<i32, InventoryError> {
        let record = self.record(flight_id)?;
        let record = record.lock();
        Ok(record.capacity - record.reserved)
    }

    /// Total capacity, as fixed at registration.
    pub fn total(&self, flight_id: Uuid) -> Result<i32, InventoryError> {
        let record = self.record(flight_id)?;
        let record = record.lock();
        Ok(record.capacity)
    }
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Flight not tracked by seat ledger: {0}")]
    FlightNotFound(Uuid),

    #[error("Insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("Seat counter invariant violated for flight {flight_id}: reserved {reserved}, delta {delta}")]
    InvariantViolation {
        flight_id: Uuid,
        reserved: i32,
        delta: i32,
    },
}
