use crate::state::AppState;
use skylane_catalog::InventoryError;
use skylane_shared::SeatAdjustment;
use tracing::info;
use uuid::Uuid;

/// Apply a signed delta to a flight's reserved-seat counter. Returns the new
/// reserved count.
pub fn update_flight_seats(
    state: &AppState,
    adjustment: SeatAdjustment,
) -> Result<i32, InventoryError> {
    let reserved = state
        .ledger
        .try_reserve(adjustment.flight_id, adjustment.seat_change)?;
    info!(
        "seat adjustment applied: flight={} delta={} reserved={}",
        adjustment.flight_id, adjustment.seat_change, reserved
    );
    Ok(reserved)
}

pub fn check_available_seats(
    state: &AppState,
    flight_id: Uuid,
    required_seats: i32,
) -> Result<bool, InventoryError> {
    state.ledger.check_available(flight_id, required_seats)
}

pub fn get_available_seats(state: &AppState, flight_id: Uuid) -> Result<i32, InventoryError> {
    state.ledger.available(flight_id)
}

pub fn get_total_seats(state: &AppState, flight_id: Uuid) -> Result<i32, InventoryError> {
    state.ledger.total(flight_id)
}
