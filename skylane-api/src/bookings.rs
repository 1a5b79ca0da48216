use crate::state::AppState;
use chrono::Utc;
use skylane_booking::{Booking, BookingError, BookingValidationReport, Passenger, StoreError};
use skylane_catalog::{FareClass, PricingError};
use skylane_shared::{BookingSummary, CreateBookingRequest};
use tracing::info;
use uuid::Uuid;

/// Create a booking: the full validate/price/reserve/pay/confirm sequence.
pub async fn create_booking(
    state: &AppState,
    request: CreateBookingRequest,
) -> Result<BookingSummary, BookingError> {
    info!(
        "create_booking: flight={} passengers={}",
        request.flight_id,
        request.passengers.len()
    );
    let booking = state.orchestrator.create_booking(request).await?;
    Ok(booking.summary())
}

/// Cancel a booking before departure. Idempotent.
pub async fn cancel_booking(state: &AppState, id: Uuid) -> Result<BookingSummary, BookingError> {
    let booking = state.orchestrator.cancel_booking(id).await?;
    Ok(booking.summary())
}

pub async fn get_booking_by_id(
    state: &AppState,
    id: Uuid,
) -> Result<Option<Booking>, StoreError> {
    state.queries.booking_by_id(id).await
}

pub async fn get_booking_by_reference(
    state: &AppState,
    reference: &str,
) -> Result<Option<Booking>, StoreError> {
    state.queries.booking_by_reference(reference).await
}

pub async fn get_user_bookings(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<Booking>, StoreError> {
    state.queries.user_bookings(user_id).await
}

pub async fn get_flight_bookings(
    state: &AppState,
    flight_id: Uuid,
) -> Result<Vec<Booking>, StoreError> {
    state.queries.flight_bookings(flight_id).await
}

/// Guest lookup: booking reference plus passenger last name, both exact.
pub async fn get_guest_booking(
    state: &AppState,
    reference: &str,
    last_name: &str,
) -> Result<Option<Booking>, StoreError> {
    state.queries.guest_booking(reference, last_name).await
}

pub async fn get_passengers(
    state: &AppState,
    booking_id: Uuid,
) -> Result<Vec<Passenger>, StoreError> {
    state.queries.passengers(booking_id).await
}

/// Read-only consistency re-check of a recorded booking.
pub async fn validate_booking(
    state: &AppState,
    id: Uuid,
) -> Result<Option<BookingValidationReport>, BookingError> {
    state.orchestrator.validate_booking(id).await
}

/// Quote the total for a prospective booking without reserving anything.
pub async fn calculate_booking_total(
    state: &AppState,
    flight_id: Uuid,
    fare_class: &str,
    passenger_count: i32,
) -> Result<(i64, String), BookingError> {
    let fare_class: FareClass = fare_class
        .parse()
        .map_err(|e: skylane_catalog::UnknownFareClass| BookingError::Validation(e.to_string()))?;
    state
        .pricing
        .calculate_total(flight_id, fare_class, passenger_count, Utc::now())
        .map_err(|e| match e {
            PricingError::InvalidPassengerCount(_) => BookingError::Validation(e.to_string()),
            PricingError::NoApplicablePrice {
                flight_id,
                fare_class,
            } => BookingError::NoApplicablePrice {
                flight_id,
                fare_class,
            },
        })
}
