use crate::machine::{BookingState, TransitionError};
use crate::models::{Booking, BookingStatus, BookingValidationReport, Passenger};
use crate::reference;
use crate::repository::{BookingRepository, StoreError};
use crate::validation;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use skylane_catalog::{
    FareClass, Flight, FlightStatus, InventoryError, PricingError, PricingResolver, SeatLedger,
};
use skylane_core::{
    FlightDocument, FlightRepository, IntentRequest, PaymentGateway, PaymentIntent, PaymentStatus,
    SearchNotifier,
};
use skylane_shared::CreateBookingRequest;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Tunables for the booking engine, normally sourced from application config.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Deadline for each payment gateway call; elapsed means failure.
    pub payment_timeout: Duration,
    /// Attempts at persisting a paid booking before parking it for
    /// reconciliation.
    pub persistence_retry_attempts: u32,
    /// Attempts at a contended status update before surfacing the conflict.
    pub conflict_retry_attempts: u32,
    /// Base backoff between retries; scales linearly with the attempt number.
    pub retry_backoff: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::from_secs(5),
            persistence_retry_attempts: 3,
            conflict_retry_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Flight not found: {0}")]
    FlightNotFound(Uuid),

    #[error("Flight is not open for booking: {0}")]
    NotBookable(Uuid),

    #[error("No applicable price for flight {flight_id}, fare class {fare_class}")]
    NoApplicablePrice {
        flight_id: Uuid,
        fare_class: FareClass,
    },

    #[error("Insufficient seats: requested {requested}, available {available}")]
    SeatsUnavailable { requested: i32, available: i32 },

    #[error("Payment was declined: {0}")]
    PaymentDeclined(String),

    #[error("Payment gateway timed out")]
    PaymentTimeout,

    #[error("Payment {payment_intent_id} captured but booking {booking_id} needs manual reconciliation")]
    ReconciliationRequired {
        booking_id: Uuid,
        payment_intent_id: String,
    },

    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Holds a seat reservation until it is either committed into a confirmed
/// booking or released.
///
/// Dropping the guard releases the seats, so a booking request future that is
/// cancelled mid-flight still compensates the ledger.
struct SeatReservation {
    ledger: Arc<SeatLedger>,
    flight_id: Uuid,
    seats: i32,
    armed: bool,
}

impl SeatReservation {
    fn acquire(ledger: Arc<SeatLedger>, flight_id: Uuid, seats: i32) -> Result<Self, InventoryError> {
        ledger.try_reserve(flight_id, seats)?;
        Ok(Self {
            ledger,
            flight_id,
            seats,
            armed: true,
        })
    }

    /// Release immediately as part of an orderly compensation path.
    fn release_now(mut self) {
        self.armed = false;
        if let Err(e) = self.ledger.release(self.flight_id, self.seats) {
            error!("seat release during compensation failed: {}", e);
        }
    }

    /// The reservation is now backed by a confirmed (or captured-payment)
    /// booking; keep the seats.
    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for SeatReservation {
    fn drop(&mut self) {
        if self.armed {
            warn!(
                "booking request dropped before completion; releasing {} seat(s) on flight {}",
                self.seats, self.flight_id
            );
            if let Err(e) = self.ledger.release(self.flight_id, self.seats) {
                error!("seat release on drop failed: {}", e);
            }
        }
    }
}

/// Drives one booking through validate -> price -> reserve -> pay ->
/// persist -> confirm, compensating the seat ledger on any failure after
/// reservation.
pub struct BookingOrchestrator {
    flights: Arc<dyn FlightRepository>,
    bookings: Arc<dyn BookingRepository>,
    ledger: Arc<SeatLedger>,
    pricing: Arc<PricingResolver>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: SearchNotifier,
    config: OrchestratorConfig,
}

impl BookingOrchestrator {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        bookings: Arc<dyn BookingRepository>,
        ledger: Arc<SeatLedger>,
        pricing: Arc<PricingResolver>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: SearchNotifier,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            flights,
            bookings,
            ledger,
            pricing,
            gateway,
            notifier,
            config,
        }
    }

    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        let mut state = BookingState::Initiated;
        let now = Utc::now();

        // 1. Validate payload: fare class, passenger set, per-passenger fields
        let fare_class = validation::validate_request(&request, now)
            .map_err(|issues| BookingError::Validation(issues.join("; ")))?;

        // 2. Validate flight: must exist and still accept bookings
        let flight = self.load_flight(request.flight_id).await?;
        if !flight.is_bookable(now) {
            return Err(BookingError::NotBookable(flight.id));
        }
        let passenger_count = request.passengers.len() as i32;

        // 3. Compute the binding total
        let (total_amount, currency) = self
            .pricing
            .calculate_total(flight.id, fare_class, passenger_count, now)
            .map_err(|e| match e {
                PricingError::InvalidPassengerCount(_) => BookingError::Validation(e.to_string()),
                PricingError::NoApplicablePrice {
                    flight_id,
                    fare_class,
                } => BookingError::NoApplicablePrice {
                    flight_id,
                    fare_class,
                },
            })?;

        // 4. Reserve seats against the ledger
        let reservation =
            match SeatReservation::acquire(Arc::clone(&self.ledger), flight.id, passenger_count) {
                Ok(reservation) => reservation,
                Err(InventoryError::InsufficientSeats {
                    requested,
                    available,
                }) => {
                    state.transition_to(BookingState::SeatsUnavailable)?;
                    return Err(BookingError::SeatsUnavailable {
                        requested,
                        available,
                    });
                }
                Err(e) => return Err(BookingError::Inventory(e)),
            };
        state.transition_to(BookingState::SeatsReserved)?;

        // 5. Authorize payment under a deadline. The idempotency key lets the
        // gateway resolve a retried call after a false timeout to the original
        // intent instead of a second charge.
        let booking_id = Uuid::new_v4();
        let intent_request = IntentRequest {
            booking_id,
            amount: total_amount,
            currency: currency.clone(),
            idempotency_key: format!("booking-{}", booking_id),
            customer_email: request.contact_email.clone(),
            description: Some(format!(
                "{} passenger(s) on {} {}-{}",
                passenger_count, flight.flight_number, flight.origin, flight.destination
            )),
        };

        let intent = match timeout(
            self.config.payment_timeout,
            self.gateway.create_intent(intent_request),
        )
        .await
        {
            Err(_) => {
                self.payment_failure_cleanup(&mut state, reservation, &flight, None)?;
                return Err(BookingError::PaymentTimeout);
            }
            Ok(Err(e)) => {
                self.payment_failure_cleanup(&mut state, reservation, &flight, None)?;
                return Err(BookingError::PaymentDeclined(e.to_string()));
            }
            Ok(Ok(intent)) => {
                if intent.status != PaymentStatus::Succeeded {
                    let reason = format!(
                        "payment intent {} ended in status {:?}",
                        intent.id, intent.status
                    );
                    self.payment_failure_cleanup(&mut state, reservation, &flight, Some(intent.id))?;
                    return Err(BookingError::PaymentDeclined(reason));
                }
                intent
            }
        };
        state.transition_to(BookingState::PaymentAuthorized)?;

        // 6. Persist booking and passengers. Payment is already captured, so
        // exhaustion parks the booking for reconciliation instead of failing.
        let passengers: Vec<Passenger> = request
            .passengers
            .iter()
            .map(|details| Passenger::from_details(booking_id, details))
            .collect();

        let mut persisted: Option<Booking> = None;
        for attempt in 1..=self.config.persistence_retry_attempts {
            let booking = Booking::new(
                booking_id,
                reference::generate(),
                request.user_id,
                flight.id,
                fare_class,
                passenger_count,
                total_amount,
                currency.clone(),
                Some(intent.id.clone()),
                BookingStatus::Confirmed,
            );
            match self.bookings.insert_booking(&booking, &passengers).await {
                Ok(()) => {
                    persisted = Some(booking);
                    break;
                }
                Err(StoreError::DuplicateReference(taken)) => {
                    // Collision on the human-readable code; redraw and retry
                    warn!("booking reference {} already taken, regenerating", taken);
                }
                Err(e) => {
                    warn!(
                        "booking persistence attempt {}/{} failed: {}",
                        attempt, self.config.persistence_retry_attempts, e
                    );
                    sleep(self.config.retry_backoff * attempt).await;
                }
            }
        }

        let booking = match persisted {
            Some(booking) => booking,
            None => {
                error!(
                    "payment {} captured but booking {} could not be persisted; parking for reconciliation",
                    intent.id, booking_id
                );
                let fallback = Booking::new(
                    booking_id,
                    reference::generate(),
                    request.user_id,
                    flight.id,
                    fare_class,
                    passenger_count,
                    total_amount,
                    currency.clone(),
                    Some(intent.id.clone()),
                    BookingStatus::ReconciliationPending,
                );
                if let Err(e) = self.bookings.insert_booking(&fallback, &passengers).await {
                    error!("reconciliation record could not be written: {}", e);
                }
                // Seats stay reserved: the captured payment backs them.
                reservation.commit();
                return Err(BookingError::ReconciliationRequired {
                    booking_id,
                    payment_intent_id: intent.id,
                });
            }
        };

        state.transition_to(BookingState::Confirmed)?;
        reservation.commit();
        info!("Booking confirmed: {} ({})", booking.id, booking.reference);
        self.notify_flight_changed(&flight);

        Ok(booking)
    }

    /// Cancel a confirmed booking before departure: release its seats, ask
    /// the gateway for a refund, mark it cancelled. Idempotent; cancelling an
    /// already-cancelled booking is a no-op success.
    pub async fn cancel_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound(id))?;

        if booking.status == BookingStatus::Cancelled {
            info!("Booking {} already cancelled", id);
            return Ok(booking);
        }
        if booking.status == BookingStatus::ReconciliationPending {
            return Err(BookingError::Conflict(
                "booking is awaiting manual reconciliation".to_string(),
            ));
        }

        let flight = self.load_flight(booking.flight_id).await?;
        let now = Utc::now();
        if flight.status == FlightStatus::Departed || flight.departure_time <= now {
            return Err(BookingError::Validation(
                "Flight has already departed".to_string(),
            ));
        }

        // The status CAS elects exactly one canceller; only the winner
        // releases seats, so a double cancel can never double-release.
        let mut cancelled: Option<Booking> = None;
        for attempt in 1..=self.config.conflict_retry_attempts {
            match self
                .bookings
                .update_status(id, BookingStatus::Confirmed, BookingStatus::Cancelled)
                .await
            {
                Ok(updated) => {
                    cancelled = Some(updated);
                    break;
                }
                Err(StoreError::Conflict {
                    actual: BookingStatus::Cancelled,
                    ..
                }) => {
                    // Lost the race to a concurrent cancel; their release stands
                    let current = self
                        .bookings
                        .get_booking(id)
                        .await?
                        .ok_or(BookingError::NotFound(id))?;
                    return Ok(current);
                }
                Err(StoreError::Conflict { actual, .. }) => {
                    return Err(BookingError::Conflict(format!(
                        "booking moved to {} during cancellation",
                        actual
                    )));
                }
                Err(e @ StoreError::Backend(_)) => {
                    warn!(
                        "cancellation attempt {}/{} failed: {}",
                        attempt, self.config.conflict_retry_attempts, e
                    );
                    if attempt == self.config.conflict_retry_attempts {
                        return Err(BookingError::Store(e));
                    }
                    sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => return Err(BookingError::Store(e)),
            }
        }
        let booking = cancelled
            .ok_or_else(|| BookingError::Conflict("cancellation retries exhausted".to_string()))?;

        if let Err(e) = self.ledger.release(booking.flight_id, booking.passenger_count) {
            error!("seat release after cancellation failed: {}", e);
        }

        if let Some(intent_id) = booking.payment_intent_id.as_deref() {
            match timeout(self.config.payment_timeout, self.gateway.refund(intent_id)).await {
                Ok(Ok(_)) => info!("Refund requested for payment intent {}", intent_id),
                Ok(Err(e)) => warn!("refund request for intent {} failed: {}", intent_id, e),
                Err(_) => warn!("refund request for intent {} timed out", intent_id),
            }
        }

        info!("Booking cancelled: {} ({})", booking.id, booking.reference);
        self.notify_flight_changed(&flight);
        Ok(booking)
    }

    /// Read-only reconciliation check over a recorded booking. Used by
    /// operations tooling, never by the booking flow itself.
    pub async fn validate_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingValidationReport>, BookingError> {
        let booking = match self.bookings.get_booking(id).await? {
            Some(booking) => booking,
            None => return Ok(None),
        };

        let mut issues = Vec::new();

        let passengers = self.bookings.passengers_for(id).await?;
        if passengers.len() as i32 != booking.passenger_count {
            issues.push(format!(
                "expected {} passenger record(s), found {}",
                booking.passenger_count,
                passengers.len()
            ));
        }

        if booking.total_amount <= 0 {
            issues.push(format!(
                "booking total must be positive, found {}",
                booking.total_amount
            ));
        }

        if !reference::is_valid(&booking.reference) {
            issues.push(format!("malformed booking reference {}", booking.reference));
        }

        match booking.payment_intent_id.as_deref() {
            None => issues.push("no payment intent recorded".to_string()),
            Some(intent_id) => match self.gateway.get_intent(intent_id).await {
                Ok(intent) => {
                    if booking.status == BookingStatus::Confirmed
                        && intent.status != PaymentStatus::Succeeded
                    {
                        issues.push(format!(
                            "confirmed booking but payment intent status is {:?}",
                            intent.status
                        ));
                    }
                    if intent.amount != booking.total_amount {
                        issues.push(format!(
                            "payment intent amount {} differs from booking total {}",
                            intent.amount, booking.total_amount
                        ));
                    }
                }
                Err(e) => issues.push(format!("payment intent {} unavailable: {}", intent_id, e)),
            },
        }

        Ok(Some(BookingValidationReport {
            booking_id: id,
            consistent: issues.is_empty(),
            issues,
        }))
    }

    async fn load_flight(&self, flight_id: Uuid) -> Result<Flight, BookingError> {
        self.flights
            .get_flight(flight_id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(BookingError::FlightNotFound(flight_id))
    }

    fn payment_failure_cleanup(
        &self,
        state: &mut BookingState,
        reservation: SeatReservation,
        flight: &Flight,
        intent_id: Option<String>,
    ) -> Result<(), TransitionError> {
        state.transition_to(BookingState::PaymentFailed)?;
        reservation.release_now();
        state.transition_to(BookingState::SeatsReleased)?;
        state.transition_to(BookingState::Aborted)?;

        if let Some(intent_id) = intent_id {
            let gateway = Arc::clone(&self.gateway);
            tokio::spawn(async move {
                if let Err(e) = gateway.cancel_intent(&intent_id).await {
                    warn!("best-effort cancel of payment intent {} failed: {}", intent_id, e);
                }
            });
        }

        self.notify_flight_changed(flight);
        Ok(())
    }

    fn notify_flight_changed(&self, flight: &Flight) {
        let available = self.ledger.available(flight.id).unwrap_or(0);
        self.notifier.flight_changed(FlightDocument {
            flight_id: flight.id,
            flight_number: flight.flight_number.clone(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            departure_time: flight.departure_time,
            available_seats: available,
            status: flight.status,
        });
    }
}

/// Behavior script for the mock gateway.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Authorize everything.
    Succeed,
    /// Report every intent as declined.
    Decline,
    /// Sleep before succeeding, to trip the orchestrator's deadline.
    Hang(Duration),
    /// Fail at the transport level, as an unreachable provider would.
    FailConnection,
}

/// In-memory payment gateway for tests and local wiring.
pub struct MockPaymentGateway {
    behavior: MockBehavior,
    intents: Mutex<HashMap<String, PaymentIntent>>,
    by_idempotency_key: Mutex<HashMap<String, String>>,
}

impl MockPaymentGateway {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            intents: Mutex::new(HashMap::new()),
            by_idempotency_key: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        // An idempotency-key replay returns the original intent untouched
        let replay = {
            let by_key = self.by_idempotency_key.lock();
            by_key
                .get(&request.idempotency_key)
                .and_then(|id| self.intents.lock().get(id).cloned())
        };
        if let Some(intent) = replay {
            return Ok(intent);
        }

        match &self.behavior {
            MockBehavior::Hang(delay) => sleep(*delay).await,
            MockBehavior::FailConnection => return Err("payment gateway unreachable".into()),
            _ => {}
        }

        let status = match self.behavior {
            MockBehavior::Decline => PaymentStatus::Failed,
            _ => PaymentStatus::Succeeded,
        };

        let intent = PaymentIntent {
            id: format!("mock_pi_{}", request.booking_id.simple()),
            booking_id: request.booking_id,
            amount: request.amount,
            currency: request.currency,
            status,
            client_secret: Some(format!("mock_secret_{}", request.booking_id.simple())),
            created_at: Utc::now(),
        };

        self.intents.lock().insert(intent.id.clone(), intent.clone());
        self.by_idempotency_key
            .lock()
            .insert(request.idempotency_key, intent.id.clone());
        Ok(intent)
    }

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.intents
            .lock()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| format!("unknown payment intent: {intent_id}").into())
    }

    async fn cancel_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let mut intents = self.intents.lock();
        let intent = intents
            .get_mut(intent_id)
            .ok_or_else(|| -> Box<dyn std::error::Error + Send + Sync> {
                format!("unknown payment intent: {intent_id}").into()
            })?;
        intent.status = PaymentStatus::Canceled;
        Ok(intent.clone())
    }

    async fn refund(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let mut intents = self.intents.lock();
        let intent = intents
            .get_mut(intent_id)
            .ok_or_else(|| -> Box<dyn std::error::Error + Send + Sync> {
                format!("unknown payment intent: {intent_id}").into()
            })?;
        intent.status = PaymentStatus::Canceled;
        Ok(intent.clone())
    }
}
