// Relocated from an inline `#[cfg(test)] mod tests` in src/orchestrator.rs.
// These tests use `skylane-store` (a dev-dependency that depends back on
// `skylane-booking`); as an in-crate unit test that cycle produces two
// distinct copies of `skylane-booking`, so the tests must live as an
// integration test that links the single normal library build.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use chrono::Utc;
use uuid::Uuid;

use skylane_booking::orchestrator::{
    BookingError, BookingOrchestrator, MockBehavior, MockPaymentGateway, OrchestratorConfig,
};
use skylane_booking::models::{Booking, BookingStatus};
use skylane_booking::reference;
use skylane_booking::repository::BookingRepository;

use skylane_catalog::{FareClass, Flight, Price, PricingResolver, SeatLedger};
use skylane_core::{
    FlightRepository, IntentRequest, NoopSearchIndex, PaymentGateway, PaymentStatus, SearchNotifier,
};
use skylane_shared::{CreateBookingRequest, Masked, PassengerDetails};
use skylane_store::{InMemoryBookingRepository, InMemoryFlightRepository};

    struct Fixture {
        orchestrator: BookingOrchestrator,
        ledger: Arc<SeatLedger>,
        flights: Arc<InMemoryFlightRepository>,
        bookings: Arc<InMemoryBookingRepository>,
        gateway: Arc<MockPaymentGateway>,
        flight: Flight,
    }

    fn test_config() -> OrchestratorConfig {
        OrchestratorConfig {
            payment_timeout: Duration::from_millis(200),
            persistence_retry_attempts: 3,
            conflict_retry_attempts: 3,
            retry_backoff: Duration::from_millis(10),
        }
    }

    async fn fixture(behavior: MockBehavior, capacity: i32) -> Fixture {
        fixture_with_config(behavior, capacity, test_config()).await
    }

    async fn fixture_with_config(
        behavior: MockBehavior,
        capacity: i32,
        config: OrchestratorConfig,
    ) -> Fixture {
        let flights = Arc::new(InMemoryFlightRepository::new());
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let ledger = Arc::new(SeatLedger::new());
        let pricing = Arc::new(PricingResolver::new());
        let gateway = Arc::new(MockPaymentGateway::new(behavior));

        let departure = Utc::now() + ChronoDuration::hours(24);
        let flight = Flight::new(
            "SL512".to_string(),
            "BER".to_string(),
            "LIS".to_string(),
            departure,
            departure + ChronoDuration::hours(3),
            capacity,
        );
        flights.save_flight(&flight).await.unwrap();
        ledger.register(flight.id, capacity);
        pricing.add_price(Price::new(
            flight.id,
            FareClass::Economy,
            15000,
            "USD".to_string(),
            Utc::now() - ChronoDuration::hours(1),
            Utc::now() + ChronoDuration::hours(48),
        ));

        let flights_dyn: Arc<dyn FlightRepository> = flights.clone();
        let bookings_dyn: Arc<dyn BookingRepository> = bookings.clone();
        let gateway_dyn: Arc<dyn PaymentGateway> = gateway.clone();

        let orchestrator = BookingOrchestrator::new(
            flights_dyn,
            bookings_dyn,
            Arc::clone(&ledger),
            pricing,
            gateway_dyn,
            SearchNotifier::new(Arc::new(NoopSearchIndex)),
            config,
        );

        Fixture {
            orchestrator,
            ledger,
            flights,
            bookings,
            gateway,
            flight,
        }
    }

    fn passenger(first: &str, last: &str) -> PassengerDetails {
        PassengerDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1985, 12, 10).unwrap(),
            passport_number: Masked::new("P1234567".to_string()),
            nationality: "GB".to_string(),
        }
    }

    fn request(flight_id: Uuid, passengers: Vec<PassengerDetails>) -> CreateBookingRequest {
        CreateBookingRequest {
            flight_id,
            fare_class: "ECONOMY".to_string(),
            user_id: None,
            contact_email: None,
            passengers,
        }
    }

    #[tokio::test]
    async fn test_create_booking_happy_path() {
        let f = fixture(MockBehavior::Succeed, 10).await;

        let booking = f
            .orchestrator
            .create_booking(request(
                f.flight.id,
                vec![passenger("Ada", "Lovelace"), passenger("Grace", "Hopper")],
            ))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_amount, 30000);
        assert!(booking.payment_intent_id.is_some());
        assert_eq!(f.ledger.available(f.flight.id).unwrap(), 8);

        let stored = f.bookings.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.reference, booking.reference);
        assert_eq!(f.bookings.passengers_for(booking.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_payment_timeout_triggers_compensation() {
        let f = fixture_with_config(
            MockBehavior::Hang(Duration::from_millis(500)),
            10,
            OrchestratorConfig {
                payment_timeout: Duration::from_millis(50),
                ..test_config()
            },
        )
        .await;

        let err = f
            .orchestrator
            .create_booking(request(f.flight.id, vec![passenger("Ada", "Lovelace")]))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::PaymentTimeout));
        assert_eq!(f.ledger.available(f.flight.id).unwrap(), 10);
        assert!(f
            .bookings
            .list_by_flight(f.flight.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_capacity_fails_before_payment() {
        let f = fixture(MockBehavior::Succeed, 1).await;

        let err = f
            .orchestrator
            .create_booking(request(
                f.flight.id,
                vec![passenger("Ada", "Lovelace"), passenger("Grace", "Hopper")],
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BookingError::SeatsUnavailable {
                requested: 2,
                available: 1
            }
        ));
        assert_eq!(f.ledger.available(f.flight.id).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_departed_flight_is_not_bookable() {
        let f = fixture(MockBehavior::Succeed, 10).await;

        let departure = Utc::now() - ChronoDuration::hours(2);
        let past_flight = Flight::new(
            "SL001".to_string(),
            "BER".to_string(),
            "LIS".to_string(),
            departure,
            departure + ChronoDuration::hours(3),
            10,
        );
        f.flights.save_flight(&past_flight).await.unwrap();
        f.ledger.register(past_flight.id, past_flight.capacity);

        let err = f
            .orchestrator
            .create_booking(request(past_flight.id, vec![passenger("Ada", "Lovelace")]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotBookable(_)));

        let err = f
            .orchestrator
            .create_booking(request(Uuid::new_v4(), vec![passenger("Ada", "Lovelace")]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::FlightNotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_booking_is_not_found() {
        let f = fixture(MockBehavior::Succeed, 10).await;
        let err = f.orchestrator.cancel_booking(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_and_repeat_cancel() {
        let f = fixture(MockBehavior::Succeed, 5).await;

        let booking = f
            .orchestrator
            .create_booking(request(f.flight.id, vec![passenger("Ada", "Lovelace")]))
            .await
            .unwrap();
        assert_eq!(f.ledger.available(f.flight.id).unwrap(), 4);

        let cancelled = f.orchestrator.cancel_booking(booking.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(f.ledger.available(f.flight.id).unwrap(), 5);

        let intent_id = booking.payment_intent_id.as_deref().unwrap();
        let intent = f.gateway.get_intent(intent_id).await.unwrap();
        assert_eq!(intent.status, PaymentStatus::Canceled);

        // Idempotent: the repeat is a no-op success and nothing re-releases
        let again = f.orchestrator.cancel_booking(booking.id).await.unwrap();
        assert_eq!(again.status, BookingStatus::Cancelled);
        assert_eq!(f.ledger.available(f.flight.id).unwrap(), 5);
    }

    #[tokio::test]
    async fn test_cancel_of_reconciliation_pending_booking_is_rejected() {
        let f = fixture(MockBehavior::Succeed, 5).await;

        let parked = Booking::new(
            Uuid::new_v4(),
            reference::generate(),
            None,
            f.flight.id,
            FareClass::Economy,
            1,
            15000,
            "USD".to_string(),
            Some("pi_parked".to_string()),
            BookingStatus::ReconciliationPending,
        );
        f.bookings.insert_booking(&parked, &[]).await.unwrap();

        let err = f.orchestrator.cancel_booking(parked.id).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_validate_booking_flags_missing_passengers() {
        let f = fixture(MockBehavior::Succeed, 5).await;

        // Recorded as a two-passenger booking, but no passenger rows exist
        let skewed = Booking::new(
            Uuid::new_v4(),
            reference::generate(),
            None,
            f.flight.id,
            FareClass::Economy,
            2,
            30000,
            "USD".to_string(),
            Some("pi_ghost".to_string()),
            BookingStatus::Confirmed,
        );
        f.bookings.insert_booking(&skewed, &[]).await.unwrap();

        let report = f
            .orchestrator
            .validate_booking(skewed.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!report.consistent);
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("passenger record")));
    }

    #[tokio::test]
    async fn test_validate_confirmed_booking_is_consistent() {
        let f = fixture(MockBehavior::Succeed, 5).await;

        let booking = f
            .orchestrator
            .create_booking(request(f.flight.id, vec![passenger("Ada", "Lovelace")]))
            .await
            .unwrap();

        let report = f
            .orchestrator
            .validate_booking(booking.id)
            .await
            .unwrap()
            .unwrap();
        assert!(report.consistent, "issues: {:?}", report.issues);
    }

    #[tokio::test]
    async fn test_gateway_idempotency_key_replay() {
        let gateway = MockPaymentGateway::new(MockBehavior::Succeed);
        let booking_id = Uuid::new_v4();
        let request = IntentRequest {
            booking_id,
            amount: 15000,
            currency: "USD".to_string(),
            idempotency_key: format!("booking-{}", booking_id),
            customer_email: None,
            description: None,
        };

        let first = gateway.create_intent(request.clone()).await.unwrap();
        let replay = gateway.create_intent(request).await.unwrap();

        // Same key resolves to the original intent: no double charge
        assert_eq!(first.id, replay.id);
        assert_eq!(first.created_at, replay.created_at);
    }
