use skylane_booking::{BookingOrchestrator, BookingQueryService, BookingRepository};
use skylane_catalog::{Flight, Price, PricingResolver, SeatLedger};
use skylane_core::{
    FlightDocument, FlightRepository, PaymentGateway, SearchIndexAdapter, SearchNotifier,
};
use skylane_store::{BusinessRules, InMemoryBookingRepository, InMemoryFlightRepository};
use std::sync::Arc;

/// Wired component graph behind the operation surface.
#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<dyn FlightRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub ledger: Arc<SeatLedger>,
    pub pricing: Arc<PricingResolver>,
    pub orchestrator: Arc<BookingOrchestrator>,
    pub queries: BookingQueryService,
    pub notifier: SearchNotifier,
}

impl AppState {
    /// Wire the engine over the in-memory stores.
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        search: Arc<dyn SearchIndexAdapter>,
        rules: &BusinessRules,
    ) -> Self {
        Self::with_repositories(
            Arc::new(InMemoryFlightRepository::new()),
            Arc::new(InMemoryBookingRepository::new()),
            gateway,
            search,
            rules,
        )
    }

    /// Wire the engine over caller-provided repositories.
    pub fn with_repositories(
        flights: Arc<dyn FlightRepository>,
        bookings: Arc<dyn BookingRepository>,
        gateway: Arc<dyn PaymentGateway>,
        search: Arc<dyn SearchIndexAdapter>,
        rules: &BusinessRules,
    ) -> Self {
        let ledger = Arc::new(SeatLedger::new());
        let pricing = Arc::new(PricingResolver::new());
        let notifier = SearchNotifier::new(search);
        let orchestrator = Arc::new(BookingOrchestrator::new(
            Arc::clone(&flights),
            Arc::clone(&bookings),
            Arc::clone(&ledger),
            Arc::clone(&pricing),
            gateway,
            notifier.clone(),
            rules.orchestrator_config(),
        ));
        let queries = BookingQueryService::new(Arc::clone(&bookings));

        Self {
            flights,
            bookings,
            ledger,
            pricing,
            orchestrator,
            queries,
            notifier,
        }
    }

    /// Register a flight: persist it, open its seat counter, and push the
    /// initial search document.
    pub async fn register_flight(
        &self,
        flight: &Flight,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.flights.save_flight(flight).await?;
        self.ledger.register(flight.id, flight.capacity);
        self.notifier.flight_indexed(FlightDocument {
            flight_id: flight.id,
            flight_number: flight.flight_number.clone(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            departure_time: flight.departure_time,
            available_seats: flight.capacity,
            status: flight.status,
        });
        Ok(())
    }

    pub fn add_price(&self, price: Price) {
        self.pricing.add_price(price);
    }
}
