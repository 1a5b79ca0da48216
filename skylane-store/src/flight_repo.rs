use async_trait::async_trait;
use parking_lot::RwLock;
use skylane_catalog::Flight;
use skylane_core::FlightRepository;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory flight store. Stands in for a database-backed repository behind
/// the same seam.
#[derive(Default)]
pub struct InMemoryFlightRepository {
    flights: RwLock<HashMap<Uuid, Flight>>,
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn get_flight(
        &self,
        id: Uuid,
    ) -> Result<Option<Flight>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.flights.read().get(&id).cloned())
    }

    async fn save_flight(
        &self,
        flight: &Flight,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.flights.write().insert(flight.id, flight.clone());
        Ok(())
    }
}
