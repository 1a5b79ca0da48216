use async_trait::async_trait;
use skylane_catalog::Flight;
use uuid::Uuid;

/// Repository trait for flight data access.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn get_flight(
        &self,
        id: Uuid,
    ) -> Result<Option<Flight>, Box<dyn std::error::Error + Send + Sync>>;

    async fn save_flight(
        &self,
        flight: &Flight,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
