use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use skylane_catalog::FlightStatus;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Flight snapshot pushed to the downstream search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightDocument {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: i32,
    pub status: FlightStatus,
}

/// Downstream search index. Notifications are best-effort; the booking core
/// never waits on them.
#[async_trait]
pub trait SearchIndexAdapter: Send + Sync {
    async fn index_flight(
        &self,
        document: FlightDocument,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn update_flight(
        &self,
        document: FlightDocument,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_flight(
        &self,
        flight_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Fire-and-forget wrapper over a search index adapter.
///
/// Each notification runs on its own task; a failed push is logged and
/// dropped. A slow or broken index cannot block or fail a booking.
#[derive(Clone)]
pub struct SearchNotifier {
    adapter: Arc<dyn SearchIndexAdapter>,
}

impl SearchNotifier {
    pub fn new(adapter: Arc<dyn SearchIndexAdapter>) -> Self {
        Self { adapter }
    }

    pub fn flight_indexed(&self, document: FlightDocument) {
        let adapter = Arc::clone(&self.adapter);
        tokio::spawn(async move {
            if let Err(e) = adapter.index_flight(document).await {
                warn!("search index insert failed: {}", e);
            }
        });
    }

    pub fn flight_changed(&self, document: FlightDocument) {
        let adapter = Arc::clone(&self.adapter);
        tokio::spawn(async move {
            if let Err(e) = adapter.update_flight(document).await {
                warn!("search index update failed: {}", e);
            }
        });
    }

    pub fn flight_deleted(&self, flight_id: Uuid) {
        let adapter = Arc::clone(&self.adapter);
        tokio::spawn(async move {
            if let Err(e) = adapter.delete_flight(flight_id).await {
                warn!("search index delete failed: {}", e);
            }
        });
    }
}

/// Adapter that drops every notification. Default wiring when no search
/// backend is configured.
pub struct NoopSearchIndex;

#[async_trait]
impl SearchIndexAdapter for NoopSearchIndex {
    async fn index_flight(
        &self,
        _document: FlightDocument,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    async fn update_flight(
        &self,
        _document: FlightDocument,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    async fn delete_flight(
        &self,
        _flight_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Adapter that records every notification, for asserting on index traffic in
/// tests.
#[derive(Default)]
pub struct RecordingSearchIndex {
    pub indexed: Mutex<Vec<FlightDocument>>,
    pub updated: Mutex<Vec<FlightDocument>>,
    pub deleted: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl SearchIndexAdapter for RecordingSearchIndex {
    async fn index_flight(
        &self,
        document: FlightDocument,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.indexed.lock().push(document);
        Ok(())
    }

    async fn update_flight(
        &self,
        document: FlightDocument,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.updated.lock().push(document);
        Ok(())
    }

    async fn delete_flight(
        &self,
        flight_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.deleted.lock().push(flight_id);
        Ok(())
    }
}
