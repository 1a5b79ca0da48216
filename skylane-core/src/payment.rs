use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

/// The provider-side payment intent the core holds a reference to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String, // Provider's ID (e.g., pi_123)
    pub booking_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub client_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inputs for intent creation. The idempotency key makes a retried call after
/// a false timeout resolve to the original intent instead of a second charge.
#[derive(Debug, Clone)]
pub struct IntentRequest {
    pub booking_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub idempotency_key: String,
    pub customer_email: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create (and authorize) a payment intent with the provider.
    async fn create_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;

    /// Retrieve intent status.
    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;

    /// Cancel an intent that has not been captured.
    async fn cancel_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;

    /// Refund a captured intent.
    async fn refund(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;
}
