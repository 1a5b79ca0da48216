use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skylane_catalog::FareClass;
use skylane_shared::{BookingSummary, Masked, PassengerDetails};
use std::fmt;
use uuid::Uuid;

/// Persisted booking status. Transient request states live in
/// [`crate::machine::BookingState`]; only these three survive into the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    ReconciliationPending,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::ReconciliationPending => "RECONCILIATION_PENDING",
        };
        write!(f, "{}", label)
    }
}

/// The single source of truth for a customer's trip purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    pub user_id: Option<Uuid>,
    pub flight_id: Uuid,
    pub fare_class: FareClass,
    pub passenger_count: i32,
    pub total_amount: i64,
    pub currency: String,
    pub payment_intent_id: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        id: Uuid,
        reference: String,
        user_id: Option<Uuid>,
        flight_id: Uuid,
        fare_class: FareClass,
        passenger_count: i32,
        total_amount: i64,
        currency: String,
        payment_intent_id: Option<String>,
        status: BookingStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            reference,
            user_id,
            flight_id,
            fare_class,
            passenger_count,
            total_amount,
            currency,
            payment_intent_id,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> BookingSummary {
        BookingSummary {
            id: self.id,
            reference: self.reference.clone(),
            status: self.status.to_string(),
            total_amount: self.total_amount,
            currency: self.currency.clone(),
        }
    }
}

/// A passenger on a booking. Created only as part of a successful booking and
/// owned by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub passport_number: Masked<String>,
    pub nationality: String,
}

impl Passenger {
    pub fn from_details(booking_id: Uuid, details: &PassengerDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            date_of_birth: details.date_of_birth,
            passport_number: details.passport_number.clone(),
            nationality: details.nationality.clone(),
        }
    }
}

/// Outcome of the read-only reconciliation check over a recorded booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingValidationReport {
    pub booking_id: Uuid,
    pub consistent: bool,
    pub issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> Booking {
        Booking::new(
            Uuid::new_v4(),
            "SKY-4H7WQ2".to_string(),
            None,
            Uuid::new_v4(),
            FareClass::Economy,
            2,
            30000,
            "USD".to_string(),
            Some("pi_test".to_string()),
            BookingStatus::Confirmed,
        )
    }

    #[test]
    fn test_update_status_touches_updated_at() {
        let mut booking = booking();
        let before = booking.updated_at;
        booking.update_status(BookingStatus::Cancelled);
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking.updated_at >= before);
    }

    #[test]
    fn test_summary_projection() {
        let booking = booking();
        let summary = booking.summary();
        assert_eq!(summary.reference, "SKY-4H7WQ2");
        assert_eq!(summary.status, "CONFIRMED");
        assert_eq!(summary.total_amount, 30000);
    }

    #[test]
    fn test_booking_debug_does_not_leak_passports() {
        let details = PassengerDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 12, 10).unwrap(),
            passport_number: Masked::new("Z44412345".to_string()),
            nationality: "GB".to_string(),
        };
        let passenger = Passenger::from_details(Uuid::new_v4(), &details);
        assert!(!format!("{:?}", passenger).contains("Z44412345"));
    }
}
