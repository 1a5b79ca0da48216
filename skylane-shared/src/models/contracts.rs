use crate::pii::Masked;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound command to create a booking on a flight.
///
/// Fare class travels as a plain string and is parsed against the known
/// classes during validation; `user_id` is absent for guest bookings.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub flight_id: Uuid,
    pub fare_class: String,
    pub user_id: Option<Uuid>,
    pub contact_email: Option<String>,
    pub passengers: Vec<PassengerDetails>,
}

/// Passenger payload inside a booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub passport_number: Masked<String>,
    pub nationality: String,
}

/// Caller-facing projection of a booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    pub id: Uuid,
    pub reference: String,
    pub status: String,
    pub total_amount: i64,
    pub currency: String,
}

/// Inbound command to adjust a flight's reserved-seat counter by a signed delta.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatAdjustment {
    pub flight_id: Uuid,
    pub seat_change: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_booking_request_deserialization() {
        let json = r#"
            {
                "flight_id": "7f8a1c8e-4f2a-4a8e-9a6d-2f1f6f3f1b10",
                "fare_class": "ECONOMY",
                "user_id": null,
                "contact_email": "pax@example.com",
                "passengers": [
                    {
                        "first_name": "Ada",
                        "last_name": "Lovelace",
                        "date_of_birth": "1985-12-10",
                        "passport_number": "P1234567",
                        "nationality": "GB"
                    }
                ]
            }
        "#;
        let req: CreateBookingRequest = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(req.fare_class, "ECONOMY");
        assert!(req.user_id.is_none());
        assert_eq!(req.passengers.len(), 1);
        assert_eq!(req.passengers[0].passport_number.inner(), "P1234567");
    }

    #[test]
    fn test_passenger_debug_hides_passport() {
        let pax = PassengerDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 12, 10).unwrap(),
            passport_number: Masked::new("P1234567".to_string()),
            nationality: "GB".to_string(),
        };
        let rendered = format!("{:?}", pax);
        assert!(!rendered.contains("P1234567"));
    }
}
