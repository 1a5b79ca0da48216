use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Departed,
    Cancelled,
}

/// Named pricing tiers for a flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FareClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

#[derive(Debug, thiserror::Error)]
#[error("Unrecognized fare class: {0}")]
pub struct UnknownFareClass(pub String);

impl FromStr for FareClass {
    type Err = UnknownFareClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ECONOMY" => Ok(FareClass::Economy),
            "PREMIUM_ECONOMY" => Ok(FareClass::PremiumEconomy),
            "BUSINESS" => Ok(FareClass::Business),
            "FIRST" => Ok(FareClass::First),
            _ => Err(UnknownFareClass(s.to_string())),
        }
    }
}

impl fmt::Display for FareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FareClass::Economy => "ECONOMY",
            FareClass::PremiumEconomy => "PREMIUM_ECONOMY",
            FareClass::Business => "BUSINESS",
            FareClass::First => "FIRST",
        };
        write!(f, "{}", label)
    }
}

/// A scheduled flight. Capacity is fixed at creation; the reserved-seat
/// counter lives in the seat ledger, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub capacity: i32,
    pub status: FlightStatus,
}

impl Flight {
    pub fn new(
        flight_number: String,
        origin: String,
        destination: String,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
        capacity: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            flight_number,
            origin,
            destination,
            departure_time,
            arrival_time,
            capacity,
            status: FlightStatus::Scheduled,
        }
    }

    /// A flight accepts bookings while it is scheduled and has not departed.
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.status == FlightStatus::Scheduled && self.departure_time > now
    }
}
