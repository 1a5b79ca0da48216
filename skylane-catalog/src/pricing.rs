use crate::flight::FareClass;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A fare row for a flight/fare-class pair, valid inside `[valid_from, valid_to)`.
///
/// Amounts are minor units (cents) of `currency`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub fare_class: FareClass,
    pub base_amount: i64,
    pub currency: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Price {
    pub fn new(
        flight_id: Uuid,
        fare_class: FareClass,
        base_amount: i64,
        currency: String,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            flight_id,
            fare_class,
            base_amount,
            currency,
            valid_from,
            valid_to,
            created_at: Utc::now(),
        }
    }

    fn covers(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at < self.valid_to
    }
}

/// Resolves the applicable fare for a flight/fare-class at a point in time.
pub struct PricingResolver {
    prices: RwLock<HashMap<(Uuid, FareClass), Vec<Price>>>,
}

impl PricingResolver {
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_price(&self, price: Price) {
        self.prices
            .write()
            .entry((price.flight_id, price.fare_class))
            .or_default()
            .push(price);
    }

    /// Select the price whose validity window contains `at`.
    ///
    /// When windows overlap, the most recently created row wins; rows created
    /// in the same instant fall back to the larger id, so resolution is total
    /// and deterministic.
    pub fn resolve(
        &self,
        flight_id: Uuid,
        fare_class: FareClass,
        at: DateTime<Utc>,
    ) -> Result<Price, PricingError> {
        let prices = self.prices.read();
        prices
            .get(&(flight_id, fare_class))
            .into_iter()
            .flatten()
            .filter(|p| p.covers(at))
            .max_by_key(|p| (p.created_at, p.id))
            .cloned()
            .ok_or(PricingError::NoApplicablePrice {
                flight_id,
                fare_class,
            })
    }

    /// Total for N passengers: resolved base price times the passenger count.
    pub fn calculate_total(
        &self,
        flight_id: Uuid,
        fare_class: FareClass,
        passenger_count: i32,
        at: DateTime<Utc>,
    ) -> Result<(i64, String), PricingError> {
        if passenger_count < 1 {
            return Err(PricingError::InvalidPassengerCount(passenger_count));
        }
        let price = self.resolve(flight_id, fare_class, at)?;
        Ok((
            price.base_amount * i64::from(passenger_count),
            price.currency,
        ))
    }
}

impl Default for PricingResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("No applicable price for flight {flight_id}, fare class {fare_class}")]
    NoApplicablePrice {
        flight_id: Uuid,
        fare_class: FareClass,
    },

    #[error("Passenger count must be at least 1, got {0}")]
    InvalidPassengerCount(i32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window(offset_hours: i64, length_hours: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = Utc::now() + Duration::hours(offset_hours);
        (from, from + Duration::hours(length_hours))
    }

    #[test]
    fn test_resolve_picks_containing_window() {
        let resolver = PricingResolver::new();
        let flight_id = Uuid::new_v4();

        let (past_from, past_to) = window(-48, 24);
        let (live_from, live_to) = window(-1, 48);
        resolver.add_price(Price::new(
            flight_id,
            FareClass::Economy,
            9900,
            "USD".to_string(),
            past_from,
            past_to,
        ));
        resolver.add_price(Price::new(
            flight_id,
            FareClass::Economy,
            15000,
            "USD".to_string(),
            live_from,
            live_to,
        ));

        let price = resolver
            .resolve(flight_id, FareClass::Economy, Utc::now())
            .unwrap();
        assert_eq!(price.base_amount, 15000);
    }

    #[test]
    fn test_overlapping_windows_most_recently_created_wins() {
        let resolver = PricingResolver::new();
        let flight_id = Uuid::new_v4();
        let (from, to) = window(-1, 48);

        let mut older = Price::new(
            flight_id,
            FareClass::Economy,
            12000,
            "USD".to_string(),
            from,
            to,
        );
        older.created_at = Utc::now() - Duration::minutes(30);
        let newer = Price::new(
            flight_id,
            FareClass::Economy,
            14000,
            "USD".to_string(),
            from,
            to,
        );

        resolver.add_price(newer);
        resolver.add_price(older);

        let price = resolver
            .resolve(flight_id, FareClass::Economy, Utc::now())
            .unwrap();
        assert_eq!(price.base_amount, 14000);
    }

    #[test]
    fn test_valid_to_is_exclusive() {
        let resolver = PricingResolver::new();
        let flight_id = Uuid::new_v4();
        let (from, to) = window(-24, 24);
        resolver.add_price(Price::new(
            flight_id,
            FareClass::Business,
            40000,
            "USD".to_string(),
            from,
            to,
        ));

        assert!(resolver.resolve(flight_id, FareClass::Business, to).is_err());
        assert!(resolver
            .resolve(flight_id, FareClass::Business, from)
            .is_ok());
    }

    #[test]
    fn test_calculate_total_multiplies_by_passenger_count() {
        let resolver = PricingResolver::new();
        let flight_id = Uuid::new_v4();
        let (from, to) = window(-1, 48);
        resolver.add_price(Price::new(
            flight_id,
            FareClass::Economy,
            15000,
            "USD".to_string(),
            from,
            to,
        ));

        let (total, currency) = resolver
            .calculate_total(flight_id, FareClass::Economy, 3, Utc::now())
            .unwrap();
        assert_eq!(total, 45000);
        assert_eq!(currency, "USD");
    }

    #[test]
    fn test_zero_passengers_is_input_error_not_pricing_error() {
        let resolver = PricingResolver::new();
        let err = resolver
            .calculate_total(Uuid::new_v4(), FareClass::Economy, 0, Utc::now())
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidPassengerCount(0)));
    }

    #[test]
    fn test_missing_price_is_no_applicable_price() {
        let resolver = PricingResolver::new();
        let err = resolver
            .calculate_total(Uuid::new_v4(), FareClass::First, 2, Utc::now())
            .unwrap_err();
        assert!(matches!(err, PricingError::NoApplicablePrice { .. }));
    }
}
