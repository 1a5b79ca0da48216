use chrono::{DateTime, Duration, Utc};
use skylane_catalog::FareClass;
use skylane_shared::{CreateBookingRequest, PassengerDetails};

/// Upper bound on plausible passenger age.
const MAX_AGE_YEARS: i64 = 120;

/// Validate a booking request's payload before any side effect.
///
/// Returns the parsed fare class on success; on failure, every problem found
/// is reported at once so the caller can fix the request in one round.
pub fn validate_request(
    request: &CreateBookingRequest,
    now: DateTime<Utc>,
) -> Result<FareClass, Vec<String>> {
    let mut issues = Vec::new();

    let fare_class = match request.fare_class.parse::<FareClass>() {
        Ok(fc) => Some(fc),
        Err(e) => {
            issues.push(e.to_string());
            None
        }
    };

    if request.passengers.is_empty() {
        issues.push("Booking must include at least one passenger".to_string());
    }

    for (idx, passenger) in request.passengers.iter().enumerate() {
        for issue in passenger_issues(passenger, now) {
            issues.push(format!("Passenger {}: {}", idx + 1, issue));
        }
    }

    match (fare_class, issues.is_empty()) {
        (Some(fc), true) => Ok(fc),
        _ => Err(issues),
    }
}

fn passenger_issues(passenger: &PassengerDetails, now: DateTime<Utc>) -> Vec<String> {
    let mut issues = Vec::new();

    if passenger.first_name.trim().is_empty() {
        issues.push("first name is required".to_string());
    }
    if passenger.last_name.trim().is_empty() {
        issues.push("last name is required".to_string());
    }

    let today = now.date_naive();
    if passenger.date_of_birth > today {
        issues.push("date of birth is in the future".to_string());
    } else if passenger.date_of_birth < today - Duration::days(MAX_AGE_YEARS * 366) {
        issues.push("date of birth is implausibly old".to_string());
    }

    let passport = passenger.passport_number.inner();
    if !is_valid_passport(passport) {
        issues.push("passport number must be 6-9 uppercase letters or digits".to_string());
    }

    if !is_valid_nationality(&passenger.nationality) {
        issues.push("nationality must be a 2-3 letter country code".to_string());
    }

    issues
}

fn is_valid_passport(passport: &str) -> bool {
    (6..=9).contains(&passport.len())
        && passport
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

fn is_valid_nationality(nationality: &str) -> bool {
    (2..=3).contains(&nationality.len()) && nationality.bytes().all(|b| b.is_ascii_uppercase())
}
