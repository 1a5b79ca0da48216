use serde::{Deserialize, Serialize};

/// Transient states of one booking request as it moves through the engine.
///
/// Success path: Initiated -> SeatsReserved -> PaymentAuthorized -> Confirmed.
/// Failure exits: ValidationFailed, SeatsUnavailable, and
/// PaymentFailed -> SeatsReleased -> Aborted for the compensated path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    Initiated,
    SeatsReserved,
    PaymentAuthorized,
    Confirmed,
    ValidationFailed,
    SeatsUnavailable,
    PaymentFailed,
    SeatsReleased,
    Aborted,
}

impl BookingState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingState::Confirmed
                | BookingState::ValidationFailed
                | BookingState::SeatsUnavailable
                | BookingState::Aborted
        )
    }

    fn allows(self, next: BookingState) -> bool {
        use BookingState::*;
        matches!(
            (self, next),
            (Initiated, SeatsReserved)
                | (Initiated, ValidationFailed)
                | (Initiated, SeatsUnavailable)
                | (SeatsReserved, PaymentAuthorized)
                | (SeatsReserved, PaymentFailed)
                | (PaymentAuthorized, Confirmed)
                | (PaymentFailed, SeatsReleased)
                | (SeatsReleased, Aborted)
        )
    }

    /// Advance to `next`, rejecting any jump the lifecycle does not allow.
    pub fn transition_to(&mut self, next: BookingState) -> Result<(), TransitionError> {
        if !self.allows(next) {
            return Err(TransitionError {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid booking state transition from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: BookingState,
    pub to: BookingState,
}
