//! # Order Lifecycle
//!
//! The order status state machine.
//!
//! ## State Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   PLACED ──► PREPARING ──► READY ──► COMPLETED (terminal)               │
//! │     │    └─────┼──────────────┘▲        ▲                               │
//! │     │          └───────────────┼────────┘   forward skips allowed       │
//! │     └──────────────────────────┘                                        │
//! │                                                                         │
//! │   any non-terminal ──► CANCELLED (terminal)                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Progress is forward-only; skipping intermediate stages is legal
//!   (PLACED → READY when a kitchen display is not in use).
//! - CANCELLED is reachable from any non-terminal status.
//! - Terminal statuses (COMPLETED, CANCELLED) accept no further transitions.
//! - A same-status "transition" is rejected, not treated as a no-op, so a
//!   double-tapped button surfaces as an error instead of silently passing.
//!
//! The table below is the single source of truth; the HTTP layer and the
//! status-guarded SQL both defer to it.

use crate::error::CoreError;
use crate::types::OrderStatus;

/// Numeric position in the forward progression. Terminal statuses compare
/// highest so nothing is "forward" of them.
const fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Placed => 0,
        OrderStatus::Preparing => 1,
        OrderStatus::Ready => 2,
        OrderStatus::Completed => 3,
        OrderStatus::Cancelled => 4,
    }
}

/// True for statuses that accept no further transitions.
#[inline]
pub const fn is_terminal(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Completed | OrderStatus::Cancelled)
}

/// True for statuses under which an order's items may no longer be edited.
///
/// Item mutation locking and transition finality coincide today, but the
/// call sites care about different questions, so both names exist.
#[inline]
pub const fn is_locked(status: OrderStatus) -> bool {
    is_terminal(status)
}

/// Checks whether `from → to` is a legal transition.
pub const fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    if is_terminal(from) {
        return false;
    }
    match to {
        // Cancellation is always available before a terminal state.
        OrderStatus::Cancelled => true,
        // Otherwise: strictly forward, skips included.
        _ => rank(to) > rank(from),
    }
}

/// Validates a transition, producing the domain error the API returns.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidStatusTransition { from, to })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 5] = [Placed, Preparing, Ready, Completed, Cancelled];

    #[test]
    fn test_forward_steps_allowed() {
        assert!(can_transition(Placed, Preparing));
        assert!(can_transition(Preparing, Ready));
        assert!(can_transition(Ready, Completed));
    }

    #[test]
    fn test_forward_skips_allowed() {
        assert!(can_transition(Placed, Ready));
        assert!(can_transition(Placed, Completed));
        assert!(can_transition(Preparing, Completed));
    }

    #[test]
    fn test_backward_rejected() {
        assert!(!can_transition(Preparing, Placed));
        assert!(!can_transition(Ready, Preparing));
        assert!(!can_transition(Ready, Placed));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(can_transition(Placed, Cancelled));
        assert!(can_transition(Preparing, Cancelled));
        assert!(can_transition(Ready, Cancelled));
    }

    #[test]
    fn test_terminal_states_frozen() {
        for to in ALL {
            assert!(!can_transition(Completed, to), "COMPLETED -> {to:?}");
            assert!(!can_transition(Cancelled, to), "CANCELLED -> {to:?}");
        }
    }

    #[test]
    fn test_same_status_rejected() {
        for s in ALL {
            assert!(!can_transition(s, s), "{s:?} -> {s:?} must be rejected");
        }
    }

    #[test]
    fn test_validate_transition_error_carries_both_statuses() {
        let err = validate_transition(Ready, Placed).unwrap_err();
        match err {
            CoreError::InvalidStatusTransition { from, to } => {
                assert_eq!(from, Ready);
                assert_eq!(to, Placed);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_locked_statuses() {
        assert!(!is_locked(Placed));
        assert!(!is_locked(Preparing));
        assert!(!is_locked(Ready));
        assert!(is_locked(Completed));
        assert!(is_locked(Cancelled));
    }
}
