use chrono::{DateTime, Utc};
use std::fmt;

use crate::transport::TransportResponse;

/// A serialized document waiting to be sent. The dispatcher only reads it.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    payload: Vec<u8>,
    label: String,
    submitted_at: DateTime<Utc>,
}

impl PendingRequest {
    pub fn new(payload: Vec<u8>, label: impl Into<String>) -> Self {
        Self {
            payload,
            label: label.into(),
            submitted_at: Utc::now(),
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Used for reporting only.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Terminal outcome of one submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    /// The endpoint answered with a 2xx status.
    Accepted,
    /// The endpoint answered with any other status.
    Rejected(u16),
    /// No response was received.
    TransportFailure(String),
}

impl CompletionResult {
    pub fn from_response(response: &TransportResponse) -> Self {
        if response.is_success() {
            CompletionResult::Accepted
        } else {
            CompletionResult::Rejected(response.status)
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, CompletionResult::Accepted)
    }
}

impl fmt::Display for CompletionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionResult::Accepted => write!(f, "accepted"),
            CompletionResult::Rejected(status) => write!(f, "rejected with status {}", status),
            CompletionResult::TransportFailure(cause) => write!(f, "transport failure: {}", cause),
        }
    }
}

/// Lifecycle of a request inside the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    InFlight,
    Accepted,
    Rejected,
    TransportFailure,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Accepted | RequestState::Rejected | RequestState::TransportFailure
        )
    }

    /// Terminal states have no outgoing transitions.
    pub fn can_transition_to(self, next: RequestState) -> bool {
        match self {
            RequestState::Pending => next == RequestState::InFlight,
            RequestState::InFlight => next.is_terminal(),
            _ => false,
        }
    }
}

impl From<&CompletionResult> for RequestState {
    fn from(result: &CompletionResult) -> Self {
        match result {
            CompletionResult::Accepted => RequestState::Accepted,
            CompletionResult::Rejected(_) => RequestState::Rejected,
            CompletionResult::TransportFailure(_) => RequestState::TransportFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> TransportResponse {
        TransportResponse { status, body: String::new() }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(CompletionResult::from_response(&response(200)), CompletionResult::Accepted);
        assert_eq!(CompletionResult::from_response(&response(201)), CompletionResult::Accepted);
        assert_eq!(CompletionResult::from_response(&response(500)), CompletionResult::Rejected(500));
        assert_eq!(CompletionResult::from_response(&response(302)), CompletionResult::Rejected(302));
        assert_eq!(CompletionResult::from_response(&response(429)), CompletionResult::Rejected(429));
    }

    #[test]
    fn test_state_machine_transitions() {
        use RequestState::*;

        assert!(Pending.can_transition_to(InFlight));
        assert!(!Pending.can_transition_to(Accepted));
        for terminal in [Accepted, Rejected, TransportFailure] {
            assert!(InFlight.can_transition_to(terminal));
            assert!(terminal.is_terminal());
            for next in [Pending, InFlight, Accepted, Rejected, TransportFailure] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_pending_request_is_read_only_view() {
        let request = PendingRequest::new(b"{}".to_vec(), "doc-1");
        assert_eq!(request.payload(), b"{}");
        assert_eq!(request.label(), "doc-1");
        assert!(request.submitted_at() <= Utc::now());
    }
}
