//! Error classification and user-facing messages.

use strum::Display;

/// Shown when no response was received (offline, DNS, timeout).
pub const CONNECTIVITY_MESSAGE: &str = "Network error. Please check your connection.";

/// Shown when the server responded with an error but no message.
pub const GENERIC_API_MESSAGE: &str = "An error occurred";

/// Shown for failures that never reached the network layer.
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Broad error category used for logging and UI routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Storage,
}
