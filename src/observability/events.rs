//! Security event logging.
//!
//! Structured audit logging for security-relevant events. Every
//! authentication decision, credential rejection, and user-record mutation
//! is recorded through [`security_event!`] with a consistent set of fields.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::observability::SecurityEvent;
//! use portcullis::security_event;
//!
//! security_event!(
//!     SecurityEvent::AuthenticationSuccess,
//!     user_id = %user.id,
//!     "User authenticated successfully"
//! );
//! ```

use std::fmt;

/// Security event categories for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    // Authentication events
    /// Successful user authentication
    AuthenticationSuccess,
    /// Failed authentication attempt
    AuthenticationFailure,
    /// Credential issued to an authenticated user
    CredentialIssued,
    /// Presented credential rejected
    CredentialRejected,

    // Authorization events
    /// Access granted to a protected route
    AccessGranted,
    /// Access denied at the gate
    AccessDenied,

    // User management events
    /// New user registered
    UserRegistered,
    /// User account modified
    UserModified,
    /// User account deleted
    UserDeleted,
    /// Password changed
    PasswordChanged,
}

impl SecurityEvent {
    /// Event category for filtering/grouping.
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess
            | Self::AuthenticationFailure
            | Self::CredentialIssued
            | Self::CredentialRejected => "authentication",

            Self::AccessGranted | Self::AccessDenied => "authorization",

            Self::UserRegistered
            | Self::UserModified
            | Self::UserDeleted
            | Self::PasswordChanged => "user_management",
        }
    }

    /// Severity level for the event.
    pub fn severity(&self) -> Severity {
        match self {
            Self::AuthenticationFailure | Self::CredentialRejected | Self::AccessDenied => {
                Severity::High
            }

            Self::AuthenticationSuccess
            | Self::UserRegistered
            | Self::UserModified
            | Self::UserDeleted
            | Self::PasswordChanged => Severity::Medium,

            Self::CredentialIssued | Self::AccessGranted => Severity::Low,
        }
    }

    /// Event name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::CredentialIssued => "credential_issued",
            Self::CredentialRejected => "credential_rejected",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::UserRegistered => "user_registered",
            Self::UserModified => "user_modified",
            Self::UserDeleted => "user_deleted",
            Self::PasswordChanged => "password_changed",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Log a security event with structured fields.
///
/// The macro automatically attaches `security_event`, `category`, and
/// `severity` fields and routes the record to the tracing level matching the
/// event's severity.
///
/// # Examples
///
/// ```ignore
/// security_event!(
///     SecurityEvent::AccessDenied,
///     reason = "expired",
///     "Credential rejected at the gate"
/// );
/// ```
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let severity = event.severity();
        let category = event.category();
        let event_name = event.name();

        match severity {
            $crate::observability::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::observability::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::observability::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}

pub use security_event;
