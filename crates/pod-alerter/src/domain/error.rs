//! Error taxonomy for watch sessions.
//!
//! None of these escape a session: the watch loop logs them and waits for
//! the next trigger.

use core::error::Error;

/// Errors raised while reading pod state from the cluster.
#[derive(Debug, derive_more::Display)]
pub enum ClusterError {
    /// No credential source produced a usable client, or the API rejected it.
    #[display("Kubernetes authentication failed: {message}")]
    Auth { message: String },
    /// The connection or watch stream broke.
    #[display("Kubernetes stream failed: {message}")]
    Stream { message: String },
    /// A single event could not be decoded; the stream itself is still healthy.
    #[display("Malformed pod event: {message}")]
    MalformedEvent { message: String },
}

impl Error for ClusterError {}

/// Errors raised while delivering a notification.
#[derive(Debug, derive_more::Display)]
pub enum SinkError {
    #[display("Failed to deliver notification: {message}")]
    Delivery { message: String },
    #[display("Invalid notification sink configuration: {message}")]
    Configuration { message: String },
}

impl Error for SinkError {}
