//! Kubernetes integration module.
//!
//! This module reads pod state from the Kubernetes API and converts it into the
//! observations the classifier works on.
//!
//! The main components are:
//! - [`KubePodReader`]: Lists and watches pods for a subscription scope
//! - [`observation`]: Conversion from API pods and watch events

pub mod observation;
pub mod pod_reader;

pub use pod_reader::KubePodReader;

/// Upper bound the API server accepts for a watch's `timeoutSeconds`.
pub const MAX_WATCH_TIMEOUT_SECS: u64 = 290;
