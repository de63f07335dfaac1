//! Core watch logic, independent of the Kubernetes client and the webhook transport.

pub mod classifier;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod scope;
pub mod session;
pub mod traits;
pub mod types;
