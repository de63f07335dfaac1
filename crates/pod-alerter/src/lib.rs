pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export main modules
pub use domain::classifier;
pub use domain::scope;
pub use domain::session;
pub use domain::types;
pub use infrastructure::k8s;
pub use infrastructure::kube_client;
pub use infrastructure::webhook;
