use std::fmt;
use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;
use tracing::debug;
use tracing::info;

use crate::domain::error::ClusterError;

/// A place Kubernetes credentials can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Service account mounted into the pod this process runs in.
    InCluster,
    /// A kubeconfig file, either at `path` or at the default location.
    Kubeconfig {
        path: Option<PathBuf>,
        context: Option<String>,
    },
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::InCluster => write!(f, "in-cluster"),
            CredentialSource::Kubeconfig { path, context } => {
                match path {
                    Some(path) => write!(f, "kubeconfig {}", path.display())?,
                    None => write!(f, "default kubeconfig")?,
                }
                match context {
                    Some(context) => write!(f, " (context {context})"),
                    None => write!(f, " (current context)"),
                }
            }
        }
    }
}

impl CredentialSource {
    /// In-cluster credentials first, then the kubeconfig addressed by `context`.
    pub fn default_chain(kubeconfig: Option<PathBuf>, context: Option<String>) -> Vec<Self> {
        vec![
            CredentialSource::InCluster,
            CredentialSource::Kubeconfig {
                path: kubeconfig,
                context,
            },
        ]
    }

    async fn load(&self) -> Result<Config, Report<ClusterError>> {
        match self {
            CredentialSource::InCluster => load_in_cluster(),
            CredentialSource::Kubeconfig { path, context } => {
                load_kubeconfig(path.as_deref(), context.clone()).await
            }
        }
    }
}

fn load_in_cluster() -> Result<Config, Report<ClusterError>> {
    let auth_error = ClusterError::Auth {
        message: "in-cluster configuration unavailable".to_string(),
    };
    Config::incluster().change_context(auth_error)
}

async fn load_kubeconfig(
    path: Option<&Path>,
    context: Option<String>,
) -> Result<Config, Report<ClusterError>> {
    let options = KubeConfigOptions {
        context,
        ..Default::default()
    };

    let Some(path) = path else {
        let auth_error = ClusterError::Auth {
            message: "Failed to load default kubeconfig".to_string(),
        };
        return Config::from_kubeconfig(&options).await.change_context(auth_error);
    };

    let read_error = ClusterError::Auth {
        message: format!("Failed to read kubeconfig file: {}", path.display()),
    };
    let kubeconfig = Kubeconfig::read_from(path).change_context(read_error)?;

    let config_error = ClusterError::Auth {
        message: format!(
            "Failed to create config from kubeconfig: {}",
            path.display()
        ),
    };
    Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .change_context(config_error)
}

/// Build a client from the first credential source that yields one.
///
/// A source whose configuration loads but whose client cannot be built counts as
/// failed like any other, and the next source is tried.
///
/// # Errors
///
/// - [`ClusterError::Auth`] carrying every source's failure if none succeeds
pub async fn init_kube_client(
    sources: &[CredentialSource],
) -> Result<Client, Report<ClusterError>> {
    first_available(sources, connect).await
}

async fn connect(source: &CredentialSource) -> Result<Client, Report<ClusterError>> {
    let config = source.load().await?;
    info!("Loaded {source} configuration for {}", config.cluster_url);
    let build_error = ClusterError::Auth {
        message: format!("Failed to create Kubernetes client from {source}"),
    };
    Client::try_from(config).change_context(build_error)
}

async fn first_available<'a, T, F, Fut>(
    sources: &'a [CredentialSource],
    mut attempt: F,
) -> Result<T, Report<ClusterError>>
where
    F: FnMut(&'a CredentialSource) -> Fut,
    Fut: Future<Output = Result<T, Report<ClusterError>>>,
{
    let mut failures: Option<Report<ClusterError>> = None;

    for source in sources {
        match attempt(source).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!("Credential source {source} unavailable: {e:?}");
                match failures.as_mut() {
                    Some(failures) => failures.extend_one(e),
                    None => failures = Some(e),
                }
            }
        }
    }

    let message = "No credential source produced a Kubernetes client".to_string();
    Err(match failures {
        Some(failures) => failures.change_context(ClusterError::Auth { message }),
        None => Report::new(ClusterError::Auth { message }),
    })
}
