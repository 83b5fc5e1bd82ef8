use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use pod_terminator_ext as k8s;
use pod_terminator_kubeapi::KubeApi;
use pod_terminator_kubeapi::OAuthClient;
use secrecy::ExposeSecret as _;
use secrecy::SecretString;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use k8s::metav1;
use k8s::ObjectMetaExt as _;

pub use clock::Clock;
pub use clock::SystemClock;
pub use cluster::ClusterClient;
pub use cluster::Deletion;
pub use config::Credentials;
pub use config::RunConfig;
pub use error::AuthError;
pub use error::ClusterError;
pub use error::Error;
pub use error::TimestampError;
pub use pod::parse_deletion_timestamp;
pub use pod::PodSnapshot;
pub use pod::TerminationCandidate;
pub use pod_terminator_kubeapi::AccessToken;
pub use session::Authenticator;
pub use session::CredentialManager;
pub use session::Session;
pub use terminator::is_overdue;
pub use terminator::CycleReport;
pub use terminator::Terminator;

mod clock;
mod cluster;
mod config;
mod error;
mod pod;
mod session;
mod terminator;

#[cfg(test)]
mod testing;

/// Builds the cluster client described by `config`.
///
/// With credentials configured this logs in first and hands the resulting
/// token to the client; otherwise the ambient kubeconfig or in-cluster
/// configuration is used and no [`CredentialManager`] is returned.
pub async fn connect(
    config: &RunConfig,
    clock: &impl Clock,
) -> Result<(KubeApi, Option<CredentialManager>), Error> {
    let cluster_url = config.cluster_url()?;
    let Some(credentials) = &config.credentials else {
        let client = KubeApi::new(cluster_url)
            .await
            .map_err(ClusterError::from)?;
        tracing::info!(cluster = %client.cluster_url(), "Using ambient cluster configuration");
        return Ok((client, None));
    };

    let (Some(endpoint), Some(cluster_url)) = (config.api(), cluster_url) else {
        return Err(Error::MissingEndpoint);
    };
    let oauth = OAuthClient::new(endpoint, config.insecure_skip_tls_verify).map_err(AuthError::from)?;
    let manager = CredentialManager::authenticate(oauth, credentials.clone(), clock).await?;
    let client = KubeApi::with_token(
        cluster_url,
        manager.session().bearer_token(),
        config.insecure_skip_tls_verify,
    )
    .map_err(ClusterError::from)?;
    tracing::info!(
        cluster = %client.cluster_url(),
        username = %credentials.username,
        "Logged in with username and password"
    );
    Ok((client, Some(manager)))
}
