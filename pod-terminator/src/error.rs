use kube::core::Status;
use pod_terminator_kubeapi::OAuthError;

/// Startup errors. Nothing past [`crate::connect`] propagates one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid API endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: http::uri::InvalidUri,
    },

    #[error("username/password login requires an API endpoint")]
    MissingEndpoint,

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("API server rejected the request ({}): {}", .0.code, .0.message)]
    Api(Box<Status>),

    #[error(transparent)]
    Kube(kube::Error),
}

impl ClusterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(status) if status.is_not_found())
    }
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(status) => Self::Api(status),
            other => Self::Kube(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

#[derive(Debug, thiserror::Error)]
#[error("invalid deletion timestamp {text:?}: {source}")]
pub struct TimestampError {
    pub text: String,
    pub source: time::error::Parse,
}
