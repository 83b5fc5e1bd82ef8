use std::collections::HashSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use kube::core::Status;
use pod_terminator_kubeapi::OAuthError;

use super::*;

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    pub(crate) fn new(now: OffsetDateTime) -> Self {
        let now = Arc::new(Mutex::new(now));
        Self { now }
    }

    pub(crate) fn advance(&self, by: time::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap()
    }
}

/// In-memory cluster that records every call made against it.
#[derive(Debug, Default)]
pub(crate) struct FakeCluster {
    pods: Vec<PodSnapshot>,
    already_gone: HashSet<String>,
    failing_delete: HashSet<String>,
    failing_list: bool,
    failing_token: bool,
    cancel_after: Option<(usize, CancellationToken)>,
    cancel_on_delete: Option<CancellationToken>,
    listed: Mutex<Vec<Option<String>>>,
    deleted: Mutex<Vec<String>>,
    tokens: Vec<String>,
}

impl FakeCluster {
    pub(crate) fn with_pods(pods: impl IntoIterator<Item = PodSnapshot>) -> Self {
        Self {
            pods: pods.into_iter().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn already_gone(mut self, pod: &str) -> Self {
        self.already_gone.insert(pod.to_string());
        self
    }

    pub(crate) fn failing_delete(mut self, pod: &str) -> Self {
        self.failing_delete.insert(pod.to_string());
        self
    }

    pub(crate) fn failing_list(self) -> Self {
        Self {
            failing_list: true,
            ..self
        }
    }

    pub(crate) fn failing_token(self) -> Self {
        Self {
            failing_token: true,
            ..self
        }
    }

    /// Cancel `shutdown` when the `cycles`th listing is made.
    pub(crate) fn cancel_after(self, cycles: usize, shutdown: CancellationToken) -> Self {
        Self {
            cancel_after: Some((cycles, shutdown)),
            ..self
        }
    }

    /// Cancel `shutdown` while the first delete is in flight.
    pub(crate) fn cancel_on_delete(self, shutdown: CancellationToken) -> Self {
        Self {
            cancel_on_delete: Some(shutdown),
            ..self
        }
    }

    pub(crate) fn listed(&self) -> Vec<Option<String>> {
        self.listed.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn tokens(&self) -> Vec<String> {
        self.tokens.clone()
    }
}

fn api_error(code: u16, reason: &str, message: &str) -> ClusterError {
    ClusterError::Api(Status::failure(message, reason).with_code(code).boxed())
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSnapshot>, ClusterError> {
        let cycle = {
            let mut listed = self.listed.lock().unwrap();
            listed.push(namespace.map(ToString::to_string));
            listed.len()
        };
        if let Some((cycles, shutdown)) = &self.cancel_after {
            if cycle >= *cycles {
                shutdown.cancel();
            }
        }

        if self.failing_list {
            return Err(api_error(503, "ServiceUnavailable", "service unavailable"));
        }

        Ok(self
            .pods
            .iter()
            .filter(|pod| namespace.is_none_or(|ns| pod.namespace == ns))
            .cloned()
            .collect())
    }

    async fn force_delete_pod(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Deletion, ClusterError> {
        let pod = format!("{namespace}/{name}");
        self.deleted.lock().unwrap().push(pod.clone());
        if let Some(shutdown) = &self.cancel_on_delete {
            shutdown.cancel();
        }

        if self.failing_delete.contains(&pod) {
            Err(api_error(500, "InternalError", "internal error"))
        } else if self.already_gone.contains(&pod) {
            Ok(Deletion::AlreadyGone)
        } else {
            Ok(Deletion::Deleted)
        }
    }

    fn use_token(&mut self, token: SecretString) -> Result<(), ClusterError> {
        if self.failing_token {
            return Err(ClusterError::Kube(kube::Error::TlsRequired));
        }
        self.tokens.push(token.expose_secret().to_string());
        Ok(())
    }
}

/// Hands out `token-1`, `token-2`, ... on each successful login.
#[derive(Debug)]
pub(crate) struct FakeAuthenticator {
    validity: Duration,
    logins: AtomicUsize,
    reject: bool,
    fail_refresh: bool,
}

impl FakeAuthenticator {
    pub(crate) fn new(validity: Duration) -> Self {
        Self {
            validity,
            logins: AtomicUsize::new(0),
            reject: false,
            fail_refresh: false,
        }
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::new(Duration::from_secs(60))
        }
    }

    pub(crate) fn failing_refresh(self) -> Self {
        Self {
            fail_refresh: true,
            ..self
        }
    }
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn login(&self, _credentials: &Credentials) -> Result<AccessToken, AuthError> {
        if self.reject {
            return Err(OAuthError::Unauthorized.into());
        }
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken {
            token: SecretString::from(format!("token-{n}")),
            expires_in: self.validity,
        })
    }

    async fn refresh_login(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        if self.fail_refresh {
            let status = http::StatusCode::SERVICE_UNAVAILABLE;
            return Err(OAuthError::UnexpectedStatus(status).into());
        }
        self.login(credentials).await
    }
}
