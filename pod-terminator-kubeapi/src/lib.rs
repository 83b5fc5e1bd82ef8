use std::fmt::Debug;

use constcat::concat;
use kube::api;
use pod_terminator_ext as k8s;
use secrecy::SecretString;

use k8s::corev1;

pub use oauth::AccessToken;
pub use oauth::OAuthClient;
pub use oauth::OAuthError;

mod oauth;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct KubeApi {
    list_params: api::ListParams,
    delete_params: api::DeleteParams,
    config: kube::Config,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi from the ambient configuration (kubeconfig or
    /// in-cluster service account), optionally pointed at another API server.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = pod_terminator_kubeapi::KubeApi::new(None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(cluster_url: Option<http::Uri>) -> kube::Result<Self> {
        let mut config = kube::Config::infer()
            .await
            .map_err(kube::Error::InferConfig)?;
        if let Some(cluster_url) = cluster_url {
            config.cluster_url = cluster_url;
        }
        Self::with_config(config)
    }

    /// Create a KubeApi that authenticates with a bearer token obtained from
    /// an OAuth login.
    pub fn with_token(
        cluster_url: http::Uri,
        token: SecretString,
        accept_invalid_certs: bool,
    ) -> kube::Result<Self> {
        let mut config = kube::Config::new(cluster_url);
        config.accept_invalid_certs = accept_invalid_certs;
        config.auth_info.token = Some(token);
        Self::with_config(config)
    }

    fn with_config(config: kube::Config) -> kube::Result<Self> {
        let client = kube::Client::try_from(config.clone())?;
        Ok(Self {
            list_params: api::ListParams::default(),
            delete_params: force_delete_params(),
            config,
            client,
        })
    }

    /// Swap the bearer token used for every subsequent request.
    pub fn set_token(&mut self, token: SecretString) -> kube::Result<()> {
        let mut config = self.config.clone();
        config.auth_info.token = Some(token);
        self.client = kube::Client::try_from(config.clone())?;
        self.config = config;
        Ok(())
    }

    /// Lists metadata for the Pods in `namespace`, or in every namespace
    /// when `namespace` is `None`.
    pub async fn list_pods(
        &self,
        namespace: Option<&str>,
    ) -> kube::Result<Vec<api::PartialObjectMeta<corev1::Pod>>> {
        let lp = self.list_params();
        self.pods(namespace)
            .list_metadata(lp)
            .await
            .map(|list| list.items)
    }

    /// Deletes a Pod immediately: zero grace period, background propagation.
    ///
    /// The API server returns once the request is accepted; it finalizes the
    /// removal on its own.
    pub async fn force_delete_pod(&self, namespace: &str, name: &str) -> kube::Result<()> {
        let dp = self.delete_params();
        self.pods(Some(namespace))
            .delete(name, dp)
            .await
            .map(|_| ())
    }

    pub fn cluster_url(&self) -> &http::Uri {
        &self.config.cluster_url
    }

    fn pods(&self, namespace: Option<&str>) -> api::Api<corev1::Pod> {
        match namespace {
            Some(namespace) => api::Api::namespaced(self.client.clone(), namespace),
            None => api::Api::all(self.client.clone()),
        }
    }

    fn list_params(&self) -> &api::ListParams {
        &self.list_params
    }

    fn delete_params(&self) -> &api::DeleteParams {
        &self.delete_params
    }
}

fn force_delete_params() -> api::DeleteParams {
    api::DeleteParams {
        grace_period_seconds: Some(0),
        propagation_policy: Some(api::PropagationPolicy::Background),
        ..k8s::default()
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging while redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("cluster_url", &self.config.cluster_url)
            .field("list_params", &self.list_params)
            .field("delete_params", &self.delete_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
