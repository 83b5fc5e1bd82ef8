use super::*;

/// Outcome of a forced delete. Both are success from the caller's view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    AlreadyGone,
}

/// What the reconciliation loop needs from the cluster.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Lists pods in `namespace`, or cluster-wide for `None`.
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSnapshot>, ClusterError>;

    /// Deletes a pod with zero grace period and background propagation.
    /// A pod that no longer exists yields [`Deletion::AlreadyGone`].
    async fn force_delete_pod(&self, namespace: &str, name: &str)
        -> Result<Deletion, ClusterError>;

    /// Installs a fresh bearer token for subsequent requests.
    fn use_token(&mut self, token: SecretString) -> Result<(), ClusterError>;
}

#[async_trait]
impl ClusterClient for KubeApi {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSnapshot>, ClusterError> {
        let pods = Self::list_pods(self, namespace).await?;
        Ok(pods
            .iter()
            .map(|pod| PodSnapshot::from(&pod.metadata))
            .collect())
    }

    async fn force_delete_pod(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Deletion, ClusterError> {
        deletion_outcome(Self::force_delete_pod(self, namespace, name).await)
    }

    fn use_token(&mut self, token: SecretString) -> Result<(), ClusterError> {
        self.set_token(token).map_err(ClusterError::from)
    }
}

/// A not-found answer means the pod is already gone.
fn deletion_outcome(result: kube::Result<()>) -> Result<Deletion, ClusterError> {
    match result.map_err(ClusterError::from) {
        Ok(()) => Ok(Deletion::Deleted),
        Err(err) if err.is_not_found() => Ok(Deletion::AlreadyGone),
        Err(err) => Err(err),
    }
}
