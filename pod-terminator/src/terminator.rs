use super::*;

/// What happened during one reconciliation cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub pods: usize,
    pub candidates: usize,
    pub overdue: usize,
    pub deleted: usize,
    pub already_gone: usize,
    pub failed: usize,
    pub list_failed: bool,
    pub token_renewed: bool,
    pub interrupted: bool,
}

/// `age` must strictly exceed `max_age`; a pod exactly at the threshold is
/// left alone for another cycle.
pub fn is_overdue(age: time::Duration, max_age: Duration) -> bool {
    age > max_age
}

/// The reconciliation loop: list, evaluate, force-delete, renew, sleep.
#[derive(Debug)]
pub struct Terminator<'a, C, K = SystemClock> {
    config: &'a RunConfig,
    client: &'a mut C,
    credentials: Option<&'a mut CredentialManager>,
    clock: K,
    shutdown: CancellationToken,
}

impl<'a, C, K> Terminator<'a, C, K>
where
    C: ClusterClient,
    K: Clock,
{
    pub fn new(
        config: &'a RunConfig,
        client: &'a mut C,
        credentials: Option<&'a mut CredentialManager>,
        clock: K,
    ) -> Self {
        Self {
            config,
            client,
            credentials,
            clock,
            shutdown: CancellationToken::new(),
        }
    }

    /// Runs cycles until `shutdown` is cancelled.
    ///
    /// Cancellation is observed between the steps of a cycle and while
    /// sleeping. A request already sent to the cluster is never aborted.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        self.shutdown = shutdown;
        tracing::info!(
            namespace = self.config.namespace().unwrap_or("<all>"),
            max_seconds = self.config.max_age.as_secs(),
            cycle_delay = self.config.cycle_delay.as_secs(),
            dry_run = self.config.dry_run,
            "Starting reconciliation loop"
        );

        while !self.shutdown.is_cancelled() {
            let report = self.reconcile_once().await;
            tracing::debug!(?report, "Cycle finished");

            tokio::select! {
                () = self.shutdown.cancelled() => break,
                () = tokio::time::sleep(self.config.cycle_delay) => {}
            }
        }

        tracing::info!("Reconciliation loop stopped");
    }

    /// One pass over the cluster. Cluster errors are logged, never returned.
    pub async fn reconcile_once(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let namespace = self.config.namespace();

        match self.client.list_pods(namespace).await {
            Ok(pods) => self.terminate_overdue(&pods, &mut report).await,
            Err(err) => {
                report.list_failed = true;
                tracing::error!(
                    namespace = namespace.unwrap_or("<all>"),
                    %err,
                    "Failed to list pods"
                );
            }
        }

        if self.interrupted(&mut report) {
            return report;
        }
        report.token_renewed = self.renew_credentials().await;
        report
    }

    async fn terminate_overdue(&self, pods: &[PodSnapshot], report: &mut CycleReport) {
        let now = self.clock.now();
        let max_age = self.config.max_age;
        report.pods = pods.len();
        tracing::info!(total = pods.len(), "Found pods");

        for pod in pods {
            let candidate = match pod.termination_candidate() {
                None => continue,
                Some(Ok(candidate)) => candidate,
                Some(Err(err)) => {
                    tracing::warn!(%pod, %err, "Skipping pod with unreadable deletion timestamp");
                    continue;
                }
            };
            report.candidates += 1;

            let age = candidate.age(now);
            tracing::info!(
                %pod,
                age = age.as_seconds_f64(),
                threshold = max_age.as_secs(),
                "Found pod in Terminating state"
            );
            if !is_overdue(age, max_age) {
                continue;
            }

            report.overdue += 1;
            tracing::warn!(%pod, "Found pod to be terminated");
            if self.config.dry_run {
                continue;
            }
            if self.interrupted(report) {
                return;
            }

            tracing::warn!(%pod, "Deleting pod");
            match self.client.force_delete_pod(&pod.namespace, &pod.name).await {
                Ok(Deletion::Deleted) => report.deleted += 1,
                Ok(Deletion::AlreadyGone) => {
                    report.already_gone += 1;
                    tracing::info!(%pod, "Pod was already gone");
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::error!(%pod, %err, "Failed to delete pod");
                }
            }
        }

        tracing::info!(
            candidates = report.candidates,
            overdue = report.overdue,
            deleted = report.deleted,
            "Finished evaluating terminating pods"
        );
    }

    fn interrupted(&self, report: &mut CycleReport) -> bool {
        if self.shutdown.is_cancelled() && !report.interrupted {
            report.interrupted = true;
            tracing::info!("Shutdown requested, abandoning the rest of the cycle");
        }
        report.interrupted
    }

    /// Renews the token once half its validity has elapsed. Returns whether a
    /// new token was installed. The renewed session only replaces the current
    /// one after the client has accepted its token.
    async fn renew_credentials(&mut self) -> bool {
        let Some(credentials) = self.credentials.as_deref_mut() else {
            return false;
        };
        let now = self.clock.now();
        if !credentials.renewal_due(now) {
            return false;
        }

        tracing::warn!(
            token_age = credentials.session().age(now).whole_seconds(),
            validity = credentials.session().validity().as_secs(),
            "Renewing token"
        );
        let session = match credentials.renew(&self.clock).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(%err, "Failed to renew token, keeping the current one");
                return false;
            }
        };

        match self.client.use_token(session.bearer_token()) {
            Ok(()) => {
                credentials.replace_session(session);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "Failed to install renewed token, keeping the current one");
                false
            }
        }
    }
}
