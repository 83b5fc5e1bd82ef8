use std::convert::Infallible;

use clap::ArgAction;
use pod_terminator::Credentials;
use pod_terminator::RunConfig;
use time::ext::NumericalStdDuration as _;

/// Force-deletes pods that have been stuck in Terminating for too long.
#[derive(Debug, clap::Parser)]
#[command(name = "pod-terminator", version, about)]
pub(crate) struct Args {
    /// Cluster API server URL. Empty uses the local kubeconfig or the
    /// in-cluster service account.
    #[arg(long, env = "API", default_value = "")]
    api: String,

    /// Log in with this user instead of the ambient configuration
    /// (OpenShift OAuth).
    #[arg(long, env = "USERNAME", default_value = "")]
    username: String,

    #[arg(long, env = "PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Force-delete pods terminating for longer than this many seconds.
    #[arg(long, env = "MAX_SECONDS", default_value_t = 10)]
    max_seconds: u64,

    /// Restrict to one namespace. Empty watches all namespaces.
    #[arg(long, env = "NAMESPACE", default_value = "")]
    namespace: String,

    /// Seconds to sleep between cycles.
    #[arg(long, env = "CYCLE_DELAY", default_value_t = 10)]
    cycle_delay: u64,

    /// Report overdue pods without deleting them ("true" or "yes").
    #[arg(long, env = "DRY_RUN", default_value = "false", value_parser = parse_flag, action = ArgAction::Set)]
    dry_run: bool,

    /// Skip TLS certificate verification for login and API requests.
    #[arg(long, env = "INSECURE_SKIP_TLS_VERIFY", default_value = "true", value_parser = parse_flag, action = ArgAction::Set)]
    insecure_skip_tls_verify: bool,
}

impl Args {
    pub(crate) fn into_run_config(self) -> RunConfig {
        let credentials =
            (!self.username.is_empty()).then(|| Credentials::new(self.username, self.password));
        RunConfig {
            api: Some(self.api).filter(|api| !api.is_empty()),
            credentials,
            namespace: Some(self.namespace).filter(|ns| !ns.is_empty()),
            max_age: self.max_seconds.std_seconds(),
            cycle_delay: self.cycle_delay.std_seconds(),
            dry_run: self.dry_run,
            insecure_skip_tls_verify: self.insecure_skip_tls_verify,
        }
    }
}

/// `true` and `yes` in any case; everything else is `false`.
fn parse_flag(value: &str) -> Result<bool, Infallible> {
    Ok(value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes"))
}
