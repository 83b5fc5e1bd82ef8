use super::*;

/// Username and password for an OpenShift OAuth login.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl ToString, password: impl Into<String>) -> Self {
        Self {
            username: username.to_string(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self::new(&self.username, self.password.expose_secret())
    }
}

/// Tunables read once at startup.
#[derive(Debug)]
pub struct RunConfig {
    /// API server URL; `None` falls back to the ambient configuration.
    pub api: Option<String>,
    /// When set, log in with these instead of using the ambient configuration.
    pub credentials: Option<Credentials>,
    /// `None` watches every namespace.
    pub namespace: Option<String>,
    /// Pods terminating for longer than this are force-deleted.
    pub max_age: Duration,
    pub cycle_delay: Duration,
    pub dry_run: bool,
    /// Skip TLS certificate verification for the login handshake and API
    /// requests made with the resulting token.
    pub insecure_skip_tls_verify: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api: None,
            credentials: None,
            namespace: None,
            max_age: Duration::from_secs(10),
            cycle_delay: Duration::from_secs(10),
            dry_run: false,
            insecure_skip_tls_verify: true,
        }
    }
}

impl RunConfig {
    pub fn api(&self) -> Option<&str> {
        self.api.as_deref().filter(|api| !api.is_empty())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    pub fn cluster_url(&self) -> Result<Option<http::Uri>, Error> {
        self.api()
            .map(|api| {
                api.parse::<http::Uri>()
                    .map_err(|source| Error::InvalidEndpoint {
                        endpoint: api.to_string(),
                        source,
                    })
            })
            .transpose()
    }
}
