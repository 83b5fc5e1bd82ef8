use super::*;

/// Performs the login handshake.
#[async_trait]
pub trait Authenticator: fmt::Debug + Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, AuthError>;

    async fn refresh_login(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        self.login(credentials).await
    }
}

#[async_trait]
impl Authenticator for OAuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        let token = self
            .request_token(&credentials.username, &credentials.password)
            .await?;
        Ok(token)
    }
}

/// The token currently in use.
#[derive(Debug)]
pub struct Session {
    token: SecretString,
    issued_at: OffsetDateTime,
    validity: Duration,
}

impl Session {
    pub fn new(token: AccessToken, issued_at: OffsetDateTime) -> Self {
        let AccessToken { token, expires_in } = token;
        Self {
            token,
            issued_at,
            validity: expires_in,
        }
    }

    pub fn issued_at(&self) -> OffsetDateTime {
        self.issued_at
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn age(&self, now: OffsetDateTime) -> time::Duration {
        now - self.issued_at
    }

    /// Renewal happens once half of the validity window has passed, so a
    /// token is replaced well before it expires.
    pub fn renewal_due(&self, now: OffsetDateTime) -> bool {
        self.age(now) > self.validity / 2
    }

    /// A copy of the token for handing to the cluster client.
    pub fn bearer_token(&self) -> SecretString {
        SecretString::from(self.token.expose_secret().to_owned())
    }
}

/// Owns the login session when username/password authentication is in use.
#[derive(Debug)]
pub struct CredentialManager {
    authenticator: Box<dyn Authenticator>,
    credentials: Credentials,
    session: Session,
}

impl CredentialManager {
    /// Logs in and starts a session. A failure here is final.
    pub async fn authenticate(
        authenticator: impl Authenticator + 'static,
        credentials: Credentials,
        clock: &impl Clock,
    ) -> Result<Self, AuthError> {
        let token = authenticator.login(&credentials).await?;
        let session = Session::new(token, clock.now());
        tracing::debug!(
            username = %credentials.username,
            validity = session.validity.as_secs(),
            "Obtained auth token"
        );
        Ok(Self {
            authenticator: Box::new(authenticator),
            credentials,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn renewal_due(&self, now: OffsetDateTime) -> bool {
        self.session.renewal_due(now)
    }

    /// Obtains a new session. The current one stays in effect until it is
    /// handed to [`Self::replace_session`].
    pub async fn renew(&self, clock: &impl Clock) -> Result<Session, AuthError> {
        let token = self.authenticator.refresh_login(&self.credentials).await?;
        let session = Session::new(token, clock.now());
        tracing::debug!(validity = session.validity.as_secs(), "Renewed auth token");
        Ok(session)
    }

    pub fn replace_session(&mut self, session: Session) {
        self.session = session;
    }
}
