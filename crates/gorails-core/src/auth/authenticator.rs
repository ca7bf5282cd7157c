use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResult, PlatformClient};

use super::{Credentials, SessionData, SessionStore};

/// What the user picked at the interactive prompt
#[derive(Debug)]
pub enum PromptChoice {
    Login(Credentials),
    /// A session cookie value copied from the browser
    Token(String),
}

/// Source of interactive input, kept behind a trait so the terminal is
/// only touched by the binary.
pub trait CredentialPrompt {
    /// False when nobody is there to answer (no terminal attached)
    fn is_interactive(&self) -> bool;

    /// Ask how to authenticate. `Ok(None)` means the user gave up.
    fn ask(&mut self) -> anyhow::Result<Option<PromptChoice>>;
}

/// Authentication inputs taken from the command line
#[derive(Debug, Clone, Default)]
pub struct AuthArgs {
    /// Explicit session cookie (`--token` / `GORAILS_SESSION`)
    pub token: Option<String>,
    /// Skip the stored session and authenticate again
    pub renew: bool,
}

pub struct Authenticator<'a> {
    client: &'a PlatformClient,
    store: &'a SessionStore,
}

impl<'a> Authenticator<'a> {
    pub fn new(client: &'a PlatformClient, store: &'a SessionStore) -> Self {
        Self { client, store }
    }

    /// Log in with credentials and persist the resulting session
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<SessionData> {
        if !credentials.is_complete() {
            return Err(ApiError::Auth("email and password are required".to_string()));
        }
        let session = self.client.login(credentials).await?;
        self.persist(&session);
        Ok(session)
    }

    /// Wrap a pre-supplied token. It is checked on first use, not here.
    ///
    /// A value copied as `name=value` from the browser is reduced to the value.
    pub fn from_token(&self, token: &str) -> ApiResult<SessionData> {
        let mut token = token.trim();
        if let Some(value) = token
            .strip_prefix(self.client.cookie_name())
            .and_then(|rest| rest.strip_prefix('='))
        {
            token = value.split(';').next().unwrap_or_default().trim();
        }
        if token.is_empty() {
            return Err(ApiError::Auth("session token is empty".to_string()));
        }
        Ok(SessionData::new(token))
    }

    /// Pick a session: explicit token, then stored session, then the prompt.
    pub async fn resolve(
        &self,
        args: &AuthArgs,
        prompt: &mut dyn CredentialPrompt,
    ) -> ApiResult<SessionData> {
        if let Some(ref token) = args.token {
            debug!("Using session token from arguments");
            return self.from_token(token);
        }

        if !args.renew {
            match self.store.load() {
                Ok(Some(session)) => {
                    debug!(path = %self.store.path().display(), "Using stored session");
                    return Ok(session);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Could not load stored session"),
            }
        }

        if !prompt.is_interactive() {
            return Err(ApiError::Auth(
                "no session available; pass --token or run `gorails-dl auth` in a terminal"
                    .to_string(),
            ));
        }

        let choice = prompt
            .ask()
            .map_err(|e| ApiError::Auth(format!("could not read input: {}", e)))?;

        match choice {
            Some(PromptChoice::Login(credentials)) => self.login(&credentials).await,
            Some(PromptChoice::Token(token)) => {
                let session = self.from_token(&token)?;
                self.persist(&session);
                Ok(session)
            }
            None => Err(ApiError::Auth("authentication cancelled".to_string())),
        }
    }

    fn persist(&self, session: &SessionData) {
        match self.store.save(session) {
            Ok(()) => info!(path = %self.store.path().display(), "Session saved"),
            Err(e) => warn!(error = %e, "Failed to save session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scrape::GoRailsMarkup;
    use std::sync::Arc;
    use url::Url;

    /// Fails the test if consulted
    struct NoPrompt;

    impl CredentialPrompt for NoPrompt {
        fn is_interactive(&self) -> bool {
            panic!("prompt should not be consulted");
        }

        fn ask(&mut self) -> anyhow::Result<Option<PromptChoice>> {
            panic!("prompt should not be consulted");
        }
    }

    struct Detached;

    impl CredentialPrompt for Detached {
        fn is_interactive(&self) -> bool {
            false
        }

        fn ask(&mut self) -> anyhow::Result<Option<PromptChoice>> {
            panic!("detached prompt must not be asked");
        }
    }

    struct PasteToken(&'static str);

    impl CredentialPrompt for PasteToken {
        fn is_interactive(&self) -> bool {
            true
        }

        fn ask(&mut self) -> anyhow::Result<Option<PromptChoice>> {
            Ok(Some(PromptChoice::Token(self.0.to_string())))
        }
    }

    fn setup(dir: &tempfile::TempDir) -> (PlatformClient, SessionStore) {
        let path = dir.path().join("session.json");
        let config = Config::new(Url::parse("https://gorails.com").unwrap(), path.clone());
        let client = PlatformClient::new(&config, Arc::new(GoRailsMarkup)).unwrap();
        (client, SessionStore::new(path))
    }

    #[tokio::test]
    async fn test_stored_session_wins_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);
        let stored = SessionData::new("stored-token");
        store.save(&stored).unwrap();

        let auth = Authenticator::new(&client, &store);
        let session = auth.resolve(&AuthArgs::default(), &mut NoPrompt).await.unwrap();
        assert_eq!(session, stored);
    }

    #[tokio::test]
    async fn test_explicit_token_beats_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);
        store.save(&SessionData::new("stored-token")).unwrap();

        let auth = Authenticator::new(&client, &store);
        let args = AuthArgs {
            token: Some(" cli-token ".to_string()),
            renew: false,
        };
        let session = auth.resolve(&args, &mut NoPrompt).await.unwrap();
        assert_eq!(session.token, "cli-token");
        // Explicit tokens are not persisted
        assert_eq!(store.load().unwrap().unwrap().token, "stored-token");
    }

    #[tokio::test]
    async fn test_no_session_without_terminal_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);

        let auth = Authenticator::new(&client, &store);
        let err = auth
            .resolve(&AuthArgs::default(), &mut Detached)
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_pasted_token_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);

        let auth = Authenticator::new(&client, &store);
        let session = auth
            .resolve(&AuthArgs::default(), &mut PasteToken("pasted"))
            .await
            .unwrap();
        assert_eq!(session.token, "pasted");
        assert_eq!(store.load().unwrap().unwrap().token, "pasted");
    }

    #[tokio::test]
    async fn test_renew_skips_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);
        store.save(&SessionData::new("old")).unwrap();

        let auth = Authenticator::new(&client, &store);
        let args = AuthArgs {
            token: None,
            renew: true,
        };
        let session = auth.resolve(&args, &mut PasteToken("new")).await.unwrap();
        assert_eq!(session.token, "new");
    }

    #[test]
    fn test_from_token_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);
        let auth = Authenticator::new(&client, &store);
        assert!(auth.from_token("   ").is_err());
        assert!(auth.from_token("_gorails_session=").is_err());
    }

    #[test]
    fn test_from_token_strips_cookie_name() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);
        let auth = Authenticator::new(&client, &store);

        let session = auth.from_token("_gorails_session=abc").unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.cookie_header("_gorails_session"), "_gorails_session=abc");

        let session = auth.from_token(" _gorails_session=abc; path=/ ").unwrap();
        assert_eq!(session.token, "abc");

        // Only the exact cookie name is stripped
        let session = auth.from_token("other=abc").unwrap();
        assert_eq!(session.token, "other=abc");
    }

    #[tokio::test]
    async fn test_pasted_cookie_pair_is_stored_as_value() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);

        let auth = Authenticator::new(&client, &store);
        auth.resolve(&AuthArgs::default(), &mut PasteToken("_gorails_session=pasted"))
            .await
            .unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "pasted");
    }

    #[tokio::test]
    async fn test_login_requires_complete_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = setup(&dir);
        let auth = Authenticator::new(&client, &store);
        let err = auth.login(&Credentials::new("", "pw")).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }
}
