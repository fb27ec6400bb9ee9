use tracing::{debug, info, warn};

use crate::credentials::CredentialStore;
use crate::error::{Result, WatchError};
use crate::forge::TokenVerifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    Start,
    Prompting,
    Verifying(String),
    Persisting(String),
    Verified(String),
}

/// Masked interactive input.
#[cfg_attr(test, mockall::automock)]
pub trait TokenPrompt: Send + Sync {
    fn read_token(&self) -> Result<String>;
}

/// Reads the token from the controlling terminal without echo.
pub struct TerminalPrompt;

impl TokenPrompt for TerminalPrompt {
    fn read_token(&self) -> Result<String> {
        let token = rpassword::prompt_password("GitHub personal access token: ")?;
        Ok(token)
    }
}

/// Token bootstrap: read from the store, otherwise prompt, verify and persist.
///
/// Each transition is a separate [`Bootstrap::step`] so the machine can be
/// driven one state at a time. The store is read only in `Start` and written
/// only in `Persisting`, and no state leads back to either.
pub struct Bootstrap<'a> {
    store: &'a dyn CredentialStore,
    prompt: &'a dyn TokenPrompt,
    verifier: &'a dyn TokenVerifier,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        store: &'a dyn CredentialStore,
        prompt: &'a dyn TokenPrompt,
        verifier: &'a dyn TokenVerifier,
    ) -> Self {
        Self {
            store,
            prompt,
            verifier,
        }
    }

    pub async fn step(&self, state: BootstrapState) -> Result<BootstrapState> {
        match state {
            BootstrapState::Start => match self.store.read() {
                Ok(token) => {
                    debug!("using stored token");
                    Ok(BootstrapState::Verified(token))
                }
                Err(WatchError::CredentialNotFound) => {
                    info!("no stored token, prompting");
                    Ok(BootstrapState::Prompting)
                }
                Err(e) => Err(e),
            },
            BootstrapState::Prompting => {
                let token = self.prompt.read_token()?;
                if token.trim().is_empty() {
                    return Err(WatchError::NoTokenEntered);
                }
                Ok(BootstrapState::Verifying(token))
            }
            BootstrapState::Verifying(token) => match self.verifier.verify(&token).await {
                Ok(login) => {
                    info!(login = %login, "token verified");
                    Ok(BootstrapState::Persisting(token))
                }
                Err(e) => {
                    warn!(error = %e, "token verification failed");
                    Err(e)
                }
            },
            BootstrapState::Persisting(token) => {
                self.store.write(&token)?;
                debug!("token persisted");
                Ok(BootstrapState::Verified(token))
            }
            verified @ BootstrapState::Verified(_) => Ok(verified),
        }
    }

    pub async fn acquire_token(&self) -> Result<String> {
        let mut state = BootstrapState::Start;
        loop {
            state = match self.step(state).await? {
                BootstrapState::Verified(token) => return Ok(token),
                next => next,
            };
        }
    }
}
