//! In-process email/password identity provider.
//!
//! Holds one signed-in user for the whole process and publishes every change on a watch
//! channel. Passwords are stored as salted SHA-256 digests.

use super::{AuthState, GatewayError, GatewayResult, IdentityGateway, User};
use crate::constants::DEFAULT_MIN_PASSWORD_LEN;
use async_trait::async_trait;
use rx_types::EmailAddress;
use rx_uuid::RecordId;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

const INVALID_EMAIL: &str = "Invalid email format.";
const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const EMAIL_TAKEN: &str = "This email is already registered.";

struct Account {
    uid: String,
    salt: [u8; 16],
    digest: String,
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct InMemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    state: watch::Sender<AuthState>,
    min_password_len: usize,
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LEN)
    }
}

impl InMemoryIdentity {
    pub fn new(min_password_len: usize) -> Self {
        // There is no persisted session to restore, so the first snapshot is already resolved.
        let (state, _) = watch::channel(AuthState::signed_out());
        Self {
            accounts: RwLock::new(HashMap::new()),
            state,
            min_password_len,
        }
    }

    fn publish(&self, next: AuthState) {
        self.state.send_replace(next);
    }
}

#[async_trait]
impl IdentityGateway for InMemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<User> {
        let email = EmailAddress::parse(email).map_err(|_| GatewayError::new(INVALID_EMAIL))?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email.as_str())
            .filter(|a| digest(&a.salt, password) == a.digest)
            .ok_or_else(|| GatewayError::new(INVALID_CREDENTIALS))?;

        let user = User {
            uid: account.uid.clone(),
            email: email.as_str().to_owned(),
        };
        drop(accounts);

        tracing::info!(uid = %user.uid, "signed in");
        self.publish(AuthState::signed_in(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<User> {
        let email = EmailAddress::parse(email).map_err(|_| GatewayError::new(INVALID_EMAIL))?;
        if password.chars().count() < self.min_password_len {
            return Err(GatewayError::new(format!(
                "Password should be at least {} characters.",
                self.min_password_len
            )));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email.as_str()) {
            return Err(GatewayError::new(EMAIL_TAKEN));
        }

        let salt: [u8; 16] = rand::random();
        let account = Account {
            uid: RecordId::new().to_string(),
            salt,
            digest: digest(&salt, password),
        };
        let user = User {
            uid: account.uid.clone(),
            email: email.as_str().to_owned(),
        };
        accounts.insert(email.as_str().to_owned(), account);
        drop(accounts);

        tracing::info!(uid = %user.uid, "account created");
        self.publish(AuthState::signed_in(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.publish(AuthState::signed_out());
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
