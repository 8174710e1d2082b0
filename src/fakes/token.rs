use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// A login session token as seen by session middleware.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserToken {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 hex of the unhashed token
    pub auth_token: String,
    pub prev_auth_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub auth_token_seen: bool,
    pub rotated_at: u64,
    pub created_at: u64,
    pub updated_at: u64,
    /// Only populated right after creation or rotation
    pub unhashed_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("user auth token not found")]
    NotFound,
    #[error("user auth token expired")]
    Expired,
    #[error("token service failure: {0}")]
    Internal(String),
}

/// Session token operations a middleware relies on.
pub trait UserTokenService: Send + Sync {
    fn create_token(&self, user_id: i64, client_ip: &str, user_agent: &str) -> Result<UserToken, TokenError>;
    fn lookup_token(&self, unhashed_token: &str) -> Result<UserToken, TokenError>;
    /// Returns `true` when the token was rotated.
    fn try_rotate_token(&self, token: &UserToken, client_ip: &str, user_agent: &str) -> Result<bool, TokenError>;
    fn revoke_token(&self, token: &UserToken) -> Result<(), TokenError>;
}

/// SHA-256 hex digest of an unhashed session token.
#[must_use]
pub fn hash_token(unhashed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unhashed.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

type CreateTokenFn = dyn Fn(i64, &str, &str) -> Result<UserToken, TokenError> + Send + Sync;
type LookupTokenFn = dyn Fn(&str) -> Result<UserToken, TokenError> + Send + Sync;
type RotateTokenFn = dyn Fn(&UserToken, &str, &str) -> Result<bool, TokenError> + Send + Sync;
type RevokeTokenFn = dyn Fn(&UserToken) -> Result<(), TokenError> + Send + Sync;

/// Scripted [`UserTokenService`].
///
/// Every operation delegates to a replaceable provider. Defaults: `create_token`
/// returns a fresh token for the user, `lookup_token` fails with
/// [`TokenError::NotFound`], `try_rotate_token` reports no rotation and
/// `revoke_token` succeeds.
///
/// ```rust
/// use brrtrouter_testkit::fakes::{FakeUserAuthTokenService, UserToken, UserTokenService};
///
/// let svc = FakeUserAuthTokenService::new();
/// svc.set_lookup_token(|unhashed| {
///     Ok(UserToken { user_id: 12, unhashed_token: unhashed.to_string(), ..Default::default() })
/// });
/// assert_eq!(svc.lookup_token("abc").unwrap().user_id, 12);
/// assert_eq!(svc.lookup_calls(), 1);
/// ```
pub struct FakeUserAuthTokenService {
    create_token: RwLock<Arc<CreateTokenFn>>,
    lookup_token: RwLock<Arc<LookupTokenFn>>,
    try_rotate_token: RwLock<Arc<RotateTokenFn>>,
    revoke_token: RwLock<Arc<RevokeTokenFn>>,
    lookup_calls: AtomicUsize,
    rotate_calls: AtomicUsize,
    revoke_calls: AtomicUsize,
}

impl Default for FakeUserAuthTokenService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeUserAuthTokenService {
    #[must_use]
    pub fn new() -> Self {
        let create_token: Arc<CreateTokenFn> = Arc::new(
            |user_id: i64, client_ip: &str, user_agent: &str| -> Result<UserToken, TokenError> {
                let unhashed = format!("{}-{}", user_id, ulid::Ulid::new());
                let now = now_secs();
                Ok(UserToken {
                    id: 1,
                    user_id,
                    auth_token: hash_token(&unhashed),
                    user_agent: user_agent.to_string(),
                    client_ip: client_ip.to_string(),
                    created_at: now,
                    updated_at: now,
                    rotated_at: now,
                    unhashed_token: unhashed,
                    ..Default::default()
                })
            },
        );
        let lookup_token: Arc<LookupTokenFn> =
            Arc::new(|_: &str| -> Result<UserToken, TokenError> { Err(TokenError::NotFound) });
        let try_rotate_token: Arc<RotateTokenFn> =
            Arc::new(|_: &UserToken, _: &str, _: &str| -> Result<bool, TokenError> { Ok(false) });
        let revoke_token: Arc<RevokeTokenFn> =
            Arc::new(|_: &UserToken| -> Result<(), TokenError> { Ok(()) });

        Self {
            create_token: RwLock::new(create_token),
            lookup_token: RwLock::new(lookup_token),
            try_rotate_token: RwLock::new(try_rotate_token),
            revoke_token: RwLock::new(revoke_token),
            lookup_calls: AtomicUsize::new(0),
            rotate_calls: AtomicUsize::new(0),
            revoke_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_create_token<F>(&self, f: F)
    where
        F: Fn(i64, &str, &str) -> Result<UserToken, TokenError> + Send + Sync + 'static,
    {
        *self.create_token.write() = Arc::new(f);
    }

    pub fn set_lookup_token<F>(&self, f: F)
    where
        F: Fn(&str) -> Result<UserToken, TokenError> + Send + Sync + 'static,
    {
        *self.lookup_token.write() = Arc::new(f);
    }

    pub fn set_try_rotate_token<F>(&self, f: F)
    where
        F: Fn(&UserToken, &str, &str) -> Result<bool, TokenError> + Send + Sync + 'static,
    {
        *self.try_rotate_token.write() = Arc::new(f);
    }

    pub fn set_revoke_token<F>(&self, f: F)
    where
        F: Fn(&UserToken) -> Result<(), TokenError> + Send + Sync + 'static,
    {
        *self.revoke_token.write() = Arc::new(f);
    }

    #[must_use]
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rotate_calls(&self) -> usize {
        self.rotate_calls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn revoke_calls(&self) -> usize {
        self.revoke_calls.load(Ordering::Relaxed)
    }
}

// Providers are cloned out of their lock before being called so a provider may
// itself replace providers on the same fake.
impl UserTokenService for FakeUserAuthTokenService {
    fn create_token(&self, user_id: i64, client_ip: &str, user_agent: &str) -> Result<UserToken, TokenError> {
        let f = Arc::clone(&*self.create_token.read());
        f(user_id, client_ip, user_agent)
    }

    fn lookup_token(&self, unhashed_token: &str) -> Result<UserToken, TokenError> {
        self.lookup_calls.fetch_add(1, Ordering::Relaxed);
        let f = Arc::clone(&*self.lookup_token.read());
        let result = f(unhashed_token);
        debug!(found = result.is_ok(), "Fake token lookup");
        result
    }

    fn try_rotate_token(&self, token: &UserToken, client_ip: &str, user_agent: &str) -> Result<bool, TokenError> {
        self.rotate_calls.fetch_add(1, Ordering::Relaxed);
        let f = Arc::clone(&*self.try_rotate_token.read());
        f(token, client_ip, user_agent)
    }

    fn revoke_token(&self, token: &UserToken) -> Result<(), TokenError> {
        self.revoke_calls.fetch_add(1, Ordering::Relaxed);
        let f = Arc::clone(&*self.revoke_token.read());
        f(token)
    }
}
