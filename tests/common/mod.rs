#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tokio::sync::mpsc;
use up_identity::{
    AppState,
    auth::{Account, AccountStore, Claims, IdentityResolver, JwtValidator, identity_hash},
    cache::MemoryIdentityCache,
    config::Config,
    deletion::{
        AccountDeleter, AccountDeletion, BillingCancellation, DeletionContext, DeletionReceipt,
        LegacyDeletion, Notifier,
    },
    error::StoreError,
};

pub const PRIMARY_PRIVATE: &str = include_str!("../fixtures/primary_private.pem");
pub const PRIMARY_PUBLIC: &str = include_str!("../fixtures/primary_public.pem");
pub const ROTATED_PRIVATE: &str = include_str!("../fixtures/rotated_private.pem");
pub const ROTATED_PUBLIC: &str = include_str!("../fixtures/rotated_public.pem");
pub const FOREIGN_PRIVATE: &str = include_str!("../fixtures/foreign_private.pem");

pub const HASHING_KEY: &str = "integration-hashing-key";
pub const EMAIL_HOST: &str = "up.example.com";
pub const ADMIN_ID: i64 = 1;

pub fn sign(private_pem: &str, username: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        preferred_username: username.to_string(),
        sub: None,
        exp: now + exp_offset_secs,
        iat: Some(now),
    };
    encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap(),
    )
    .unwrap()
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        redis_url: None,
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/up".into(),
        jwt_public_keys: vec![PRIMARY_PUBLIC.into(), ROTATED_PUBLIC.into()],
        hashing_key: HASHING_KEY.into(),
        email_host: EMAIL_HOST.into(),
        token_cache_ttl_secs: 60,
        token_cache_capacity: 100,
        admin_account_ids: vec![ADMIN_ID],
        billing_service_url: "http://billing.invalid".into(),
        notify_webhook_url: None,
    }
}

/// Accounts keyed by the identity they were registered under.
pub struct Accounts {
    by_hash: HashMap<String, i64>,
    failure: Option<StoreError>,
    pub lookups: AtomicUsize,
}

impl Accounts {
    pub fn new(entries: &[(&str, i64)]) -> Self {
        Self {
            by_hash: entries
                .iter()
                .map(|(name, id)| (identity_hash(name, HASHING_KEY.as_bytes()).unwrap(), *id))
                .collect(),
            failure: None,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Every lookup fails with `failure`, as when the database is down.
    pub fn failing(mut self, failure: StoreError) -> Self {
        self.failure = Some(failure);
        self
    }
}

#[async_trait]
impl AccountStore for Accounts {
    async fn lookup_by_hash(&self, hash: &str) -> Result<Account, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.by_hash
            .get(hash)
            .map(|id| Account {
                id: *id,
                creation_time: 1_700_000_000_000_000 + id,
            })
            .ok_or(StoreError::NotFound)
    }

    async fn list_since(&self, since: i64, until: i64) -> Result<Vec<Account>, StoreError> {
        let mut ids: Vec<i64> = self.by_hash.values().copied().collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .map(|id| Account {
                id,
                creation_time: 1_700_000_000_000_000 + id,
            })
            .filter(|a| a.creation_time > since && a.creation_time <= until)
            .collect())
    }
}

/// Records the order in which deletion collaborators were called.
#[derive(Default)]
pub struct Journal {
    pub calls: Mutex<Vec<String>>,
}

impl Journal {
    pub fn entries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

pub struct Legacy(pub Arc<Journal>, pub Option<StoreError>);

#[async_trait]
impl LegacyDeletion for Legacy {
    async fn handle_account_deletion(&self, ctx: &DeletionContext) -> Result<(), StoreError> {
        self.0.record(format!("legacy:{}", ctx.account_id));
        self.1.clone().map_or(Ok(()), Err)
    }
}

pub struct Billing(pub Arc<Journal>, pub Result<bool, StoreError>);

#[async_trait]
impl BillingCancellation for Billing {
    async fn cancel_and_confirm(&self, account_id: i64) -> Result<bool, StoreError> {
        self.0.record(format!("billing:{account_id}"));
        self.1.clone()
    }
}

pub struct Core(pub Arc<Journal>, pub Option<StoreError>);

#[async_trait]
impl AccountDeletion for Core {
    async fn handle_account_deletion(
        &self,
        ctx: &DeletionContext,
    ) -> Result<DeletionReceipt, StoreError> {
        self.0.record(format!("core:{}", ctx.account_id));
        if let Some(failure) = &self.1 {
            return Err(failure.clone());
        }
        Ok(DeletionReceipt {
            account_id: ctx.account_id,
            deleted_at: Utc::now(),
        })
    }
}

pub struct Channel(pub mpsc::UnboundedSender<String>);

#[async_trait]
impl Notifier for Channel {
    async fn notify(&self, message: &str) -> Result<(), StoreError> {
        let _ = self.0.send(message.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub accounts: Arc<Accounts>,
    pub journal: Arc<Journal>,
    pub notifications: mpsc::UnboundedReceiver<String>,
}

pub struct Outcomes {
    pub lookup: Option<StoreError>,
    pub legacy: Option<StoreError>,
    pub billing: Result<bool, StoreError>,
    pub core: Option<StoreError>,
}

impl Default for Outcomes {
    fn default() -> Self {
        Self {
            lookup: None,
            legacy: None,
            billing: Ok(true),
            core: None,
        }
    }
}

pub fn test_app(entries: &[(&str, i64)], outcomes: Outcomes) -> TestApp {
    let config = test_config();
    let accounts = match outcomes.lookup {
        Some(failure) => Arc::new(Accounts::new(entries).failing(failure)),
        None => Arc::new(Accounts::new(entries)),
    };
    let journal = Arc::new(Journal::default());
    let (tx, notifications) = mpsc::unbounded_channel();

    let resolver = Arc::new(IdentityResolver::new(
        accounts.clone(),
        config.hashing_key.as_bytes(),
        config.email_host.clone(),
    ));
    let deleter = Arc::new(AccountDeleter::new(
        resolver.clone(),
        Arc::new(Legacy(journal.clone(), outcomes.legacy)),
        Arc::new(Billing(journal.clone(), outcomes.billing)),
        Arc::new(Core(journal.clone(), outcomes.core)),
        Arc::new(Channel(tx)),
    ));

    let state = AppState {
        validator: Arc::new(JwtValidator::new(config.jwt_public_keys.as_slice()).unwrap()),
        identity_cache: Arc::new(MemoryIdentityCache::new(
            Duration::from_secs(config.token_cache_ttl_secs),
            config.token_cache_capacity,
        )),
        config: Arc::new(config),
        resolver,
        accounts: accounts.clone(),
        deleter,
    };

    TestApp {
        state,
        accounts,
        journal,
        notifications,
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    match token {
        Some(token) => request_with_authorization(method, uri, &format!("Bearer {token}")),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    }
}

/// Sends `authorization` verbatim as the Authorization header value.
pub fn request_with_authorization(method: &str, uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", authorization)
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
