use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use up_identity::{
    AppState, app,
    auth::{IdentityResolver, JwtValidator},
    cache::{IdentityCache, MemoryIdentityCache, RedisIdentityCache},
    config::Config,
    deletion::{AccountDeleter, Notifier},
    store::{
        HttpBillingClient, LogNotifier, PgAccountDeletion, PgAccountStore, PgEmergencyContacts,
        WebhookNotifier,
    },
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(?config, "configuration loaded");

    let validator =
        JwtValidator::new(config.jwt_public_keys.as_slice()).expect("Failed to load JWT public keys");
    tracing::info!("Loaded {} trusted public key(s)", validator.key_count());

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'up_identity';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 令牌缓存：配置了 Redis 时在副本间共享
    let identity_cache: Arc<dyn IdentityCache> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            tracing::info!("Using Redis identity cache");
            Arc::new(RedisIdentityCache::new(
                Arc::new(client),
                config.token_cache_ttl(),
            ))
        }
        None => Arc::new(MemoryIdentityCache::new(
            config.token_cache_ttl(),
            config.token_cache_capacity,
        )),
    };

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(http.clone(), url.clone())),
        None => {
            tracing::warn!("NOTIFY_WEBHOOK_URL not set, admin actions are only logged");
            Arc::new(LogNotifier)
        }
    };

    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    let resolver = Arc::new(IdentityResolver::new(
        accounts.clone(),
        config.hashing_key.as_bytes(),
        config.email_host.clone(),
    ));
    let deleter = Arc::new(AccountDeleter::new(
        resolver.clone(),
        Arc::new(PgEmergencyContacts::new(pool.clone())),
        Arc::new(HttpBillingClient::new(
            http.clone(),
            config.billing_service_url.clone(),
        )),
        Arc::new(PgAccountDeletion::new(pool.clone())),
        notifier,
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        validator: Arc::new(validator),
        identity_cache,
        resolver,
        accounts,
        deleter,
    };

    let router = app(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
