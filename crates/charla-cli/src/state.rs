//! Application state wiring all components together.
//!
//! The orchestrator is generic over gateway and vault traits; AppState pins
//! them to the concrete infra implementations and shares the token store
//! between the orchestrator and the HTTP gateway.

use std::path::PathBuf;
use std::sync::Arc;

use charla_core::auth::token_store::TokenStore;
use charla_core::chat::orchestrator::ChatOrchestrator;
use charla_core::signal::SignalBus;
use charla_infra::config::load_client_config;
use charla_infra::http::HttpGateway;
use charla_infra::sqlite::pool::{DatabasePool, default_data_dir, default_database_url};
use charla_infra::sqlite::vault::SqliteAuthVault;

/// Concrete type aliases for the orchestrator generics pinned to infra
/// implementations.
pub type ConcreteTokenStore = TokenStore<SqliteAuthVault>;
pub type ConcreteGateway = HttpGateway<ConcreteTokenStore>;
pub type ConcreteOrchestrator = ChatOrchestrator<ConcreteGateway, SqliteAuthVault>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub signals: SignalBus,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to the local database,
    /// restore any persisted identity, wire the gateway and orchestrator.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = PathBuf::from(default_data_dir());

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::new(&default_database_url()).await?;

        let config = load_client_config(&data_dir).await;

        // The token store is shared: the orchestrator writes to it on
        // login/logout, the gateway reads the bearer from it per request.
        let tokens = Arc::new(TokenStore::new(SqliteAuthVault::new(db_pool.clone())));
        tokens.load().await?;

        let gateway = HttpGateway::new(&config, tokens.clone());
        let signals = SignalBus::default();
        let orchestrator = ChatOrchestrator::new(gateway, tokens, signals.clone());

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            signals,
            data_dir,
        })
    }
}
