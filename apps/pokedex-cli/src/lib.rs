//! # Pokédex CLI
//!
//! Command-line front end for the species catalog and team builder.
//!
//! ## Startup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CLI Startup                                          │
//! │                                                                         │
//! │  main()                                                                 │
//! │    │                                                                    │
//! │    ├──► init_tracing()          (stderr, RUST_LOG aware)               │
//! │    │                                                                    │
//! │    ├──► run(cli)                                                        │
//! │    │      ├──► database_path()  (--db, POKEDEX_DB_PATH, data dir)      │
//! │    │      ├──► CatalogConfig    (--config or catalog.toml + env)       │
//! │    │      ├──► AppContext::open (Database, PokeApiClient, engine,      │
//! │    │      │                      controllers)                          │
//! │    │      └──► commands::dispatch                                       │
//! │    │                                                                    │
//! │    └──► exit code from ErrorCode on failure                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pokedex_db::{Database, DbConfig};
use pokedex_sync::{CatalogApi, CatalogConfig, CatalogSyncEngine, PokeApiClient};

use crate::commands::{Cli, Output};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::{PokedexController, SyncController, TeamController};

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(quiet: bool) {
    let default = if quiet {
        "warn,sqlx=warn"
    } else {
        "info,pokedex=debug,sqlx=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/dev.pokedex.pokedex/pokedex.db`
/// - **Windows**: `%APPDATA%\pokedex\pokedex\data\pokedex.db`
/// - **Linux**: `~/.local/share/pokedex/pokedex.db`
///
/// ## Override
/// Set `POKEDEX_DB_PATH` to use a custom path.
pub fn database_path() -> AppResult<PathBuf> {
    if let Ok(path) = std::env::var("POKEDEX_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let dirs = ProjectDirs::from("dev", "pokedex", "pokedex")
        .ok_or_else(|| AppError::new(ErrorCode::ConfigError, "Could not determine data directory"))?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        AppError::new(
            ErrorCode::ConfigError,
            format!("Could not create {}: {}", data_dir.display(), e),
        )
    })?;

    Ok(data_dir.join("pokedex.db"))
}

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    pub db: Database,
    pub sync: SyncController,
    pub pokedex: PokedexController,
    pub teams: TeamController,
}

impl AppContext {
    /// Opens the database at `db_path` and connects to the remote catalog.
    pub async fn open(db_path: PathBuf, config: CatalogConfig) -> AppResult<Self> {
        let db = Database::new(DbConfig::new(db_path)).await?;
        let api = PokeApiClient::new(config.clone())?;
        Self::with_api(db, Arc::new(api), config).await
    }

    /// Builds the engine and controllers over an existing database.
    pub async fn with_api(
        db: Database,
        api: Arc<dyn CatalogApi>,
        config: CatalogConfig,
    ) -> AppResult<Self> {
        let engine = CatalogSyncEngine::new(api, &db, config);
        let sync = SyncController::new(engine.clone()).await?;

        Ok(AppContext {
            pokedex: PokedexController::new(db.clone(), engine.clone()),
            teams: TeamController::new(db.clone(), engine),
            sync,
            db,
        })
    }
}

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> AppResult<()> {
    let db_path = match cli.db {
        Some(path) => path,
        None => database_path()?,
    };
    info!(?db_path, "Database path determined");

    // An explicit config file must load; the default location may be absent.
    let config = match cli.config {
        Some(path) => CatalogConfig::load(Some(path))?,
        None => CatalogConfig::load_or_default(None),
    };
    debug!(base_url = %config.api.base_url, "Catalog config loaded");

    let ctx = AppContext::open(db_path, config).await?;
    let result = commands::dispatch(&ctx, Output { json: cli.json }, cli.command).await;
    ctx.db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::commands::{dispatch, Command, TeamCommand};
    use crate::state::test_support::StubApi;

    async fn context() -> (AppContext, Arc<StubApi>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = Arc::new(StubApi::default());
        let ctx = AppContext::with_api(db, api.clone(), CatalogConfig::default())
            .await
            .unwrap();
        (ctx, api)
    }

    const OUT: Output = Output { json: true };

    #[tokio::test]
    async fn test_search_syncs_empty_catalog_first() {
        let (ctx, api) = context().await;
        assert!(ctx.sync.needs_sync());

        let search = Command::Search {
            query: "pika".into(),
            by_id: false,
            limit: 10,
            details: true,
        };
        dispatch(&ctx, OUT, search).await.unwrap();

        assert!(!ctx.sync.needs_sync());
        assert_eq!(ctx.db.species().count().await.unwrap(), 4);
        // Only the one matching row was hydrated.
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
        let pikachu = ctx.db.species().get(25).await.unwrap().unwrap();
        assert!(pikachu.has_basic_details());
    }

    #[tokio::test]
    async fn test_detail_hydration_is_bounded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = Arc::new(StubApi {
            delay_ms: 20,
            ..StubApi::default()
        });
        let mut config = CatalogConfig::default();
        config.api.max_concurrent_details = 2;
        let ctx = AppContext::with_api(db, api.clone(), config).await.unwrap();

        let search = Command::Search {
            query: String::new(),
            by_id: false,
            limit: 50,
            details: true,
        };
        dispatch(&ctx, OUT, search).await.unwrap();

        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 4);
        let peak = api.peak_in_flight.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "peak in flight was {peak}");
        let catalog = ctx.db.species().list_all().await.unwrap();
        assert!(catalog.iter().all(|s| s.has_basic_details()));
    }

    #[tokio::test]
    async fn test_team_commands_end_to_end() {
        let (ctx, _api) = context().await;

        dispatch(&ctx, OUT, Command::Team(TeamCommand::Create { name: "Kanto".into() }))
            .await
            .unwrap();
        let team = ctx.teams.teams().await.unwrap()[0].id;

        for species in [1, 4, 25] {
            dispatch(&ctx, OUT, Command::Team(TeamCommand::Add { team, species }))
                .await
                .unwrap();
        }
        dispatch(&ctx, OUT, Command::Team(TeamCommand::Move { team, from: 2, to: 0 }))
            .await
            .unwrap();
        dispatch(&ctx, OUT, Command::Team(TeamCommand::Remove { team, position: 2 }))
            .await
            .unwrap();

        let stored = ctx.db.teams().get_roster(team).await.unwrap().unwrap();
        assert_eq!(stored.member_ids, vec![25, 1]);

        dispatch(&ctx, OUT, Command::Team(TeamCommand::Analyze { team }))
            .await
            .unwrap();
        dispatch(&ctx, OUT, Command::Team(TeamCommand::Delete { team }))
            .await
            .unwrap();
        assert_eq!(ctx.db.teams().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_team_maps_to_not_found() {
        let (ctx, _api) = context().await;

        let err = dispatch(&ctx, OUT, Command::Team(TeamCommand::Share { team: 42 }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.code.exit_code(), 3);

        let err = dispatch(&ctx, OUT, Command::Team(TeamCommand::Delete { team: 42 }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_offline_sync_is_retryable_network_error() {
        let (ctx, api) = context().await;
        api.fail.store(true, Ordering::SeqCst);

        let err = dispatch(&ctx, OUT, Command::Sync { force: false })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.retryable);
        assert!(ctx.sync.needs_sync());
    }
}
