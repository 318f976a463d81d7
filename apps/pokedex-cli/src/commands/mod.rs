//! # CLI Commands Module
//!
//! Every command the `pokedex` binary understands.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (argument definitions, dispatch)
//! ├── catalog.rs  ◄─── sync, status, search, show, invalidate
//! └── team.rs     ◄─── team list/create/rename/delete/add/remove/move/
//!                      analyze/share
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ pokedex team add 3 25                                               │
//! │         │                                                               │
//! │         ▼  (clap)                                                       │
//! │  Command::Team(TeamCommand::Add { team: 3, species: 25 })              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  team::execute(&ctx, &out, command)                                    │
//! │         │   ctx.teams.open_team(3)                                     │
//! │         │   ctx.teams.add_to_selected(25)                              │
//! │         ▼                                                               │
//! │  Output::emit  ──► human text, or JSON with --json                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod team;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pokedex_core::validation::parse_species_id;
use pokedex_core::{SpeciesId, TeamId};

use crate::error::{AppError, AppResult};
use crate::AppContext;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "pokedex")]
#[command(about = "Browse the species catalog and build teams of up to six")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Database file (defaults to POKEDEX_DB_PATH, then the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Catalog config file (defaults to catalog.toml in the config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the species list
    Sync {
        /// Sync even when the catalog is already populated
        #[arg(short, long)]
        force: bool,
    },
    /// Show catalog sync state
    Status,
    /// Search the catalog by name, or by number with --by-id
    Search {
        /// Search text; omit to list everything
        #[arg(default_value = "")]
        query: String,
        /// Match against the catalog number instead of the name
        #[arg(long)]
        by_id: bool,
        /// Maximum rows to print
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        /// Load types for the printed rows
        #[arg(short, long)]
        details: bool,
    },
    /// Show full details of one species
    Show {
        #[arg(value_parser = species_arg)]
        species: SpeciesId,
    },
    /// Delete the local catalog so the next sync starts fresh
    Invalidate,
    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommand),
}

#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// List all teams
    List,
    /// Create a team (blank name becomes "My Team")
    Create {
        #[arg(default_value = "")]
        name: String,
    },
    /// Rename a team
    Rename { team: TeamId, name: String },
    /// Delete a team
    Delete { team: TeamId },
    /// Add a species to the end of a team
    Add {
        team: TeamId,
        #[arg(value_parser = species_arg)]
        species: SpeciesId,
    },
    /// Remove the member at a 1-based position
    Remove {
        team: TeamId,
        #[arg(value_parser = position_arg)]
        position: usize,
    },
    /// Move a member from one 1-based position to another
    Move {
        team: TeamId,
        #[arg(value_parser = position_arg)]
        from: usize,
        #[arg(value_parser = position_arg)]
        to: usize,
    },
    /// Show members, type coverage and stats of a team
    Analyze { team: TeamId },
    /// Print a shareable summary of a team
    Share { team: TeamId },
}

fn species_arg(value: &str) -> Result<SpeciesId, String> {
    parse_species_id(value).map_err(|e| e.to_string())
}

/// Converts a 1-based position to a 0-based index.
fn position_arg(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(position) => Ok(position - 1),
        Err(_) => Err(format!("'{}' is not a position", value)),
    }
}

// =============================================================================
// Output
// =============================================================================

/// Writes command results as text or JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> AppResult<()> {
        if self.json {
            let text = serde_json::to_string_pretty(value)
                .map_err(|e| AppError::internal(format!("JSON output failed: {}", e)))?;
            println!("{}", text);
        } else {
            println!("{}", human());
        }
        Ok(())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

pub async fn dispatch(ctx: &AppContext, out: Output, command: Command) -> AppResult<()> {
    match command {
        Command::Sync { force } => catalog::sync(ctx, out, force).await,
        Command::Status => catalog::status(ctx, out).await,
        Command::Search {
            query,
            by_id,
            limit,
            details,
        } => catalog::search(ctx, out, &query, by_id, limit, details).await,
        Command::Show { species } => catalog::show(ctx, out, species).await,
        Command::Invalidate => catalog::invalidate(ctx, out).await,
        Command::Team(command) => team::execute(ctx, out, command).await,
    }
}
