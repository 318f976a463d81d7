//! Catalog commands: sync, status, search, show, invalidate.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use pokedex_core::{capitalize, SearchMode, Species, SpeciesId};

use super::Output;
use crate::error::AppResult;
use crate::state::SyncStatusDto;
use crate::AppContext;

/// Runs a list sync when the local catalog is still empty.
pub async fn ensure_catalog(ctx: &AppContext) -> AppResult<()> {
    if ctx.sync.needs_sync() {
        info!("Catalog is empty, syncing before continuing");
        ctx.sync.start_sync().await?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncReport {
    synced: bool,
    species_count: u64,
}

pub async fn sync(ctx: &AppContext, out: Output, force: bool) -> AppResult<()> {
    let synced = if force || ctx.sync.needs_sync() {
        ctx.sync.start_sync().await?;
        true
    } else {
        false
    };

    let report = SyncReport {
        synced,
        species_count: ctx.db.species().count().await?,
    };
    out.emit(&report, || {
        if report.synced {
            format!("Synced {} species", report.species_count)
        } else {
            format!(
                "Catalog already holds {} species (use --force to sync again)",
                report.species_count
            )
        }
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    #[serde(flatten)]
    sync: SyncStatusDto,
    species_count: u64,
    team_count: u64,
    database_healthy: bool,
}

pub async fn status(ctx: &AppContext, out: Output) -> AppResult<()> {
    let report = StatusReport {
        sync: ctx.sync.snapshot(),
        species_count: ctx.db.species().count().await?,
        team_count: ctx.db.teams().count().await?,
        database_healthy: ctx.db.health_check().await,
    };

    out.emit(&report, || {
        let catalog = if report.sync.needs_sync {
            "empty, run `pokedex sync`".to_string()
        } else {
            format!("{} species", report.species_count)
        };
        format!(
            "Catalog:  {}\nTeams:    {}\nDatabase: {}",
            catalog,
            report.team_count,
            if report.database_healthy { "ok" } else { "unreachable" }
        )
    })
}

pub async fn search(
    ctx: &AppContext,
    out: Output,
    query: &str,
    by_id: bool,
    limit: usize,
    details: bool,
) -> AppResult<()> {
    ensure_catalog(ctx).await?;

    let pokedex = &ctx.pokedex;
    pokedex.update_search_mode(if by_id { SearchMode::Id } else { SearchMode::Name });
    pokedex.update_search_query(query)?;

    let matches = pokedex.species_list().await?;
    let total = matches.len();
    let mut rows: Vec<Species> = matches.into_iter().take(limit).collect();

    if details {
        rows = hydrate_rows(ctx, rows).await;
    }

    out.emit(&rows, || {
        if rows.is_empty() {
            return "No species found".to_string();
        }
        let mut lines: Vec<String> = rows.iter().map(format_row).collect();
        if total > rows.len() {
            lines.push(format!("... {} more (raise --limit)", total - rows.len()));
        }
        lines.join("\n")
    })
}

/// Loads basic details for the rows, at most `api.max_concurrent_details`
/// requests at a time. Rows that fail keep their stored state.
async fn hydrate_rows(ctx: &AppContext, rows: Vec<Species>) -> Vec<Species> {
    let limit = ctx.sync.engine().config().api.max_concurrent_details.max(1);
    let permits = Arc::new(Semaphore::new(limit));
    let mut tasks = JoinSet::new();

    for (index, species) in rows.iter().enumerate() {
        if species.has_basic_details() {
            continue;
        }
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let pokedex = ctx.pokedex.clone();
        let id = species.id;
        tasks.spawn(async move {
            let result = pokedex.fetch_details_if_needed(id).await;
            drop(permit);
            (index, id, result)
        });
    }

    let mut rows = rows;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(species))) => rows[index] = species,
            Ok((_, id, Err(e))) => warn!(species_id = id, error = %e, "Could not load details"),
            Err(e) => warn!(error = %e, "Detail task failed"),
        }
    }
    rows
}

fn format_row(species: &Species) -> String {
    let types = if species.types.is_empty() {
        "-".to_string()
    } else {
        species.types.join("/")
    };
    format!("{}  {:<14} {}", species.formatted_id(), species.name, types)
}

pub async fn show(ctx: &AppContext, out: Output, id: SpeciesId) -> AppResult<()> {
    ensure_catalog(ctx).await?;

    let species = ctx.pokedex.select_species(id).await?;
    out.emit(&species, || format_detail(&species))
}

fn format_detail(species: &Species) -> String {
    let mut lines = vec![format!("{} {}", species.formatted_id(), species.name)];

    if !species.types.is_empty() {
        lines.push(format!("Types:     {}", species.types.join(", ")));
    }
    if let Some(height) = species.height {
        // Stored in decimetres.
        lines.push(format!("Height:    {:.1} m", height as f64 / 10.0));
    }
    if let Some(weight) = species.weight {
        // Stored in hectograms.
        lines.push(format!("Weight:    {:.1} kg", weight as f64 / 10.0));
    }
    if let Some(abilities) = species.abilities.as_ref().filter(|a| !a.is_empty()) {
        lines.push(format!("Abilities: {}", abilities.join(", ")));
    }
    if let Some(stats) = &species.stats {
        lines.push("Base stats:".to_string());
        for stat in stats {
            lines.push(format!("  {:<16} {:>3}", capitalize(&stat.name), stat.value));
        }
    }
    lines.push(format!("Image:     {}", species.display_image_url()));

    lines.join("\n")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvalidateReport {
    removed: u64,
}

pub async fn invalidate(ctx: &AppContext, out: Output) -> AppResult<()> {
    let removed = ctx.sync.invalidate().await?;
    if removed == 0 {
        warn!("Catalog was already empty");
    }

    let report = InvalidateReport { removed };
    out.emit(&report, || {
        format!("Removed {} species; the next command will sync again", removed)
    })
}
