//! Team commands.
//!
//! Each command opens the team it names before acting on it, matching the
//! select-then-edit flow of [`TeamController`](crate::state::TeamController).

use serde::Serialize;

use pokedex_core::{Roster, Team, TeamId, MAX_TEAM_SIZE};

use super::catalog::ensure_catalog;
use super::{Output, TeamCommand};
use crate::error::{AppError, AppResult};
use crate::state::TeamAnalysis;
use crate::AppContext;

pub async fn execute(ctx: &AppContext, out: Output, command: TeamCommand) -> AppResult<()> {
    match command {
        TeamCommand::List => list(ctx, out).await,
        TeamCommand::Create { name } => {
            let roster = ctx.teams.create_team(&name).await?;
            out.emit(&roster, || format!("Created team {} \"{}\"", roster.id, roster.name))
        }
        TeamCommand::Rename { team, name } => {
            ctx.teams.open_team(team).await?;
            ctx.teams.rename_selected(&name).await?;
            let roster = reload(ctx, team).await?;
            out.emit(&roster, || format!("Renamed team {} to \"{}\"", team, roster.name))
        }
        TeamCommand::Delete { team } => {
            if !ctx.teams.delete_team(team).await? {
                return Err(AppError::not_found("Team", team));
            }
            out.emit(&Changed { team, changed: true }, || format!("Deleted team {}", team))
        }
        TeamCommand::Add { team, species } => {
            ensure_catalog(ctx).await?;
            let before = ctx.teams.open_team(team).await?;
            let changed = ctx.teams.add_to_selected(species).await?;

            out.emit(&Changed { team, changed }, || {
                if changed {
                    format!("Added #{:03} to \"{}\"", species, before.name)
                } else if before.contains(species) {
                    format!("\"{}\" already has #{:03}", before.name, species)
                } else {
                    format!("\"{}\" is full ({} members)", before.name, MAX_TEAM_SIZE)
                }
            })
        }
        TeamCommand::Remove { team, position } => {
            ctx.teams.open_team(team).await?;
            let changed = ctx.teams.remove_from_selected(position).await?;
            out.emit(&Changed { team, changed }, || {
                if changed {
                    format!("Removed member {} from team {}", position + 1, team)
                } else {
                    format!("Team {} has no member {}", team, position + 1)
                }
            })
        }
        TeamCommand::Move { team, from, to } => {
            ctx.teams.open_team(team).await?;
            let changed = ctx.teams.reorder_selected(from, to).await?;
            out.emit(&Changed { team, changed }, || {
                if changed {
                    format!("Moved member {} to position {}", from + 1, to + 1)
                } else {
                    "Nothing to move".to_string()
                }
            })
        }
        TeamCommand::Analyze { team } => {
            ctx.teams.select_team(team).await?;
            let analysis = ctx
                .teams
                .selected_analysis()
                .await?
                .ok_or_else(|| AppError::not_found("Team", team))?;
            out.emit(&analysis, || format_analysis(&analysis))
        }
        TeamCommand::Share { team } => {
            ctx.teams.open_team(team).await?;
            let text = ctx
                .teams
                .selected_share_text()
                .await?
                .ok_or_else(|| AppError::not_found("Team", team))?;
            out.emit(&ShareText { text: &text }, || text.clone())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Changed {
    team: TeamId,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct ShareText<'a> {
    text: &'a str,
}

async fn reload(ctx: &AppContext, id: TeamId) -> AppResult<Roster> {
    ctx.db
        .teams()
        .get_roster(id)
        .await?
        .ok_or_else(|| AppError::not_found("Team", id))
}

async fn list(ctx: &AppContext, out: Output) -> AppResult<()> {
    let teams = ctx.teams.teams().await?;
    out.emit(&teams, || {
        if teams.is_empty() {
            return "No teams yet. Create one with `pokedex team create <name>`".to_string();
        }
        teams.iter().map(format_summary).collect::<Vec<_>>().join("\n")
    })
}

fn format_summary(team: &Team) -> String {
    let members = team
        .members
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "[{}] {} ({}/{}) {}",
        team.id,
        team.name,
        team.size(),
        MAX_TEAM_SIZE,
        members
    )
    .trim_end()
    .to_string()
}

fn format_analysis(analysis: &TeamAnalysis) -> String {
    let team = &analysis.team;
    let mut lines = vec![format!("{} ({}/{})", team.name, team.size(), MAX_TEAM_SIZE)];

    for (position, member) in team.members.iter().enumerate() {
        let types = if member.types.is_empty() {
            "?".to_string()
        } else {
            member.types.join("/")
        };
        lines.push(format!(
            "  {}. {} {} [{}]",
            position + 1,
            member.formatted_id(),
            member.name,
            types
        ));
    }
    if team.is_empty() {
        return lines.join("\n");
    }

    if !analysis.type_count.is_empty() {
        let counts = analysis
            .type_count
            .iter()
            .map(|(kind, n)| format!("{} x{}", kind, n))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Types:        {}", counts));
    }

    let coverage = &analysis.coverage;
    let join_counts = |entries: Vec<(&str, u32)>| {
        entries
            .iter()
            .map(|(kind, n)| format!("{} x{}", kind, n))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!(
        "Weak to:      {}",
        or_none(join_counts(coverage.weaknesses_by_count()))
    ));
    lines.push(format!(
        "Resists:      {}",
        or_none(join_counts(coverage.strengths_by_count()))
    ));
    lines.push(format!(
        "Immune to:    {}",
        or_none(coverage.sorted_immunities().join(", "))
    ));

    let stats = &analysis.stats;
    lines.push("Stats (total / average):".to_string());
    for (label, total, average) in [
        ("HP", stats.total_hp, stats.average_hp),
        ("Attack", stats.total_attack, stats.average_attack),
        ("Defense", stats.total_defense, stats.average_defense),
        ("Sp. Atk", stats.total_sp_atk, stats.average_sp_atk),
        ("Sp. Def", stats.total_sp_def, stats.average_sp_def),
        ("Speed", stats.total_speed, stats.average_speed),
    ] {
        lines.push(format!("  {:<8} {:>4} / {:>3}", label, total, average));
    }

    lines.join("\n")
}

fn or_none(value: String) -> String {
    if value.is_empty() {
        "none".to_string()
    } else {
        value
    }
}
