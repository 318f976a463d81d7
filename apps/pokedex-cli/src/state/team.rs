//! # Team State
//!
//! Team list, the currently selected team, and analytics of that team.
//!
//! ## Selection Rules
//! - Creating a team selects it
//! - Deleting the selected team clears the selection
//! - Member operations apply to the selected team and are no-ops without one
//! - Selecting a team hydrates full details of its members
//! - Adding a member hydrates full details of the added species

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use pokedex_core::{format_team_for_sharing, Roster, SpeciesId, Team, TeamId, TeamStats, TypeCoverage};
use pokedex_db::{Database, Feed, TeamQuery};
use pokedex_sync::CatalogSyncEngine;

use crate::error::{AppError, AppResult};

/// Derived analytics of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAnalysis {
    pub team: Team,
    pub type_count: Vec<(String, usize)>,
    pub coverage: TypeCoverage,
    pub stats: TeamStats,
}

impl From<Team> for TeamAnalysis {
    fn from(team: Team) -> Self {
        TeamAnalysis {
            type_count: team.type_count(),
            coverage: team.type_coverage(),
            stats: team.total_stats(),
            team,
        }
    }
}

/// Team builder state.
#[derive(Clone)]
pub struct TeamController {
    db: Database,
    engine: CatalogSyncEngine,
    selected: Arc<RwLock<Option<TeamId>>>,
}

impl TeamController {
    pub fn new(db: Database, engine: CatalogSyncEngine) -> Self {
        TeamController {
            db,
            engine,
            selected: Arc::new(RwLock::new(None)),
        }
    }

    /// All teams with members resolved, in creation order.
    pub async fn teams(&self) -> AppResult<Vec<Team>> {
        Ok(self.db.teams().list_all().await?)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selected_team_id(&self) -> Option<TeamId> {
        self.selected.read().ok().and_then(|s| *s)
    }

    fn set_selected(&self, id: Option<TeamId>) {
        if let Ok(mut s) = self.selected.write() {
            *s = id;
        }
    }

    fn require_selected(&self) -> Option<TeamId> {
        let id = self.selected_team_id();
        if id.is_none() {
            debug!("No team selected");
        }
        id
    }

    pub async fn selected_team(&self) -> AppResult<Option<Team>> {
        match self.selected_team_id() {
            Some(id) => Ok(self.db.teams().get(id).await?),
            None => Ok(None),
        }
    }

    /// Live view of the selected team, if any.
    pub fn watch_selected(&self) -> Option<Feed<TeamQuery>> {
        self.selected_team_id()
            .map(|id| self.db.teams().watch_by_id(id))
    }

    /// Selects a team and hydrates full details of its members.
    ///
    /// A member whose hydration fails is logged and left as stored.
    pub async fn select_team(&self, id: TeamId) -> AppResult<Team> {
        let team = self
            .db
            .teams()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Team", id))?;
        self.set_selected(Some(id));

        let missing: Vec<SpeciesId> = team
            .members
            .iter()
            .filter(|m| !m.has_full_details())
            .map(|m| m.id)
            .collect();
        if missing.is_empty() {
            return Ok(team);
        }

        for species_id in missing {
            if let Err(e) = self.engine.ensure_full_details_loaded(species_id).await {
                warn!(team_id = id, species_id, error = %e, "Could not load member details");
            }
        }

        self.db
            .teams()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Team", id))
    }

    /// Selects a team without touching member details.
    pub async fn open_team(&self, id: TeamId) -> AppResult<Roster> {
        let roster = self
            .db
            .teams()
            .get_roster(id)
            .await?
            .ok_or_else(|| AppError::not_found("Team", id))?;
        self.set_selected(Some(id));
        Ok(roster)
    }

    pub fn clear_selection(&self) {
        self.set_selected(None);
    }

    // =========================================================================
    // Team Lifecycle
    // =========================================================================

    /// Creates a team and selects it. A blank name becomes the default name.
    pub async fn create_team(&self, name: &str) -> AppResult<Roster> {
        let roster = self.db.teams().create(name).await?;
        self.set_selected(Some(roster.id));
        info!(team_id = roster.id, name = %roster.name, "Team created");
        Ok(roster)
    }

    /// Renames the selected team.
    pub async fn rename_selected(&self, name: &str) -> AppResult<bool> {
        let Some(id) = self.require_selected() else {
            return Ok(false);
        };
        Ok(self.db.teams().rename(id, name).await?)
    }

    /// Deletes a team, clearing the selection if it pointed at it.
    pub async fn delete_team(&self, id: TeamId) -> AppResult<bool> {
        let deleted = self.db.teams().delete(id).await?;
        if self.selected_team_id() == Some(id) {
            self.set_selected(None);
        }
        Ok(deleted)
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Appends a species to the selected team.
    ///
    /// ## Returns
    /// `false` without a selection, when the team is full or already holds
    /// the species.
    pub async fn add_to_selected(&self, species_id: SpeciesId) -> AppResult<bool> {
        let Some(id) = self.require_selected() else {
            return Ok(false);
        };

        if self.db.species().get(species_id).await?.is_none() {
            return Err(AppError::not_found("Species", species_id));
        }

        let added = self.db.teams().add_member(id, species_id).await?;
        if added {
            if let Err(e) = self.engine.ensure_full_details_loaded(species_id).await {
                warn!(team_id = id, species_id, error = %e, "Added member without details");
            }
        }
        Ok(added)
    }

    pub async fn remove_from_selected(&self, index: usize) -> AppResult<bool> {
        let Some(id) = self.require_selected() else {
            return Ok(false);
        };
        Ok(self.db.teams().remove_member_at(id, index).await?)
    }

    pub async fn reorder_selected(&self, from: usize, to: usize) -> AppResult<bool> {
        let Some(id) = self.require_selected() else {
            return Ok(false);
        };
        Ok(self.db.teams().reorder_members(id, from, to).await?)
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    pub async fn selected_analysis(&self) -> AppResult<Option<TeamAnalysis>> {
        Ok(self.selected_team().await?.map(TeamAnalysis::from))
    }

    pub async fn selected_share_text(&self) -> AppResult<Option<String>> {
        Ok(self
            .selected_team()
            .await?
            .map(|team| format_team_for_sharing(&team)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::error::ErrorCode;
    use crate::state::test_support::{synced_engine, StubApi};

    async fn controller(api: StubApi) -> (TeamController, Arc<StubApi>, Database) {
        let (engine, api, db) = synced_engine(api).await;
        (TeamController::new(db.clone(), engine), api, db)
    }

    #[tokio::test]
    async fn test_create_selects_new_team() {
        let (teams, _api, _db) = controller(StubApi::default()).await;
        assert!(teams.selected_team_id().is_none());

        let roster = teams.create_team("   ").await.unwrap();
        assert_eq!(roster.name, "My Team");
        assert_eq!(teams.selected_team_id(), Some(roster.id));

        assert!(teams.rename_selected("Volt Squad").await.unwrap());
        assert_eq!(teams.teams().await.unwrap()[0].name, "Volt Squad");
    }

    #[tokio::test]
    async fn test_member_operations_without_selection_are_noops() {
        let (teams, api, _db) = controller(StubApi::default()).await;

        assert!(!teams.add_to_selected(25).await.unwrap());
        assert!(!teams.remove_from_selected(0).await.unwrap());
        assert!(!teams.reorder_selected(0, 1).await.unwrap());
        assert!(!teams.rename_selected("Nobody").await.unwrap());
        assert!(teams.selected_analysis().await.unwrap().is_none());
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_hydrates_and_rejects_duplicates() {
        let (teams, api, _db) = controller(StubApi::default()).await;
        teams.create_team("Starters").await.unwrap();

        assert!(teams.add_to_selected(4).await.unwrap());
        assert!(!teams.add_to_selected(4).await.unwrap());
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);

        let team = teams.selected_team().await.unwrap().unwrap();
        assert_eq!(team.size(), 1);
        assert!(team.members[0].has_full_details());

        let err = teams.add_to_selected(999).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_survives_failed_hydration() {
        let (teams, api, _db) = controller(StubApi::default()).await;
        teams.create_team("Offline").await.unwrap();
        api.fail.store(true, Ordering::SeqCst);

        assert!(teams.add_to_selected(1).await.unwrap());
        let team = teams.selected_team().await.unwrap().unwrap();
        assert!(team.contains(1));
        assert!(!team.members[0].has_full_details());
    }

    #[tokio::test]
    async fn test_reorder_and_remove() {
        let (teams, _api, _db) = controller(StubApi::default()).await;
        teams.create_team("Order").await.unwrap();
        for id in [1, 4, 25] {
            teams.add_to_selected(id).await.unwrap();
        }

        assert!(teams.reorder_selected(0, 2).await.unwrap());
        let ids = |team: Team| team.members.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids(teams.selected_team().await.unwrap().unwrap()), vec![4, 25, 1]);

        assert!(teams.remove_from_selected(1).await.unwrap());
        assert!(!teams.remove_from_selected(5).await.unwrap());
        assert_eq!(ids(teams.selected_team().await.unwrap().unwrap()), vec![4, 1]);
    }

    #[tokio::test]
    async fn test_delete_clears_matching_selection() {
        let (teams, _api, _db) = controller(StubApi::default()).await;
        let first = teams.create_team("First").await.unwrap();
        let second = teams.create_team("Second").await.unwrap();

        // Deleting a team that is not selected keeps the selection.
        assert!(teams.delete_team(first.id).await.unwrap());
        assert_eq!(teams.selected_team_id(), Some(second.id));

        assert!(teams.delete_team(second.id).await.unwrap());
        assert!(teams.selected_team_id().is_none());
        assert!(!teams.delete_team(second.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_select_team_hydrates_members() {
        let (teams, api, db) = controller(StubApi::default()).await;
        let roster = db.teams().create("Stored").await.unwrap();
        db.teams().add_member(roster.id, 25).await.unwrap();
        db.teams().add_member(roster.id, 50).await.unwrap();

        let team = teams.select_team(roster.id).await.unwrap();
        assert!(team.members.iter().all(|m| m.has_full_details()));
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
        assert_eq!(teams.selected_team_id(), Some(roster.id));

        let missing = teams.select_team(roster.id + 100).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_selected_analysis() {
        let (teams, _api, _db) = controller(StubApi::default()).await;
        teams.create_team("Ground Control").await.unwrap();
        teams.add_to_selected(50).await.unwrap();
        teams.add_to_selected(25).await.unwrap();

        let analysis = teams.selected_analysis().await.unwrap().unwrap();
        assert_eq!(analysis.team.size(), 2);
        // Diglett (Ground) is immune to Electric, so it never counts as a weakness.
        assert!(analysis.coverage.immunities.contains("Electric"));
        assert!(!analysis.coverage.weaknesses.contains_key("Electric"));
        // Stub stats are 2 × id: (100 + 50) / 2.
        assert_eq!(analysis.stats.total_hp, 150);
        assert_eq!(analysis.stats.average_hp, 75);

        let text = teams.selected_share_text().await.unwrap().unwrap();
        assert!(text.starts_with("My Pokemon Team: Ground Control"));
        assert!(text.contains("1. Diglett (Ground)"));
        assert!(text.ends_with("(2/6 Pokemon)"));
    }

    #[tokio::test]
    async fn test_watch_selected_follows_member_changes() {
        let (teams, _api, _db) = controller(StubApi::default()).await;
        assert!(teams.watch_selected().is_none());

        teams.create_team("Live").await.unwrap();
        let mut feed = teams.watch_selected().unwrap();
        assert_eq!(feed.current().await.unwrap().unwrap().size(), 0);

        teams.add_to_selected(1).await.unwrap();
        let latest = feed.next().await.unwrap().unwrap().unwrap();
        assert!(latest.contains(1));
    }
}
