//! # Team Repository
//!
//! Persistence of rosters and their resolution into [`Team`] values.
//!
//! ## Member Mutations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_member(team, species)                                              │
//! │       │                                                                 │
//! │       ▼  (write lock held)                                              │
//! │  SELECT roster ─► roster::with_added ─► unchanged? ─► Ok(false)         │
//! │                                            │                            │
//! │                                            ▼ changed                    │
//! │                           UPDATE teams SET member_ids ─► notify         │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                        Ok(true)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bound violations (full team, duplicate, bad index) and missing teams are
//! reported as `Ok(false)`, never as errors.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::encoding::{decode_ids, encode_ids};
use crate::error::{DbError, DbResult};
use crate::feed::{ChangeNotifier, Feed, FeedQuery};
use crate::repository::species::SpeciesRepository;
use pokedex_core::roster::{with_added, with_removed_at, with_reordered};
use pokedex_core::validation::normalize_team_name;
use pokedex_core::{Roster, SpeciesId, Team, TeamId};

/// Raw `teams` row.
#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: i64,
    name: String,
    member_ids: String,
}

impl TryFrom<TeamRow> for Roster {
    type Error = DbError;

    fn try_from(row: TeamRow) -> DbResult<Self> {
        Ok(Roster {
            id: row.id,
            name: row.name,
            member_ids: decode_ids(&row.member_ids)?,
        })
    }
}

/// Repository for team database operations.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
    changes: ChangeNotifier,
    species: SpeciesRepository,
    species_changes: ChangeNotifier,
    /// Serializes read-modify-write of member lists.
    write_lock: Arc<Mutex<()>>,
}

impl TeamRepository {
    /// Creates a new TeamRepository.
    pub fn new(
        pool: SqlitePool,
        changes: ChangeNotifier,
        species: SpeciesRepository,
        species_changes: ChangeNotifier,
        write_lock: Arc<Mutex<()>>,
    ) -> Self {
        TeamRepository {
            pool,
            changes,
            species,
            species_changes,
            write_lock,
        }
    }

    // =========================================================================
    // Team lifecycle
    // =========================================================================

    /// Creates an empty team.
    ///
    /// The name is normalized: blank becomes the default name, longer than
    /// the limit is rejected.
    pub async fn create(&self, name: &str) -> DbResult<Roster> {
        let name = normalize_team_name(name)?;

        let result = sqlx::query("INSERT INTO teams (name, member_ids) VALUES (?1, '')")
            .bind(&name)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();

        info!(team_id = id, name = %name, "Created team");
        self.changes.notify();
        Ok(Roster::new(id, name))
    }

    /// Renames a team. Returns `false` if the team doesn't exist.
    pub async fn rename(&self, id: TeamId, name: &str) -> DbResult<bool> {
        let name = normalize_team_name(name)?;

        let result = sqlx::query("UPDATE teams SET name = ?1 WHERE id = ?2")
            .bind(&name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        let renamed = result.rows_affected() > 0;
        if renamed {
            debug!(team_id = id, name = %name, "Renamed team");
            self.changes.notify();
        }
        Ok(renamed)
    }

    /// Deletes a team. Returns `false` if the team doesn't exist.
    pub async fn delete(&self, id: TeamId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(team_id = id, "Deleted team");
            self.changes.notify();
        }
        Ok(deleted)
    }

    // =========================================================================
    // Member mutations
    // =========================================================================

    /// Appends a species. `false` when the team is full, already holds the
    /// species, or doesn't exist.
    pub async fn add_member(&self, id: TeamId, species_id: SpeciesId) -> DbResult<bool> {
        self.mutate_members(id, |roster| with_added(roster, species_id))
            .await
    }

    /// Removes the member at `index`. `false` when out of range.
    pub async fn remove_member_at(&self, id: TeamId, index: usize) -> DbResult<bool> {
        self.mutate_members(id, |roster| with_removed_at(roster, index))
            .await
    }

    /// Moves the member at `from` to `to`. `false` when either is out of range.
    pub async fn reorder_members(&self, id: TeamId, from: usize, to: usize) -> DbResult<bool> {
        self.mutate_members(id, |roster| with_reordered(roster, from, to))
            .await
    }

    async fn mutate_members<F>(&self, id: TeamId, rule: F) -> DbResult<bool>
    where
        F: FnOnce(&Roster) -> Roster,
    {
        let _guard = self.write_lock.lock().await;

        let Some(current) = self.get_roster(id).await? else {
            debug!(team_id = id, "Member change on missing team ignored");
            return Ok(false);
        };

        let next = rule(&current);
        if next == current {
            debug!(team_id = id, "Member change rejected by roster rules");
            return Ok(false);
        }

        sqlx::query("UPDATE teams SET member_ids = ?1 WHERE id = ?2")
            .bind(encode_ids(&next.member_ids))
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(team_id = id, members = ?next.member_ids, "Updated team members");
        self.changes.notify();
        Ok(true)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets the persisted roster (member ids only).
    pub async fn get_roster(&self, id: TeamId) -> DbResult<Option<Roster>> {
        let row: Option<TeamRow> =
            sqlx::query_as("SELECT id, name, member_ids FROM teams WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Roster::try_from).transpose()
    }

    /// Lists all rosters ordered by id.
    pub async fn list_rosters(&self) -> DbResult<Vec<Roster>> {
        let rows: Vec<TeamRow> = sqlx::query_as("SELECT id, name, member_ids FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Roster::try_from).collect()
    }

    /// Gets a team with its members resolved.
    pub async fn get(&self, id: TeamId) -> DbResult<Option<Team>> {
        match self.get_roster(id).await? {
            Some(roster) => Ok(Some(self.resolve(roster).await?)),
            None => Ok(None),
        }
    }

    /// Lists all teams ordered by id, members resolved.
    pub async fn list_all(&self) -> DbResult<Vec<Team>> {
        let rosters = self.list_rosters().await?;

        let mut teams = Vec::with_capacity(rosters.len());
        for roster in rosters {
            teams.push(self.resolve(roster).await?);
        }
        Ok(teams)
    }

    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Resolves member ids in roster order, skipping ids missing from the
    /// catalog.
    async fn resolve(&self, roster: Roster) -> DbResult<Team> {
        let mut members = Vec::with_capacity(roster.member_ids.len());
        for species_id in &roster.member_ids {
            if let Some(species) = self.species.get(*species_id).await? {
                members.push(species);
            }
        }

        Ok(Team {
            id: roster.id,
            name: roster.name,
            members,
        })
    }

    // =========================================================================
    // Live feeds
    // =========================================================================

    /// Live view of all teams. Re-emits on team or species changes.
    pub fn watch_all(&self) -> Feed<TeamListQuery> {
        Feed::new(TeamListQuery { repo: self.clone() }, self.changes.subscribe())
            .with_related(self.species_changes.subscribe())
    }

    /// Live view of one team. Emits `None` once the team is deleted.
    pub fn watch_by_id(&self, id: TeamId) -> Feed<TeamQuery> {
        Feed::new(
            TeamQuery {
                repo: self.clone(),
                id,
            },
            self.changes.subscribe(),
        )
        .with_related(self.species_changes.subscribe())
    }
}

/// Feed query behind [`TeamRepository::watch_all`].
pub struct TeamListQuery {
    repo: TeamRepository,
}

#[async_trait]
impl FeedQuery for TeamListQuery {
    type Item = Vec<Team>;

    async fn fetch(&self) -> DbResult<Vec<Team>> {
        self.repo.list_all().await
    }
}

/// Feed query behind [`TeamRepository::watch_by_id`].
pub struct TeamQuery {
    repo: TeamRepository,
    id: TeamId,
}

#[async_trait]
impl FeedQuery for TeamQuery {
    type Item = Option<Team>;

    async fn fetch(&self) -> DbResult<Option<Team>> {
        self.repo.get(self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use pokedex_core::{Species, ValidationError, DEFAULT_TEAM_NAME};

    async fn db_with_catalog() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog: Vec<Species> = (1..=10)
            .map(|id| Species::skeleton(id, format!("Species {id}")))
            .collect();
        db.species().upsert_skeletons(&catalog).await.unwrap();
        db
    }

    async fn member_ids(repo: &TeamRepository, id: TeamId) -> Vec<SpeciesId> {
        repo.get_roster(id).await.unwrap().unwrap().member_ids
    }

    #[tokio::test]
    async fn test_create_normalizes_name() {
        let db = db_with_catalog().await;
        let teams = db.teams();

        let rain = teams.create("  Rain  ").await.unwrap();
        assert_eq!(rain.name, "Rain");
        assert!(rain.is_empty());

        let unnamed = teams.create("   ").await.unwrap();
        assert_eq!(unnamed.name, DEFAULT_TEAM_NAME);
        assert_ne!(rain.id, unnamed.id);

        let too_long = teams.create(&"x".repeat(51)).await;
        assert!(matches!(
            too_long,
            Err(DbError::Validation(ValidationError::TooLong { .. }))
        ));
        assert_eq!(teams.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team = teams.create("Old").await.unwrap();

        assert!(teams.rename(team.id, "New").await.unwrap());
        assert_eq!(teams.get_roster(team.id).await.unwrap().unwrap().name, "New");

        assert!(teams.rename(team.id, "").await.unwrap());
        assert_eq!(
            teams.get_roster(team.id).await.unwrap().unwrap().name,
            DEFAULT_TEAM_NAME
        );

        assert!(!teams.rename(999, "Ghost").await.unwrap());

        assert!(teams.delete(team.id).await.unwrap());
        assert!(!teams.delete(team.id).await.unwrap());
        assert!(teams.get(team.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_member_bounds() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team = teams.create("Six").await.unwrap();

        for species_id in 1..=6 {
            assert!(teams.add_member(team.id, species_id).await.unwrap());
        }
        assert_eq!(member_ids(&teams, team.id).await, vec![1, 2, 3, 4, 5, 6]);

        // Full
        assert!(!teams.add_member(team.id, 7).await.unwrap());
        // Duplicate
        teams.remove_member_at(team.id, 5).await.unwrap();
        assert!(!teams.add_member(team.id, 1).await.unwrap());
        // Missing team
        assert!(!teams.add_member(999, 1).await.unwrap());

        assert_eq!(member_ids(&teams, team.id).await, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_remove_and_reorder_persist_order() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team = teams.create("Order").await.unwrap();
        for species_id in [1, 4, 7, 10] {
            teams.add_member(team.id, species_id).await.unwrap();
        }

        assert!(teams.reorder_members(team.id, 0, 2).await.unwrap());
        assert_eq!(member_ids(&teams, team.id).await, vec![4, 7, 1, 10]);

        assert!(!teams.reorder_members(team.id, 0, 4).await.unwrap());
        assert!(!teams.reorder_members(team.id, 1, 1).await.unwrap());

        assert!(teams.remove_member_at(team.id, 1).await.unwrap());
        assert_eq!(member_ids(&teams, team.id).await, vec![4, 1, 10]);

        assert!(!teams.remove_member_at(team.id, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolution_skips_missing_species() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team = teams.create("Dangling").await.unwrap();
        teams.add_member(team.id, 3).await.unwrap();
        teams.add_member(team.id, 42).await.unwrap();
        teams.add_member(team.id, 1).await.unwrap();

        let resolved = teams.get(team.id).await.unwrap().unwrap();
        assert_eq!(
            resolved.members.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![3, 1]
        );
        // Persisted roster keeps the dangling id
        assert_eq!(member_ids(&teams, team.id).await, vec![3, 42, 1]);
    }

    #[tokio::test]
    async fn test_list_all_in_creation_order() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        teams.create("A").await.unwrap();
        teams.create("B").await.unwrap();

        let names: Vec<String> = teams
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team_id = teams.create("Race").await.unwrap().id;

        let handles: Vec<_> = (1..=4)
            .map(|species_id| {
                let teams = teams.clone();
                tokio::spawn(async move { teams.add_member(team_id, species_id).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        let mut ids = member_ids(&teams, team_id).await;
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_team_feeds() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team = teams.create("Watched").await.unwrap();

        let mut all = teams.watch_all();
        let mut one = teams.watch_by_id(team.id);
        assert_eq!(all.current().await.unwrap().len(), 1);
        assert!(one.current().await.unwrap().unwrap().is_empty());

        teams.add_member(team.id, 5).await.unwrap();
        let updated = one.next().await.unwrap().unwrap().unwrap();
        assert!(updated.contains(5));

        teams.delete(team.id).await.unwrap();
        assert!(all.next().await.unwrap().unwrap().is_empty());
        assert!(one.next().await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_team_feed_follows_species_changes() {
        let db = db_with_catalog().await;
        let teams = db.teams();
        let team = teams.create("Hydrating").await.unwrap();
        teams.add_member(team.id, 2).await.unwrap();

        let mut one = teams.watch_by_id(team.id);
        one.current().await.unwrap();

        db.species()
            .update_basic_details(2, &["Water".to_string()], None)
            .await
            .unwrap();

        let team = one.next().await.unwrap().unwrap().unwrap();
        assert_eq!(team.members[0].types, vec!["Water"]);
    }
}
