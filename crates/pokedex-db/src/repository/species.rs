//! # Species Repository
//!
//! Database operations for the species catalog.
//!
//! ## Row Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upsert_skeletons      id + name          (types = '', rest NULL)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  update_basic_details  types, image_url                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  update_full_details   + height, weight, stats, abilities               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  delete_all            catalog invalidation only                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Re-running list sync only rewrites `name`, so hydrated columns survive.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::encoding::{decode_names, decode_stats, encode_names, encode_stats};
use crate::error::{DbError, DbResult};
use crate::feed::{ChangeNotifier, Feed, FeedQuery};
use pokedex_core::{Species, SpeciesId};

const SPECIES_COLUMNS: &str =
    "id, name, types, image_url, height, weight, stats, abilities";

/// Raw `species` row.
#[derive(Debug, sqlx::FromRow)]
struct SpeciesRow {
    id: i64,
    name: String,
    types: String,
    image_url: Option<String>,
    height: Option<i64>,
    weight: Option<i64>,
    stats: Option<String>,
    abilities: Option<String>,
}

impl TryFrom<SpeciesRow> for Species {
    type Error = DbError;

    fn try_from(row: SpeciesRow) -> DbResult<Self> {
        let id = SpeciesId::try_from(row.id).map_err(|_| DbError::decode("id", row.id.to_string()))?;
        let height = row.height.map(|h| to_u32("height", h)).transpose()?;
        let weight = row.weight.map(|w| to_u32("weight", w)).transpose()?;
        let stats = row.stats.as_deref().map(decode_stats).transpose()?;

        Ok(Species {
            id,
            name: row.name,
            types: decode_names(&row.types),
            image_url: row.image_url,
            height,
            weight,
            stats,
            abilities: row.abilities.as_deref().map(decode_names),
        })
    }
}

fn to_u32(column: &str, value: i64) -> DbResult<u32> {
    u32::try_from(value).map_err(|_| DbError::decode(column, value.to_string()))
}

/// Repository for species database operations.
#[derive(Debug, Clone)]
pub struct SpeciesRepository {
    pool: SqlitePool,
    changes: ChangeNotifier,
}

impl SpeciesRepository {
    /// Creates a new SpeciesRepository.
    pub fn new(pool: SqlitePool, changes: ChangeNotifier) -> Self {
        SpeciesRepository { pool, changes }
    }

    /// Inserts or renames skeleton records in one transaction.
    ///
    /// Only `id` and `name` of each input are written. Existing rows keep
    /// every detail column. Either the whole batch commits or nothing does.
    ///
    /// ## Returns
    /// Number of records written.
    pub async fn upsert_skeletons(&self, skeletons: &[Species]) -> DbResult<usize> {
        debug!(count = skeletons.len(), "Upserting species skeletons");

        let mut tx = self.pool.begin().await?;
        for species in skeletons {
            sqlx::query(
                r#"
                INSERT INTO species (id, name)
                VALUES (?1, ?2)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name
                "#,
            )
            .bind(i64::from(species.id))
            .bind(&species.name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        self.changes.notify();
        Ok(skeletons.len())
    }

    /// Gets a species by id.
    pub async fn get(&self, id: SpeciesId) -> DbResult<Option<Species>> {
        let sql = format!("SELECT {SPECIES_COLUMNS} FROM species WHERE id = ?1");
        let row: Option<SpeciesRow> = sqlx::query_as(&sql)
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await?;

        row.map(Species::try_from).transpose()
    }

    /// Gets a species by id, failing if it is absent.
    pub async fn get_required(&self, id: SpeciesId) -> DbResult<Species> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Species", id))
    }

    /// Lists the whole catalog ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Species>> {
        let sql = format!("SELECT {SPECIES_COLUMNS} FROM species ORDER BY id");
        let rows: Vec<SpeciesRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Species::try_from).collect()
    }

    /// Number of catalog rows.
    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM species")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Writes the basic detail tier (types and image).
    ///
    /// Full-detail columns are left untouched.
    ///
    /// ## Returns
    /// `false` if no row with this id exists.
    pub async fn update_basic_details(
        &self,
        id: SpeciesId,
        types: &[String],
        image_url: Option<&str>,
    ) -> DbResult<bool> {
        let result = sqlx::query("UPDATE species SET types = ?1, image_url = ?2 WHERE id = ?3")
            .bind(encode_names(types))
            .bind(image_url)
            .bind(i64::from(id))
            .execute(&self.pool)
            .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            debug!(species_id = id, "Stored basic details");
            self.changes.notify();
        }
        Ok(updated)
    }

    /// Writes every detail column from a fully hydrated record.
    ///
    /// The name is not touched. Absent optional fields are stored as NULL.
    ///
    /// ## Returns
    /// `false` if no row with this id exists.
    pub async fn update_full_details(&self, species: &Species) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE species
            SET types = ?1, image_url = ?2, height = ?3, weight = ?4,
                stats = ?5, abilities = ?6
            WHERE id = ?7
            "#,
        )
        .bind(encode_names(&species.types))
        .bind(species.image_url.as_deref())
        .bind(species.height.map(i64::from))
        .bind(species.weight.map(i64::from))
        .bind(species.stats.as_deref().map(encode_stats))
        .bind(species.abilities.as_deref().map(encode_names))
        .bind(i64::from(species.id))
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            debug!(species_id = species.id, "Stored full details");
            self.changes.notify();
        }
        Ok(updated)
    }

    /// Removes the whole catalog in one statement.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM species")
            .execute(&self.pool)
            .await?;

        self.changes.notify();
        Ok(result.rows_affected())
    }

    /// Live view of the catalog ordered by id.
    pub fn watch_all(&self) -> Feed<CatalogQuery> {
        Feed::new(CatalogQuery { repo: self.clone() }, self.changes.subscribe())
    }
}

/// Feed query behind [`SpeciesRepository::watch_all`].
pub struct CatalogQuery {
    repo: SpeciesRepository,
}

#[async_trait]
impl FeedQuery for CatalogQuery {
    type Item = Vec<Species>;

    async fn fetch(&self) -> DbResult<Vec<Species>> {
        self.repo.list_all().await
    }
}
