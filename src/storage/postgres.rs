//! Postgres-backed `ListingStore`.
//!
//! Schema is created at connect time. `save` reproduces the
//! eager-load / cascade-all / orphan-removal behavior of the listing model:
//! the image rows are reconciled to exactly the supplied set inside one
//! transaction, with a `position` column so load order reproduces the order
//! the service persisted.

use crate::domain::listing::{Listing, ListingImage, ListingStatus};
use crate::storage::store::{CheckedSave, ListingStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    /// Connects to `database_url` and creates the tables if needed.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listings (
                id BIGSERIAL PRIMARY KEY,
                owner_id BIGINT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                condition TEXT NOT NULL,
                language TEXT NOT NULL,
                min_players INT NOT NULL,
                max_players INT NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listing_images (
                id BIGSERIAL PRIMARY KEY,
                listing_id BIGINT NOT NULL REFERENCES listings(id) ON DELETE CASCADE,
                url TEXT NOT NULL,
                position INT NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_images(&self, listing_id: i64) -> anyhow::Result<Vec<ListingImage>> {
        let rows = sqlx::query(
            "SELECT id, listing_id, url FROM listing_images
             WHERE listing_id = $1 ORDER BY position, id",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_image).collect()
    }

    /// Deletes image rows absent from the new set, updates the kept ones and
    /// inserts the new ones, preserving the supplied order via `position`.
    async fn sync_images(
        tx: &mut Transaction<'_, Postgres>,
        listing_id: i64,
        images: &mut [ListingImage],
    ) -> anyhow::Result<()> {
        let kept_ids: Vec<i64> = images.iter().filter_map(|i| i.id).collect();
        sqlx::query(
            "DELETE FROM listing_images WHERE listing_id = $1 AND NOT (id = ANY($2))",
        )
        .bind(listing_id)
        .bind(&kept_ids)
        .execute(&mut **tx)
        .await?;

        for (position, image) in images.iter_mut().enumerate() {
            match image.id {
                Some(image_id) => {
                    // Scoped to the owning listing so a stray id can never
                    // touch another listing's rows.
                    sqlx::query(
                        "UPDATE listing_images SET url = $1, position = $2
                         WHERE id = $3 AND listing_id = $4",
                    )
                    .bind(&image.url)
                    .bind(position as i32)
                    .bind(image_id)
                    .bind(listing_id)
                    .execute(&mut **tx)
                    .await?;
                }
                None => {
                    let row = sqlx::query(
                        "INSERT INTO listing_images (listing_id, url, position)
                         VALUES ($1, $2, $3) RETURNING id",
                    )
                    .bind(listing_id)
                    .bind(&image.url)
                    .bind(position as i32)
                    .fetch_one(&mut **tx)
                    .await?;
                    image.id = Some(row.try_get("id")?);
                }
            }
            image.listing_id = Some(listing_id);
        }
        Ok(())
    }

    /// Updates the listing row inside `tx`, refreshing the immutable
    /// `created_at` from the database. Returns false when the row is gone.
    async fn update_row(
        tx: &mut Transaction<'_, Postgres>,
        listing: &mut Listing,
    ) -> anyhow::Result<bool> {
        let id = listing
            .id
            .ok_or_else(|| anyhow::anyhow!("update of a listing without an id"))?;

        // created_at is deliberately not in the SET list: it is immutable
        // after insert.
        let updated = sqlx::query(
            "UPDATE listings SET
                owner_id = $1, title = $2, description = $3, condition = $4,
                language = $5, min_players = $6, max_players = $7, status = $8
             WHERE id = $9
             RETURNING created_at",
        )
        .bind(listing.owner_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.condition)
        .bind(listing.language.as_str())
        .bind(listing.min_players)
        .bind(listing.max_players)
        .bind(listing.status.as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        match updated {
            Some(row) => {
                listing.created_at = Some(row.try_get::<DateTime<Utc>, _>("created_at")?);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn get(&self, id: i64) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query(
            "SELECT id, owner_id, title, description, condition, language,
                    min_players, max_players, status, created_at
             FROM listings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut listing = row_to_listing(&row)?;
                listing.images = self.load_images(id).await?;
                Ok(Some(listing))
            }
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> anyhow::Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn find_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, title, description, condition, language,
                    min_players, max_players, status, created_at
             FROM listings WHERE owner_id = $1 ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut listing = row_to_listing(row)?;
            if let Some(id) = listing.id {
                listing.images = self.load_images(id).await?;
            }
            listings.push(listing);
        }
        Ok(listings)
    }

    async fn save(&self, mut listing: Listing) -> anyhow::Result<Listing> {
        let mut tx = self.pool.begin().await?;

        let listing_id = match listing.id {
            None => {
                let row = sqlx::query(
                    "INSERT INTO listings
                        (owner_id, title, description, condition, language,
                         min_players, max_players, status)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                     RETURNING id, created_at",
                )
                .bind(listing.owner_id)
                .bind(&listing.title)
                .bind(&listing.description)
                .bind(&listing.condition)
                .bind(listing.language.as_str())
                .bind(listing.min_players)
                .bind(listing.max_players)
                .bind(listing.status.as_str())
                .fetch_one(&mut *tx)
                .await?;

                let id: i64 = row.try_get("id")?;
                listing.id = Some(id);
                listing.created_at = Some(row.try_get::<DateTime<Utc>, _>("created_at")?);
                id
            }
            Some(id) => {
                if !Self::update_row(&mut tx, &mut listing).await? {
                    anyhow::bail!("update of unknown listing id {}", id);
                }
                id
            }
        };

        Self::sync_images(&mut tx, listing_id, &mut listing.images).await?;
        tx.commit().await?;
        Ok(listing)
    }

    async fn save_if_status(
        &self,
        mut listing: Listing,
        expected: ListingStatus,
    ) -> anyhow::Result<CheckedSave> {
        let id = listing
            .id
            .ok_or_else(|| anyhow::anyhow!("guarded save requires a listing id"))?;

        let mut tx = self.pool.begin().await?;

        // Row lock for the whole check-then-write; dropping the transaction
        // on the early returns rolls back and releases it.
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM listings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current: ListingStatus = match current {
            Some(s) => s.parse()?,
            None => return Ok(CheckedSave::Missing),
        };
        if current != expected {
            return Ok(CheckedSave::StatusChanged(current));
        }

        if !Self::update_row(&mut tx, &mut listing).await? {
            return Ok(CheckedSave::Missing);
        }
        Self::sync_images(&mut tx, id, &mut listing.images).await?;
        tx.commit().await?;
        Ok(CheckedSave::Saved(listing))
    }

    async fn update_status(
        &self,
        id: i64,
        target: ListingStatus,
    ) -> anyhow::Result<Option<Listing>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "UPDATE listings SET status = $1 WHERE id = $2
             RETURNING id, owner_id, title, description, condition, language,
                       min_players, max_players, status, created_at",
        )
        .bind(target.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut listing = row_to_listing(&row)?;

        let image_rows = sqlx::query(
            "SELECT id, listing_id, url FROM listing_images
             WHERE listing_id = $1 ORDER BY position, id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        listing.images = image_rows.iter().map(row_to_image).collect::<anyhow::Result<_>>()?;

        tx.commit().await?;
        Ok(Some(listing))
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        // listing_images rows go with the listing (ON DELETE CASCADE).
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM listings WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_listing(row: &PgRow) -> anyhow::Result<Listing> {
    Ok(Listing {
        id: Some(row.try_get("id")?),
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        condition: row.try_get("condition")?,
        language: row.try_get::<String, _>("language")?.parse()?,
        min_players: row.try_get("min_players")?,
        max_players: row.try_get("max_players")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        created_at: Some(row.try_get::<DateTime<Utc>, _>("created_at")?),
        images: Vec::new(),
    })
}

fn row_to_image(row: &PgRow) -> anyhow::Result<ListingImage> {
    Ok(ListingImage {
        id: Some(row.try_get("id")?),
        url: row.try_get("url")?,
        listing_id: Some(row.try_get("listing_id")?),
    })
}
