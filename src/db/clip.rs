// SPDX-License-Identifier: GPL-2.0-or-later
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{Clip, ClipRepository, NewClip};

const INSERT_CLIP: &str = "
    INSERT INTO audio_clips (title, description, genre, duration, audio_url)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *;
";

/// Migrations embedded from `./migrations/`; they only ever create missing objects.
pub static MIGRATIONS: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/");

/// A [`ClipRepository`] backed by the `audio_clips` table in PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgClipRepository {
    pool: PgPool,
}

impl PgClipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClipRepository for PgClipRepository {
    #[instrument(skip_all)]
    async fn ping(&self) -> Result<(), crate::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn ensure_schema(&self) -> Result<(), crate::Error> {
        MIGRATIONS.run(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn list(&self) -> Result<Vec<Clip>, crate::Error> {
        sqlx::query_as::<_, Clip>(
            "
            SELECT *
            FROM audio_clips;
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(crate::Error::Database)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Clip, crate::Error> {
        sqlx::query_as::<_, Clip>(
            "
            SELECT *
            FROM audio_clips
            WHERE id = $1;
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(crate::Error::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn create(&self, clip: NewClip) -> Result<Clip, crate::Error> {
        clip.validate()?;
        Ok(sqlx::query_as::<_, Clip>(INSERT_CLIP)
            .bind(&clip.title)
            .bind(&clip.description)
            .bind(&clip.genre)
            .bind(clip.duration)
            .bind(&clip.audio_url)
            .fetch_one(&self.pool)
            .await?)
    }

    /// The increment happens in a single statement so the row lock serializes concurrent plays,
    /// even across service instances.
    #[instrument(skip(self))]
    async fn increment_play_count(&self, id: i64) -> Result<Clip, crate::Error> {
        sqlx::query_as::<_, Clip>(
            "
            UPDATE audio_clips
            SET play_count = play_count + 1, updated_at = now()
            WHERE id = $1
            RETURNING *;
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(crate::Error::NotFound(id))
    }

    #[instrument(skip_all)]
    async fn count(&self) -> Result<i64, crate::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_clips;")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip_all)]
    async fn clear(&self) -> Result<u64, crate::Error> {
        Ok(sqlx::query("DELETE FROM audio_clips;")
            .execute(&self.pool)
            .await?
            .rows_affected())
    }

    /// The table lock is held until commit, so a second seeder waits and then sees the rows
    /// the first one inserted.
    #[instrument(skip_all)]
    async fn seed_if_empty(&self, clips: &[NewClip]) -> Result<usize, crate::Error> {
        for clip in clips {
            clip.validate()?;
        }

        let mut transaction = self.pool.begin().await?;
        sqlx::query("LOCK TABLE audio_clips IN EXCLUSIVE MODE;")
            .execute(&mut *transaction)
            .await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_clips;")
            .fetch_one(&mut *transaction)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        for clip in clips {
            sqlx::query(INSERT_CLIP)
                .bind(&clip.title)
                .bind(&clip.description)
                .bind(&clip.genre)
                .bind(clip.duration)
                .bind(&clip.audio_url)
                .execute(&mut *transaction)
                .await?;
        }
        transaction.commit().await?;
        Ok(clips.len())
    }
}
