// SPDX-License-Identifier: GPL-2.0-or-later
//
// Provides structures and functions for interacting with the database.

mod clip;
#[cfg(test)]
pub(crate) mod memory;

pub use clip::{PgClipRepository, MIGRATIONS};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Representation of an audio clip in the database.
///
/// Clips are added through the HTTP API or by the seeder, and their audio is fetched from
/// `audio_url` every time they are streamed.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Clip {
    /// The unique identifier for the clip and primary key for the table.
    pub id: i64,
    pub title: String,
    /// A description of the clip for human consumption.
    pub description: Option<String>,
    pub genre: String,
    /// Duration of the audio, in seconds.
    pub duration: f64,
    /// Location of the audio payload; not checked until the clip is streamed.
    pub audio_url: String,
    /// Number of times the clip has been streamed.
    pub play_count: i64,
    /// The time when the clip was added to the database.
    pub created_at: DateTime<Utc>,
    /// The last time the row was changed; this is equal to `created_at` when created.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Display for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Clip ID {}\n\tTitle: {}\n\tGenre: {}\n\tPlays: {}\n\tURL: {}\n",
            self.id, self.title, self.genre, self.play_count, self.audio_url
        )
    }
}

/// The fields needed to insert a clip; everything else is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClip {
    pub title: String,
    pub description: Option<String>,
    pub genre: String,
    pub duration: f64,
    pub audio_url: String,
}

impl NewClip {
    /// Check the required fields are present and sensible.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut problems = vec![];
        if self.title.trim().is_empty() {
            problems.push("title must not be empty");
        }
        if self.genre.trim().is_empty() {
            problems.push("genre must not be empty");
        }
        if self.audio_url.trim().is_empty() {
            problems.push("audio_url must not be empty");
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            problems.push("duration must be a non-negative number of seconds");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::Validation(problems.join(", ")))
        }
    }
}

/// The usage statistics of a single clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipStats {
    pub id: i64,
    pub title: String,
    pub play_count: i64,
    pub genre: String,
    pub duration: f64,
}

impl From<Clip> for ClipStats {
    fn from(clip: Clip) -> Self {
        Self {
            id: clip.id,
            title: clip.title,
            play_count: clip.play_count,
            genre: clip.genre,
            duration: clip.duration,
        }
    }
}

/// Storage for the clip catalog.
///
/// Every operation on a single clip reports a missing id as [`crate::Error::NotFound`].
#[async_trait]
pub trait ClipRepository: Send + Sync {
    /// Check the store answers queries at all.
    async fn ping(&self) -> Result<(), crate::Error>;

    /// Create the clip table if it doesn't exist yet. Existing data is never dropped.
    async fn ensure_schema(&self) -> Result<(), crate::Error>;

    /// List all clips. No pagination or ordering is performed.
    async fn list(&self) -> Result<Vec<Clip>, crate::Error>;

    async fn get(&self, id: i64) -> Result<Clip, crate::Error>;

    /// Validate and insert a new clip with a play count of zero.
    async fn create(&self, clip: NewClip) -> Result<Clip, crate::Error>;

    /// Atomically add one to the clip's play count, returning the updated clip.
    async fn increment_play_count(&self, id: i64) -> Result<Clip, crate::Error>;

    async fn count(&self) -> Result<i64, crate::Error>;

    /// Remove every clip, returning how many were removed.
    async fn clear(&self) -> Result<u64, crate::Error>;

    /// Insert `clips` if the catalog is empty, returning how many were inserted.
    ///
    /// The emptiness check and the inserts are one atomic unit: concurrent callers seed the
    /// catalog at most once between them, and a failed insert leaves the catalog empty.
    async fn seed_if_empty(&self, clips: &[NewClip]) -> Result<usize, crate::Error>;

    async fn stats(&self, id: i64) -> Result<ClipStats, crate::Error> {
        self.get(id).await.map(ClipStats::from)
    }
}
