use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    /// The unique identifier for the clip and primary key for the table.
    pub id: i64,
    /// Human-readable name of the clip; also used as the download filename.
    pub title: String,
    /// A description of the clip for human consumption.
    pub description: Option<String>,
    pub genre: String,
    /// Duration of the audio, in seconds.
    pub duration: f64,
    /// Where the audio payload lives; fetched when the clip is streamed.
    pub audio_url: String,
    /// Number of times the clip has been streamed.
    pub play_count: i64,
    /// The time when the clip was added to the database.
    pub created_at: DateTime<Utc>,
    /// The last time the clip was changed; this is equal to `created_at` when created.
    pub updated_at: DateTime<Utc>,
}

/// The request body used to add a clip.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClipCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub genre: String,
    /// Duration in seconds.
    pub duration: f64,
    pub audio_url: String,
}

/// Usage statistics for a single clip.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClipStats {
    pub id: i64,
    pub title: String,
    pub play_count: i64,
    pub genre: String,
    pub duration: f64,
}
