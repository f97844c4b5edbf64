/// Conversions between database records and the public-facing API structures
use clips_api_structs::{Clip, ClipCreate, ClipStats};

use crate::db;

impl From<db::Clip> for Clip {
    fn from(clip: db::Clip) -> Self {
        Self {
            id: clip.id,
            title: clip.title,
            description: clip.description,
            genre: clip.genre,
            duration: clip.duration,
            audio_url: clip.audio_url,
            play_count: clip.play_count,
            created_at: clip.created_at,
            updated_at: clip.updated_at,
        }
    }
}

impl From<db::ClipStats> for ClipStats {
    fn from(stats: db::ClipStats) -> Self {
        Self {
            id: stats.id,
            title: stats.title,
            play_count: stats.play_count,
            genre: stats.genre,
            duration: stats.duration,
        }
    }
}

impl From<ClipCreate> for db::NewClip {
    fn from(upload: ClipCreate) -> Self {
        Self {
            title: upload.title,
            description: upload.description,
            genre: upload.genre,
            duration: upload.duration,
            audio_url: upload.audio_url,
        }
    }
}

pub fn db_clips_to_api(clips: Vec<db::Clip>) -> Vec<Clip> {
    clips.into_iter().map(Clip::from).collect()
}
