// SPDX-License-Identifier: GPL-2.0-or-later
//
// Startup bootstrap: wait for the database, create the schema, and seed an empty catalog.
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::db::{ClipRepository, NewClip};

/// The example clips inserted into an empty catalog.
pub const SEED_CLIPS: [SeedClip; 6] = [
    SeedClip {
        title: "Ambient Forest",
        description: "Peaceful forest ambience with birds and gentle wind",
        genre: "ambient",
        duration: 30.0,
        audio_url: "https://commondatastorage.googleapis.com/codeskulptor-demos/DDR_assets/Kangaroo_MusiQue_-_The_Neverwritten_Role_Playing_Game.mp3",
    },
    SeedClip {
        title: "Electronic Beat",
        description: "Upbeat electronic rhythm with synth pads",
        genre: "electronic",
        duration: 25.5,
        audio_url: "https://codeskulptor-demos.commondatastorage.googleapis.com/GalaxyInvaders/theme_01.mp3",
    },
    SeedClip {
        title: "Acoustic Guitar",
        description: "Solo acoustic guitar melody",
        genre: "acoustic",
        duration: 32.3,
        audio_url: "https://codeskulptor-demos.commondatastorage.googleapis.com/pang/paza-moduless.mp3",
    },
    SeedClip {
        title: "Rain Sounds",
        description: "Gentle rain falling on a rooftop",
        genre: "ambient",
        duration: 28.7,
        audio_url: "https://commondatastorage.googleapis.com/codeskulptor-assets/sounddogs/soundtrack.mp3",
    },
    SeedClip {
        title: "Jazz Piano",
        description: "Smooth jazz piano improvisation",
        genre: "jazz",
        duration: 41.2,
        audio_url: "https://commondatastorage.googleapis.com/codeskulptor-demos/DDR_assets/Kangaroo_MusiQue_-_The_Neverwritten_Role_Playing_Game.mp3",
    },
    SeedClip {
        title: "Tech House",
        description: "Modern tech house with deep bass",
        genre: "electronic",
        duration: 35.6,
        audio_url: "https://codeskulptor-demos.commondatastorage.googleapis.com/GalaxyInvaders/theme_01.mp3",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct SeedClip {
    pub title: &'static str,
    pub description: &'static str,
    pub genre: &'static str,
    pub duration: f64,
    pub audio_url: &'static str,
}

impl From<&SeedClip> for NewClip {
    fn from(seed: &SeedClip) -> Self {
        Self {
            title: seed.title.to_string(),
            description: Some(seed.description.to_string()),
            genre: seed.genre.to_string(),
            duration: seed.duration,
            audio_url: seed.audio_url.to_string(),
        }
    }
}

/// Ping the store until it answers, up to `retries` times with `delay` between attempts.
#[instrument(skip(repository))]
pub async fn wait_for_store(
    repository: &dyn ClipRepository,
    retries: u32,
    delay: Duration,
) -> Result<(), crate::Error> {
    for attempt in 1..=retries {
        match repository.ping().await {
            Ok(()) => {
                info!(attempt, "Database is ready");
                return Ok(());
            }
            Err(err) => {
                warn!(attempt, retries, "Waiting for the database: {}", err);
                if attempt < retries {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(crate::Error::DatabaseUnavailable { attempts: retries })
}

/// Insert [`SEED_CLIPS`] if, and only if, the catalog is empty.
///
/// # Returns
///
/// The number of clips inserted, which is zero when any clip already exists.
#[instrument(skip_all)]
pub async fn seed_if_empty(repository: &dyn ClipRepository) -> Result<usize, crate::Error> {
    let clips: Vec<NewClip> = SEED_CLIPS.iter().map(NewClip::from).collect();
    let inserted = repository.seed_if_empty(&clips).await?;
    if inserted == 0 {
        info!("Database already contains clips; skipping seed");
    } else {
        info!("Database seeded with {} clips", inserted);
    }
    Ok(inserted)
}

/// Wait for the store, make sure the schema exists, and seed an empty catalog.
pub async fn bootstrap(
    repository: &dyn ClipRepository,
    retries: u32,
    delay: Duration,
) -> Result<usize, crate::Error> {
    wait_for_store(repository, retries, delay).await?;
    repository.ensure_schema().await?;
    info!("Database schema is up to date");
    seed_if_empty(repository).await
}
