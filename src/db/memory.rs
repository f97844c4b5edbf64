// SPDX-License-Identifier: GPL-2.0-or-later
//
// An in-memory clip store for exercising the service without PostgreSQL.
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::Utc;

use super::{Clip, ClipRepository, NewClip};

#[derive(Debug, Default)]
pub(crate) struct MemoryClipRepository {
    clips: Mutex<Vec<Clip>>,
    /// The number of pings to fail before the store "comes up".
    unreachable_for: AtomicU32,
    pub(crate) pings: AtomicU32,
}

impl MemoryClipRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn unreachable_for(pings: u32) -> Self {
        Self {
            unreachable_for: AtomicU32::new(pings),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ClipRepository for MemoryClipRepository {
    async fn ping(&self) -> Result<(), crate::Error> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .unreachable_for
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            Err(crate::Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    async fn ensure_schema(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Clip>, crate::Error> {
        Ok(self.clips.lock().unwrap().clone())
    }

    async fn get(&self, id: i64) -> Result<Clip, crate::Error> {
        self.clips
            .lock()
            .unwrap()
            .iter()
            .find(|clip| clip.id == id)
            .cloned()
            .ok_or(crate::Error::NotFound(id))
    }

    async fn create(&self, clip: NewClip) -> Result<Clip, crate::Error> {
        clip.validate()?;
        Ok(insert(&mut self.clips.lock().unwrap(), clip))
    }

    async fn increment_play_count(&self, id: i64) -> Result<Clip, crate::Error> {
        let mut clips = self.clips.lock().unwrap();
        let clip = clips
            .iter_mut()
            .find(|clip| clip.id == id)
            .ok_or(crate::Error::NotFound(id))?;
        clip.play_count += 1;
        clip.updated_at = Utc::now();
        Ok(clip.clone())
    }

    async fn count(&self) -> Result<i64, crate::Error> {
        Ok(self.clips.lock().unwrap().len() as i64)
    }

    async fn clear(&self) -> Result<u64, crate::Error> {
        let mut clips = self.clips.lock().unwrap();
        let removed = clips.len() as u64;
        clips.clear();
        Ok(removed)
    }

    async fn seed_if_empty(&self, seeds: &[NewClip]) -> Result<usize, crate::Error> {
        for seed in seeds {
            seed.validate()?;
        }
        let mut clips = self.clips.lock().unwrap();
        if !clips.is_empty() {
            return Ok(0);
        }
        for seed in seeds {
            insert(&mut clips, seed.clone());
        }
        Ok(seeds.len())
    }
}

fn insert(clips: &mut Vec<Clip>, clip: NewClip) -> Clip {
    let now = Utc::now();
    let clip = Clip {
        id: clips.iter().map(|c| c.id).max().unwrap_or(0) + 1,
        title: clip.title,
        description: clip.description,
        genre: clip.genre,
        duration: clip.duration,
        audio_url: clip.audio_url,
        play_count: 0,
        created_at: now,
        updated_at: now,
    };
    clips.push(clip.clone());
    clip
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_clip(title: &str) -> NewClip {
        NewClip {
            title: title.into(),
            description: Some("a test clip".into()),
            genre: "test".into(),
            duration: 1.5,
            audio_url: "http://localhost/clip.mp3".into(),
        }
    }

    #[tokio::test]
    async fn created_clip_round_trips() {
        let repo = MemoryClipRepository::new();
        let created = repo.create(new_clip("one")).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.play_count, 0);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn invalid_clip_is_not_stored() {
        let repo = MemoryClipRepository::new();

        let result = repo.create(new_clip("")).await;

        assert!(matches!(result, Err(crate::Error::Validation(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn stats_for_missing_clip() {
        let repo = MemoryClipRepository::new();

        assert!(matches!(
            repo.stats(42).await,
            Err(crate::Error::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let repo = Arc::new(MemoryClipRepository::new());
        let id = repo.create(new_clip("popular")).await.unwrap().id;

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.increment_play_count(id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.stats(id).await.unwrap().play_count, 25);
    }
}
