// SPDX-License-Identifier: GPL-2.0-or-later
//
// These tests need a PostgreSQL server; point DATABASE_URL at one and run with `--ignored`.
use std::sync::Arc;

use sqlx::PgPool;

use clips_service::db::{ClipRepository, NewClip, PgClipRepository};
use clips_service::{seed, Error};

fn new_clip(title: &str) -> NewClip {
    NewClip {
        title: title.to_string(),
        description: Some("integration test clip".to_string()),
        genre: "test".to_string(),
        duration: 10.0,
        audio_url: "http://localhost/clip.mp3".to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn create_and_get(pool: PgPool) {
    let repo = PgClipRepository::new(pool);

    let created = repo.create(new_clip("X")).await.unwrap();
    let fetched = repo.get(created.id).await.unwrap();

    assert!(created.id >= 0);
    assert_eq!(created.play_count, 0);
    assert_eq!(fetched, created);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn list_returns_each_clip_once(pool: PgPool) {
    let repo = PgClipRepository::new(pool);
    let mut ids = vec![];
    for title in ["a", "b", "c"] {
        ids.push(repo.create(new_clip(title)).await.unwrap().id);
    }

    let mut listed: Vec<i64> = repo.list().await.unwrap().iter().map(|c| c.id).collect();
    listed.sort();

    assert_eq!(listed, ids);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn invalid_clip_persists_nothing(pool: PgPool) {
    let repo = PgClipRepository::new(pool);

    let result = repo.create(new_clip("")).await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn missing_clip(pool: PgPool) {
    let repo = PgClipRepository::new(pool);

    assert!(matches!(repo.get(404).await, Err(Error::NotFound(404))));
    assert!(matches!(repo.stats(404).await, Err(Error::NotFound(404))));
    assert!(matches!(
        repo.increment_play_count(404).await,
        Err(Error::NotFound(404))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn concurrent_plays_are_all_counted(pool: PgPool) {
    let repo = Arc::new(PgClipRepository::new(pool));
    let clip = repo.create(new_clip("popular")).await.unwrap();
    let id = clip.id;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_play_count(id).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stats = repo.stats(clip.id).await.unwrap();
    assert_eq!(stats.play_count, 20);
    let updated = repo.get(clip.id).await.unwrap();
    assert!(updated.updated_at >= updated.created_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn bootstrap_seeds_once(pool: PgPool) {
    let repo = PgClipRepository::new(pool);
    let delay = std::time::Duration::from_millis(10);

    assert_eq!(seed::bootstrap(&repo, 3, delay).await.unwrap(), 6);
    assert_eq!(seed::bootstrap(&repo, 3, delay).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 6);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn simultaneous_bootstraps_seed_once(pool: PgPool) {
    let first = PgClipRepository::new(pool.clone());
    let second = PgClipRepository::new(pool);
    let delay = std::time::Duration::from_millis(10);

    let (a, b) = tokio::join!(
        seed::bootstrap(&first, 3, delay),
        seed::bootstrap(&second, 3, delay)
    );

    assert_eq!(a.unwrap() + b.unwrap(), 6);
    assert_eq!(first.count().await.unwrap(), 6);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn seeding_a_populated_catalog_inserts_nothing(pool: PgPool) {
    let repo = PgClipRepository::new(pool);
    repo.create(new_clip("already here")).await.unwrap();

    let inserted = repo
        .seed_if_empty(&[new_clip("a"), new_clip("b")])
        .await
        .unwrap();

    assert_eq!(inserted, 0);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn invalid_seed_rolls_back(pool: PgPool) {
    let repo = PgClipRepository::new(pool);

    let result = repo.seed_if_empty(&[new_clip("a"), new_clip("")]).await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(repo.count().await.unwrap(), 0);
}
