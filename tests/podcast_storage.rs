//! Integration tests for podcast storage
//!
//! Most cases run against an in-memory SQLite database; the concurrency case
//! uses a temporary file so several pooled connections share one database.
//! No fixtures are needed: `cargo test --test podcast_storage`.

use podcast_catalog::storage::{
    queries, Author, Database, Explicit, MediaOrder, MediaStatus, NewMedia, NewPodcast, Podcast,
};

async fn setup() -> Database {
    Database::new_in_memory()
        .await
        .expect("Failed to create in-memory database")
}

async fn create_podcast(db: &Database, title: &str) -> Podcast {
    let new_podcast = NewPodcast::new(title, Author::new("Ann Host", "ann@example.com"), title);
    queries::insert_podcast(db.pool(), &new_podcast)
        .await
        .expect("Failed to insert podcast")
}

async fn add_episode(db: &Database, podcast: &Podcast, slug: &str, status: MediaStatus) {
    let new_media = NewMedia::new(slug, slug)
        .in_podcast(podcast.id())
        .with_status(status);
    queries::insert_media(db.pool(), &new_media)
        .await
        .expect("Failed to insert media");
}

#[tokio::test]
async fn test_slugs_that_normalize_alike_collide() {
    let db = setup().await;
    let first = create_podcast(&db, "My Show").await;
    assert_eq!(first.slug().as_str(), "my-show");

    let duplicate = NewPodcast::new("Other", Author::new("b", "b@example.com"), "my  SHOW!!");
    let err = queries::insert_podcast(db.pool(), &duplicate)
        .await
        .expect_err("Duplicate slug should be rejected");
    assert!(err.is_unique_violation(), "unexpected error: {:?}", err);

    // Lookup normalizes too
    let found = queries::find_podcast_by_slug(db.pool(), "My Show")
        .await
        .unwrap()
        .expect("Podcast should be found by unnormalized slug");
    assert_eq!(found.id(), first.id());
}

#[tokio::test]
async fn test_counts_for_podcast_without_media() {
    let db = setup().await;
    let podcast = create_podcast(&db, "Empty Show").await;

    assert_eq!(podcast.media_count(db.pool()).await.unwrap(), 0);
    assert_eq!(podcast.published_media_count(db.pool()).await.unwrap(), 0);
    assert!(podcast.media().fetch_all(db.pool()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_counters_follow_status_bits() {
    let db = setup().await;
    let podcast = create_podcast(&db, "Mixed Show").await;

    add_episode(&db, &podcast, "trashed", MediaStatus::TRASH).await;
    add_episode(&db, &podcast, "live", MediaStatus::PUBLISH).await;
    add_episode(&db, &podcast, "live-but-trashed", MediaStatus::PUBLISH | MediaStatus::TRASH).await;
    add_episode(&db, &podcast, "live-draft", MediaStatus::PUBLISH | MediaStatus::DRAFT).await;

    // Media belonging to another podcast never leaks into the counts
    let other = create_podcast(&db, "Other Show").await;
    add_episode(&db, &other, "elsewhere", MediaStatus::PUBLISH).await;

    let podcast = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(podcast.media_count(db.pool()).await.unwrap(), 2);
    assert_eq!(podcast.published_media_count(db.pool()).await.unwrap(), 2);

    assert_eq!(podcast.media().count(db.pool()).await.unwrap(), 4);
    assert_eq!(podcast.media().published().count(db.pool()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_counters_are_memoized_per_instance() {
    let db = setup().await;
    let podcast = create_podcast(&db, "Growing Show").await;
    assert_eq!(podcast.loaded_counts(), (None, None));

    assert_eq!(podcast.media_count(db.pool()).await.unwrap(), 0);
    assert_eq!(podcast.loaded_counts(), (Some(0), None));

    add_episode(&db, &podcast, "new-episode", MediaStatus::PUBLISH).await;

    // Same instance keeps its first answer
    assert_eq!(podcast.media_count(db.pool()).await.unwrap(), 0);

    // Fresh load sees the new row
    let reloaded = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.media_count(db.pool()).await.unwrap(), 1);
    assert_eq!(reloaded.published_media_count(db.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_listing_preloads_counts() {
    let db = setup().await;
    let alpha = create_podcast(&db, "Alpha").await;
    let _beta = create_podcast(&db, "Beta").await;
    add_episode(&db, &alpha, "a1", MediaStatus::PUBLISH).await;
    add_episode(&db, &alpha, "a2", MediaStatus::initial()).await;

    let podcasts = queries::list_podcasts_with_counts(db.pool(), 10, 0).await.unwrap();
    assert_eq!(podcasts.len(), 2);
    assert_eq!(podcasts[0].title, "Alpha");
    assert_eq!(podcasts[0].loaded_counts(), (Some(2), Some(1)));
    assert_eq!(podcasts[1].loaded_counts(), (Some(0), Some(0)));

    // Plain listing leaves them deferred
    let plain = queries::list_podcasts(db.pool(), 10, 0).await.unwrap();
    assert_eq!(plain[0].loaded_counts(), (None, None));
}

#[tokio::test]
async fn test_author_round_trip() {
    let db = setup().await;
    let podcast = create_podcast(&db, "Authored").await;

    let loaded = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.author, Author::new("Ann Host", "ann@example.com"));
    assert_ne!(loaded.author, Author::new("Ann Host", "other@example.com"));

    let mut loaded = loaded;
    loaded.author = Author::new("Bob", "bob@example.com");
    queries::update_podcast(db.pool(), &mut loaded).await.unwrap();

    let reloaded = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.author.name(), "Bob");
    assert_eq!(reloaded.author.email(), "bob@example.com");
}

#[tokio::test]
async fn test_explicit_keeps_three_states() {
    let db = setup().await;

    for (i, explicit) in [Explicit::Yes, Explicit::No, Explicit::Clean].into_iter().enumerate() {
        let mut new_podcast = NewPodcast::new(
            format!("Show {}", i),
            Author::new("a", "a@example.com"),
            &format!("show-{}", i),
        );
        new_podcast.explicit = explicit;
        let podcast = queries::insert_podcast(db.pool(), &new_podcast).await.unwrap();

        let loaded = queries::find_podcast_by_id(db.pool(), podcast.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.explicit, explicit);
    }

    let stored: Vec<Option<bool>> = sqlx::query_scalar("SELECT explicit FROM podcasts ORDER BY id")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(stored, vec![Some(true), None, Some(false)]);
}

#[tokio::test]
async fn test_update_timestamps() {
    let db = setup().await;
    let mut podcast = create_podcast(&db, "Timestamps").await;
    let created_on = podcast.created_on();
    let mut previous = podcast.modified_on();

    for subtitle in ["one", "two", "three"] {
        podcast.subtitle = Some(subtitle.to_string());
        queries::update_podcast(db.pool(), &mut podcast).await.unwrap();
        assert!(podcast.modified_on() >= previous);
        previous = podcast.modified_on();
    }

    let reloaded = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.created_on(), created_on);
    assert_eq!(reloaded.modified_on(), podcast.modified_on());
    assert_eq!(reloaded.subtitle.as_deref(), Some("three"));
}

#[tokio::test]
async fn test_rename_normalizes_slug() {
    let db = setup().await;
    let mut podcast = create_podcast(&db, "Old Name").await;

    podcast.set_slug("  Brand New Name!  ");
    assert_eq!(podcast.slug().as_str(), "brand-new-name");
    queries::update_podcast(db.pool(), &mut podcast).await.unwrap();

    assert!(queries::find_podcast_by_slug(db.pool(), "old-name").await.unwrap().is_none());
    assert!(queries::find_podcast_by_slug(db.pool(), "brand-new-name").await.unwrap().is_some());
}

#[tokio::test]
async fn test_oversized_values_are_rejected() {
    let db = setup().await;
    let new_podcast = NewPodcast::new("t".repeat(51), Author::new("a", "a@example.com"), "long");

    let err = queries::insert_podcast(db.pool(), &new_podcast)
        .await
        .expect_err("51-character title should be rejected");
    assert!(err.is_check_violation(), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_media_query_paging_and_order() {
    let db = setup().await;
    let podcast = create_podcast(&db, "Paged").await;
    for slug in ["charlie", "alpha", "echo", "bravo", "delta"] {
        add_episode(&db, &podcast, slug, MediaStatus::PUBLISH).await;
    }

    let by_title: Vec<String> = podcast
        .media()
        .order_by(MediaOrder::Title)
        .page(2, 2)
        .fetch_all(db.pool())
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(by_title, vec!["charlie", "delta"]);

    let first = podcast.media().fetch_first(db.pool()).await.unwrap().unwrap();
    assert_eq!(first.title, "charlie");

    assert!(podcast.media().published().exists(db.pool()).await.unwrap());
    assert!(!podcast.media().with_status(MediaStatus::DRAFT).exists(db.pool()).await.unwrap());
}

#[tokio::test]
async fn test_deleting_podcast_detaches_media() {
    let db = setup().await;
    let podcast = create_podcast(&db, "Doomed").await;
    add_episode(&db, &podcast, "survivor", MediaStatus::PUBLISH).await;
    let episode = podcast.media().fetch_first(db.pool()).await.unwrap().unwrap();

    let owner = queries::find_media_podcast(db.pool(), &episode).await.unwrap().unwrap();
    assert_eq!(owner.id(), podcast.id());

    queries::delete_podcast(db.pool(), podcast.id()).await.unwrap();

    let orphan = queries::find_media_by_id(db.pool(), episode.id()).await.unwrap().unwrap();
    assert_eq!(orphan.podcast_id(), None);
    assert!(queries::find_media_podcast(db.pool(), &orphan).await.unwrap().is_none());

    let err = queries::delete_podcast(db.pool(), podcast.id()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rename_into_taken_slug_fails_and_keeps_row() {
    let db = setup().await;
    let _taken = create_podcast(&db, "Taken").await;
    let mut podcast = create_podcast(&db, "Mine").await;

    podcast.set_slug("TAKEN");
    podcast.title = "Renamed".to_string();
    let err = queries::update_podcast(db.pool(), &mut podcast)
        .await
        .expect_err("Rename into an existing slug should be rejected");
    assert!(err.is_unique_violation(), "unexpected error: {:?}", err);

    let stored = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.slug().as_str(), "mine");
    assert_eq!(stored.title, "Mine");
    assert_eq!(stored.modified_on(), stored.created_on());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_all_succeed() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::new(dir.path().join("concurrent.db"))
        .await
        .expect("Failed to create database");
    let podcast = create_podcast(&db, "Busy Show").await;

    let mut handles = Vec::new();
    for i in 0..40 {
        let db = db.clone();
        let id = podcast.id();
        handles.push(tokio::spawn(async move {
            let mut podcast = queries::find_podcast_by_id(db.pool(), id)
                .await?
                .expect("Podcast missing");
            podcast.subtitle = Some(format!("edit {}", i));
            queries::update_podcast(db.pool(), &mut podcast).await?;
            Ok::<_, podcast_catalog::CatalogError>(podcast.modified_on())
        }));
    }

    let mut latest = podcast.modified_on();
    for handle in handles {
        let modified_on = handle
            .await
            .expect("Update task panicked")
            .expect("Concurrent update failed");
        assert!(modified_on >= podcast.created_on());
        latest = latest.max(modified_on);
    }

    let stored = queries::find_podcast_by_id(db.pool(), podcast.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.modified_on(), latest);
    assert!(stored.subtitle.unwrap().starts_with("edit "));
}
