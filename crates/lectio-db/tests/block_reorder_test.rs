//! Integration tests for publication content blocks: append positions,
//! kind-checked field updates, atomic reorder, and delete resequencing.
//!
//! All tests require a migrated PostgreSQL database (DATABASE_URL).

use lectio_core::{
    BlockFieldUpdate, BlockKind, CreatePublicationRequest, Error, PublicationRepository,
};
use lectio_db::test_fixtures::TestDatabase;
use uuid::Uuid;

async fn seed_publication(db: &lectio_db::Database) -> Uuid {
    db.publications
        .insert(
            lectio_core::new_v7(),
            CreatePublicationRequest {
                title: format!("Boletín {}", Uuid::new_v4()),
                publish_at: None,
                tags: vec!["noticias".to_string()],
            },
        )
        .await
        .expect("Failed to create test publication")
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_blocks_append_at_end() {
    let test_db = TestDatabase::new().await;
    let publication = seed_publication(&test_db.db).await;

    let text = test_db
        .db
        .publications
        .insert_block(publication, BlockKind::Text)
        .await
        .unwrap();
    let image = test_db
        .db
        .publications
        .insert_block(publication, BlockKind::Image)
        .await
        .unwrap();
    let quote = test_db
        .db
        .publications
        .insert_block(publication, BlockKind::Quote)
        .await
        .unwrap();

    assert_eq!(text.position, 0);
    assert_eq!(image.position, 1);
    assert_eq!(quote.position, 2);

    let blocks = test_db.db.publications.list_blocks(publication).await.unwrap();
    let ids: Vec<Uuid> = blocks.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![text.id, image.id, quote.id]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_block_update_rejects_wrong_kind() {
    let test_db = TestDatabase::new().await;
    let publication = seed_publication(&test_db.db).await;

    let text = test_db
        .db
        .publications
        .insert_block(publication, BlockKind::Text)
        .await
        .unwrap();

    let result = test_db
        .db
        .publications
        .update_block(
            text.id,
            vec![BlockFieldUpdate::EmbedContent("<iframe></iframe>".into())],
        )
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    // A mixed batch with one offending field writes nothing.
    let result = test_db
        .db
        .publications
        .update_block(
            text.id,
            vec![
                BlockFieldUpdate::TextContent("hello".into()),
                BlockFieldUpdate::QuoteAuthor("nobody".into()),
            ],
        )
        .await;
    assert!(result.is_err());
    let unchanged = test_db
        .db
        .publications
        .list_blocks(publication)
        .await
        .unwrap();
    assert_eq!(unchanged[0].text_content, None);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_reorder_rewrites_all_positions() {
    let test_db = TestDatabase::new().await;
    let publication = seed_publication(&test_db.db).await;

    let mut ids = Vec::new();
    for _ in 0..4 {
        let block = test_db
            .db
            .publications
            .insert_block(publication, BlockKind::Text)
            .await
            .unwrap();
        ids.push(block.id);
    }

    let reversed: Vec<Uuid> = ids.iter().rev().copied().collect();
    test_db
        .db
        .publications
        .reorder_blocks(publication, reversed.clone())
        .await
        .unwrap();

    let blocks = test_db.db.publications.list_blocks(publication).await.unwrap();
    let listed: Vec<Uuid> = blocks.iter().map(|b| b.id).collect();
    assert_eq!(listed, reversed);
    let positions: Vec<i32> = blocks.iter().map(|b| b.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_reorder_demands_exact_id_cover() {
    let test_db = TestDatabase::new().await;
    let publication = seed_publication(&test_db.db).await;

    let a = test_db
        .db
        .publications
        .insert_block(publication, BlockKind::Text)
        .await
        .unwrap();
    let b = test_db
        .db
        .publications
        .insert_block(publication, BlockKind::Text)
        .await
        .unwrap();

    // Missing block.
    let partial = test_db
        .db
        .publications
        .reorder_blocks(publication, vec![a.id])
        .await;
    assert!(matches!(partial, Err(Error::InvalidInput(_))));

    // Stranger block.
    let stranger = test_db
        .db
        .publications
        .reorder_blocks(publication, vec![a.id, lectio_core::new_v7()])
        .await;
    assert!(matches!(stranger, Err(Error::InvalidInput(_))));

    // Duplicate entry.
    let duplicate = test_db
        .db
        .publications
        .reorder_blocks(publication, vec![a.id, a.id])
        .await;
    assert!(matches!(duplicate, Err(Error::InvalidInput(_))));

    // Original order is intact after the failed attempts.
    let blocks = test_db.db.publications.list_blocks(publication).await.unwrap();
    let listed: Vec<Uuid> = blocks.iter().map(|bl| bl.id).collect();
    assert_eq!(listed, vec![a.id, b.id]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_delete_block_resequences() {
    let test_db = TestDatabase::new().await;
    let publication = seed_publication(&test_db.db).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let block = test_db
            .db
            .publications
            .insert_block(publication, BlockKind::Text)
            .await
            .unwrap();
        ids.push(block.id);
    }

    // Drop the middle block; survivors close the gap.
    test_db.db.publications.delete_block(ids[1]).await.unwrap();

    let blocks = test_db.db.publications.list_blocks(publication).await.unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].id, ids[0]);
    assert_eq!(blocks[0].position, 0);
    assert_eq!(blocks[1].id, ids[2]);
    assert_eq!(blocks[1].position, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_listing_hides_unpublished_from_readers() {
    let test_db = TestDatabase::new().await;
    let publication = seed_publication(&test_db.db).await;

    // Still a draft: invisible to readers, visible to editors.
    let reader_view = test_db
        .db
        .publications
        .list(lectio_core::ListPublicationsRequest::default())
        .await
        .unwrap();
    assert!(reader_view.iter().all(|p| p.id != publication));

    let editor_view = test_db
        .db
        .publications
        .list(lectio_core::ListPublicationsRequest {
            include_unpublished: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(editor_view.iter().any(|p| p.id == publication));

    test_db.cleanup().await;
}
