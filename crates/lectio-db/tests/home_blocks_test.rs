//! Integration tests for the landing-page editor: hero singleton upsert,
//! home block append positions, inactive filtering, atomic reorder, and
//! delete resequencing.
//!
//! All tests require a migrated PostgreSQL database (DATABASE_URL).

use lectio_core::{
    Error, HeroConfig, HomeBlockFieldUpdate, HomeBlockKind, HomeRepository,
};
use lectio_db::test_fixtures::TestDatabase;
use uuid::Uuid;

fn sample_hero(title: &str) -> HeroConfig {
    HeroConfig {
        title: title.to_string(),
        subtitle: "Bienvenidos".to_string(),
        button_text: Some("Explorar".to_string()),
        button_url: Some("/documents".to_string()),
        background_url: "https://cdn.example.org/hero.jpg".to_string(),
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_hero_is_a_singleton() {
    let test_db = TestDatabase::new().await;

    assert!(test_db.db.home.hero().await.unwrap().is_none());

    test_db.db.home.set_hero(sample_hero("First")).await.unwrap();
    test_db.db.home.set_hero(sample_hero("Second")).await.unwrap();

    // The second save replaced the first; there is still exactly one row.
    let hero = test_db.db.home.hero().await.unwrap().unwrap();
    assert_eq!(hero.title, "Second");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hero_configuration")
        .fetch_one(&test_db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_hero_rejects_empty_title() {
    let test_db = TestDatabase::new().await;

    let result = test_db.db.home.set_hero(sample_hero("   ")).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_home_blocks_append_at_end() {
    let test_db = TestDatabase::new().await;

    let a = test_db
        .db
        .home
        .insert_block(HomeBlockKind::Reflection)
        .await
        .unwrap();
    let b = test_db
        .db
        .home
        .insert_block(HomeBlockKind::Parallax)
        .await
        .unwrap();
    let c = test_db
        .db
        .home
        .insert_block(HomeBlockKind::TopRatedSection)
        .await
        .unwrap();

    assert_eq!(a.position, 0);
    assert_eq!(b.position, 1);
    assert_eq!(c.position, 2);

    let blocks = test_db.db.home.list_blocks(true).await.unwrap();
    let ids: Vec<Uuid> = blocks.iter().map(|bl| bl.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_inactive_blocks_hidden_from_readers() {
    let test_db = TestDatabase::new().await;

    let shown = test_db
        .db
        .home
        .insert_block(HomeBlockKind::Reflection)
        .await
        .unwrap();
    let hidden = test_db
        .db
        .home
        .insert_block(HomeBlockKind::Parallax)
        .await
        .unwrap();

    test_db
        .db
        .home
        .update_block(hidden.id, vec![HomeBlockFieldUpdate::Active(false)])
        .await
        .unwrap();

    let reader_view = test_db.db.home.list_blocks(false).await.unwrap();
    let reader_ids: Vec<Uuid> = reader_view.iter().map(|bl| bl.id).collect();
    assert_eq!(reader_ids, vec![shown.id]);

    // The hidden block keeps its slot for the editor view.
    let editor_view = test_db.db.home.list_blocks(true).await.unwrap();
    assert_eq!(editor_view.len(), 2);
    assert_eq!(editor_view[1].id, hidden.id);
    assert_eq!(editor_view[1].position, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_block_update_writes_buttons_and_layout() {
    let test_db = TestDatabase::new().await;

    let block = test_db
        .db
        .home
        .insert_block(HomeBlockKind::TextWithBackground)
        .await
        .unwrap();

    let updated = test_db
        .db
        .home
        .update_block(
            block.id,
            vec![
                HomeBlockFieldUpdate::Title("Lecturas del mes".to_string()),
                HomeBlockFieldUpdate::ContentPosition(lectio_core::ContentPosition::Right),
                HomeBlockFieldUpdate::PrimaryButton(Some(lectio_core::HomeButton {
                    text: "Ver más".to_string(),
                    url: "/publications".to_string(),
                    style: lectio_core::ButtonStyle::Primary,
                    new_tab: true,
                })),
            ],
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Lecturas del mes");
    assert_eq!(updated.content_position, lectio_core::ContentPosition::Right);
    let button = updated.primary_button.unwrap();
    assert_eq!(button.url, "/publications");
    assert!(button.new_tab);
    assert!(updated.secondary_button.is_none());

    // Clearing the button removes all four columns together.
    let cleared = test_db
        .db
        .home
        .update_block(block.id, vec![HomeBlockFieldUpdate::PrimaryButton(None)])
        .await
        .unwrap();
    assert!(cleared.primary_button.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_home_reorder_demands_exact_id_cover() {
    let test_db = TestDatabase::new().await;

    let a = test_db
        .db
        .home
        .insert_block(HomeBlockKind::Reflection)
        .await
        .unwrap();
    let b = test_db
        .db
        .home
        .insert_block(HomeBlockKind::RecentSection)
        .await
        .unwrap();

    let partial = test_db.db.home.reorder_blocks(vec![a.id]).await;
    assert!(matches!(partial, Err(Error::InvalidInput(_))));

    let stranger = test_db
        .db
        .home
        .reorder_blocks(vec![a.id, lectio_core::new_v7()])
        .await;
    assert!(matches!(stranger, Err(Error::InvalidInput(_))));

    test_db
        .db
        .home
        .reorder_blocks(vec![b.id, a.id])
        .await
        .unwrap();

    let blocks = test_db.db.home.list_blocks(true).await.unwrap();
    let ids: Vec<Uuid> = blocks.iter().map(|bl| bl.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
    let positions: Vec<i32> = blocks.iter().map(|bl| bl.position).collect();
    assert_eq!(positions, vec![0, 1]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_delete_home_block_resequences() {
    let test_db = TestDatabase::new().await;

    let mut ids = Vec::new();
    for kind in [
        HomeBlockKind::Reflection,
        HomeBlockKind::Parallax,
        HomeBlockKind::ActiveForumsSection,
    ] {
        ids.push(test_db.db.home.insert_block(kind).await.unwrap().id);
    }

    // Drop the middle block; survivors close the gap.
    test_db.db.home.delete_block(ids[1]).await.unwrap();

    let blocks = test_db.db.home.list_blocks(true).await.unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].id, ids[0]);
    assert_eq!(blocks[0].position, 0);
    assert_eq!(blocks[1].id, ids[2]);
    assert_eq!(blocks[1].position, 1);

    test_db.cleanup().await;
}
