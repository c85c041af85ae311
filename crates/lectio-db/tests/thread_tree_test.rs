//! Integration tests for the threaded discussion tree.
//!
//! Covers ordering, sibling counts, cross-root parent rejection, edit
//! authorization, and cascading subtree deletion, against both scoped
//! trees (document comments and topic replies).
//!
//! All tests require a migrated PostgreSQL database (DATABASE_URL).

use lectio_core::{
    AuthPrincipal, CreateNodeRequest, CreateTopicRequest, Error, ForumRepository,
    ListRootsRequest, Role, ThreadRepository,
};
use lectio_db::test_fixtures::{seed_document, TestDatabase};
use uuid::Uuid;

fn node_req(body: &str, parent_id: Option<Uuid>) -> CreateNodeRequest {
    CreateNodeRequest {
        body: body.to_string(),
        parent_id,
        attachment_url: None,
        image_url: None,
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_roots_newest_first_children_oldest_first() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc = seed_document(&test_db.db, author).await;

    let first = test_db
        .db
        .comments
        .create(doc, author, node_req("first root", None))
        .await
        .unwrap();
    let second = test_db
        .db
        .comments
        .create(doc, author, node_req("second root", None))
        .await
        .unwrap();

    let roots = test_db
        .db
        .comments
        .roots(doc, ListRootsRequest::default())
        .await
        .unwrap();
    assert_eq!(roots.len(), 2);
    // Newest first.
    assert_eq!(roots[0].id, second.node.id);
    assert_eq!(roots[1].id, first.node.id);

    let child_a = test_db
        .db
        .comments
        .create(doc, author, node_req("child a", Some(first.node.id)))
        .await
        .unwrap();
    let child_b = test_db
        .db
        .comments
        .create(doc, author, node_req("child b", Some(first.node.id)))
        .await
        .unwrap();

    let children = test_db.db.comments.children(first.node.id).await.unwrap();
    assert_eq!(children.len(), 2);
    // Oldest first.
    assert_eq!(children[0].id, child_a.node.id);
    assert_eq!(children[1].id, child_b.node.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_nested_create_returns_sibling_count() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc = seed_document(&test_db.db, author).await;

    let root = test_db
        .db
        .comments
        .create(doc, author, node_req("root", None))
        .await
        .unwrap();
    assert_eq!(root.sibling_count, None, "root creates carry no count");

    let first_child = test_db
        .db
        .comments
        .create(doc, author, node_req("reply 1", Some(root.node.id)))
        .await
        .unwrap();
    assert_eq!(first_child.sibling_count, Some(1));

    let second_child = test_db
        .db
        .comments
        .create(doc, author, node_req("reply 2", Some(root.node.id)))
        .await
        .unwrap();
    assert_eq!(second_child.sibling_count, Some(2));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_cross_root_parent_rejected() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc_a = seed_document(&test_db.db, author).await;
    let doc_b = seed_document(&test_db.db, author).await;

    let root_a = test_db
        .db
        .comments
        .create(doc_a, author, node_req("root on a", None))
        .await
        .unwrap();

    // Parenting a node under doc_b to a node that lives under doc_a
    // must fail outright.
    let result = test_db
        .db
        .comments
        .create(doc_b, author, node_req("grafted", Some(root_a.node.id)))
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_unknown_parent_rejected() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc = seed_document(&test_db.db, author).await;

    let ghost = lectio_core::new_v7();
    let result = test_db
        .db
        .comments
        .create(doc, author, node_req("orphan", Some(ghost)))
        .await;
    assert!(matches!(result, Err(Error::NodeNotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_empty_body_rejected() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc = seed_document(&test_db.db, author).await;

    let result = test_db
        .db
        .comments
        .create(doc, author, node_req("   ", None))
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_edit_authorization() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc = seed_document(&test_db.db, author).await;

    let root = test_db
        .db
        .comments
        .create(doc, author, node_req("original", None))
        .await
        .unwrap();

    // Another student may not edit.
    let stranger = AuthPrincipal::new(lectio_core::new_v7(), Role::Student);
    let denied = test_db
        .db
        .comments
        .edit(root.node.id, stranger, "hijacked".to_string(), None, None)
        .await;
    assert!(matches!(denied, Err(Error::Forbidden(_))));

    // A teacher may.
    let teacher = AuthPrincipal::new(lectio_core::new_v7(), Role::Teacher);
    let edited = test_db
        .db
        .comments
        .edit(root.node.id, teacher, "moderated".to_string(), None, None)
        .await
        .unwrap();
    assert_eq!(edited.body, "moderated");
    // Tree position is untouched by edits.
    assert_eq!(edited.parent_id, None);
    assert_eq!(edited.root_item_id, doc);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_delete_cascades_to_subtree() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();
    let doc = seed_document(&test_db.db, author).await;

    let root = test_db
        .db
        .comments
        .create(doc, author, node_req("root", None))
        .await
        .unwrap();
    let child = test_db
        .db
        .comments
        .create(doc, author, node_req("child", Some(root.node.id)))
        .await
        .unwrap();
    let grandchild = test_db
        .db
        .comments
        .create(doc, author, node_req("grandchild", Some(child.node.id)))
        .await
        .unwrap();

    let principal = AuthPrincipal::new(author, Role::Student);
    test_db
        .db
        .comments
        .delete(root.node.id, principal)
        .await
        .unwrap();

    for id in [root.node.id, child.node.id, grandchild.node.id] {
        let gone = test_db.db.comments.fetch(id).await;
        assert!(matches!(gone, Err(Error::NodeNotFound(_))));
    }

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_topic_reply_tree_is_independent() {
    let test_db = TestDatabase::new().await;
    let author = lectio_core::new_v7();

    let category = test_db
        .db
        .forum
        .create_category("Lecturas", "Discusión de lecturas")
        .await
        .unwrap();
    let topic = test_db
        .db
        .forum
        .create_topic(
            category.id,
            author,
            CreateTopicRequest {
                title: "Primer tema".to_string(),
                body: "¿Qué opinan?".to_string(),
                image_url: None,
            },
        )
        .await
        .unwrap();

    let reply = test_db
        .db
        .replies
        .create(topic.id, author, node_req("primera respuesta", None))
        .await
        .unwrap();

    // The reply lives in the topic tree, not the comment tree.
    assert!(test_db.db.replies.fetch(reply.node.id).await.is_ok());
    assert!(test_db.db.comments.fetch(reply.node.id).await.is_err());

    // Deleting the topic takes its reply tree with it.
    let principal = AuthPrincipal::new(author, Role::Student);
    test_db
        .db
        .forum
        .delete_topic(topic.id, principal)
        .await
        .unwrap();
    assert!(test_db.db.replies.fetch(reply.node.id).await.is_err());

    test_db.cleanup().await;
}
