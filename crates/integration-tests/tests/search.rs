use integration_tests::TestForum;
use rf_core::{ErrorKind, Role};
use rstest::rstest;

#[tokio::test]
async fn search_excludes_deleted_discussions() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let live = t.post(&alice, "Async runtimes").await.unwrap();
    let gone = t.post(&alice, "Async traits").await.unwrap();
    t.moderation.delete_discussion(&alice, &gone).await.unwrap();

    let hits = t.forum.search_discussions("async").await.unwrap();
    let ids: Vec<String> = hits.iter().map(|d| d.id.to_string()).collect();
    assert_eq!(ids, vec![live]);
}

#[tokio::test]
async fn search_matches_content_as_well_as_title() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let id = t
        .forum
        .create_discussion(&alice, "Help wanted", "segfault in unsafe block")
        .await
        .unwrap();

    let hits = t.forum.search_discussions("segfault").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id);
}

#[tokio::test]
async fn search_input_with_query_syntax_is_taken_literally() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    t.post(&alice, "Quoting rules").await.unwrap();

    let hits = t.forum.search_discussions("\"quoting* OR").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Quoting rules");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("this search term is far too long to accept")]
#[tokio::test]
async fn invalid_search_terms_are_rejected(#[case] term: &str) {
    let t = TestForum::new().await.unwrap();
    let err = t.forum.search_discussions(term).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
