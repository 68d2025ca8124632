use integration_tests::TestForum;
use rf_core::{ElementKind, ErrorKind, Role, VoteKind};

#[tokio::test]
async fn repeated_like_keeps_a_single_membership() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let bob = t.user("bob", Role::Customer).await.unwrap();
    let d = t.post(&alice, "Upvote me").await.unwrap();

    t.forum.vote(&bob, &d, "like").await.unwrap();
    t.forum.vote(&bob, &d, "like").await.unwrap();

    let votes = t.forum.get_discussion(&d).await.unwrap().votes;
    assert_eq!(votes.liked_by.iter().copied().collect::<Vec<_>>(), vec![bob.user_id]);
    assert!(votes.disliked_by.is_empty());
}

#[tokio::test]
async fn switching_to_dislike_moves_the_membership() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let bob = t.user("bob", Role::Customer).await.unwrap();
    let d = t.post(&alice, "Change of heart").await.unwrap();
    let c = t.reply(&alice, &d, None, "vote on me").await.unwrap();

    let target = t.forum.vote(&bob, &c, "like").await.unwrap();
    assert_eq!(target.kind, ElementKind::Comment);
    t.forum.vote(&bob, &c, "dislike").await.unwrap();

    let votes = t.forum.get_comment(&c).await.unwrap().votes;
    assert!(votes.liked_by.is_empty());
    assert_eq!(votes.disliked_by.iter().copied().collect::<Vec<_>>(), vec![bob.user_id]);
    assert_eq!(votes.vote_of(bob.user_id), Some(VoteKind::Dislike));
}

#[tokio::test]
async fn listing_counts_follow_votes() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let bob = t.user("bob", Role::Customer).await.unwrap();
    let carol = t.user("carol", Role::Customer).await.unwrap();
    let d = t.post(&alice, "Popular topic").await.unwrap();
    t.reply(&bob, &d, None, "me too").await.unwrap();

    t.forum.vote(&bob, &d, "like").await.unwrap();
    t.forum.vote(&carol, &d, "dislike").await.unwrap();
    t.forum.vote(&carol, &d, "like").await.unwrap();

    let listing = t.forum.list_discussions().await.unwrap();
    let summary = listing.iter().find(|s| s.id.to_string() == d).unwrap();
    assert_eq!(summary.likes, 2);
    assert_eq!(summary.dislikes, 0);
    assert_eq!(summary.comment_count, 1);
}

#[tokio::test]
async fn retract_clears_the_vote() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let d = t.post(&alice, "Second thoughts").await.unwrap();

    t.forum.vote(&alice, &d, "dislike").await.unwrap();
    t.forum.retract_vote(&alice, &d).await.unwrap();

    let votes = t.forum.get_discussion(&d).await.unwrap().votes;
    assert_eq!(votes.likes() + votes.dislikes(), 0);
}

#[tokio::test]
async fn vote_on_deleted_or_unknown_element_is_refused() {
    let t = TestForum::new().await.unwrap();
    let alice = t.user("alice", Role::Customer).await.unwrap();
    let d = t.post(&alice, "Gone soon").await.unwrap();
    t.moderation.delete_discussion(&alice, &d).await.unwrap();

    for id in [d.as_str(), "not-an-id", "0190f0e4-0000-7000-8000-000000000000"] {
        let err = t.forum.vote(&alice, id, "like").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousOrNotFound, "id {id}");
    }
}
