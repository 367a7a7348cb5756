//! Tests for the content service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockContentRepository, MockMediaStore, MockRelationshipRepository};
use crate::domain::{
    ContentKind, ErrorCode, Rating, RelationshipSnapshot, ReviewDraft, TicketDraft, User,
    Username,
};

type Service = ContentService<MockContentRepository, MockRelationshipRepository, MockMediaStore>;

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixture_timestamp().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_timestamp()
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn at(seconds: i64) -> DateTime<Utc> {
    fixture_timestamp() + chrono::Duration::seconds(seconds)
}

struct Mocks {
    content: MockContentRepository,
    relationships: MockRelationshipRepository,
    media: MockMediaStore,
}

impl Mocks {
    fn into_service(self) -> Service {
        ContentService::new(
            Arc::new(self.content),
            Arc::new(self.relationships),
            Arc::new(self.media),
            Arc::new(FixtureClock),
        )
        .with_max_image_bytes(16)
    }
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        content: MockContentRepository::new(),
        relationships: MockRelationshipRepository::new(),
        media: MockMediaStore::new(),
    }
}

fn user(name: &str) -> User {
    User::new(UserId::random(), Username::new(name).expect("valid username"))
}

fn ticket(id: i64, owner: &User, image: Option<&str>, created: i64) -> Ticket {
    Ticket {
        id: TicketId::new(id),
        title: format!("ticket {id}"),
        description: String::new(),
        image: image.map(str::to_owned),
        author: owner.clone(),
        created_at: at(created),
    }
}

fn review(id: i64, parent: &Ticket, owner: &User, created: i64) -> Review {
    Review {
        id: ReviewId::new(id),
        ticket_id: parent.id,
        rating: Rating::new(3).expect("valid rating"),
        headline: format!("review {id}"),
        body: String::new(),
        author: owner.clone(),
        created_at: at(created),
    }
}

fn draft() -> TicketDraft {
    TicketDraft::new("Dune", "desert planet").expect("valid draft")
}

fn review_draft() -> ReviewDraft {
    ReviewDraft::new(4, "Great", "").expect("valid draft")
}

fn png(len: usize) -> ImageUpload {
    ImageUpload::new("image/png", vec![7; len]).expect("valid upload")
}

#[rstest]
#[tokio::test]
async fn create_ticket_stores_image_then_row(mut mocks: Mocks) {
    let owner = user("ada");
    let created = ticket(1, &owner, Some("tickets/a.png"), 0);
    mocks
        .media
        .expect_store()
        .times(1)
        .return_once(|_| Ok("tickets/a.png".to_owned()));
    mocks
        .content
        .expect_insert_ticket()
        .withf(|new_ticket| {
            new_ticket.image.as_deref() == Some("tickets/a.png")
                && new_ticket.created_at == fixture_timestamp()
        })
        .times(1)
        .return_once(move |_| Ok(created));

    let result = mocks
        .into_service()
        .create_ticket(CreateTicketRequest {
            owner: owner.id().clone(),
            draft: draft(),
            image: Some(png(4)),
        })
        .await
        .expect("ticket created");
    assert_eq!(result.image.as_deref(), Some("tickets/a.png"));
}

#[rstest]
#[tokio::test]
async fn create_ticket_removes_image_when_insert_fails(mut mocks: Mocks) {
    mocks
        .media
        .expect_store()
        .return_once(|_| Ok("tickets/a.png".to_owned()));
    mocks
        .media
        .expect_remove()
        .withf(|path| path == "tickets/a.png")
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .content
        .expect_insert_ticket()
        .return_once(|_| Err(ContentRepositoryError::connection("refused")));

    let err = mocks
        .into_service()
        .create_ticket(CreateTicketRequest {
            owner: UserId::random(),
            draft: draft(),
            image: Some(png(4)),
        })
        .await
        .expect_err("insert fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn create_ticket_rejects_oversized_image_before_storing(mut mocks: Mocks) {
    mocks.media.expect_store().times(0);
    mocks.content.expect_insert_ticket().times(0);

    let err = mocks
        .into_service()
        .create_ticket(CreateTicketRequest {
            owner: UserId::random(),
            draft: draft(),
            image: Some(png(17)),
        })
        .await
        .expect_err("image too large");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn edit_ticket_requires_ownership(mut mocks: Mocks) {
    let owner = user("ada");
    let existing = ticket(1, &owner, None, 0);
    mocks
        .content
        .expect_find_ticket()
        .return_once(move |_| Ok(Some(existing)));
    mocks.content.expect_update_ticket().times(0);

    let err = mocks
        .into_service()
        .edit_ticket(EditTicketRequest {
            owner: UserId::random(),
            ticket_id: TicketId::new(1),
            draft: draft(),
            image: ImageEdit::Keep,
        })
        .await
        .expect_err("not owner");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn edit_ticket_reports_missing_ticket(mut mocks: Mocks) {
    mocks.content.expect_find_ticket().return_once(|_| Ok(None));

    let err = mocks
        .into_service()
        .edit_ticket(EditTicketRequest {
            owner: UserId::random(),
            ticket_id: TicketId::new(9),
            draft: draft(),
            image: ImageEdit::Keep,
        })
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn edit_ticket_replacing_image_drops_the_old_blob(mut mocks: Mocks) {
    let owner = user("ada");
    let existing = ticket(1, &owner, Some("tickets/old.png"), 0);
    let updated = ticket(1, &owner, Some("tickets/new.png"), 0);
    mocks
        .content
        .expect_find_ticket()
        .return_once(move |_| Ok(Some(existing)));
    mocks
        .media
        .expect_store()
        .return_once(|_| Ok("tickets/new.png".to_owned()));
    mocks
        .content
        .expect_update_ticket()
        .withf(|_, _, change| {
            *change == StoredImageChange::Set("tickets/new.png".to_owned())
        })
        .return_once(move |_, _, _| Ok(Some(updated)));
    mocks
        .media
        .expect_remove()
        .withf(|path| path == "tickets/old.png")
        .times(1)
        .return_once(|_| Ok(()));

    let result = mocks
        .into_service()
        .edit_ticket(EditTicketRequest {
            owner: owner.id().clone(),
            ticket_id: TicketId::new(1),
            draft: draft(),
            image: ImageEdit::Replace(png(3)),
        })
        .await
        .expect("ticket updated");
    assert_eq!(result.image.as_deref(), Some("tickets/new.png"));
}

#[rstest]
#[tokio::test]
async fn edit_ticket_keeping_image_leaves_blob_alone(mut mocks: Mocks) {
    let owner = user("ada");
    let existing = ticket(1, &owner, Some("tickets/old.png"), 0);
    let updated = existing.clone();
    mocks
        .content
        .expect_find_ticket()
        .return_once(move |_| Ok(Some(existing)));
    mocks
        .content
        .expect_update_ticket()
        .withf(|_, _, change| *change == StoredImageChange::Keep)
        .return_once(move |_, _, _| Ok(Some(updated)));
    mocks.media.expect_remove().times(0);

    mocks
        .into_service()
        .edit_ticket(EditTicketRequest {
            owner: owner.id().clone(),
            ticket_id: TicketId::new(1),
            draft: draft(),
            image: ImageEdit::Keep,
        })
        .await
        .expect("ticket updated");
}

#[rstest]
#[tokio::test]
async fn delete_ticket_removes_row_and_image(mut mocks: Mocks) {
    let owner = user("ada");
    let existing = ticket(1, &owner, Some("tickets/a.png"), 0);
    mocks
        .content
        .expect_find_ticket()
        .return_once(move |_| Ok(Some(existing)));
    mocks
        .content
        .expect_delete_ticket()
        .times(1)
        .return_once(|_| Ok(true));
    mocks
        .media
        .expect_remove()
        .times(1)
        .return_once(|_| Ok(()));

    mocks
        .into_service()
        .delete_ticket(owner.id(), TicketId::new(1))
        .await
        .expect("ticket deleted");
}

#[rstest]
#[tokio::test]
async fn delete_ticket_survives_media_cleanup_failure(mut mocks: Mocks) {
    let owner = user("ada");
    let existing = ticket(1, &owner, Some("tickets/a.png"), 0);
    mocks
        .content
        .expect_find_ticket()
        .return_once(move |_| Ok(Some(existing)));
    mocks.content.expect_delete_ticket().return_once(|_| Ok(true));
    mocks
        .media
        .expect_remove()
        .return_once(|_| Err(MediaStoreError::io("permission denied")));

    mocks
        .into_service()
        .delete_ticket(owner.id(), TicketId::new(1))
        .await
        .expect("row deletion still succeeds");
}

#[rstest]
#[tokio::test]
async fn create_review_for_missing_ticket_is_not_found(mut mocks: Mocks) {
    mocks
        .content
        .expect_insert_review()
        .return_once(|ticket_id, _| Err(ContentRepositoryError::missing_ticket(ticket_id.get())));

    let err = mocks
        .into_service()
        .create_review(CreateReviewRequest {
            owner: UserId::random(),
            ticket_id: TicketId::new(42),
            draft: review_draft(),
        })
        .await
        .expect_err("missing ticket");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn create_review_with_ticket_shares_one_timestamp(mut mocks: Mocks) {
    let owner = user("ada");
    let parent = ticket(1, &owner, None, 0);
    let created = ReviewWithTicket {
        review: review(1, &parent, &owner, 0),
        ticket: parent,
    };
    mocks
        .content
        .expect_insert_ticket_with_review()
        .withf(|new_ticket, new_review| {
            new_ticket.created_at == new_review.created_at && new_ticket.owner == new_review.owner
        })
        .times(1)
        .return_once(move |_, _| Ok(created));

    let result = mocks
        .into_service()
        .create_review_with_ticket(CreateTicketWithReviewRequest {
            owner: owner.id().clone(),
            ticket: draft(),
            image: None,
            review: review_draft(),
        })
        .await
        .expect("both created");
    assert_eq!(result.review.ticket_id, result.ticket.id);
}

#[rstest]
#[tokio::test]
async fn create_review_with_ticket_rolls_back_image(mut mocks: Mocks) {
    mocks
        .media
        .expect_store()
        .return_once(|_| Ok("tickets/a.png".to_owned()));
    mocks
        .content
        .expect_insert_ticket_with_review()
        .return_once(|_, _| Err(ContentRepositoryError::query("constraint")));
    mocks
        .media
        .expect_remove()
        .times(1)
        .return_once(|_| Ok(()));

    let err = mocks
        .into_service()
        .create_review_with_ticket(CreateTicketWithReviewRequest {
            owner: UserId::random(),
            ticket: draft(),
            image: Some(png(2)),
            review: review_draft(),
        })
        .await
        .expect_err("insert fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn edit_review_requires_ownership(mut mocks: Mocks) {
    let owner = user("ada");
    let parent = ticket(1, &owner, None, 0);
    let existing = review(5, &parent, &owner, 0);
    mocks
        .content
        .expect_find_review()
        .return_once(move |_| Ok(Some(existing)));
    mocks.content.expect_update_review().times(0);

    let err = mocks
        .into_service()
        .edit_review(EditReviewRequest {
            owner: UserId::random(),
            review_id: ReviewId::new(5),
            draft: review_draft(),
        })
        .await
        .expect_err("not owner");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn delete_review_leaves_ticket(mut mocks: Mocks) {
    let owner = user("ada");
    let parent = ticket(1, &owner, None, 0);
    let existing = review(5, &parent, &owner, 0);
    mocks
        .content
        .expect_find_review()
        .return_once(move |_| Ok(Some(existing)));
    mocks
        .content
        .expect_delete_review()
        .times(1)
        .return_once(|_| Ok(true));
    mocks.content.expect_delete_ticket().times(0);

    mocks
        .into_service()
        .delete_review(owner.id(), ReviewId::new(5))
        .await
        .expect("review deleted");
}

#[rstest]
#[tokio::test]
async fn feed_queries_visible_authors_and_excludes_blocks(mut mocks: Mocks) {
    let viewer = user("viewer");
    let friend = user("friend");
    let blocked = user("blocked");
    let snapshot = RelationshipSnapshot {
        following: HashSet::from([friend.id().clone()]),
        blocking: HashSet::from([blocked.id().clone()]),
        blocked_by: HashSet::new(),
    };
    let viewer_ticket = ticket(1, &viewer, None, 10);
    let friend_ticket = ticket(2, &friend, None, 30);
    let friend_review = ReviewWithTicket {
        review: review(1, &viewer_ticket, &friend, 20),
        ticket: viewer_ticket.clone(),
    };

    mocks
        .relationships
        .expect_snapshot()
        .times(1)
        .return_once(move |_| Ok(snapshot));
    let expected_authors = HashSet::from([viewer.id().clone(), friend.id().clone()]);
    mocks
        .content
        .expect_tickets_by_authors()
        .withf(move |authors| authors.iter().cloned().collect::<HashSet<_>>() == expected_authors)
        .return_once(move |_| Ok(vec![viewer_ticket, friend_ticket]));
    let viewer_id = viewer.id().clone();
    let blocked_id = blocked.id().clone();
    mocks
        .content
        .expect_reviews_matching()
        .withf(move |filter| {
            filter.ticket_owner.as_ref() == Some(&viewer_id)
                && filter.excluded_authors == vec![blocked_id.clone()]
                && !filter.authors.contains(&blocked_id)
        })
        .return_once(move |_| Ok(vec![friend_review]));

    let feed = mocks
        .into_service()
        .feed(viewer.id())
        .await
        .expect("feed assembled");
    let kinds: Vec<_> = feed.iter().map(FeedEntry::kind).collect();
    assert_eq!(
        kinds,
        vec![ContentKind::Ticket, ContentKind::Review, ContentKind::Ticket]
    );
}

#[rstest]
#[tokio::test]
async fn posts_only_reads_own_content(mut mocks: Mocks) {
    let viewer = user("viewer");
    let viewer_id = viewer.id().clone();
    let filter_id = viewer_id.clone();
    mocks.relationships.expect_snapshot().times(0);
    mocks
        .content
        .expect_tickets_by_authors()
        .withf(move |authors| authors == [viewer_id.clone()].as_slice())
        .return_once(|_| Ok(Vec::new()));
    mocks
        .content
        .expect_reviews_matching()
        .withf(move |filter| *filter == ReviewFilter::by_author(filter_id.clone()))
        .return_once(|_| Ok(Vec::new()));

    let posts = mocks
        .into_service()
        .posts(viewer.id())
        .await
        .expect("posts listed");
    assert!(posts.is_empty());
}

#[rstest]
#[tokio::test]
async fn ticket_lookup_maps_missing_to_not_found(mut mocks: Mocks) {
    mocks.content.expect_find_ticket().return_once(|_| Ok(None));

    let err = mocks
        .into_service()
        .ticket(TicketId::new(3))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
