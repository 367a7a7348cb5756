//! Feed assembly: one reverse-chronological timeline of tickets and reviews.
//!
//! Ordering is strictly by creation time, newest first. Equal timestamps put
//! reviews before tickets (a review written together with its ticket sorts
//! above it), then the higher id first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Review, ReviewWithTicket, Ticket, UserId};

/// Kind tag attached to each feed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    /// A ticket.
    Ticket,
    /// A review.
    Review,
}

/// One element of an assembled feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedEntry {
    /// A ticket on its own.
    Ticket {
        /// The ticket.
        ticket: Ticket,
    },
    /// A review and the ticket it answers.
    Review {
        /// The review.
        review: Review,
        /// The parent ticket.
        ticket: Ticket,
    },
}

impl FeedEntry {
    /// Kind tag.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Ticket { .. } => ContentKind::Ticket,
            Self::Review { .. } => ContentKind::Review,
        }
    }

    /// Creation time of the element itself.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Ticket { ticket } => ticket.created_at,
            Self::Review { review, .. } => review.created_at,
        }
    }

    fn id(&self) -> i64 {
        match self {
            Self::Ticket { ticket } => ticket.id.get(),
            Self::Review { review, .. } => review.id.get(),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self.kind() {
            ContentKind::Review => 0,
            ContentKind::Ticket => 1,
        }
    }
}

impl From<Ticket> for FeedEntry {
    fn from(ticket: Ticket) -> Self {
        Self::Ticket { ticket }
    }
}

impl From<ReviewWithTicket> for FeedEntry {
    fn from(value: ReviewWithTicket) -> Self {
        let ReviewWithTicket { review, ticket } = value;
        Self::Review { review, ticket }
    }
}

fn feed_order(a: &FeedEntry, b: &FeedEntry) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| a.kind_rank().cmp(&b.kind_rank()))
        .then_with(|| b.id().cmp(&a.id()))
}

/// Merge tickets and reviews into one deterministic timeline.
///
/// # Examples
/// ```
/// use litrevu::domain::assemble_feed;
///
/// let feed = assemble_feed(Vec::new(), Vec::new());
/// assert!(feed.is_empty());
/// ```
pub fn assemble_feed(tickets: Vec<Ticket>, reviews: Vec<ReviewWithTicket>) -> Vec<FeedEntry> {
    let mut entries: Vec<FeedEntry> = tickets
        .into_iter()
        .map(FeedEntry::from)
        .chain(reviews.into_iter().map(FeedEntry::from))
        .collect();
    entries.sort_by(feed_order);
    entries
}

/// Which reviews belong in a timeline.
///
/// A review matches when its author is listed in `authors`, or when its parent
/// ticket belongs to `ticket_owner`; in both cases the author must not be in
/// `excluded_authors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Authors whose reviews are included.
    pub authors: Vec<UserId>,
    /// Include reviews answering this user's tickets.
    pub ticket_owner: Option<UserId>,
    /// Authors never included.
    pub excluded_authors: Vec<UserId>,
}

impl ReviewFilter {
    /// Reviews written by `author`.
    pub fn by_author(author: UserId) -> Self {
        Self {
            authors: vec![author],
            ..Self::default()
        }
    }

    /// Whether `item` passes the filter.
    pub fn matches(&self, item: &ReviewWithTicket) -> bool {
        let author = item.review.author.id();
        if self.excluded_authors.contains(author) {
            return false;
        }
        self.authors.contains(author)
            || self
                .ticket_owner
                .as_ref()
                .is_some_and(|owner| item.ticket.author.id() == owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rating, ReviewId, TicketId, User, Username};
    use chrono::TimeZone;
    use rstest::rstest;

    fn author(name: &str) -> User {
        User::new(UserId::random(), Username::new(name).expect("valid username"))
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    fn ticket(id: i64, owner: &User, created: i64) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            title: format!("ticket {id}"),
            description: String::new(),
            image: None,
            author: owner.clone(),
            created_at: at(created),
        }
    }

    fn review(id: i64, parent: &Ticket, owner: &User, created: i64) -> ReviewWithTicket {
        ReviewWithTicket {
            review: Review {
                id: ReviewId::new(id),
                ticket_id: parent.id,
                rating: Rating::new(4).expect("valid rating"),
                headline: format!("review {id}"),
                body: String::new(),
                author: owner.clone(),
                created_at: at(created),
            },
            ticket: parent.clone(),
        }
    }

    #[rstest]
    fn orders_newest_first_across_kinds() {
        let ada = author("ada");
        let t1 = ticket(1, &ada, 10);
        let t3 = ticket(2, &ada, 30);
        let r2 = review(1, &t1, &ada, 20);

        let feed = assemble_feed(vec![t1, t3], vec![r2]);
        let times: Vec<_> = feed.iter().map(FeedEntry::created_at).collect();
        assert_eq!(times, vec![at(30), at(20), at(10)]);
        assert_eq!(
            feed.iter().map(FeedEntry::kind).collect::<Vec<_>>(),
            vec![ContentKind::Ticket, ContentKind::Review, ContentKind::Ticket]
        );
    }

    #[rstest]
    fn ties_put_reviews_first_then_higher_ids() {
        let ada = author("ada");
        let t1 = ticket(1, &ada, 5);
        let t2 = ticket(2, &ada, 5);
        let r1 = review(7, &t1, &ada, 5);

        let feed = assemble_feed(vec![t1, t2], vec![r1]);
        let ids: Vec<_> = feed.iter().map(FeedEntry::id).collect();
        assert_eq!(feed.first().map(FeedEntry::kind), Some(ContentKind::Review));
        assert_eq!(ids, vec![7, 2, 1]);
    }

    #[rstest]
    fn serialises_with_content_type_tag() {
        let ada = author("ada");
        let entry = FeedEntry::from(ticket(3, &ada, 0));
        let value = serde_json::to_value(&entry).expect("serialise entry");
        assert_eq!(value.get("contentType"), Some(&serde_json::json!("TICKET")));
        assert!(value.get("ticket").is_some());
    }

    #[rstest]
    fn review_filter_includes_answers_to_own_tickets() {
        let viewer = author("viewer");
        let stranger = author("stranger");
        let own_ticket = ticket(1, &viewer, 0);
        let other_ticket = ticket(2, &stranger, 0);

        let filter = ReviewFilter {
            authors: vec![viewer.id().clone()],
            ticket_owner: Some(viewer.id().clone()),
            excluded_authors: Vec::new(),
        };

        assert!(filter.matches(&review(1, &own_ticket, &stranger, 1)));
        assert!(!filter.matches(&review(2, &other_ticket, &stranger, 1)));
        assert!(filter.matches(&review(3, &other_ticket, &viewer, 1)));
    }

    #[rstest]
    fn review_filter_exclusion_wins() {
        let viewer = author("viewer");
        let blocked = author("blocked");
        let own_ticket = ticket(1, &viewer, 0);

        let filter = ReviewFilter {
            authors: vec![viewer.id().clone(), blocked.id().clone()],
            ticket_owner: Some(viewer.id().clone()),
            excluded_authors: vec![blocked.id().clone()],
        };

        assert!(!filter.matches(&review(1, &own_ticket, &blocked, 1)));
    }
}
