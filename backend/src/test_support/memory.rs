//! In-memory adapters for the driven ports.
//!
//! They honour the same contracts as the Diesel and `cap-std` adapters:
//! follow and block are applied atomically per call, deleting a ticket
//! removes its reviews, and listings use the same ordering.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    ContentRepository, ContentRepositoryError, MediaStore, MediaStoreError, NewAccount,
    PasswordHashError, PasswordHasher, RelationshipRepository, RelationshipRepositoryError,
    StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    BlockOutcome, BlockedUser, FollowOutcome, ImageUpload, NewReview, NewTicket, Rating, Review,
    ReviewDraft, ReviewFilter, ReviewId, ReviewWithTicket, RelationshipOverview,
    RelationshipSnapshot, StoredImageChange, Ticket, TicketDraft, TicketId, User, UserId,
    Username,
};

/// Stores stay usable after a panicking test thread poisoned them.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Accounts keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<UserId, StoredCredentials>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a user without going through the async port.
    pub fn user(&self, id: &UserId) -> Option<User> {
        lock(&self.accounts)
            .get(id)
            .map(|stored| stored.user.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, account: &NewAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        let username = account.user.username();
        if accounts
            .values()
            .any(|stored| stored.user.username() == username)
        {
            return Err(UserPersistenceError::duplicate_username(
                username.as_ref().to_owned(),
            ));
        }
        accounts.insert(
            account.user.id().clone(),
            StoredCredentials {
                user: account.user.clone(),
                password_hash: account.password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.user(id))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .values()
            .find(|stored| stored.user.username() == username)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .values()
            .find(|stored| stored.user.username().as_ref() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = lock(&self.accounts)
            .values()
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| a.username().as_ref().cmp(b.username().as_ref()));
        Ok(users)
    }
}

#[derive(Default)]
struct Edges {
    follows: HashSet<(UserId, UserId)>,
    blocks: HashMap<(UserId, UserId), DateTime<Utc>>,
}

/// Follow and block edges.
pub struct InMemoryRelationshipRepository {
    users: Arc<InMemoryUserRepository>,
    edges: Mutex<Edges>,
}

impl InMemoryRelationshipRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            edges: Mutex::new(Edges::default()),
        }
    }

    /// Whether `follower` currently follows `followed`.
    pub fn is_following(&self, follower: &UserId, followed: &UserId) -> bool {
        lock(&self.edges)
            .follows
            .contains(&(follower.clone(), followed.clone()))
    }

    /// Number of stored follow edges.
    pub fn follow_count(&self) -> usize {
        lock(&self.edges).follows.len()
    }

    /// Number of stored block edges.
    pub fn block_count(&self) -> usize {
        lock(&self.edges).blocks.len()
    }

    fn users_sorted(&self, ids: impl Iterator<Item = UserId>) -> Vec<User> {
        let mut users: Vec<User> = ids.filter_map(|id| self.users.user(&id)).collect();
        users.sort_by(|a, b| a.username().as_ref().cmp(b.username().as_ref()));
        users
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryRelationshipRepository {
    async fn follow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<FollowOutcome, RelationshipRepositoryError> {
        let mut edges = lock(&self.edges);
        let blocked = edges
            .blocks
            .contains_key(&(follower.clone(), followed.clone()))
            || edges
                .blocks
                .contains_key(&(followed.clone(), follower.clone()));
        if blocked {
            return Ok(FollowOutcome::Blocked);
        }
        if edges.follows.insert((follower.clone(), followed.clone())) {
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipRepositoryError> {
        Ok(lock(&self.edges)
            .follows
            .remove(&(follower.clone(), followed.clone())))
    }

    async fn block(
        &self,
        blocker: &UserId,
        blocked: &UserId,
    ) -> Result<BlockOutcome, RelationshipRepositoryError> {
        let mut edges = lock(&self.edges);
        let before = edges.follows.len();
        edges.follows.retain(|(a, b)| {
            !((a == blocker && b == blocked) || (a == blocked && b == blocker))
        });
        let removed_follows = before - edges.follows.len();
        let key = (blocker.clone(), blocked.clone());
        let created = !edges.blocks.contains_key(&key);
        if created {
            edges.blocks.insert(key, Utc::now());
        }
        Ok(BlockOutcome {
            created,
            removed_follows,
        })
    }

    async fn unblock(
        &self,
        blocker: &UserId,
        blocked: &UserId,
    ) -> Result<bool, RelationshipRepositoryError> {
        Ok(lock(&self.edges)
            .blocks
            .remove(&(blocker.clone(), blocked.clone()))
            .is_some())
    }

    async fn snapshot(
        &self,
        viewer: &UserId,
    ) -> Result<RelationshipSnapshot, RelationshipRepositoryError> {
        let edges = lock(&self.edges);
        Ok(RelationshipSnapshot {
            following: edges
                .follows
                .iter()
                .filter(|(a, _)| a == viewer)
                .map(|(_, b)| b.clone())
                .collect(),
            blocking: edges
                .blocks
                .keys()
                .filter(|(a, _)| a == viewer)
                .map(|(_, b)| b.clone())
                .collect(),
            blocked_by: edges
                .blocks
                .keys()
                .filter(|(_, b)| b == viewer)
                .map(|(a, _)| a.clone())
                .collect(),
        })
    }

    async fn overview(
        &self,
        viewer: &UserId,
    ) -> Result<RelationshipOverview, RelationshipRepositoryError> {
        let (following, followers, blocks) = {
            let edges = lock(&self.edges);
            let following: Vec<UserId> = edges
                .follows
                .iter()
                .filter(|(a, _)| a == viewer)
                .map(|(_, b)| b.clone())
                .collect();
            let followers: Vec<UserId> = edges
                .follows
                .iter()
                .filter(|(_, b)| b == viewer)
                .map(|(a, _)| a.clone())
                .collect();
            let blocks: HashMap<UserId, DateTime<Utc>> = edges
                .blocks
                .iter()
                .filter(|((a, _), _)| a == viewer)
                .map(|((_, b), at)| (b.clone(), *at))
                .collect();
            (following, followers, blocks)
        };
        let blocked = self
            .users_sorted(blocks.keys().cloned())
            .into_iter()
            .filter_map(|user| {
                blocks.get(user.id()).map(|at| BlockedUser {
                    blocked_at: *at,
                    user,
                })
            })
            .collect();
        Ok(RelationshipOverview {
            following: self.users_sorted(following.into_iter()),
            followers: self.users_sorted(followers.into_iter()),
            blocked,
        })
    }
}

struct TicketRow {
    owner: UserId,
    title: String,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

struct ReviewRow {
    ticket_id: TicketId,
    owner: UserId,
    rating: Rating,
    headline: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Content {
    tickets: BTreeMap<i64, TicketRow>,
    reviews: BTreeMap<i64, ReviewRow>,
}

/// Tickets and reviews with store-assigned ids.
pub struct InMemoryContentRepository {
    users: Arc<InMemoryUserRepository>,
    content: Mutex<Content>,
    next_id: AtomicI64,
}

impl InMemoryContentRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            content: Mutex::new(Content::default()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored reviews.
    pub fn review_count(&self) -> usize {
        lock(&self.content).reviews.len()
    }

    /// Number of stored tickets.
    pub fn ticket_count(&self) -> usize {
        lock(&self.content).tickets.len()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn author(&self, id: &UserId) -> Result<User, ContentRepositoryError> {
        self.users
            .user(id)
            .ok_or_else(|| ContentRepositoryError::query(format!("unknown author {id}")))
    }

    fn ticket(&self, id: i64, row: &TicketRow) -> Result<Ticket, ContentRepositoryError> {
        Ok(Ticket {
            id: TicketId::new(id),
            title: row.title.clone(),
            description: row.description.clone(),
            image: row.image.clone(),
            author: self.author(&row.owner)?,
            created_at: row.created_at,
        })
    }

    fn review(&self, id: i64, row: &ReviewRow) -> Result<Review, ContentRepositoryError> {
        Ok(Review {
            id: ReviewId::new(id),
            ticket_id: row.ticket_id,
            rating: row.rating,
            headline: row.headline.clone(),
            body: row.body.clone(),
            author: self.author(&row.owner)?,
            created_at: row.created_at,
        })
    }

    fn review_with_ticket(
        &self,
        content: &Content,
        id: i64,
        row: &ReviewRow,
    ) -> Result<ReviewWithTicket, ContentRepositoryError> {
        let ticket_id = row.ticket_id.get();
        let ticket_row = content
            .tickets
            .get(&ticket_id)
            .ok_or_else(|| ContentRepositoryError::missing_ticket(ticket_id))?;
        Ok(ReviewWithTicket {
            review: self.review(id, row)?,
            ticket: self.ticket(ticket_id, ticket_row)?,
        })
    }
}

fn ticket_row(ticket: &NewTicket) -> TicketRow {
    TicketRow {
        owner: ticket.owner.clone(),
        title: ticket.draft.title().to_owned(),
        description: ticket.draft.description().to_owned(),
        image: ticket.image.clone(),
        created_at: ticket.created_at,
    }
}

fn review_row(ticket_id: TicketId, review: &NewReview) -> ReviewRow {
    ReviewRow {
        ticket_id,
        owner: review.owner.clone(),
        rating: review.draft.rating(),
        headline: review.draft.headline().to_owned(),
        body: review.draft.body().to_owned(),
        created_at: review.created_at,
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, ContentRepositoryError> {
        let id = self.next_id();
        let row = ticket_row(ticket);
        let stored = self.ticket(id, &row)?;
        lock(&self.content).tickets.insert(id, row);
        Ok(stored)
    }

    async fn insert_ticket_with_review(
        &self,
        ticket: &NewTicket,
        review: &NewReview,
    ) -> Result<ReviewWithTicket, ContentRepositoryError> {
        let ticket_id = self.next_id();
        let review_id = self.next_id();
        let ticket_row = ticket_row(ticket);
        let review_row = review_row(TicketId::new(ticket_id), review);
        let created = ReviewWithTicket {
            review: self.review(review_id, &review_row)?,
            ticket: self.ticket(ticket_id, &ticket_row)?,
        };
        let mut content = lock(&self.content);
        content.tickets.insert(ticket_id, ticket_row);
        content.reviews.insert(review_id, review_row);
        Ok(created)
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>, ContentRepositoryError> {
        let content = lock(&self.content);
        content
            .tickets
            .get(&id.get())
            .map(|row| self.ticket(id.get(), row))
            .transpose()
    }

    async fn update_ticket(
        &self,
        id: TicketId,
        draft: &TicketDraft,
        image: &StoredImageChange,
    ) -> Result<Option<Ticket>, ContentRepositoryError> {
        let mut content = lock(&self.content);
        let Some(row) = content.tickets.get_mut(&id.get()) else {
            return Ok(None);
        };
        row.title = draft.title().to_owned();
        row.description = draft.description().to_owned();
        match image {
            StoredImageChange::Keep => {}
            StoredImageChange::Set(path) => row.image = Some(path.clone()),
            StoredImageChange::Clear => row.image = None,
        }
        self.ticket(id.get(), row).map(Some)
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, ContentRepositoryError> {
        let mut content = lock(&self.content);
        let removed = content.tickets.remove(&id.get()).is_some();
        if removed {
            content.reviews.retain(|_, review| review.ticket_id != id);
        }
        Ok(removed)
    }

    async fn insert_review(
        &self,
        ticket_id: TicketId,
        review: &NewReview,
    ) -> Result<Review, ContentRepositoryError> {
        let mut content = lock(&self.content);
        if !content.tickets.contains_key(&ticket_id.get()) {
            return Err(ContentRepositoryError::missing_ticket(ticket_id.get()));
        }
        let id = self.next_id();
        let row = review_row(ticket_id, review);
        let stored = self.review(id, &row)?;
        content.reviews.insert(id, row);
        Ok(stored)
    }

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, ContentRepositoryError> {
        let content = lock(&self.content);
        content
            .reviews
            .get(&id.get())
            .map(|row| self.review(id.get(), row))
            .transpose()
    }

    async fn update_review(
        &self,
        id: ReviewId,
        draft: &ReviewDraft,
    ) -> Result<Option<Review>, ContentRepositoryError> {
        let mut content = lock(&self.content);
        let Some(row) = content.reviews.get_mut(&id.get()) else {
            return Ok(None);
        };
        row.rating = draft.rating();
        row.headline = draft.headline().to_owned();
        row.body = draft.body().to_owned();
        self.review(id.get(), row).map(Some)
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, ContentRepositoryError> {
        Ok(lock(&self.content)
            .reviews
            .remove(&id.get())
            .is_some())
    }

    async fn tickets_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<Vec<Ticket>, ContentRepositoryError> {
        let content = lock(&self.content);
        let mut tickets = content
            .tickets
            .iter()
            .filter(|(_, row)| authors.contains(&row.owner))
            .map(|(id, row)| self.ticket(*id, row))
            .collect::<Result<Vec<_>, _>>()?;
        tickets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tickets)
    }

    async fn reviews_matching(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewWithTicket>, ContentRepositoryError> {
        let content = lock(&self.content);
        let mut reviews = Vec::new();
        for (id, row) in &content.reviews {
            let item = self.review_with_ticket(&content, *id, row)?;
            if filter.matches(&item) {
                reviews.push(item);
            }
        }
        reviews.sort_by(|a, b| {
            b.review
                .created_at
                .cmp(&a.review.created_at)
                .then_with(|| b.review.id.cmp(&a.review.id))
        });
        Ok(reviews)
    }
}

/// Image blobs keyed by relative path.
#[derive(Default)]
pub struct InMemoryMediaStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob is stored under `path`.
    pub fn contains(&self, path: &str) -> bool {
        lock(&self.blobs).contains_key(path)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        lock(&self.blobs).len()
    }

    /// Whether no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn store(&self, image: &ImageUpload) -> Result<String, MediaStoreError> {
        let path = format!("tickets/{}.{}", Uuid::new_v4(), image.format().extension());
        lock(&self.blobs).insert(path.clone(), image.bytes().to_vec());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), MediaStoreError> {
        lock(&self.blobs).remove(path);
        Ok(())
    }
}

/// Hasher that stores passwords behind a fixed prefix. Never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHasher;

const PLAIN_PREFIX: &str = "plain$";

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("{PLAIN_PREFIX}{password}"))
    }

    fn verify(&self, password: &str, encoded: &str) -> bool {
        encoded
            .strip_prefix(PLAIN_PREFIX)
            .is_some_and(|stored| stored == password)
    }
}
