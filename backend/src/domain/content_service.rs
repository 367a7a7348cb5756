//! Content services: ticket and review mutations, feeds and posts.
//!
//! Ownership is checked here, never in adapters. Images are written to the
//! media store before the database row; when the row write fails the blob is
//! removed again, and blobs replaced or orphaned by an edit or delete are
//! removed after the row change commits.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    ContentCommand, ContentQuery, ContentRepository, ContentRepositoryError, CreateReviewRequest,
    CreateTicketRequest, CreateTicketWithReviewRequest, EditReviewRequest, EditTicketRequest,
    MediaStore, MediaStoreError, RelationshipRepository, RelationshipRepositoryError,
};
use crate::domain::{
    Error, FeedEntry, ImageEdit, ImageUpload, NewReview, NewTicket, Review,
    ReviewFilter, ReviewId, ReviewWithTicket, StoredImageChange, Ticket, TicketId,
    UserId, assemble_feed, visible_authors,
};

/// Default upper bound for uploaded images.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Content service implementing the content driving ports.
#[derive(Clone)]
pub struct ContentService<C, R, M> {
    content: Arc<C>,
    relationships: Arc<R>,
    media: Arc<M>,
    clock: Arc<dyn Clock>,
    max_image_bytes: usize,
}

impl<C, R, M> ContentService<C, R, M> {
    /// Create a new service with the given adapters.
    pub fn new(
        content: Arc<C>,
        relationships: Arc<R>,
        media: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            content,
            relationships,
            media,
            clock,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Override the accepted image size.
    #[must_use]
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }
}

pub(crate) fn map_content_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("content repository unavailable: {message}"))
        }
        ContentRepositoryError::Query { message } => {
            Error::internal(format!("content repository error: {message}"))
        }
        ContentRepositoryError::MissingTicket { ticket_id } => {
            Error::not_found(format!("ticket {ticket_id} not found"))
        }
    }
}

pub(crate) fn map_relationship_error(error: RelationshipRepositoryError) -> Error {
    match error {
        RelationshipRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("relationship repository unavailable: {message}"))
        }
        RelationshipRepositoryError::Query { message } => {
            Error::internal(format!("relationship repository error: {message}"))
        }
    }
}

fn map_media_error(error: MediaStoreError) -> Error {
    Error::internal(format!("media store error: {error}"))
}

fn ticket_not_found(id: TicketId) -> Error {
    Error::not_found(format!("ticket {id} not found"))
}

fn review_not_found(id: ReviewId) -> Error {
    Error::not_found(format!("review {id} not found"))
}

impl<C, R, M> ContentService<C, R, M>
where
    C: ContentRepository,
    R: RelationshipRepository,
    M: MediaStore,
{
    async fn store_upload(&self, image: &ImageUpload) -> Result<String, Error> {
        image.ensure_within(self.max_image_bytes)?;
        self.media.store(image).await.map_err(map_media_error)
    }

    async fn store_image(&self, image: Option<&ImageUpload>) -> Result<Option<String>, Error> {
        match image {
            Some(image) => self.store_upload(image).await.map(Some),
            None => Ok(None),
        }
    }

    /// Best-effort removal; a leaked blob never fails the request.
    async fn discard_image(&self, path: Option<&str>) {
        let Some(path) = path else {
            return;
        };
        if let Err(err) = self.media.remove(path).await {
            warn!(path, error = %err, "failed to remove stored image");
        }
    }

    /// Run a row write, dropping `stored` if it fails.
    async fn with_rollback<T>(
        &self,
        stored: Option<&str>,
        result: Result<T, ContentRepositoryError>,
    ) -> Result<T, Error> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                self.discard_image(stored).await;
                Err(map_content_error(err))
            }
        }
    }

    async fn owned_ticket(&self, owner: &UserId, id: TicketId) -> Result<Ticket, Error> {
        let ticket = self
            .content
            .find_ticket(id)
            .await
            .map_err(map_content_error)?
            .ok_or_else(|| ticket_not_found(id))?;
        if !ticket.is_owned_by(owner) {
            return Err(Error::forbidden(format!("ticket {id} belongs to another user")));
        }
        Ok(ticket)
    }

    async fn owned_review(&self, owner: &UserId, id: ReviewId) -> Result<Review, Error> {
        let review = self
            .content
            .find_review(id)
            .await
            .map_err(map_content_error)?
            .ok_or_else(|| review_not_found(id))?;
        if !review.is_owned_by(owner) {
            return Err(Error::forbidden(format!("review {id} belongs to another user")));
        }
        Ok(review)
    }

    async fn timeline(
        &self,
        authors: Vec<UserId>,
        filter: ReviewFilter,
    ) -> Result<Vec<FeedEntry>, Error> {
        let tickets = self
            .content
            .tickets_by_authors(&authors)
            .await
            .map_err(map_content_error)?;
        let reviews = self
            .content
            .reviews_matching(&filter)
            .await
            .map_err(map_content_error)?;
        Ok(assemble_feed(tickets, reviews))
    }
}

#[async_trait]
impl<C, R, M> ContentCommand for ContentService<C, R, M>
where
    C: ContentRepository,
    R: RelationshipRepository,
    M: MediaStore,
{
    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, Error> {
        let CreateTicketRequest {
            owner,
            draft,
            image,
        } = request;
        let stored = self.store_image(image.as_ref()).await?;
        let new_ticket = NewTicket {
            owner,
            draft,
            image: stored.clone(),
            created_at: self.clock.utc(),
        };
        let result = self.content.insert_ticket(&new_ticket).await;
        let ticket = self.with_rollback(stored.as_deref(), result).await?;
        info!(ticket_id = %ticket.id, owner = %ticket.author.id(), "ticket created");
        Ok(ticket)
    }

    async fn edit_ticket(&self, request: EditTicketRequest) -> Result<Ticket, Error> {
        let EditTicketRequest {
            owner,
            ticket_id,
            draft,
            image,
        } = request;
        let current = self.owned_ticket(&owner, ticket_id).await?;

        let (change, stored) = match &image {
            ImageEdit::Keep => (StoredImageChange::Keep, None),
            ImageEdit::Remove => (StoredImageChange::Clear, None),
            ImageEdit::Replace(upload) => {
                let path = self.store_upload(upload).await?;
                (StoredImageChange::Set(path.clone()), Some(path))
            }
        };

        let result = self.content.update_ticket(ticket_id, &draft, &change).await;
        let updated = self
            .with_rollback(stored.as_deref(), result)
            .await?
            .ok_or_else(|| ticket_not_found(ticket_id))?;

        if !matches!(change, StoredImageChange::Keep) {
            self.discard_image(current.image.as_deref()).await;
        }
        info!(ticket_id = %ticket_id, "ticket updated");
        Ok(updated)
    }

    async fn delete_ticket(&self, owner: &UserId, ticket_id: TicketId) -> Result<(), Error> {
        let current = self.owned_ticket(owner, ticket_id).await?;
        let deleted = self
            .content
            .delete_ticket(ticket_id)
            .await
            .map_err(map_content_error)?;
        if !deleted {
            return Err(ticket_not_found(ticket_id));
        }
        self.discard_image(current.image.as_deref()).await;
        info!(ticket_id = %ticket_id, "ticket deleted");
        Ok(())
    }

    async fn create_review(&self, request: CreateReviewRequest) -> Result<Review, Error> {
        let CreateReviewRequest {
            owner,
            ticket_id,
            draft,
        } = request;
        let new_review = NewReview {
            owner,
            draft,
            created_at: self.clock.utc(),
        };
        let review = self
            .content
            .insert_review(ticket_id, &new_review)
            .await
            .map_err(map_content_error)?;
        info!(review_id = %review.id, ticket_id = %ticket_id, "review created");
        Ok(review)
    }

    async fn create_review_with_ticket(
        &self,
        request: CreateTicketWithReviewRequest,
    ) -> Result<ReviewWithTicket, Error> {
        let CreateTicketWithReviewRequest {
            owner,
            ticket,
            image,
            review,
        } = request;
        let stored = self.store_image(image.as_ref()).await?;
        let created_at = self.clock.utc();
        let new_ticket = NewTicket {
            owner: owner.clone(),
            draft: ticket,
            image: stored.clone(),
            created_at,
        };
        let new_review = NewReview {
            owner,
            draft: review,
            created_at,
        };
        let result = self
            .content
            .insert_ticket_with_review(&new_ticket, &new_review)
            .await;
        let created = self.with_rollback(stored.as_deref(), result).await?;
        info!(
            ticket_id = %created.ticket.id,
            review_id = %created.review.id,
            "ticket and review created"
        );
        Ok(created)
    }

    async fn edit_review(&self, request: EditReviewRequest) -> Result<Review, Error> {
        let EditReviewRequest {
            owner,
            review_id,
            draft,
        } = request;
        self.owned_review(&owner, review_id).await?;
        let updated = self
            .content
            .update_review(review_id, &draft)
            .await
            .map_err(map_content_error)?
            .ok_or_else(|| review_not_found(review_id))?;
        info!(review_id = %review_id, "review updated");
        Ok(updated)
    }

    async fn delete_review(&self, owner: &UserId, review_id: ReviewId) -> Result<(), Error> {
        self.owned_review(owner, review_id).await?;
        let deleted = self
            .content
            .delete_review(review_id)
            .await
            .map_err(map_content_error)?;
        if !deleted {
            return Err(review_not_found(review_id));
        }
        info!(review_id = %review_id, "review deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, R, M> ContentQuery for ContentService<C, R, M>
where
    C: ContentRepository,
    R: RelationshipRepository,
    M: MediaStore,
{
    async fn feed(&self, viewer: &UserId) -> Result<Vec<FeedEntry>, Error> {
        let snapshot = self
            .relationships
            .snapshot(viewer)
            .await
            .map_err(map_relationship_error)?;
        let authors: Vec<UserId> = visible_authors(viewer, &snapshot).into_iter().collect();
        let filter = ReviewFilter {
            authors: authors.clone(),
            ticket_owner: Some(viewer.clone()),
            excluded_authors: snapshot.excluded().into_iter().collect(),
        };
        self.timeline(authors, filter).await
    }

    async fn posts(&self, viewer: &UserId) -> Result<Vec<FeedEntry>, Error> {
        self.timeline(vec![viewer.clone()], ReviewFilter::by_author(viewer.clone()))
            .await
    }

    async fn ticket(&self, ticket_id: TicketId) -> Result<Ticket, Error> {
        self.content
            .find_ticket(ticket_id)
            .await
            .map_err(map_content_error)?
            .ok_or_else(|| ticket_not_found(ticket_id))
    }
}

#[cfg(test)]
#[path = "content_service_tests.rs"]
mod tests;
