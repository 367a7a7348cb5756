//! Tickets, reviews and the validation rules that guard them.

pub mod review;
pub mod ticket;
pub mod validation;

pub use review::{NewReview, Rating, Review, ReviewDraft, ReviewId, ReviewWithTicket};
pub use ticket::{
    ImageEdit, ImageFormat, ImageUpload, NewTicket, StoredImageChange, Ticket,
    TicketDraft, TicketId,
};
pub use validation::ContentValidationError;
