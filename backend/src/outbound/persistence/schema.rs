//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `username` is unique.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login and display name (max 150 characters).
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Requests for a review of a book or article.
    tickets (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Title (max 128 characters).
        title -> Varchar,
        /// Description (max 2048 characters).
        description -> Varchar,
        /// Relative media path of the cover image.
        image -> Nullable<Varchar>,
        /// Owning user.
        user_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rated responses to a ticket; removed with their ticket.
    reviews (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Parent ticket.
        ticket_id -> Int8,
        /// Rating between 0 and 5.
        rating -> Int2,
        /// Headline (max 128 characters).
        headline -> Varchar,
        /// Body (max 8192 characters).
        body -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges: `user_id` follows `followed_user_id`.
    user_follows (user_id, followed_user_id) {
        /// Follower.
        user_id -> Uuid,
        /// Followed user.
        followed_user_id -> Uuid,
        /// When the edge was written.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed block edges: `user_id` blocks `blocked_user_id`.
    user_blocks (user_id, blocked_user_id) {
        /// Blocker.
        user_id -> Uuid,
        /// Blocked user.
        blocked_user_id -> Uuid,
        /// When the edge was written.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tickets -> users (user_id));
diesel::joinable!(reviews -> tickets (ticket_id));
diesel::joinable!(reviews -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, tickets, reviews, user_follows, user_blocks);
