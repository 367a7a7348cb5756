//! Follow and block edges, and the visibility rule derived from them.
//!
//! A follow edge `(a, b)` means `a` wants `b`'s content in their feed. A block
//! edge `(a, b)` hides content in both directions and prevents either user
//! from following the other. The two never coexist for the same pair.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{User, UserId};

/// The edges touching one viewer, read fresh for every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipSnapshot {
    /// Users the viewer follows.
    pub following: HashSet<UserId>,
    /// Users the viewer blocks.
    pub blocking: HashSet<UserId>,
    /// Users who block the viewer.
    pub blocked_by: HashSet<UserId>,
}

impl RelationshipSnapshot {
    /// Users hidden from the viewer in either direction.
    pub fn excluded(&self) -> HashSet<UserId> {
        self.blocking.union(&self.blocked_by).cloned().collect()
    }

    /// Whether a block exists between the viewer and `other`, either way.
    pub fn is_blocked_with(&self, other: &UserId) -> bool {
        self.blocking.contains(other) || self.blocked_by.contains(other)
    }
}

/// Authors whose content the viewer may see.
///
/// Computed as `{viewer} ∪ following − (blocking ∪ blocked_by)`.
///
/// # Examples
/// ```
/// use litrevu::domain::{RelationshipSnapshot, UserId, visible_authors};
///
/// let viewer = UserId::random();
/// let friend = UserId::random();
/// let mut snapshot = RelationshipSnapshot::default();
/// snapshot.following.insert(friend.clone());
///
/// let visible = visible_authors(&viewer, &snapshot);
/// assert!(visible.contains(&viewer));
/// assert!(visible.contains(&friend));
/// ```
pub fn visible_authors(viewer: &UserId, snapshot: &RelationshipSnapshot) -> HashSet<UserId> {
    let excluded = snapshot.excluded();
    std::iter::once(viewer)
        .chain(snapshot.following.iter())
        .filter(|author| !excluded.contains(*author))
        .cloned()
        .collect()
}

/// Result of a follow attempt applied by the relationship store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new edge was written.
    Created,
    /// The edge already existed.
    AlreadyFollowing,
    /// A block exists between the two users; nothing was written.
    Blocked,
}

/// Result of a block applied by the relationship store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOutcome {
    /// Whether a new block edge was written.
    pub created: bool,
    /// Follow edges removed between the pair, in either direction.
    pub removed_follows: usize,
}

/// A user the viewer blocks, with the time of the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUser {
    /// Blocked user.
    pub user: User,
    /// When the block was created.
    pub blocked_at: DateTime<Utc>,
}

/// Everything the follow management view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipOverview {
    /// Users the viewer follows.
    pub following: Vec<User>,
    /// Users following the viewer.
    pub followers: Vec<User>,
    /// Users the viewer blocks.
    pub blocked: Vec<BlockedUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    struct Users {
        viewer: UserId,
        a: UserId,
        b: UserId,
        c: UserId,
    }

    #[fixture]
    fn users() -> Users {
        Users {
            viewer: UserId::random(),
            a: UserId::random(),
            b: UserId::random(),
            c: UserId::random(),
        }
    }

    #[rstest]
    fn viewer_alone_sees_self(users: Users) {
        let visible = visible_authors(&users.viewer, &RelationshipSnapshot::default());
        assert_eq!(visible, HashSet::from([users.viewer]));
    }

    #[rstest]
    fn followed_users_are_visible_unless_blocked(users: Users) {
        let snapshot = RelationshipSnapshot {
            following: HashSet::from([users.a.clone(), users.b.clone(), users.c.clone()]),
            blocking: HashSet::from([users.b.clone()]),
            blocked_by: HashSet::from([users.c.clone()]),
        };

        let visible = visible_authors(&users.viewer, &snapshot);
        assert_eq!(visible, HashSet::from([users.viewer, users.a]));
    }

    #[rstest]
    fn blocked_users_that_are_not_followed_stay_hidden(users: Users) {
        let snapshot = RelationshipSnapshot {
            blocked_by: HashSet::from([users.a.clone()]),
            ..RelationshipSnapshot::default()
        };
        assert!(!visible_authors(&users.viewer, &snapshot).contains(&users.a));
        assert!(snapshot.is_blocked_with(&users.a));
        assert!(!snapshot.is_blocked_with(&users.b));
    }

    #[rstest]
    fn excluded_is_union_of_both_directions(users: Users) {
        let snapshot = RelationshipSnapshot {
            blocking: HashSet::from([users.a.clone()]),
            blocked_by: HashSet::from([users.b.clone()]),
            ..RelationshipSnapshot::default()
        };
        assert_eq!(snapshot.excluded(), HashSet::from([users.a, users.b]));
    }
}
