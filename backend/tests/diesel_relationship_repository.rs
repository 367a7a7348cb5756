//! Diesel relationship adapter against embedded PostgreSQL.
//!
//! Exercises the follow and block transactions on a real schema so the
//! uniqueness and lock-ordering assumptions are checked against PostgreSQL.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{PgContext, pg_context};
use litrevu::domain::ports::RelationshipRepository;
use litrevu::domain::{BlockOutcome, FollowOutcome, UserId};
use litrevu::outbound::persistence::DieselRelationshipRepository;
use rstest::{fixture, rstest};

struct Pair {
    repo: DieselRelationshipRepository,
    alice: UserId,
    bob: UserId,
}

#[fixture]
fn context() -> Option<PgContext> {
    pg_context()
}

fn pair(context: &PgContext) -> Pair {
    Pair {
        repo: DieselRelationshipRepository::new(context.pool.clone()),
        alice: context.seed_user("alice"),
        bob: context.seed_user("bob"),
    }
}

#[rstest]
fn follow_is_written_once(context: Option<PgContext>) {
    let Some(context) = context else { return };
    let Pair { repo, alice, bob } = pair(&context);

    let first = context.run(repo.follow(&alice, &bob)).expect("follow");
    let again = context.run(repo.follow(&alice, &bob)).expect("re-follow");

    assert_eq!(first, FollowOutcome::Created);
    assert_eq!(again, FollowOutcome::AlreadyFollowing);
    assert_eq!(context.count_rows("user_follows"), 1);
    let snapshot = context.run(repo.snapshot(&alice)).expect("snapshot");
    assert!(snapshot.following.contains(&bob));
}

#[rstest]
fn block_removes_follows_in_both_directions(context: Option<PgContext>) {
    let Some(context) = context else { return };
    let Pair { repo, alice, bob } = pair(&context);
    context.run(repo.follow(&alice, &bob)).expect("alice follows bob");
    context.run(repo.follow(&bob, &alice)).expect("bob follows alice");

    let outcome = context.run(repo.block(&alice, &bob)).expect("block");
    let repeated = context.run(repo.block(&alice, &bob)).expect("block again");

    assert_eq!(
        outcome,
        BlockOutcome {
            created: true,
            removed_follows: 2,
        }
    );
    assert_eq!(
        repeated,
        BlockOutcome {
            created: false,
            removed_follows: 0,
        }
    );
    assert_eq!(context.count_rows("user_follows"), 0);
    assert_eq!(context.count_rows("user_blocks"), 1);
}

#[rstest]
fn follow_across_a_block_is_refused_either_way(context: Option<PgContext>) {
    let Some(context) = context else { return };
    let Pair { repo, alice, bob } = pair(&context);
    context.run(repo.block(&alice, &bob)).expect("block");

    let by_blocker = context.run(repo.follow(&alice, &bob)).expect("follow");
    let by_blocked = context.run(repo.follow(&bob, &alice)).expect("follow");

    assert_eq!(by_blocker, FollowOutcome::Blocked);
    assert_eq!(by_blocked, FollowOutcome::Blocked);
    assert_eq!(context.count_rows("user_follows"), 0);
}

#[rstest]
fn unblock_reports_whether_an_edge_existed(context: Option<PgContext>) {
    let Some(context) = context else { return };
    let Pair { repo, alice, bob } = pair(&context);
    context.run(repo.block(&alice, &bob)).expect("block");

    let removed = context.run(repo.unblock(&alice, &bob)).expect("unblock");
    let removed_again = context.run(repo.unblock(&alice, &bob)).expect("unblock again");

    assert!(removed);
    assert!(!removed_again);
    let snapshot = context.run(repo.snapshot(&bob)).expect("snapshot");
    assert!(snapshot.blocked_by.is_empty());
    assert_eq!(
        context.run(repo.follow(&bob, &alice)).expect("follow"),
        FollowOutcome::Created
    );
}
