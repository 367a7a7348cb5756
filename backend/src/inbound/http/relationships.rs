//! Follow and block handlers.
//!
//! ```text
//! GET /api/v1/follow-users
//! POST /api/v1/follow-users {"username":"grace"}
//! POST /api/v1/unfollow/{userId}
//! POST /api/v1/block/{userId}
//! POST /api/v1/unblock/{userId}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Username;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RelationshipOverviewSchema, UserSchema};
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_user_validation_error, parse_user_id};

const USER_ID_FIELD: FieldName = FieldName::new("userId");

/// Request body for `POST /api/v1/follow-users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FollowRequest {
    /// Username of the user to follow.
    pub username: String,
}

/// Users the viewer follows, users following the viewer, and users the
/// viewer blocks.
#[utoipa::path(
    get,
    path = "/api/v1/follow-users",
    responses(
        (status = 200, description = "Relationship overview", body = RelationshipOverviewSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "getRelationships"
)]
#[get("/follow-users")]
pub async fn overview(
    state: web::Data<HttpState>,
    viewer: Viewer,
) -> ApiResult<HttpResponse> {
    let overview = state.relationships_query.overview(viewer.id()).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// Follow a user by username.
///
/// Following someone already followed succeeds without change.
#[utoipa::path(
    post,
    path = "/api/v1/follow-users",
    request_body = FollowRequest,
    responses(
        (status = 200, description = "Now following", body = UserSchema),
        (status = 400, description = "Invalid request or self-follow", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "A block exists between the users", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "followUser"
)]
#[post("/follow-users")]
pub async fn follow(
    state: web::Data<HttpState>,
    viewer: Viewer,
    payload: web::Json<FollowRequest>,
) -> ApiResult<HttpResponse> {
    let requester = viewer.into_user_id();
    let username = Username::new(&payload.username).map_err(map_user_validation_error)?;
    let followed = state
        .relationships
        .follow_username(&requester, &username)
        .await?;
    Ok(HttpResponse::Ok().json(followed))
}

/// Stop following a user.
#[utoipa::path(
    post,
    path = "/api/v1/unfollow/{userId}",
    params(("userId" = String, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "Not following"),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "unfollowUser"
)]
#[post("/unfollow/{user_id}")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = viewer.into_user_id();
    let target = parse_user_id(&path, USER_ID_FIELD)?;
    state.relationships.unfollow(&requester, &target).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Block a user, dropping follows in both directions.
#[utoipa::path(
    post,
    path = "/api/v1/block/{userId}",
    params(("userId" = String, Path, description = "User to block")),
    responses(
        (status = 204, description = "Blocked"),
        (status = 400, description = "Invalid user id or self-block", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "blockUser"
)]
#[post("/block/{user_id}")]
pub async fn block(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = viewer.into_user_id();
    let target = parse_user_id(&path, USER_ID_FIELD)?;
    state.relationships.block(&requester, &target).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Lift a block. Follows removed by the block stay removed.
#[utoipa::path(
    post,
    path = "/api/v1/unblock/{userId}",
    params(("userId" = String, Path, description = "User to unblock")),
    responses(
        (status = 204, description = "Not blocked"),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "unblockUser"
)]
#[post("/unblock/{user_id}")]
pub async fn unblock(
    state: web::Data<HttpState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = viewer.into_user_id();
    let target = parse_user_id(&path, USER_ID_FIELD)?;
    state.relationships.unblock(&requester, &target).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, ErrorCode, RelationshipOverview, User, UserId};
    use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_app};
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn send(
        ports: MockPorts,
        viewer: &UserId,
        request: actix_test::TestRequest,
    ) -> ServiceResponse {
        let app = actix_test::init_service(test_app(ports.into_state())).await;
        let cookie = session_cookie(&app, viewer).await;
        actix_test::call_service(&app, request.cookie(cookie).to_request()).await
    }

    async fn error_code(res: ServiceResponse) -> Option<String> {
        let body: Value = actix_test::read_body_json(res).await;
        body.get("code").and_then(Value::as_str).map(str::to_owned)
    }

    #[rstest]
    #[actix_web::test]
    async fn overview_lists_the_viewers_edges() {
        let viewer = UserId::random();
        let friend = User::new(UserId::random(), Username::new("grace").expect("username"));
        let expected = RelationshipOverview {
            following: vec![friend],
            ..RelationshipOverview::default()
        };
        let mut ports = MockPorts::default();
        ports
            .relationships_query
            .expect_overview()
            .return_once(move |_| Ok(expected));

        let res = send(
            ports,
            &viewer,
            actix_test::TestRequest::get().uri("/api/v1/follow-users"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.pointer("/following/0/username"), Some(&json!("grace")));
        assert_eq!(body.get("blocked"), Some(&json!([])));
    }

    #[rstest]
    #[actix_web::test]
    async fn follow_by_username_returns_the_followed_user() {
        let viewer = UserId::random();
        let target = User::new(UserId::random(), Username::new("grace").expect("username"));
        let returned = target.clone();
        let mut ports = MockPorts::default();
        ports
            .relationships
            .expect_follow_username()
            .withf(|_, username| username.as_ref() == "grace")
            .return_once(move |_, _| Ok(returned));

        let res = send(
            ports,
            &viewer,
            actix_test::TestRequest::post()
                .uri("/api/v1/follow-users")
                .set_json(json!({"username": "grace"})),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("id"), Some(&json!(target.id().to_string())));
    }

    #[rstest]
    #[case(Error::self_reference("cannot follow yourself"), StatusCode::BAD_REQUEST, ErrorCode::SelfReference)]
    #[case(Error::blocked_relationship("a block exists"), StatusCode::CONFLICT, ErrorCode::BlockedRelationship)]
    #[case(Error::not_found("user grace not found"), StatusCode::NOT_FOUND, ErrorCode::NotFound)]
    #[actix_web::test]
    async fn follow_failures_map_to_statuses(
        #[case] error: Error,
        #[case] status: StatusCode,
        #[case] code: ErrorCode,
    ) {
        let mut ports = MockPorts::default();
        ports
            .relationships
            .expect_follow_username()
            .return_once(move |_, _| Err(error));

        let res = send(
            ports,
            &UserId::random(),
            actix_test::TestRequest::post()
                .uri("/api/v1/follow-users")
                .set_json(json!({"username": "grace"})),
        )
        .await;

        assert_eq!(res.status(), status);
        let expected = serde_json::to_value(code).expect("code serialises");
        assert_eq!(error_code(res).await.as_deref(), expected.as_str());
    }

    #[rstest]
    #[actix_web::test]
    async fn follow_rejects_malformed_usernames() {
        let res = send(
            MockPorts::default(),
            &UserId::random(),
            actix_test::TestRequest::post()
                .uri("/api/v1/follow-users")
                .set_json(json!({"username": "no spaces"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case("unfollow")]
    #[case("block")]
    #[case("unblock")]
    #[actix_web::test]
    async fn edge_commands_answer_no_content(#[case] action: &str) {
        let viewer = UserId::random();
        let target = UserId::random();
        let expected = target.clone();
        let mut ports = MockPorts::default();
        match action {
            "unfollow" => {
                ports
                    .relationships
                    .expect_unfollow()
                    .withf(move |_, id| *id == expected)
                    .return_once(|_, _| Ok(()));
            }
            "block" => {
                ports
                    .relationships
                    .expect_block()
                    .withf(move |_, id| *id == expected)
                    .return_once(|_, _| Ok(()));
            }
            _ => {
                ports
                    .relationships
                    .expect_unblock()
                    .withf(move |_, id| *id == expected)
                    .return_once(|_, _| Ok(()));
            }
        }

        let res = send(
            ports,
            &viewer,
            actix_test::TestRequest::post().uri(&format!("/api/v1/{action}/{target}")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[actix_web::test]
    async fn block_rejects_invalid_user_ids() {
        let res = send(
            MockPorts::default(),
            &UserId::random(),
            actix_test::TestRequest::post().uri("/api/v1/block/not-a-uuid"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.pointer("/details/code"), Some(&json!("invalid_uuid")));
    }

    #[rstest]
    #[actix_web::test]
    async fn self_block_is_a_bad_request() {
        let viewer = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .relationships
            .expect_block()
            .return_once(|_, _| Err(Error::self_reference("cannot block yourself")));

        let res = send(
            ports,
            &viewer,
            actix_test::TestRequest::post().uri(&format!("/api/v1/block/{viewer}")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
