//! Account and user listing handlers.
//!
//! ```text
//! POST /api/v1/signup {"username":"ada","password":"pw","passwordConfirmation":"pw"}
//! POST /api/v1/login {"username":"ada","password":"pw"}
//! POST /api/v1/logout
//! GET /api/v1/users
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    LoginCredentials, LoginValidationError, SignupDetails, SignupValidationError, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::{SessionContext, Viewer};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_login_validation_error, map_signup_validation_error};

/// Login request body for `POST /api/v1/login`.
///
/// Example JSON:
/// `{"username":"ada","password":"password"}`
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Signup request body for `POST /api/v1/signup`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

impl TryFrom<SignupRequest> for SignupDetails {
    type Error = SignupValidationError;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.password,
            &value.password_confirmation,
        )
    }
}

/// Create an account and start a session for it.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let details =
        SignupDetails::try_from(payload.into_inner()).map_err(map_signup_validation_error)?;
    let user = state.signup.signup(&details).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(user))
}

/// Check credentials and start a session.
///
/// Unknown usernames and wrong passwords both answer `401` with the same
/// message.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(viewer: Viewer, session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id = viewer.into_user_id();
    session.purge();
    info!(user_id = %user_id, "session ended");
    Ok(HttpResponse::NoContent().finish())
}

/// List users the viewer may still follow.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use litrevu::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Follow candidates", body = [UserSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    viewer: Viewer,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.follow_candidates(viewer.id()).await?;
    Ok(web::Json(users))
}
