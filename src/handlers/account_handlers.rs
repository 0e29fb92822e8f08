use std::sync::Arc;

use axum::{extract::Query, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::{
    authentication::{
        generate_id, get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser,
    },
    avatars::{initials_svg, initials_url},
    config::Config,
    data_formats::{
        AvatarParams, DocumentList, LoginRequest, PostResponse, RegisterRequest,
        SavedPostResponse, SessionResponse, SessionWrapper, StatusWrapper, UserResponse,
        UserWrapper,
    },
    db_helpers::{
        delete_session_in_db, get_user_by_email, get_user_by_id, insert_session, insert_user,
        list_saved_posts_in_db, list_saves_for_user_in_db,
    },
    errors::RequestError,
};

use super::JsonResult;

const SESSION_ID_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;

type UserJson = UserWrapper<UserResponse>;

// ----------------- Account Handlers -----------------
pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> Result<(StatusCode, Json<UserJson>), RequestError> {
    user.name = user.name.trim().to_owned();
    user.username = user.username.trim().to_owned();
    user.email = user.email.trim().to_owned();
    if user.name.is_empty() || user.username.is_empty() || user.email.is_empty() {
        return Err(RequestError::BadRequest(
            "name, username and email are required".to_owned(),
        ));
    }
    if user.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RequestError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    user.password = hash_password_argon2(user.password).await.map_err(|e| {
        error!("Could not hash password: {:?}", e);
        RequestError::RunTimeError("Could not register user\nPlease Try again")
    })?;

    let avatar = initials_url(&config.public_url, &user.name);
    let created = insert_user(&pool, &user, &avatar).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::RunTimeError("Email or username already exists");
        }
        e
    })?;
    info!("Registered user {} as {}", created.id, created.role.as_str());

    Ok((
        StatusCode::CREATED,
        Json(UserWrapper::wrap_with_user_data(UserResponse::new(created))),
    ))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<SessionWrapper<SessionResponse>> {
    let user = match get_user_by_email(&pool, request.email.trim()).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError("Email not found")),
    };
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|e| {
            error!("Could not verify password: {:?}", e);
            RequestError::RunTimeError("Could not login user\nPlease Try again")
        })?;
    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password"));
    }

    let expires_at = Utc::now() + Duration::days(config.session_ttl_days);
    let session = insert_session(&pool, &generate_id(SESSION_ID_LEN), user.id, expires_at).await?;
    let token = get_jwt_token(&config.jwt_secret, user.id, &session.id, session.expires_at)
        .map_err(|e| {
            error!("Could not sign token: {:?}", e);
            RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
        })?;
    info!("User {} signed in", user.id);

    Ok(Json(SessionWrapper {
        session: SessionResponse {
            token,
            user_id: user.id,
            expires_at: session.expires_at,
        },
    }))
}

pub async fn logout_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> JsonResult<StatusWrapper> {
    delete_session_in_db(&pool, &user.session_id).await?;
    info!("User {} signed out", user.id);
    Ok(Json(StatusWrapper::ok()))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
) -> JsonResult<UserJson> {
    match get_user_by_id(&pool, id).await? {
        Some(user) => Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
            user,
        )))),
        None => Err(RequestError::NotAuthorized("Account no longer exists")),
    }
}

pub async fn list_my_saves(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
) -> JsonResult<DocumentList<SavedPostResponse>> {
    let saves = list_saves_for_user_in_db(&pool, id).await?;
    Ok(Json(
        saves
            .into_iter()
            .map(SavedPostResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn list_my_saved_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
) -> JsonResult<DocumentList<PostResponse>> {
    let posts = list_saved_posts_in_db(&pool, id).await?;
    Ok(Json(
        posts
            .into_iter()
            .map(PostResponse::new)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn initials_avatar(Query(AvatarParams { name }): Query<AvatarParams>) -> impl IntoResponse {
    (
        [
            ("content-type", "image/svg+xml"),
            ("cache-control", "public, max-age=86400"),
        ],
        initials_svg(&name),
    )
}
