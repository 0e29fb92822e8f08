use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    authentication::AuthUser,
    data_formats::{
        parse_tags, DocumentList, DocumentPage, FormFields, InfinitePostsParams, LikesRequest,
        PostResponse, PostWrapper, SaveWrapper, SavedPostResponse, SearchParams, StatusWrapper,
        RECENT_POSTS_LIMIT,
    },
    db_helpers::{
        create_post_in_db, delete_post_in_db, delete_save_in_db, get_post_by_id_in_db,
        get_save_in_db, insert_save_in_db, list_infinite_posts_in_db, list_recent_posts_in_db,
        search_posts_in_db, set_post_likes_in_db, update_post_in_db, NewPost, PostChanges,
    },
    errors::RequestError,
    models::Post,
    storage::{delete_file_best_effort, upload_file, FileStorage},
};

use super::{is_admin, settle_image, stage_image, JsonResult};

const MAX_PAGE_SIZE: i64 = 100;

type PostJson = PostWrapper<PostResponse>;

fn into_list(posts: Vec<Post>) -> DocumentList<PostResponse> {
    posts
        .into_iter()
        .map(PostResponse::new)
        .collect::<Vec<_>>()
        .into()
}

// ----------------- Post Handlers -----------------

/// Upload first, then the document. If the document cannot be written the
/// uploaded file is deleted again.
pub async fn create_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PostJson>), RequestError> {
    let mut form = FormFields::read(multipart).await?;
    let file = form
        .take_file()
        .ok_or_else(|| RequestError::BadRequest("file is required".to_owned()))?;
    let caption = form.get("caption").unwrap_or_default().trim().to_owned();
    let location = form.optional("location");
    let tags = parse_tags(form.get("tags"));

    let uploaded = upload_file(&pool, &storage, Some(user.id), &file).await?;
    let image_url = storage.preview_url(&uploaded.id);

    let post = create_post_in_db(
        &pool,
        NewPost {
            creator_id: user.id,
            caption: &caption,
            image_url: &image_url,
            image_id: &uploaded.id,
            location: location.as_deref(),
            tags,
        },
    )
    .await;
    let post = match post {
        Ok(post) => post,
        Err(e) => {
            delete_file_best_effort(&pool, &storage, &uploaded.id).await;
            return Err(e);
        }
    };
    info!("User {} created post {}", user.id, post.id);
    Ok((StatusCode::CREATED, Json(PostWrapper { post: PostResponse::new(post) })))
}

pub async fn get_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<PostJson> {
    match get_post_by_id_in_db(&pool, id).await? {
        Some(post) => Ok(Json(PostWrapper {
            post: PostResponse::new(post),
        })),
        None => Err(RequestError::NotFound("Post not found")),
    }
}

pub async fn list_recent_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
) -> JsonResult<DocumentList<PostResponse>> {
    let posts = list_recent_posts_in_db(&pool, RECENT_POSTS_LIMIT).await?;
    Ok(Json(into_list(posts)))
}

pub async fn list_infinite_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Query(InfinitePostsParams { cursor, limit }): Query<InfinitePostsParams>,
) -> JsonResult<DocumentPage<PostResponse>> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let posts = list_infinite_posts_in_db(&pool, cursor, limit).await?;
    let next_cursor = if posts.len() as i64 == limit {
        posts.last().map(|post| post.id)
    } else {
        None
    };
    Ok(Json(DocumentPage {
        documents: posts.into_iter().map(PostResponse::new).collect(),
        next_cursor,
    }))
}

pub async fn search_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Query(SearchParams { search_term }): Query<SearchParams>,
) -> JsonResult<DocumentList<PostResponse>> {
    let posts = search_posts_in_db(&pool, search_term.trim()).await?;
    Ok(Json(into_list(posts)))
}

pub async fn update_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> JsonResult<PostJson> {
    let existing = get_post_by_id_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))?;
    if existing.creator_id != user.id {
        return Err(RequestError::Forbidden);
    }

    let mut form = FormFields::read(multipart).await?;
    let caption = form.get("caption").unwrap_or_default().trim().to_owned();
    let location = form.optional("location");
    let tags = parse_tags(form.get("tags"));

    let staged = stage_image(&pool, &storage, user.id, form.take_file()).await?;
    let (image_url, image_id) = match &staged {
        Some(file) => (storage.preview_url(&file.id), file.id.clone()),
        None => (existing.image_url.clone(), existing.image_id.clone()),
    };

    let outcome = update_post_in_db(
        &pool,
        id,
        PostChanges {
            caption: &caption,
            image_url: &image_url,
            image_id: &image_id,
            location: location.as_deref(),
            tags,
        },
    )
    .await;
    let post = settle_image(
        &pool,
        &storage,
        staged.as_ref(),
        Some(existing.image_id.as_str()),
        outcome,
    )
    .await?;
    info!("User {} updated post {}", user.id, post.id);
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

/// The creator or an admin may delete. The document goes first, then the file.
pub async fn delete_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<StatusWrapper> {
    let post = get_post_by_id_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))?;
    if post.creator_id != user.id && !is_admin(&pool, user.id).await? {
        return Err(RequestError::Forbidden);
    }
    delete_post_in_db(&pool, id).await?;
    delete_file_best_effort(&pool, &storage, &post.image_id).await;
    info!("User {} deleted post {}", user.id, id);
    Ok(Json(StatusWrapper::ok()))
}

pub async fn like_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Path(id): Path<i64>,
    Json(LikesRequest { likes }): Json<LikesRequest>,
) -> JsonResult<PostJson> {
    let post = set_post_likes_in_db(&pool, id, likes).await?;
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

pub async fn save_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<SaveWrapper<SavedPostResponse>>), RequestError> {
    let save = insert_save_in_db(&pool, user.id, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaveWrapper {
            save: save.into(),
        }),
    ))
}

pub async fn delete_saved_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<StatusWrapper> {
    let save = get_save_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Saved post not found"))?;
    if save.user_id != user.id {
        return Err(RequestError::Forbidden);
    }
    delete_save_in_db(&pool, id).await?;
    Ok(Json(StatusWrapper::ok()))
}
