use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::cache::keys;
use crate::domain::Video;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::bearer_header;

#[derive(Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub description: String,
    pub play_url: String,
    pub cover_url: String,
}

pub async fn publish(state: web::Data<AppState>, req: HttpRequest, body: web::Json<PublishRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    if body.title.trim().is_empty() || body.play_url.trim().is_empty() {
        return Err(AppError::Validation("title and play_url are required".into()));
    }
    let account = state
        .accounts
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::Internal("authenticated account vanished".into()))?;
    let video = state
        .videos
        .create(
            account_id,
            &account.username,
            &body.title,
            &body.description,
            &body.play_url,
            &body.cover_url,
        )
        .await?;
    Ok(HttpResponse::Ok().json(video))
}

#[derive(Deserialize)]
pub struct GetDetailRequest {
    pub id: i64,
}

/// Cache-aside-with-lease over `video:detail:id={id}`, TTL 5m, using the
/// same protocol and the longer 2s lease TTL as the feed endpoints
/// (a video detail query is costlier than a feed page).
pub async fn get_detail(state: web::Data<AppState>, body: web::Json<GetDetailRequest>) -> AppResult<HttpResponse> {
    if body.id <= 0 {
        return Err(AppError::Validation("id must be positive".into()));
    }
    let key = keys::video_detail(body.id);

    let videos = state.videos.clone();
    let video: Video = state
        .cache
        .cache_aside(&key, keys::VIDEO_DETAIL_TTL, keys::VIDEO_DETAIL_LEASE_TTL, || {
            let videos = videos.clone();
            async move {
                videos
                    .find_by_id(body.id)
                    .await?
                    .ok_or_else(|| AppError::Validation("video not found".into()))
            }
        })
        .await?;

    Ok(HttpResponse::Ok().json(video))
}

#[derive(Deserialize)]
pub struct ListByAuthorIdRequest {
    pub author_id: i64,
}

pub async fn list_by_author_id(state: web::Data<AppState>, body: web::Json<ListByAuthorIdRequest>) -> AppResult<HttpResponse> {
    let videos = state.videos.list_by_author(body.author_id).await?;
    Ok(HttpResponse::Ok().json(videos))
}
