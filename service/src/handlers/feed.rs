use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::bearer_header;

const MAX_LIMIT: i64 = 50;

fn validate_limit(limit: i64) -> AppResult<()> {
    if limit <= 0 || limit > MAX_LIMIT {
        return Err(AppError::Validation(format!("limit must be in 1..={MAX_LIMIT}")));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct ListLatestRequest {
    pub limit: i64,
    pub latest_time: i64,
}

pub async fn list_latest(state: web::Data<AppState>, req: HttpRequest, body: web::Json<ListLatestRequest>) -> AppResult<HttpResponse> {
    validate_limit(body.limit)?;
    let viewer = state.auth.authenticate_soft(bearer_header(&req)).await?;
    let page = state.feed.list_latest(body.limit, body.latest_time, viewer).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[derive(Deserialize)]
pub struct ListLikesCountRequest {
    pub limit: i64,
    pub likes_count_before: Option<i64>,
    pub id_before: Option<i64>,
}

pub async fn list_likes_count(state: web::Data<AppState>, req: HttpRequest, body: web::Json<ListLikesCountRequest>) -> AppResult<HttpResponse> {
    validate_limit(body.limit)?;
    let viewer = state.auth.authenticate_soft(bearer_header(&req)).await?;
    let page = state
        .feed
        .list_by_likes(body.limit, body.likes_count_before, body.id_before, viewer)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[derive(Deserialize)]
pub struct ListByPopularityRequest {
    pub limit: i64,
    pub as_of: i64,
    pub offset: i64,
    pub popularity_before: Option<i64>,
    pub create_time_before: Option<i64>,
    pub id_before: Option<i64>,
}

pub async fn list_by_popularity(state: web::Data<AppState>, req: HttpRequest, body: web::Json<ListByPopularityRequest>) -> AppResult<HttpResponse> {
    validate_limit(body.limit)?;
    if body.offset < 0 {
        return Err(AppError::Validation("offset must be non-negative".into()));
    }
    let viewer = state.auth.authenticate_soft(bearer_header(&req)).await?;
    let page = state
        .feed
        .list_by_popularity(
            body.limit,
            body.as_of,
            body.offset,
            (body.popularity_before, body.create_time_before, body.id_before),
            viewer,
        )
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[derive(Deserialize)]
pub struct ListByFollowingRequest {
    pub limit: i64,
    pub latest_time: i64,
}

pub async fn list_by_following(state: web::Data<AppState>, req: HttpRequest, body: web::Json<ListByFollowingRequest>) -> AppResult<HttpResponse> {
    validate_limit(body.limit)?;
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    let page = state.feed.list_by_following(body.limit, body.latest_time, account_id).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_limit() {
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(-1).is_err());
    }

    #[test]
    fn rejects_limit_above_max() {
        assert!(validate_limit(MAX_LIMIT + 1).is_err());
    }

    #[test]
    fn accepts_limit_within_bounds() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(MAX_LIMIT).is_ok());
    }
}
