use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::error::{ApiError, ErrorResponse, MessageResponse};
use super::users::ArtistResponse;
use village_db::catalog::music::{self as catalog, MusicChanges, MusicWithArtist, NewMusic};
use village_db::entities::music;
use village_db::AppState;

/// Track fields without the joined artist.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResponse {
    pub music_id: Uuid,
    pub title: String,
    pub album: String,
    pub release_date: NaiveDate,
    pub genre: String,
    /// Length in seconds
    pub duration: i32,
    pub mp3_cid: String,
    pub cover_image_cid: String,
    pub wallet_address: String,
    pub token_address: String,
    pub pool_address: String,
    pub play_count: i32,
    pub likes: i32,
}

impl From<music::Model> for TrackResponse {
    fn from(m: music::Model) -> Self {
        Self {
            music_id: m.music_id,
            title: m.title,
            album: m.album,
            release_date: m.release_date,
            genre: m.genre,
            duration: m.duration,
            mp3_cid: m.mp3_cid,
            cover_image_cid: m.cover_image_cid,
            wallet_address: m.wallet_address,
            token_address: m.token_address,
            pool_address: m.pool_address,
            play_count: m.play_count,
            likes: m.likes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MusicResponse {
    #[serde(flatten)]
    pub track: TrackResponse,
    /// Owning artist
    pub artist: Option<ArtistResponse>,
}

impl From<MusicWithArtist> for MusicResponse {
    fn from(m: MusicWithArtist) -> Self {
        Self {
            track: TrackResponse::from(m.music),
            artist: m.artist.map(ArtistResponse::from),
        }
    }
}

fn to_responses(rows: Vec<MusicWithArtist>) -> Vec<MusicResponse> {
    rows.into_iter().map(MusicResponse::from).collect()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMusicRequest {
    #[schema(example = "Bohemian Rhapsody")]
    pub title: String,
    #[schema(example = "A Night at the Opera")]
    pub album: String,
    /// YYYY-MM-DD
    #[schema(example = "2024-01-01")]
    pub release_date: NaiveDate,
    #[schema(example = "Rock")]
    pub genre: String,
    #[schema(example = 354)]
    pub duration: i32,
    pub mp3_cid: String,
    pub cover_image_cid: String,
    #[schema(example = "0x1234567890abcdef")]
    pub wallet_address: String,
    pub token_address: String,
    pub pool_address: String,
}

impl From<CreateMusicRequest> for NewMusic {
    fn from(r: CreateMusicRequest) -> Self {
        Self {
            title: r.title,
            album: r.album,
            release_date: r.release_date,
            genre: r.genre,
            duration: r.duration,
            mp3_cid: r.mp3_cid,
            cover_image_cid: r.cover_image_cid,
            wallet_address: r.wallet_address,
            token_address: r.token_address,
            pool_address: r.pool_address,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMusicRequest {
    pub title: Option<String>,
    pub album: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub duration: Option<i32>,
    pub mp3_cid: Option<String>,
    pub cover_image_cid: Option<String>,
    pub token_address: Option<String>,
    pub pool_address: Option<String>,
}

impl From<UpdateMusicRequest> for MusicChanges {
    fn from(r: UpdateMusicRequest) -> Self {
        Self {
            title: r.title,
            album: r.album,
            release_date: r.release_date,
            genre: r.genre,
            duration: r.duration,
            mp3_cid: r.mp3_cid,
            cover_image_cid: r.cover_image_cid,
            token_address: r.token_address,
            pool_address: r.pool_address,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Matched against title, album and artist username
    pub q: Option<String>,
}

/// POST /music
#[utoipa::path(
    post,
    path = "/music",
    tag = "music",
    request_body = CreateMusicRequest,
    responses(
        (status = 201, description = "Music created", body = MusicResponse),
        (status = 400, description = "Invalid request or unknown artist", body = ErrorResponse)
    )
)]
pub async fn create_music(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateMusicRequest>,
) -> Result<(StatusCode, Json<MusicResponse>), ApiError> {
    let created = catalog::create(&state.db, body.into()).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /music
#[utoipa::path(
    get,
    path = "/music",
    tag = "music",
    responses((status = 200, description = "All music, newest release first", body = [MusicResponse]))
)]
pub async fn list_music(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MusicResponse>>, ApiError> {
    Ok(Json(to_responses(catalog::list(&state.db).await?)))
}

/// GET /music/search?q=...
#[utoipa::path(
    get,
    path = "/music/search",
    tag = "music",
    params(SearchParams),
    responses((status = 200, description = "Matching music, newest release first", body = [MusicResponse]))
)]
pub async fn search_music(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MusicResponse>>, ApiError> {
    let rows = catalog::search(&state.db, params.q.as_deref()).await?;
    Ok(Json(to_responses(rows)))
}

/// GET /music/artist/:wallet_address
#[utoipa::path(
    get,
    path = "/music/artist/{wallet_address}",
    tag = "music",
    params(("wallet_address" = String, Path, description = "Artist wallet address")),
    responses((status = 200, description = "The artist's music, newest release first", body = [MusicResponse]))
)]
pub async fn list_by_artist(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> Result<Json<Vec<MusicResponse>>, ApiError> {
    let rows = catalog::list_by_artist(&state.db, &wallet_address).await?;
    Ok(Json(to_responses(rows)))
}

/// GET /music/genre/:genre
#[utoipa::path(
    get,
    path = "/music/genre/{genre}",
    tag = "music",
    params(("genre" = String, Path, description = "Exact genre name")),
    responses((status = 200, description = "Music in the genre, newest release first", body = [MusicResponse]))
)]
pub async fn list_by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre): Path<String>,
) -> Result<Json<Vec<MusicResponse>>, ApiError> {
    let rows = catalog::list_by_genre(&state.db, &genre).await?;
    Ok(Json(to_responses(rows)))
}

/// GET /music/:music_id
#[utoipa::path(
    get,
    path = "/music/{music_id}",
    tag = "music",
    params(("music_id" = String, Path, description = "Music identifier (UUID)")),
    responses(
        (status = 200, description = "The music record", body = MusicResponse),
        (status = 404, description = "Music not found", body = ErrorResponse)
    )
)]
pub async fn get_music(
    State(state): State<Arc<AppState>>,
    Path(music_id): Path<String>,
) -> Result<Json<MusicResponse>, ApiError> {
    Ok(Json(catalog::get_by_id(&state.db, &music_id).await?.into()))
}

/// PUT /music/:music_id
#[utoipa::path(
    put,
    path = "/music/{music_id}",
    tag = "music",
    params(("music_id" = String, Path, description = "Music identifier (UUID)")),
    request_body = UpdateMusicRequest,
    responses(
        (status = 200, description = "Updated music record", body = MusicResponse),
        (status = 400, description = "Invalid field value", body = ErrorResponse),
        (status = 404, description = "Music not found", body = ErrorResponse)
    )
)]
pub async fn update_music(
    State(state): State<Arc<AppState>>,
    Path(music_id): Path<String>,
    Json(body): Json<UpdateMusicRequest>,
) -> Result<Json<MusicResponse>, ApiError> {
    let updated = catalog::update(&state.db, &music_id, body.into()).await?;
    Ok(Json(updated.into()))
}

/// DELETE /music/:music_id
#[utoipa::path(
    delete,
    path = "/music/{music_id}",
    tag = "music",
    params(("music_id" = String, Path, description = "Music identifier (UUID)")),
    responses(
        (status = 200, description = "Music deleted", body = MessageResponse),
        (status = 404, description = "Music not found", body = ErrorResponse)
    )
)]
pub async fn delete_music(
    State(state): State<Arc<AppState>>,
    Path(music_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = catalog::delete(&state.db, &music_id).await?;
    Ok(Json(MessageResponse {
        message: deleted.message.to_string(),
    }))
}
