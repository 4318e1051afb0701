use utoipa::OpenApi;

use super::error::{ErrorResponse, MessageResponse};
use super::music::{CreateMusicRequest, MusicResponse, TrackResponse, UpdateMusicRequest};
use super::users::{ArtistResponse, CreateUserForm, UpdateUserForm, UserResponse};
use super::{music, users, ApiStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Startup Village API",
        version = "1.0.0",
        description = "Catalog of artists, identified by wallet address, and the music they publish"
    ),
    paths(
        super::healthz,
        music::create_music,
        music::list_music,
        music::search_music,
        music::list_by_artist,
        music::list_by_genre,
        music::get_music,
        music::update_music,
        music::delete_music,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(
        ApiStatus,
        ErrorResponse,
        MessageResponse,
        TrackResponse,
        MusicResponse,
        CreateMusicRequest,
        UpdateMusicRequest,
        ArtistResponse,
        UserResponse,
        CreateUserForm,
        UpdateUserForm,
    )),
    tags(
        (name = "music", description = "Music records"),
        (name = "users", description = "Users and their uploaded images")
    )
)]
pub struct ApiDoc;
