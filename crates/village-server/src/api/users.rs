use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error::{ApiError, ErrorResponse, MessageResponse};
use super::music::TrackResponse;
use village_db::catalog::users::{self as catalog, NewUser, UserChanges, UserWithMusic};
use village_db::entities::user;
use village_db::AppState;
use village_media::{ImageKind, StorageBackend};

/// Prefix under which stored images are served and persisted.
pub const UPLOADS_PREFIX: &str = "uploads";

/// User fields without their music, as embedded in a music record.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArtistResponse {
    pub wallet_address: String,
    pub username: String,
    /// Path of the profile image, e.g. `uploads/profiles/me_<hex>.png`
    pub profile: Option<String>,
    pub background: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for ArtistResponse {
    fn from(u: user::Model) -> Self {
        Self {
            wallet_address: u.wallet_address,
            username: u.username,
            profile: u.profile,
            background: u.background,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: ArtistResponse,
    /// Every track the user owns, newest release first
    pub music: Vec<TrackResponse>,
}

impl From<UserWithMusic> for UserResponse {
    fn from(u: UserWithMusic) -> Self {
        Self {
            user: ArtistResponse::from(u.user),
            music: u.music.into_iter().map(TrackResponse::from).collect(),
        }
    }
}

/// Multipart body of `POST /users`. Only used for the API docs.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CreateUserForm {
    #[schema(example = "0x1234567890abcdef")]
    wallet_address: String,
    #[schema(example = "artist1")]
    username: String,
    #[schema(value_type = Option<String>, format = Binary)]
    profile: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    background: Option<Vec<u8>>,
}

/// Multipart body of `PUT /users/{wallet_address}`. Only used for the API docs.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UpdateUserForm {
    username: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    profile: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    background: Option<Vec<u8>>,
}

// ─── Multipart handling ────────────────────────────────────────────

struct UploadedImage {
    file_name: String,
    data: Vec<u8>,
}

/// Raw multipart fields, read fully before anything touches storage.
#[derive(Default)]
struct UserForm {
    wallet_address: Option<String>,
    username: Option<String>,
    profile: Option<UploadedImage>,
    background: Option<UploadedImage>,
}

impl UserForm {
    fn image_slot(&mut self, kind: ImageKind) -> &mut Option<UploadedImage> {
        match kind {
            ImageKind::Profile => &mut self.profile,
            ImageKind::Background => &mut self.background,
        }
    }
}

async fn read_user_form(multipart: &mut Multipart) -> Result<UserForm, ApiError> {
    let mut form = UserForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if let Some(kind) = ImageKind::from_field(&name) {
            let file_name = field.file_name().unwrap_or(kind.field_name()).to_string();
            let data = field.bytes().await?;
            // Browsers send an empty part when no file was picked
            if data.is_empty() {
                continue;
            }
            let slot = form.image_slot(kind);
            if slot.is_some() {
                return Err(ApiError::BadRequest(format!(
                    "only one file is allowed in the '{kind}' field"
                )));
            }
            *slot = Some(UploadedImage {
                file_name,
                data: data.to_vec(),
            });
            continue;
        }

        match name.as_str() {
            "wallet_address" => form.wallet_address = Some(field.text().await?),
            "username" => form.username = Some(field.text().await?),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Images written to storage during one request, removed again if the
/// request fails before they are recorded.
#[derive(Default)]
struct StoredImages {
    profile: Option<String>,
    background: Option<String>,
}

impl StoredImages {
    fn paths(&self) -> impl Iterator<Item = &str> {
        self.profile
            .as_deref()
            .into_iter()
            .chain(self.background.as_deref())
    }

    async fn discard(&self, storage: &dyn StorageBackend) {
        for path in self.paths() {
            remove_stored(storage, path).await;
        }
    }
}

async fn store_images(
    storage: &dyn StorageBackend,
    form: &mut UserForm,
) -> Result<StoredImages, ApiError> {
    let mut stored = StoredImages::default();

    for kind in [ImageKind::Profile, ImageKind::Background] {
        let Some(upload) = form.image_slot(kind).take() else {
            continue;
        };
        match storage
            .store_image(kind, &upload.file_name, &upload.data)
            .await
        {
            Ok(relative) => {
                let path = format!("{UPLOADS_PREFIX}/{relative}");
                match kind {
                    ImageKind::Profile => stored.profile = Some(path),
                    ImageKind::Background => stored.background = Some(path),
                }
            }
            Err(e) => {
                stored.discard(storage).await;
                return Err(e.into());
            }
        }
    }

    Ok(stored)
}

/// Deletes a persisted `uploads/...` path from storage. Failures are logged
/// and otherwise ignored; the database is already the source of truth.
async fn remove_stored(storage: &dyn StorageBackend, stored_path: &str) {
    let Some(relative) = stored_path.strip_prefix(&format!("{UPLOADS_PREFIX}/")) else {
        tracing::warn!(path = stored_path, "not a managed upload path, leaving it alone");
        return;
    };
    if let Err(e) = storage.delete_file(relative).await {
        tracing::warn!(path = stored_path, "failed to remove image: {e}");
    }
}

// ─── Handlers ──────────────────────────────────────────────────────

/// POST /users
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body(content = CreateUserForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Missing field or invalid image", body = ErrorResponse),
        (status = 409, description = "Wallet address already registered", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let mut form = read_user_form(&mut multipart).await?;
    let storage = state.storage.as_ref();
    let stored = store_images(storage, &mut form).await?;

    let input = NewUser {
        wallet_address: form.wallet_address.unwrap_or_default(),
        username: form.username.unwrap_or_default(),
        profile: stored.profile.clone(),
        background: stored.background.clone(),
    };

    match catalog::create(&state.db, input).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created.into()))),
        Err(e) => {
            stored.discard(storage).await;
            Err(e.into())
        }
    }
}

/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses((status = 200, description = "All users with their music", body = [UserResponse]))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = catalog::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:wallet_address
#[utoipa::path(
    get,
    path = "/users/{wallet_address}",
    tag = "users",
    params(("wallet_address" = String, Path, description = "User wallet address")),
    responses(
        (status = 200, description = "The user with their music", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(catalog::get_by_wallet(&state.db, &wallet_address).await?.into()))
}

/// PUT /users/:wallet_address
///
/// Fields left out of the form keep their stored value. A replaced image is
/// removed from storage once the new one is recorded.
#[utoipa::path(
    put,
    path = "/users/{wallet_address}",
    tag = "users",
    params(("wallet_address" = String, Path, description = "User wallet address")),
    request_body(content = UpdateUserForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid field or image", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let mut form = read_user_form(&mut multipart).await?;

    // Fail before writing any file when the user does not exist
    let previous = catalog::get_by_wallet(&state.db, &wallet_address).await?.user;

    let storage = state.storage.as_ref();
    let stored = store_images(storage, &mut form).await?;

    let changes = UserChanges {
        username: form.username,
        profile: stored.profile.clone(),
        background: stored.background.clone(),
    };

    let updated = match catalog::update(&state.db, &wallet_address, changes).await {
        Ok(updated) => updated,
        Err(e) => {
            stored.discard(storage).await;
            return Err(e.into());
        }
    };

    let replaced = [
        (previous.profile, &updated.user.profile),
        (previous.background, &updated.user.background),
    ];
    for (old, current) in replaced {
        if let Some(old) = old {
            if current.as_deref() != Some(old.as_str()) {
                remove_stored(storage, &old).await;
            }
        }
    }

    Ok(Json(updated.into()))
}

/// DELETE /users/:wallet_address
///
/// Deletes the user, every track they own and their stored images.
#[utoipa::path(
    delete,
    path = "/users/{wallet_address}",
    tag = "users",
    params(("wallet_address" = String, Path, description = "User wallet address")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = catalog::delete(&state.db, &wallet_address).await?;

    for path in deleted.record.image_paths() {
        remove_stored(state.storage.as_ref(), path).await;
    }

    Ok(Json(MessageResponse {
        message: deleted.message.to_string(),
    }))
}
