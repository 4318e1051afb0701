use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::{require_non_blank, CatalogError, CatalogResult, Deleted};
use crate::entities::{music, user};

/// Escape character for LIKE patterns. Chosen so it needs no quoting in any backend.
const LIKE_ESCAPE: char = '!';

#[derive(Debug, Clone)]
pub struct NewMusic {
    pub title: String,
    pub album: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub duration: i32,
    pub mp3_cid: String,
    pub cover_image_cid: String,
    pub wallet_address: String,
    pub token_address: String,
    pub pool_address: String,
}

/// Partial update. `None` leaves the stored value untouched; the owner and
/// identifier of a track cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct MusicChanges {
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

#[derive(Debug, Clone)]
pub struct MusicWithArtist {
    pub music: music::Model,
    pub artist: Option<user::Model>,
}

impl From<(music::Model, Option<user::Model>)> for MusicWithArtist {
    fn from((music, artist): (music::Model, Option<user::Model>)) -> Self {
        Self { music, artist }
    }
}

fn not_found() -> CatalogError {
    CatalogError::NotFound("music not found".to_string())
}

fn require_duration(duration: i32) -> CatalogResult<()> {
    if duration < 0 {
        return Err(CatalogError::Validation(
            "duration must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Runs a music query with the artist joined in, newest release first.
async fn fetch_with_artist(
    db: &DatabaseConnection,
    query: Select<music::Entity>,
) -> CatalogResult<Vec<MusicWithArtist>> {
    let rows = query
        .find_also_related(user::Entity)
        .order_by_desc(music::Column::ReleaseDate)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(MusicWithArtist::from).collect())
}

pub async fn create(db: &DatabaseConnection, input: NewMusic) -> CatalogResult<MusicWithArtist> {
    require_non_blank("title", &input.title)?;
    require_non_blank("wallet_address", &input.wallet_address)?;
    require_duration(input.duration)?;

    let artist = user::Entity::find_by_id(input.wallet_address.clone())
        .one(db)
        .await?
        .ok_or_else(|| {
            CatalogError::Validation(format!(
                "no user registered with wallet address {}",
                input.wallet_address
            ))
        })?;

    let model = music::ActiveModel {
        music_id: Set(Uuid::new_v4()),
        title: Set(input.title),
        album: Set(input.album),
        release_date: Set(input.release_date),
        genre: Set(input.genre),
        duration: Set(input.duration),
        mp3_cid: Set(input.mp3_cid),
        cover_image_cid: Set(input.cover_image_cid),
        wallet_address: Set(input.wallet_address),
        token_address: Set(input.token_address),
        pool_address: Set(input.pool_address),
        play_count: Set(0),
        likes: Set(0),
    };
    let created = model.insert(db).await?;

    tracing::info!(music_id = %created.music_id, wallet_address = %created.wallet_address, "music created");

    Ok(MusicWithArtist {
        music: created,
        artist: Some(artist),
    })
}

pub async fn list(db: &DatabaseConnection) -> CatalogResult<Vec<MusicWithArtist>> {
    fetch_with_artist(db, music::Entity::find()).await
}

/// Identifiers that are not valid UUIDs cannot exist, so they are reported
/// as not found rather than as malformed input.
pub async fn get_by_id(db: &DatabaseConnection, music_id: &str) -> CatalogResult<MusicWithArtist> {
    let id = Uuid::parse_str(music_id).map_err(|_| not_found())?;

    music::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await?
        .map(MusicWithArtist::from)
        .ok_or_else(not_found)
}

pub async fn list_by_artist(
    db: &DatabaseConnection,
    wallet_address: &str,
) -> CatalogResult<Vec<MusicWithArtist>> {
    fetch_with_artist(
        db,
        music::Entity::find().filter(music::Column::WalletAddress.eq(wallet_address)),
    )
    .await
}

pub async fn list_by_genre(
    db: &DatabaseConnection,
    genre: &str,
) -> CatalogResult<Vec<MusicWithArtist>> {
    fetch_with_artist(db, music::Entity::find().filter(music::Column::Genre.eq(genre))).await
}

pub async fn update(
    db: &DatabaseConnection,
    music_id: &str,
    changes: MusicChanges,
) -> CatalogResult<MusicWithArtist> {
    let existing = get_by_id(db, music_id).await?;

    let mut active: music::ActiveModel = existing.music.clone().into();
    if let Some(title) = changes.title {
        require_non_blank("title", &title)?;
        active.title = Set(title);
    }
    if let Some(album) = changes.album {
        active.album = Set(album);
    }
    if let Some(release_date) = changes.release_date {
        active.release_date = Set(release_date);
    }
    if let Some(genre) = changes.genre {
        active.genre = Set(genre);
    }
    if let Some(duration) = changes.duration {
        require_duration(duration)?;
        active.duration = Set(duration);
    }
    if let Some(mp3_cid) = changes.mp3_cid {
        active.mp3_cid = Set(mp3_cid);
    }
    if let Some(cover_image_cid) = changes.cover_image_cid {
        active.cover_image_cid = Set(cover_image_cid);
    }
    if let Some(token_address) = changes.token_address {
        active.token_address = Set(token_address);
    }
    if let Some(pool_address) = changes.pool_address {
        active.pool_address = Set(pool_address);
    }

    if !active.is_changed() {
        return Ok(existing);
    }

    let updated = active.update(db).await?;
    Ok(MusicWithArtist {
        music: updated,
        artist: existing.artist,
    })
}

pub async fn delete(
    db: &DatabaseConnection,
    music_id: &str,
) -> CatalogResult<Deleted<music::Model>> {
    let existing = get_by_id(db, music_id).await?;

    music::Entity::delete_by_id(existing.music.music_id)
        .exec(db)
        .await?;

    tracing::info!(music_id, "music deleted");

    Ok(Deleted {
        message: "music deleted",
        record: existing.music,
    })
}

/// Case-insensitive substring search over title, album and artist username.
///
/// A blank or missing term yields no results without touching the database.
pub async fn search(
    db: &DatabaseConnection,
    term: Option<&str>,
) -> CatalogResult<Vec<MusicWithArtist>> {
    let term = match term.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(Vec::new()),
    };

    // SQL LOWER folds every letter on Postgres but only ASCII on SQLite, so
    // non-ASCII terms match case-insensitively on Postgres alone.
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    let contains = |col: Expr| {
        Expr::expr(Func::lower(col)).like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE))
    };

    let condition = Condition::any()
        .add(contains(Expr::col((music::Entity, music::Column::Title))))
        .add(contains(Expr::col((music::Entity, music::Column::Album))))
        .add(contains(Expr::col((user::Entity, user::Column::Username))));

    fetch_with_artist(db, music::Entity::find().filter(condition)).await
}

/// SECURITY: escape LIKE wildcards so user input only ever matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
