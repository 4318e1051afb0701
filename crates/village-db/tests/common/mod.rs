// Shared test utilities for catalog integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use village_db::catalog::music::{self, MusicWithArtist, NewMusic};
use village_db::catalog::users::{self, NewUser, UserWithMusic};
use village_migration::{Migrator, MigratorTrait};

/// Fresh in-memory SQLite database with the real migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub async fn register(db: &DatabaseConnection, wallet: &str, username: &str) -> UserWithMusic {
    users::create(
        db,
        NewUser {
            wallet_address: wallet.into(),
            username: username.into(),
            profile: None,
            background: None,
        },
    )
    .await
    .unwrap()
}

pub fn new_music(wallet: &str, title: &str, album: &str, genre: &str, released: &str) -> NewMusic {
    NewMusic {
        title: title.into(),
        album: album.into(),
        release_date: date(released),
        genre: genre.into(),
        duration: 180,
        mp3_cid: "Qm1".into(),
        cover_image_cid: "Qm2".into(),
        wallet_address: wallet.into(),
        token_address: "0xT".into(),
        pool_address: "0xP".into(),
    }
}

pub async fn publish(
    db: &DatabaseConnection,
    wallet: &str,
    title: &str,
    album: &str,
    genre: &str,
    released: &str,
) -> MusicWithArtist {
    music::create(db, new_music(wallet, title, album, genre, released))
        .await
        .unwrap()
}

pub fn titles(rows: &[MusicWithArtist]) -> Vec<&str> {
    rows.iter().map(|r| r.music.title.as_str()).collect()
}
