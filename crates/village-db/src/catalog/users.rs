use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionError, TransactionTrait,
};

use super::{require_non_blank, CatalogError, CatalogResult, Deleted};
use crate::entities::{music, user};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub wallet_address: String,
    pub username: String,
    pub profile: Option<String>,
    pub background: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub profile: Option<String>,
    pub background: Option<String>,
}

/// A user together with every track they own, newest release first.
#[derive(Debug, Clone)]
pub struct UserWithMusic {
    pub user: user::Model,
    pub music: Vec<music::Model>,
}

fn conflict(wallet_address: &str) -> CatalogError {
    CatalogError::Conflict(format!(
        "wallet address {wallet_address} is already registered"
    ))
}

fn newest_first(music: &mut [music::Model]) {
    music.sort_by(|a, b| b.release_date.cmp(&a.release_date));
}

pub async fn create(db: &DatabaseConnection, input: NewUser) -> CatalogResult<UserWithMusic> {
    require_non_blank("wallet_address", &input.wallet_address)?;
    require_non_blank("username", &input.username)?;

    let existing = user::Entity::find_by_id(input.wallet_address.clone())
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(conflict(&input.wallet_address));
    }

    let wallet_address = input.wallet_address.clone();
    let model = user::ActiveModel {
        wallet_address: Set(input.wallet_address),
        username: Set(input.username),
        profile: Set(input.profile),
        background: Set(input.background),
        created_at: Set(Utc::now().fixed_offset()),
    };

    // A concurrent registration can slip in between the lookup and the insert.
    let created = model.insert(db).await.map_err(|e: DbErr| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict(&wallet_address),
        _ => CatalogError::from(e),
    })?;

    tracing::info!(wallet_address = %created.wallet_address, "user registered");

    Ok(UserWithMusic {
        user: created,
        music: Vec::new(),
    })
}

pub async fn list(db: &DatabaseConnection) -> CatalogResult<Vec<UserWithMusic>> {
    let rows = user::Entity::find()
        .find_with_related(music::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(user, mut music)| {
            newest_first(&mut music);
            UserWithMusic { user, music }
        })
        .collect())
}

pub async fn get_by_wallet(
    db: &DatabaseConnection,
    wallet_address: &str,
) -> CatalogResult<UserWithMusic> {
    let user = user::Entity::find_by_id(wallet_address.to_string())
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::NotFound("user not found".to_string()))?;

    let music = user
        .find_related(music::Entity)
        .order_by_desc(music::Column::ReleaseDate)
        .all(db)
        .await?;

    Ok(UserWithMusic { user, music })
}

pub async fn update(
    db: &DatabaseConnection,
    wallet_address: &str,
    changes: UserChanges,
) -> CatalogResult<UserWithMusic> {
    let existing = get_by_wallet(db, wallet_address).await?;

    let mut active: user::ActiveModel = existing.user.clone().into();
    if let Some(username) = changes.username {
        require_non_blank("username", &username)?;
        active.username = Set(username);
    }
    if let Some(profile) = changes.profile {
        active.profile = Set(Some(profile));
    }
    if let Some(background) = changes.background {
        active.background = Set(Some(background));
    }

    if !active.is_changed() {
        return Ok(existing);
    }

    let updated = active.update(db).await?;
    Ok(UserWithMusic {
        user: updated,
        music: existing.music,
    })
}

/// Removes the user and every track they own.
pub async fn delete(
    db: &DatabaseConnection,
    wallet_address: &str,
) -> CatalogResult<Deleted<user::Model>> {
    let existing = get_by_wallet(db, wallet_address).await?;

    // Music and user go together or not at all
    let wallet = wallet_address.to_string();
    db.transaction::<_, (), DbErr>(move |txn| {
        Box::pin(async move {
            music::Entity::delete_many()
                .filter(music::Column::WalletAddress.eq(wallet.as_str()))
                .exec(txn)
                .await?;
            user::Entity::delete_by_id(wallet).exec(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(|e| match e {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => {
            CatalogError::Database(e)
        }
    })?;

    tracing::info!(
        wallet_address,
        tracks = existing.music.len(),
        "user deleted"
    );

    Ok(Deleted {
        message: "user deleted",
        record: existing.user,
    })
}
