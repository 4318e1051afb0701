use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Music::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Music::MusicId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Music::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Music::Album).string_len(255).not_null())
                    .col(ColumnDef::new(Music::ReleaseDate).date().not_null())
                    .col(ColumnDef::new(Music::Genre).string_len(128).not_null())
                    .col(ColumnDef::new(Music::Duration).integer().not_null())
                    .col(ColumnDef::new(Music::Mp3Cid).string_len(255).not_null())
                    .col(ColumnDef::new(Music::CoverImageCid).string_len(255).not_null())
                    .col(ColumnDef::new(Music::WalletAddress).string_len(128).not_null())
                    .col(ColumnDef::new(Music::TokenAddress).string_len(128).not_null())
                    .col(ColumnDef::new(Music::PoolAddress).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Music::PlayCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Music::Likes).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_music_wallet_address")
                            .from(Music::Table, Music::WalletAddress)
                            .to(Users::Table, Users::WalletAddress)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_music_wallet_address")
                    .table(Music::Table)
                    .col(Music::WalletAddress)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_music_genre")
                    .table(Music::Table)
                    .col(Music::Genre)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_music_release_date")
                    .table(Music::Table)
                    .col(Music::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Music::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Music {
    Table,
    MusicId,
    Title,
    Album,
    ReleaseDate,
    Genre,
    Duration,
    Mp3Cid,
    CoverImageCid,
    WalletAddress,
    TokenAddress,
    PoolAddress,
    PlayCount,
    Likes,
}
