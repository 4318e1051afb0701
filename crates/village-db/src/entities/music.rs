use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "music")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub music_id: Uuid,
    pub title: String,
    pub album: String,
    pub release_date: Date,
    pub genre: String,
    /// Length in seconds
    pub duration: i32,
    /// IPFS CID of the audio file
    pub mp3_cid: String,
    pub cover_image_cid: String,
    /// Owning artist (users.wallet_address)
    pub wallet_address: String,
    pub token_address: String,
    pub pool_address: String,
    #[sea_orm(default_value = "0")]
    pub play_count: i32,
    #[sea_orm(default_value = "0")]
    pub likes: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::WalletAddress",
        to = "super::user::Column::WalletAddress",
        on_delete = "Cascade"
    )]
    Artist,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
