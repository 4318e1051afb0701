use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Externally issued wallet address, also the artist identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_address: String,
    pub username: String,
    /// Stored path of the profile image, if one was uploaded
    pub profile: Option<String>,
    /// Stored path of the background image, if one was uploaded
    pub background: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::music::Entity")]
    Music,
}

impl Related<super::music::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Music.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored image paths owned by this user.
    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.profile
            .as_deref()
            .into_iter()
            .chain(self.background.as_deref())
    }
}
