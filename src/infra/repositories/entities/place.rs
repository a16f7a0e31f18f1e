//! Place database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Coordinates, Place};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub image: String,
    /// Owning user id; denormalized, no foreign key
    pub creator: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Place {
    fn from(model: Model) -> Self {
        Place {
            id: model.id,
            title: model.title,
            description: model.description,
            address: model.address,
            location: Coordinates {
                lat: model.lat,
                lon: model.lon,
            },
            image: model.image,
            creator: model.creator,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
