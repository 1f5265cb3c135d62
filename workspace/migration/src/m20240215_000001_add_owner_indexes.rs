use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{ingredient, recipe, tag};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Every list endpoint filters by owner and sorts by name or id.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_tags_user_name")
                    .table(Tag::table())
                    .col(Tag::column(tag::Column::UserId))
                    .col(Tag::column(tag::Column::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ingredients_user_name")
                    .table(Ingredient::table())
                    .col(Ingredient::column(ingredient::Column::UserId))
                    .col(Ingredient::column(ingredient::Column::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipes_user")
                    .table(Recipe::table())
                    .col(Recipe::column(recipe::Column::UserId))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_recipes_user", Recipe::table()),
            ("idx_ingredients_user_name", Ingredient::table()),
            ("idx_tags_user_name", Tag::table()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}
