//! This file serves as the root for all SeaORM entity modules.
//! Every catalog entity (tag, ingredient, recipe) carries a `user_id`
//! foreign key and is only ever queried scoped to its owner.

pub mod auth_token;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod recipe_tag;
pub mod tag;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::auth_token::Entity as AuthToken;
    pub use super::ingredient::Entity as Ingredient;
    pub use super::recipe::Entity as Recipe;
    pub use super::recipe_ingredient::Entity as RecipeIngredient;
    pub use super::recipe_tag::Entity as RecipeTag;
    pub use super::tag::Entity as Tag;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use crate::accounts::create_user;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn sample_recipe(db: &DatabaseConnection, user_id: i32) -> recipe::Model {
        recipe::ActiveModel {
            title: Set("Pork burguer".to_string()),
            time_minutes: Set(5),
            price: Set(Decimal::new(1150, 2)),
            link: Set(None),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_ingredient_str() {
        let db = setup_db().await.unwrap();
        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        let ingredient = ingredient::ActiveModel {
            name: Set("Cucumber".to_string()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert_eq!(ingredient.to_string(), ingredient.name);
    }

    #[tokio::test]
    async fn test_recipe_str() {
        let db = setup_db().await.unwrap();
        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        let recipe = sample_recipe(&db, user.id).await;

        assert_eq!(recipe.to_string(), recipe.title);
        assert_eq!(recipe.price, Decimal::new(1150, 2));
    }

    #[tokio::test]
    async fn test_recipe_links_tags_and_ingredients() {
        let db = setup_db().await.unwrap();
        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();
        let recipe = sample_recipe(&db, user.id).await;

        let tag = tag::ActiveModel {
            name: Set("Dinner".to_string()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let ingredient = ingredient::ActiveModel {
            name: Set("Pork".to_string()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        recipe_tag::ActiveModel {
            recipe_id: Set(recipe.id),
            tag_id: Set(tag.id),
        }
        .insert(&db)
        .await
        .unwrap();
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            ingredient_id: Set(ingredient.id),
        }
        .insert(&db)
        .await
        .unwrap();

        let tags = recipe.find_related(Tag).all(&db).await.unwrap();
        assert_eq!(tags, vec![tag.clone()]);
        let ingredients = recipe.find_related(Ingredient).all(&db).await.unwrap();
        assert_eq!(ingredients, vec![ingredient]);

        let recipes_for_tag = tag.find_related(Recipe).all(&db).await.unwrap();
        assert_eq!(recipes_for_tag.len(), 1);
        assert_eq!(recipes_for_tag[0].id, recipe.id);

        let tag_links = RecipeTag::find()
            .find_also_related(Tag)
            .all(&db)
            .await
            .unwrap();
        assert_eq!(tag_links.len(), 1);
        assert_eq!(tag_links[0].1.as_ref().map(|t| t.id), Some(tag.id));

        let ingredient_links = RecipeIngredient::find()
            .find_also_related(Recipe)
            .all(&db)
            .await
            .unwrap();
        assert_eq!(ingredient_links.len(), 1);
        assert_eq!(ingredient_links[0].1.as_ref().map(|r| r.id), Some(recipe.id));
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_owned_rows() {
        let db = setup_db().await.unwrap();
        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();
        let recipe = sample_recipe(&db, user.id).await;

        User::delete_by_id(user.id).exec(&db).await.unwrap();

        let remaining = Recipe::find()
            .filter(recipe::Column::Id.eq(recipe.id))
            .all(&db)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
