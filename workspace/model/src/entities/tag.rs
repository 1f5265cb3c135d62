use sea_orm::entity::prelude::*;
use std::fmt;

/// Represents a tag a user can attach to their recipes (e.g. "Vegan").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// The user who owns this tag.
    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::recipe_tag::Entity")]
    RecipeTag,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        super::recipe_tag::Relation::Recipe.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recipe_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::create_user;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection, Set};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_tag_display_is_name() {
        let db = setup_test_db().await;
        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        let tag = ActiveModel {
            name: Set("Burger".to_string()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert_eq!(tag.to_string(), tag.name);
        assert_eq!(format!("{}", tag), "Burger");
    }

    #[tokio::test]
    async fn test_tags_are_scoped_to_owner() {
        let db = setup_test_db().await;
        let owner = create_user(&db, "owner@mail.com", "testpass123").await.unwrap();
        let other = create_user(&db, "other@mail.com", "testpass456").await.unwrap();

        for (name, user_id) in [("Junk food", owner.id), ("Fruity", other.id)] {
            ActiveModel {
                name: Set(name.to_string()),
                user_id: Set(user_id),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }

        let owned = owner.find_related(Entity).all(&db).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "Junk food");
    }
}
