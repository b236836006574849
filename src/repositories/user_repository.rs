use crate::entities::{UserRole, user_entity as user};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(user_id).one(db).await
    }

    /// `email` must already be normalized.
    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<user::Model, DbErr> {
        let now = Utc::now();
        user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn set_role<C: ConnectionTrait>(
        db: &C,
        model: user::Model,
        role: UserRole,
    ) -> Result<user::Model, DbErr> {
        let mut am: user::ActiveModel = model.into();
        am.role = Set(role);
        am.updated_at = Set(Utc::now());
        am.update(db).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
        let result = user::Entity::delete_by_id(user_id).exec(db).await?;
        Ok(result.rows_affected)
    }
}
