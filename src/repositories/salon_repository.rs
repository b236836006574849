use crate::entities::salon_entity as salon;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

pub struct SalonRepository;

impl SalonRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        salon_id: i32,
    ) -> Result<Option<salon::Model>, DbErr> {
        salon::Entity::find_by_id(salon_id).one(db).await
    }

    /// A salon account owns exactly one salon in practice; the oldest wins
    /// if legacy data has more.
    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> Result<Option<salon::Model>, DbErr> {
        salon::Entity::find()
            .filter(salon::Column::UserId.eq(user_id))
            .order_by_asc(salon::Column::Id)
            .one(db)
            .await
    }

    pub async fn find_by_subscription_id<C: ConnectionTrait>(
        db: &C,
        subscription_id: &str,
    ) -> Result<Option<salon::Model>, DbErr> {
        salon::Entity::find()
            .filter(salon::Column::StripeSubscriptionId.eq(subscription_id))
            .one(db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        model: salon::ActiveModel,
    ) -> Result<salon::Model, DbErr> {
        model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        model: salon::ActiveModel,
    ) -> Result<salon::Model, DbErr> {
        model.update(db).await
    }

    pub async fn ids_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<i32>, DbErr> {
        salon::Entity::find()
            .select_only()
            .column(salon::Column::Id)
            .filter(salon::Column::UserId.eq(user_id))
            .into_tuple::<i32>()
            .all(db)
            .await
    }

    pub async fn delete_by_ids<C: ConnectionTrait>(
        db: &C,
        salon_ids: &[i32],
    ) -> Result<u64, DbErr> {
        if salon_ids.is_empty() {
            return Ok(0);
        }
        let result = salon::Entity::delete_many()
            .filter(salon::Column::Id.is_in(salon_ids.iter().copied()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
