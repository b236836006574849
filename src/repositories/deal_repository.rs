use crate::entities::{DealStatus, deal_entity as deal};
use crate::models::{DealQuery, PaginationParams};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

pub struct DealRepository;

impl DealRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        deal_id: i32,
    ) -> Result<Option<deal::Model>, DbErr> {
        deal::Entity::find_by_id(deal_id).one(db).await
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        model: deal::ActiveModel,
    ) -> Result<deal::Model, DbErr> {
        model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        model: deal::ActiveModel,
    ) -> Result<deal::Model, DbErr> {
        model.update(db).await
    }

    /// Takes one unit of stock. Returns false when the deal had none left;
    /// the `quantity_left > 0` guard makes concurrent callers unable to
    /// drive the counter below zero.
    pub async fn take_one<C: ConnectionTrait>(db: &C, deal_id: i32) -> Result<bool, DbErr> {
        let result = deal::Entity::update_many()
            .col_expr(
                deal::Column::QuantityLeft,
                Expr::col(deal::Column::QuantityLeft).sub(1),
            )
            .col_expr(deal::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(deal::Column::Id.eq(deal_id))
            .filter(deal::Column::QuantityLeft.gt(0))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Approved, active, unexpired deals for the public listing.
    pub async fn list_public<C: ConnectionTrait>(
        db: &C,
        query: &DealQuery,
        params: &PaginationParams,
        now: DateTime<Utc>,
    ) -> Result<(Vec<deal::Model>, u64), DbErr> {
        let mut select = deal::Entity::find()
            .filter(deal::Column::Status.eq(DealStatus::Approved))
            .filter(deal::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(deal::Column::ExpiresAt.is_null())
                    .add(deal::Column::ExpiresAt.gt(now)),
            );
        if let Some(city) = query.city.as_deref() {
            select = select.filter(deal::Column::City.eq(city));
        }
        if let Some(category) = query.category.as_deref() {
            select = select.filter(deal::Column::Category.eq(category));
        }
        if let Some(featured) = query.featured {
            select = select.filter(deal::Column::Featured.eq(featured));
        }

        let total = select.clone().count(db).await?;
        let items = select
            .order_by_desc(deal::Column::Featured)
            .order_by_desc(deal::Column::CreatedAt)
            .order_by_desc(deal::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(db)
            .await?;
        Ok((items, total))
    }

    pub async fn list_for_salon<C: ConnectionTrait>(
        db: &C,
        salon_id: i32,
    ) -> Result<Vec<deal::Model>, DbErr> {
        deal::Entity::find()
            .filter(deal::Column::SalonId.eq(salon_id))
            .order_by_desc(deal::Column::CreatedAt)
            .order_by_desc(deal::Column::Id)
            .all(db)
            .await
    }

    pub async fn ids_for_salons<C: ConnectionTrait>(
        db: &C,
        salon_ids: &[i32],
    ) -> Result<Vec<i32>, DbErr> {
        if salon_ids.is_empty() {
            return Ok(Vec::new());
        }
        deal::Entity::find()
            .select_only()
            .column(deal::Column::Id)
            .filter(deal::Column::SalonId.is_in(salon_ids.iter().copied()))
            .into_tuple::<i32>()
            .all(db)
            .await
    }

    pub async fn delete_by_ids<C: ConnectionTrait>(db: &C, deal_ids: &[i32]) -> Result<u64, DbErr> {
        if deal_ids.is_empty() {
            return Ok(0);
        }
        let result = deal::Entity::delete_many()
            .filter(deal::Column::Id.is_in(deal_ids.iter().copied()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
