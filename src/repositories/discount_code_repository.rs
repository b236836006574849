use crate::entities::discount_code_entity as dc;
use crate::models::{CodeStats, CustomerInfo};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

pub struct DiscountCodeRepository;

impl DiscountCodeRepository {
    /// Inserts one unused row per code.
    pub async fn insert_batch<C: ConnectionTrait>(
        db: &C,
        deal_id: i32,
        codes: &[String],
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        if codes.is_empty() {
            return Ok(0);
        }
        let rows = codes.iter().map(|code| dc::ActiveModel {
            deal_id: Set(deal_id),
            code: Set(code.clone()),
            is_used: Set(false),
            created_at: Set(now),
            ..Default::default()
        });
        dc::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await
    }

    /// Oldest unclaimed code of the deal, if any.
    pub async fn find_first_unclaimed<C: ConnectionTrait>(
        db: &C,
        deal_id: i32,
    ) -> Result<Option<dc::Model>, DbErr> {
        dc::Entity::find()
            .filter(dc::Column::DealId.eq(deal_id))
            .filter(dc::Column::IsUsed.eq(false))
            .filter(dc::Column::CustomerEmail.is_null())
            .order_by_asc(dc::Column::Id)
            .one(db)
            .await
    }

    /// Flips one code to used and attaches the customer.
    ///
    /// Conditional on `is_used = false`: of two callers racing for the same
    /// row exactly one sees `true`.
    pub async fn mark_claimed<C: ConnectionTrait>(
        db: &C,
        code_id: i32,
        customer: &CustomerInfo,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = dc::Entity::update_many()
            .col_expr(dc::Column::IsUsed, Expr::value(true))
            .col_expr(dc::Column::UsedAt, Expr::value(now))
            .col_expr(dc::Column::CustomerName, Expr::value(customer.name.clone()))
            .col_expr(dc::Column::CustomerEmail, Expr::value(customer.email.clone()))
            .col_expr(dc::Column::CustomerPhone, Expr::value(customer.phone.clone()))
            .filter(dc::Column::Id.eq(code_id))
            .filter(dc::Column::IsUsed.eq(false))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn list_for_deal<C: ConnectionTrait>(
        db: &C,
        deal_id: i32,
    ) -> Result<Vec<dc::Model>, DbErr> {
        dc::Entity::find()
            .filter(dc::Column::DealId.eq(deal_id))
            .order_by_asc(dc::Column::Id)
            .all(db)
            .await
    }

    pub async fn stats<C: ConnectionTrait>(db: &C, deal_id: i32) -> Result<CodeStats, DbErr> {
        let total = dc::Entity::find()
            .filter(dc::Column::DealId.eq(deal_id))
            .count(db)
            .await?;
        let used = dc::Entity::find()
            .filter(dc::Column::DealId.eq(deal_id))
            .filter(dc::Column::IsUsed.eq(true))
            .count(db)
            .await?;
        Ok(CodeStats {
            total,
            used,
            unused: total - used,
        })
    }

    pub async fn delete_for_deals<C: ConnectionTrait>(
        db: &C,
        deal_ids: &[i32],
    ) -> Result<u64, DbErr> {
        if deal_ids.is_empty() {
            return Ok(0);
        }
        let result = dc::Entity::delete_many()
            .filter(dc::Column::DealId.is_in(deal_ids.iter().copied()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
