use crate::entities::purchase_entity as purchase;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

pub struct PurchaseRepository;

impl PurchaseRepository {
    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        deal_id: i32,
        discount_code_id: i32,
        code: &str,
        customer_email: &str,
        payment_reference: &str,
    ) -> Result<purchase::Model, DbErr> {
        purchase::ActiveModel {
            deal_id: Set(deal_id),
            discount_code_id: Set(discount_code_id),
            code: Set(code.to_string()),
            customer_email: Set(customer_email.to_string()),
            payment_reference: Set(payment_reference.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_payment_reference<C: ConnectionTrait>(
        db: &C,
        payment_reference: &str,
    ) -> Result<Option<purchase::Model>, DbErr> {
        purchase::Entity::find()
            .filter(purchase::Column::PaymentReference.eq(payment_reference))
            .one(db)
            .await
    }

    pub async fn count_for_deal<C: ConnectionTrait>(db: &C, deal_id: i32) -> Result<u64, DbErr> {
        purchase::Entity::find()
            .filter(purchase::Column::DealId.eq(deal_id))
            .count(db)
            .await
    }
}
