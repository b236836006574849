use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Salons {
    Table,
    Id,
    UserId,
    Name,
    Email,
    Phone,
    Address,
    City,
    SubscriptionPlan,
    SubscriptionType,
    StripeSubscriptionId,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    SalonId,
    Title,
    Description,
    ImageUrl,
    OriginalPrice,
    DiscountedPrice,
    IsFree,
    Category,
    City,
    IsActive,
    Status,
    Featured,
    ExpiresAt,
    QuantityLeft,
    BookingUrl,
    RequiresDiscountCode,
    StripePriceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DiscountCodes {
    Table,
    Id,
    DealId,
    Code,
    IsUsed,
    CreatedAt,
    UsedAt,
    CustomerName,
    CustomerEmail,
    CustomerPhone,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    Id,
    DealId,
    DiscountCodeId,
    Code,
    CustomerEmail,
    PaymentReference,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Salons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Salons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Salons::UserId).integer().not_null())
                    .col(ColumnDef::new(Salons::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Salons::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Salons::Phone).string_len(32).null())
                    .col(ColumnDef::new(Salons::Address).string_len(255).null())
                    .col(ColumnDef::new(Salons::City).string_len(128).null())
                    .col(
                        ColumnDef::new(Salons::SubscriptionPlan)
                            .string_len(16)
                            .not_null()
                            .default("baspaket"),
                    )
                    .col(ColumnDef::new(Salons::SubscriptionType).string_len(32).null())
                    .col(
                        ColumnDef::new(Salons::StripeSubscriptionId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Salons::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Salons::CancelAtPeriodEnd)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Salons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Salons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_salons_user")
                            .from(Salons::Table, Salons::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deals::SalonId).integer().not_null())
                    .col(ColumnDef::new(Deals::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Deals::Description).text().not_null())
                    .col(ColumnDef::new(Deals::ImageUrl).string_len(1024).null())
                    .col(ColumnDef::new(Deals::OriginalPrice).big_integer().not_null())
                    .col(ColumnDef::new(Deals::DiscountedPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Deals::IsFree)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Deals::Category).string_len(128).not_null())
                    .col(ColumnDef::new(Deals::City).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Deals::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Deals::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Deals::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Deals::ExpiresAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Deals::QuantityLeft)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Deals::BookingUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(Deals::RequiresDiscountCode)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Deals::StripePriceId).string_len(255).null())
                    .col(
                        ColumnDef::new(Deals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Deals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_salon")
                            .from(Deals::Table, Deals::SalonId)
                            .to(Salons::Table, Salons::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DiscountCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscountCodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiscountCodes::DealId).integer().not_null())
                    .col(ColumnDef::new(DiscountCodes::Code).string_len(32).not_null())
                    .col(
                        ColumnDef::new(DiscountCodes::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(DiscountCodes::CustomerName).string_len(255).null())
                    .col(ColumnDef::new(DiscountCodes::CustomerEmail).string_len(255).null())
                    .col(ColumnDef::new(DiscountCodes::CustomerPhone).string_len(32).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discount_codes_deal")
                            .from(DiscountCodes::Table, DiscountCodes::DealId)
                            .to(Deals::Table, Deals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // codes are looked up by their string when salons verify them
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_discount_codes_code")
                    .table(DiscountCodes::Table)
                    .col(DiscountCodes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_discount_codes_deal_unused")
                    .table(DiscountCodes::Table)
                    .col(DiscountCodes::DealId)
                    .col(DiscountCodes::IsUsed)
                    .to_owned(),
            )
            .await?;

        // audit rows outlive their deal, so no foreign key here
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::DealId).integer().not_null())
                    .col(ColumnDef::new(Purchases::DiscountCodeId).integer().not_null())
                    .col(ColumnDef::new(Purchases::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Purchases::CustomerEmail).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Purchases::PaymentReference)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_purchases_payment_reference")
                    .table(Purchases::Table)
                    .col(Purchases::PaymentReference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DiscountCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Salons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
