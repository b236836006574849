use crate::entities::{SubscriptionPlan, UserRole, salon_entity as salon};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthResponse, AuthUser, CreateAccountResponse, CreateAdminAccountRequest, CreateAdminRequest,
    CreateSalonAccountRequest, DeleteUserRequest, DeleteUserResponse, LoginRequest, UserResponse,
};
use crate::repositories::{
    DealRepository, DiscountCodeRepository, SalonRepository, UserRepository, is_unique_violation,
};
use crate::utils::{
    JwtService, hash_password, normalize_email, require_non_empty, validate_email,
    validate_password, verify_password,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};

#[derive(Clone)]
pub struct AccountService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AccountService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let user = UserRepository::find_by_email(&self.pool, &email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Failed login for user {}", user.id);
            return Err(invalid_credentials());
        }

        let access_token = self
            .jwt_service
            .generate_access_token(user.id, user.role)?;
        log::info!("User {} logged in", user.id);

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: UserResponse::from(user),
        })
    }

    pub async fn create_admin_account(
        &self,
        actor: &AuthUser,
        request: CreateAdminAccountRequest,
    ) -> AppResult<CreateAccountResponse> {
        require_admin(actor)?;
        let email = self.new_account_email(&request.email).await?;
        validate_password(&request.password)?;
        let password_hash = hash_password(&request.password)?;

        let user = UserRepository::insert(&self.pool, &email, &password_hash, UserRole::Admin)
            .await
            .map_err(map_duplicate_email)?;
        log::info!("Admin account {} created by {}", user.id, actor.user_id);

        Ok(CreateAccountResponse {
            user_id: user.id,
            salon_id: None,
            email: user.email,
            role: user.role,
        })
    }

    /// Creates the login and its salon together.
    pub async fn create_salon_account(
        &self,
        actor: &AuthUser,
        request: CreateSalonAccountRequest,
    ) -> AppResult<CreateAccountResponse> {
        require_admin(actor)?;
        let email = self.new_account_email(&request.email).await?;
        validate_password(&request.password)?;
        require_non_empty(&request.salon_name, "Salon name")?;
        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let user = UserRepository::insert(&txn, &email, &password_hash, UserRole::Salon)
            .await
            .map_err(map_duplicate_email)?;
        let created = SalonRepository::insert(
            &txn,
            salon::ActiveModel {
                user_id: Set(user.id),
                name: Set(request.salon_name.trim().to_string()),
                email: Set(email.clone()),
                phone: Set(request.phone),
                address: Set(request.address),
                city: Set(request.city),
                subscription_plan: Set(request
                    .subscription_plan
                    .unwrap_or(SubscriptionPlan::Baspaket)),
                subscription_type: Set(request.subscription_type),
                stripe_subscription_id: Set(None),
                current_period_end: Set(None),
                cancel_at_period_end: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await?;
        txn.commit().await?;

        log::info!(
            "Salon account {} (salon {}) created by {}",
            user.id,
            created.id,
            actor.user_id
        );
        Ok(CreateAccountResponse {
            user_id: user.id,
            salon_id: Some(created.id),
            email: user.email,
            role: user.role,
        })
    }

    /// Promotes an existing account to admin.
    pub async fn create_admin(
        &self,
        actor: &AuthUser,
        request: CreateAdminRequest,
    ) -> AppResult<CreateAccountResponse> {
        require_admin(actor)?;
        let email = normalize_email(&request.email);
        let user = UserRepository::find_by_email(&self.pool, &email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let user = if user.role == UserRole::Admin {
            user
        } else {
            UserRepository::set_role(&self.pool, user, UserRole::Admin).await?
        };
        log::info!("User {} promoted to admin by {}", user.id, actor.user_id);

        Ok(CreateAccountResponse {
            user_id: user.id,
            salon_id: None,
            email: user.email,
            role: user.role,
        })
    }

    /// Deletes the account and everything its salons own: codes, deals,
    /// salons, then the user.
    pub async fn delete_user(
        &self,
        actor: &AuthUser,
        request: DeleteUserRequest,
    ) -> AppResult<DeleteUserResponse> {
        require_admin(actor)?;
        if request.user_id == actor.user_id {
            return Err(AppError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        if UserRepository::find_by_id(&txn, request.user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        let salon_ids = SalonRepository::ids_for_user(&txn, request.user_id).await?;
        let deal_ids = DealRepository::ids_for_salons(&txn, &salon_ids).await?;
        let codes_deleted = DiscountCodeRepository::delete_for_deals(&txn, &deal_ids).await?;
        let deals_deleted = DealRepository::delete_by_ids(&txn, &deal_ids).await?;
        let salons_deleted = SalonRepository::delete_by_ids(&txn, &salon_ids).await?;
        UserRepository::delete(&txn, request.user_id).await?;
        txn.commit().await?;

        log::info!(
            "User {} deleted by {} ({salons_deleted} salons, {deals_deleted} deals, {codes_deleted} codes)",
            request.user_id,
            actor.user_id
        );
        Ok(DeleteUserResponse {
            user_id: request.user_id,
            salons_deleted,
            deals_deleted,
            codes_deleted,
        })
    }

    /// Creates the configured bootstrap admin unless the email is taken.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<()> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if UserRepository::find_by_email(&self.pool, &email).await?.is_some() {
            return Ok(());
        }
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        let user = UserRepository::insert(&self.pool, &email, &password_hash, UserRole::Admin)
            .await?;
        log::info!("Bootstrap admin {} created", user.id);
        Ok(())
    }

    async fn new_account_email(&self, raw: &str) -> AppResult<String> {
        let email = normalize_email(raw);
        validate_email(&email)?;
        if UserRepository::find_by_email(&self.pool, &email).await?.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }
        Ok(email)
    }
}

fn require_admin(actor: &AuthUser) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn invalid_credentials() -> AppError {
    AppError::AuthError("Invalid email or password".to_string())
}

fn map_duplicate_email(err: sea_orm::DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::ValidationError("Email is already registered".to_string())
    } else {
        err.into()
    }
}
