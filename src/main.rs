use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use lyxdeal_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{EmailSender, EmailService, PaymentGateway, StripeService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::{CancelToken, JwtService},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    let pool = create_pool(&config.database, &CancelToken::never())
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeService::new(config.stripe.clone()));
    let email_sender: Arc<dyn EmailSender> = Arc::new(EmailService::new(config.email.clone()));

    let discount_code_service = DiscountCodeService::new(pool.clone(), config.codes.clone());
    let checkout_service =
        CheckoutService::new(pool.clone(), gateway.clone(), discount_code_service.clone());
    let deal_service = DealService::new(pool.clone(), config.codes.clone());
    let account_service = AccountService::new(pool.clone(), jwt_service.clone());
    let subscription_service = SubscriptionService::new(pool.clone(), gateway);
    let notification_service =
        NotificationService::new(pool.clone(), email_sender, &config.notifications);

    if let Some(admin) = &config.admin
        && let Err(e) = account_service.ensure_admin(&admin.email, &admin.password).await
    {
        log::error!("Failed to create bootstrap admin: {e}");
    }

    let background = tasks::spawn_all(
        notification_service.clone(),
        Duration::from_secs(config.notifications.poll_interval_secs.max(1)),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(discount_code_service.clone()))
            .app_data(web::Data::new(checkout_service.clone()))
            .app_data(web::Data::new(deal_service.clone()))
            .app_data(web::Data::new(account_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .configure(handlers::functions_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::deals_config)
                    .configure(handlers::salon_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    log::info!("HTTP server stopped, shutting down background tasks");
    background.shutdown().await;
    Ok(())
}
