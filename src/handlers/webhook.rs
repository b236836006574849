use crate::services::CheckoutService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::json;

/// Stripe webhook.
///
/// A bad signature gets 401. A verified event always gets 200, with the
/// error code attached when fulfilment failed; redelivering a completed
/// checkout is harmless, retrying a broken one forever is not.
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    checkout_service: web::Data<CheckoutService>,
) -> Result<HttpResponse> {
    let Some(signature) = req
        .headers()
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        log::warn!("Stripe webhook without a readable signature header");
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Missing Stripe-Signature header"
        })));
    };

    let Ok(payload) = std::str::from_utf8(&body) else {
        log::warn!("Stripe webhook body is not UTF-8");
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Invalid payload encoding"
        })));
    };

    let event = match checkout_service.verify_webhook(payload, signature) {
        Ok(event) => event,
        Err(e) => {
            log::warn!("Rejected Stripe webhook: {e}");
            return Ok(HttpResponse::Unauthorized().json(json!({
                "error": "Invalid signature"
            })));
        }
    };
    log::info!("Stripe event {} ({:?})", event.id, event.type_);

    let body = match checkout_service.handle_event(&event).await {
        Ok(Some(outcome)) => {
            log::info!(
                "Event {} fulfilled {} with code {}",
                event.id,
                outcome.payment_reference,
                outcome.discount_code_id
            );
            json!({ "received": true })
        }
        Ok(None) => json!({ "received": true }),
        Err(e) => {
            log::error!("Could not fulfil Stripe event {}: {e}", event.id);
            json!({ "received": true, "error": e.error_code() })
        }
    };
    Ok(HttpResponse::Ok().json(body))
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook/stripe", web::post().to(stripe_webhook));
}
