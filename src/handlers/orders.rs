use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::OrderService;
use crate::domain::order::OrderRequest;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderAccepted {
    pub success: bool,
    pub order_id: String,
    pub message: String,
}

/// POST /api/orders
///
/// Validates the payload, rejects duplicate idempotency keys, assigns an
/// order identifier and dispatches the operator notifications. The order is
/// accepted regardless of notification outcome.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order accepted", body = OrderAccepted),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Duplicate idempotency key"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let placed = service.place_order(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(OrderAccepted {
        success: true,
        order_id: placed.order_id,
        message: "Благодарим Ви! Поръчката е приета.".to_string(),
    }))
}
