use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::InquiryService;
use crate::domain::order::DistributorInquiry;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryAccepted {
    pub success: bool,
    pub inquiry_id: String,
    pub message: String,
}

/// POST /api/distributors
#[utoipa::path(
    post,
    path = "/api/distributors",
    request_body = DistributorInquiry,
    responses(
        (status = 201, description = "Inquiry received", body = InquiryAccepted),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "distributors"
)]
pub async fn create_inquiry(
    service: web::Data<InquiryService>,
    body: web::Json<DistributorInquiry>,
) -> Result<HttpResponse, AppError> {
    let received = service.submit(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(InquiryAccepted {
        success: true,
        inquiry_id: received.inquiry_id,
        message: "Благодарим Ви! Ще се свържем с Вас.".to_string(),
    }))
}
