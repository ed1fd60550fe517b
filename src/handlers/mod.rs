pub mod distributors;
pub mod orders;

use actix_web::HttpResponse;

/// CORS preflight for the storefront origin: always 200 with permissive
/// headers. The origin header itself is added globally in `build_server`.
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
        .insert_header(("Access-Control-Max-Age", "86400"))
        .finish()
}
