pub mod application;
pub mod client;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use actix_web::http::Method;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use serde_json::json;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::{InquiryService, MailRouting, OrderService, ProcessingDelay};
pub use client::CheckoutClient;
pub use infrastructure::idempotency::InMemoryIdempotencyStore;
pub use infrastructure::mailer::{HttpMailer, LogMailer};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::orders::create_order, handlers::distributors::create_inquiry),
    components(schemas(
        domain::order::OrderRequest,
        domain::order::OrderItem,
        domain::order::Customer,
        domain::order::Delivery,
        domain::order::Address,
        domain::order::Preferred,
        domain::order::Payment,
        domain::order::DeliveryMethod,
        domain::order::PaymentMethod,
        domain::order::Unit,
        domain::order::DistributorInquiry,
        handlers::orders::OrderAccepted,
        handlers::distributors::InquiryAccepted,
    )),
    tags(
        (name = "orders", description = "Checkout order submission"),
        (name = "distributors", description = "B2B distributor inquiries"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    orders: OrderService,
    inquiries: InquiryService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let orders = web::Data::new(orders);
    let inquiries = web::Data::new(inquiries);

    Ok(HttpServer::new(move || {
        // Malformed bodies are rejected at the boundary with the same error
        // shape the business validation uses.
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let body = json!({ "error": format!("Invalid request body: {err}") });
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(body),
            )
            .into()
        });

        App::new()
            .app_data(orders.clone())
            .app_data(inquiries.clone())
            .app_data(json_config)
            .wrap(middleware::Logger::default())
            .wrap(middleware::DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
            .service(
                web::scope("/api")
                    .route("/orders", web::post().to(handlers::orders::create_order))
                    .route("/orders", web::method(Method::OPTIONS).to(handlers::preflight))
                    .route(
                        "/distributors",
                        web::post().to(handlers::distributors::create_inquiry),
                    )
                    .route(
                        "/distributors",
                        web::method(Method::OPTIONS).to(handlers::preflight),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
