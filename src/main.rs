use std::env;
use std::sync::Arc;

use checkout_service::{
    build_server, HttpMailer, InMemoryIdempotencyStore, InquiryService, LogMailer, MailRouting,
    OrderService, ProcessingDelay,
};
use checkout_service::domain::ports::Notifier;
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let from = env::var("MAIL_FROM").unwrap_or_else(|_| "orders@gradina.example".to_string());
    let inbox = env::var("ORDERS_INBOX").unwrap_or_else(|_| "orders@gradina.example".to_string());
    let secondary_inbox = env::var("ORDERS_INBOX_CC").ok();
    let distributors_inbox =
        env::var("DISTRIBUTORS_INBOX").unwrap_or_else(|_| inbox.clone());

    let notifier: Arc<dyn Notifier> = match (env::var("MAIL_API_URL"), env::var("MAIL_API_KEY")) {
        (Ok(url), Ok(key)) => Arc::new(HttpMailer::new(url, key)),
        _ => {
            log::warn!("MAIL_API_URL/MAIL_API_KEY not set; logging mail instead of sending");
            Arc::new(LogMailer)
        }
    };

    let orders = OrderService::new(
        Arc::new(InMemoryIdempotencyStore::default()),
        notifier.clone(),
        MailRouting {
            from: from.clone(),
            inbox,
            secondary_inbox,
        },
        ProcessingDelay::default(),
    );
    let inquiries = InquiryService::new(notifier, from, distributors_inbox);

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(orders, inquiries, &host, port)?.await
}
