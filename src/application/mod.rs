pub mod inquiry_service;
pub mod order_service;

pub use inquiry_service::{InquiryService, ReceivedInquiry};
pub use order_service::{MailRouting, OrderService, PlacedOrder, ProcessingDelay};
