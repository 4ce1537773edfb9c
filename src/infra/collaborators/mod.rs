pub mod http_notification_service;
pub mod http_payment_service;
