pub mod balance_endpoint;
pub mod balance_events;
pub mod checkout;
pub mod coupon;
pub mod jobs;
pub mod paid_action;
pub mod profile;
