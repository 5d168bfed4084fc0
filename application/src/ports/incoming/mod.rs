pub mod checkout;
pub mod coupon;
pub mod jobs;
pub mod profile;
