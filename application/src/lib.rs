#[cfg(any(feature = "adapters", feature = "reqwest", feature = "tokio"))]
compile_error!("application must not depend on adapters/framework crates");

pub mod balance;
pub mod checkout;
pub mod coupon;
pub mod error;
pub mod executor;
pub mod gate;
pub mod infrastructure_config;
pub mod jobs;
pub mod ports;
pub mod profile;

#[cfg(test)]
pub(crate) mod test_support;
