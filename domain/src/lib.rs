pub mod action;
pub mod auth;
pub mod checkout;
pub mod credits;
pub mod error;
pub mod gallery;
pub mod outcome;
pub mod profile;
