pub mod classify;
pub mod service;
