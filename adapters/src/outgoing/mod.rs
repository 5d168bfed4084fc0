pub mod events_watch;
pub mod http_reqwest;
