pub mod tokio_watch;
