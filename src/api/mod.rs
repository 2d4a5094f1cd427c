// Entry points for the UI layer: tracing bootstrap and session construction.

pub mod puzzle_api;
pub mod simple;

pub use puzzle_api::{create_session, create_session_with_source};
pub use simple::init_tracing;
