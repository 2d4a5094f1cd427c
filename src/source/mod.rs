// Remote content access: single-attempt transports and the retrying decorator.

pub mod http_source;
pub mod retry;
pub mod traits;
