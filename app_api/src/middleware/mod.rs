mod sanitize_middleware;

pub use sanitize_middleware::mongo_sanitize;
