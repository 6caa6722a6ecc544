//! Request logging.

mod layer;

pub use layer::{LoggingLayer, LoggingMiddleware};
