//! HTTP entry points.

pub mod http;
