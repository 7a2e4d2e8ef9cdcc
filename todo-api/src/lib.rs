//! # Todo API Server Library
//!
//! HTTP layer of the multi-user todo service: configuration, router,
//! extractors, the response envelope and error mapping.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration loaded from the environment
//! - `error`: `ApiError` and its HTTP mapping
//! - `extract`: Envelope-aware extractors and the owner-scope check
//! - `middleware`: Authentication and security headers
//! - `response`: The `{success, data, error}` envelope
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
