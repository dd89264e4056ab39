//! Romeria Server - HTTP API for the testimony pipeline
//!
//! This crate exposes the testimony pipeline and lead-form flow over a
//! small public REST surface. It supports:
//!
//! - **Testimony Submission**: validate, upload media, encode, store
//! - **Testimonial Feed**: filtered, paginated records from the store
//! - **Lead Intake**: contact-form writes to the lead database
//! - **Health & Metrics**: liveness/readiness probes and Prometheus text
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: Generic client messages, detail in server logs only
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! There is no authentication: every submitter is anonymous, spam is
//! handled by validation and the honeypot field, and moderation happens
//! in the document store itself.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /submit-testimony` - Run a testimony through the pipeline
//! - `POST /contact-lead` - Write a lead to the contact database
//! - `GET /testimonials` - Filtered, paginated testimonial feed
//! - `OPTIONS` on the POST routes - CORS preflight for form hosts

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::start_server;
pub use state::ServerState;
