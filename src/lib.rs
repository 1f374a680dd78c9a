//! Card Transaction Credit Score API Library
//!
//! This library scores the credit risk of an identity from the transaction
//! history of its payment cards: transactions are fetched per card from
//! PostgreSQL, reduced to four features, scored by a pre-trained model, and
//! combined into one score and risk tier.
//!
//! # Modules
//!
//! - `aggregation`: Combining per-card results.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `features`: Per-card feature extraction.
//! - `handlers`: HTTP request handlers.
//! - `model_artifact`: ONNX model loading and inference.
//! - `models`: Core data models.
//! - `pipeline`: Per-identity scoring pipeline.
//! - `routes`: Router and middleware assembly.
//! - `score_models`: Request and response payloads.
//! - `scoring`: Model wrapper and score errors.
//! - `transaction_store`: Transaction fetcher and its PostgreSQL implementation.

pub mod aggregation;
pub mod config;
pub mod db;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod model_artifact;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod score_models;
pub mod scoring;
pub mod transaction_store;
