//! Utility to inspect a credit model artifact before deploying it.
//!
//! Usage: `model_check [path]` (defaults to `MODEL_PATH`, then `model.onnx`).

use dotenvy::dotenv;
use ort::session::Session;
use rust_credit_score_api::model_artifact::{CreditModel, LoadedModel};
use rust_credit_score_api::models::FEATURE_NAMES;
use std::env;

/// Main entry point for the model inspection utility.
///
/// Prints the graph's inputs and outputs, the tensors the service will bind,
/// the artifact checksum and a sample prediction.
fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let path = env::args()
        .nth(1)
        .or_else(|| env::var("MODEL_PATH").ok())
        .unwrap_or_else(|| "model.onnx".to_string());

    let session = Session::builder()?
        .commit_from_file(&path)
        .map_err(|e| anyhow::anyhow!("Error checking model '{}': {}", path, e))?;

    println!("Model file: {}", path);
    println!("Inputs:");
    for input in session.inputs() {
        println!("  - {}: {:?}", input.name(), input.dtype());
    }
    println!("Outputs:");
    for output in session.outputs() {
        println!("  - {}: {:?}", output.name(), output.dtype());
    }

    let loaded = LoadedModel::load(&path)
        .map_err(|e| anyhow::anyhow!("Model is not usable by the service: {}", e))?;

    println!();
    println!("Bound input:  {}", loaded.info.input);
    println!("Bound output: {}", loaded.info.output);
    println!("Features:     {}", FEATURE_NAMES.join(", "));
    println!("SHA-256:      {}", loaded.info.sha256);

    let sample = [0.0_f64; 4];
    let prediction = loaded.model.predict(&sample)?;
    println!("Sample prediction for {:?} = {:.4}", sample, prediction);

    Ok(())
}
