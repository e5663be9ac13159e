//! services/api/src/bin/openapi.rs
//!
//! Writes the REST API's OpenAPI document to disk, for client generation and
//! CI diffing.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Output path defaults to `openapi.json`; pass an argument to override.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    std::fs::write(&path, ApiDoc::openapi().to_pretty_json()?)?;
    println!("Wrote the OpenAPI document to {}", path);
    Ok(())
}
