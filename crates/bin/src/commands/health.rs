//! Health check command - checks a running userinfo server.

use std::time::Duration;

use crate::cli::HealthArgs;

/// The `/health` URL for a server base URL. A URL already ending in `/health` is kept.
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await?;
            let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("");
            let backend = body.get("backend").and_then(|s| s.as_str()).unwrap_or("unknown");
            if status == "healthy" {
                println!("healthy (backend: {backend})");
                Ok(())
            } else {
                eprintln!("unhealthy: server reported status {status:?}");
                std::process::exit(1);
            }
        }
        Ok(response) => {
            eprintln!("unhealthy: server returned HTTP status {}", response.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("unhealthy: failed to reach {url}: {e}");
            std::process::exit(1);
        }
    }
}
