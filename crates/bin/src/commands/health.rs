//! Health check command - checks a running Ecofusion backend.

use std::time::Duration;

use ecofusion::server::HealthResponse;

use crate::cli::HealthArgs;

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = args.url.trim_end_matches('/');
    let url = if base.ends_with("/api/health") {
        base.to_string()
    } else {
        format!("{base}/api/health")
    };
    let timeout = Duration::from_secs(args.timeout);

    let client = reqwest::Client::builder().timeout(timeout).build()?;

    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let health: HealthResponse = response.json().await?;
            if health.ok {
                println!("healthy: {}", serde_json::to_string(&health)?);
                if !health.mail_configured {
                    eprintln!("warning: contact email is not configured");
                }
                if !health.newsletter_configured {
                    eprintln!("warning: newsletter list is not configured");
                }
                Ok(())
            } else {
                eprintln!("unhealthy: server reported ok=false");
                std::process::exit(1);
            }
        }
        Ok(response) => {
            eprintln!(
                "unhealthy: server returned HTTP status {}",
                response.status()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {}: {}", url, e);
            std::process::exit(1);
        }
    }
}
