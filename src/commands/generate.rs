//! Generate static files

use anyhow::Result;

use crate::cms::ContentClient;
use crate::generator::{GenerateSummary, Generator};
use crate::SpaceTraveling;

/// Generate the site from the configured content repository
pub async fn run(site: &SpaceTraveling) -> Result<GenerateSummary> {
    let client = site.client()?;
    tracing::info!("Fetching posts from {}", client.endpoint());
    run_with_client(site, &client).await
}

/// Generate the site from any content client
pub async fn run_with_client(
    site: &SpaceTraveling,
    client: &dyn ContentClient,
) -> Result<GenerateSummary> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site)?;
    let summary = generator.generate(client).await?;

    if summary.skipped > 0 {
        tracing::warn!("Skipped {} posts", summary.skipped);
    }

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(summary)
}
