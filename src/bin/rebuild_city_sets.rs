// src/bin/rebuild_city_sets.rs
// Operator tool: rebuild city set aggregates on a running service and report drift
use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::{Duration, Instant};

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Deserialize, Debug, Default)]
struct RebuildResponse {
    #[serde(default)]
    upserted: i64,
    #[serde(default)]
    removed: i64,
}

#[derive(Deserialize, Debug, Default)]
struct PortfolioStats {
    #[serde(default)]
    total_photos: i64,
    #[serde(default)]
    public_photos: i64,
    #[serde(default)]
    favorite_photos: i64,
    #[serde(default)]
    city_sets: i64,
    #[serde(default)]
    drifted_city_sets: i64,
}

#[derive(Deserialize, Debug)]
struct StatsResponse {
    stats: PortfolioStats,
}

struct RebuildClient {
    base_url: String,
    admin_token: String,
    client: Client,
}

impl RebuildClient {
    fn new(base_url: String, admin_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            admin_token,
            client,
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn stats(&self) -> Result<PortfolioStats> {
        let response = self
            .client
            .get(format!("{}/admin/stats", self.base_url))
            .header("X-Admin-Token", &self.admin_token)
            .send()
            .await
            .context("Stats request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("HTTP {} - {}", status, body);
        }

        let body: StatsResponse = response
            .json()
            .await
            .context("Failed to parse stats response")?;
        Ok(body.stats)
    }

    async fn rebuild(&self) -> Result<RebuildResponse> {
        let response = self
            .client
            .post(format!("{}/admin/city-sets/rebuild", self.base_url))
            .header("X-Admin-Token", &self.admin_token)
            .send()
            .await
            .context("Rebuild request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("HTTP {} - {}", status, body);
        }

        response
            .json::<RebuildResponse>()
            .await
            .context("Failed to parse rebuild response")
    }
}

fn print_stats(label: &str, stats: &PortfolioStats) {
    let drift_color = if stats.drifted_city_sets == 0 { GREEN } else { YELLOW };
    println!("{}{}{}", BOLD, label, RESET);
    println!("  • Photos: {} ({} public, {} favorites)", stats.total_photos, stats.public_photos, stats.favorite_photos);
    println!("  • City sets: {}", stats.city_sets);
    println!("  • Drifted sets: {}{}{}", drift_color, stats.drifted_city_sets, RESET);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let admin_token = env::var("ADMIN_TOKEN").context("ADMIN_TOKEN must be set in .env")?;
    let base_url = env::var("PORTFOLIO_URL").unwrap_or_else(|_| "http://localhost:8003".to_string());

    let client = RebuildClient::new(base_url, admin_token)?;

    println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
    if !client.check_service_health().await {
        println!("{}❌ Service unavailable.{}", RED, RESET);
        bail!("portfolio-photos is not reachable");
    }
    println!("{}✅ Service available{}\n", GREEN, RESET);

    let before = client.stats().await?;
    print_stats("Before rebuild", &before);

    println!("\n{}🚀 Rebuilding city sets...{}", BOLD, RESET);
    let started = Instant::now();
    let result = client.rebuild().await?;
    println!(
        "{}✅ {} upserted, {} removed ({:.1}s){}\n",
        GREEN,
        result.upserted,
        result.removed,
        started.elapsed().as_secs_f64(),
        RESET
    );

    let after = client.stats().await?;
    print_stats("After rebuild", &after);

    if after.drifted_city_sets > 0 {
        println!("\n{}⚠️  Drift remains, photos may have changed during the rebuild.{}", YELLOW, RESET);
    }

    Ok(())
}
