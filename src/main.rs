use std::env;
use std::sync::Arc;

use anyhow::Context;
use estate_data::models::ListingStatus;
use estate_data::{connect, sort_listings, Config, FileStore, ListingFilters, Source};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Estate Data");
    info!("==============");

    let config = Config::load()?;
    info!("API: {}", config.api_url);
    info!("Local store: {}", config.data_dir.display());

    let store = FileStore::open(&config.data_dir).context("Failed to open local store")?;
    let service = connect(&config.api_url, Arc::new(store)).context("Failed to create API client")?;

    let auth = service.auth();
    if let (Ok(email), Ok(password)) = (env::var("ESTATE_ADMIN_EMAIL"), env::var("ESTATE_ADMIN_PASSWORD")) {
        let admin = auth.login(&email, &password).await?;
        info!("Signed in as {}", admin.email);
    } else if auth.is_authenticated() {
        match auth.verify().await {
            Ok(admin) => info!("Resumed session for {}", admin.email),
            Err(e) => warn!("Stored session is no longer valid: {}", e),
        }
    }

    match service.preload_communities().await {
        Ok(report) if !report.failed.is_empty() => {
            warn!("Could not preload: {}", report.failed.join(", "))
        }
        Ok(_) => {}
        Err(e) => warn!("Preload skipped: {}", e),
    }

    let communities = service.get_communities().await;
    report_source("communities", communities.source, communities.error.as_deref());

    for (i, community) in communities.data.iter().enumerate() {
        println!("{}. {} ({})", i + 1, community.name, community.price_range);
        println!("   {}", community.location);
        println!("   {} builders, {} home models", community.builders.len(), community.homes.len());
        if !community.amenities.is_empty() {
            println!("   Amenities: {}", community.amenities.join(", "));
        }
        println!("   ID: {}", community.id);
        println!();
    }

    let listings = service.search_listings("", &ListingFilters::default()).await;
    report_source("listings", listings.source, listings.error.as_deref());

    let available = listings
        .data
        .into_iter()
        .filter(|l| l.status == ListingStatus::Available)
        .collect();
    for listing in sort_listings(available, "price-asc") {
        println!("${}  {}", listing.price, listing.title);
        println!("   {} bd / {} ba, {} sqft", listing.bedrooms, listing.bathrooms, listing.sqft);
        println!("   {}", listing.address);
        if let Some(community) = &listing.community_id {
            println!("   Community: {}", community);
        }
        println!();
    }

    Ok(())
}

fn report_source(what: &str, source: Source, error: Option<&str>) {
    match source {
        Source::Local => warn!(
            "⚠️  Showing locally stored {} (remote unavailable: {})",
            what,
            error.unwrap_or("unknown error")
        ),
        _ => info!("✅ Loaded {} from the API", what),
    }
}
