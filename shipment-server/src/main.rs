use std::net::SocketAddr;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shipment_server::facilities::{
    CachedFacilityClient, FacilityCacheConfig, FacilityClient, FacilityClientConfig,
};
use shipment_server::timezone::{
    TimezoneCacheConfig, TimezoneClient, TimezoneClientConfig, TimezoneDiskCache, TimezoneResolver,
};
use shipment_server::transport::{StopsClient, StopsClientConfig};
use shipment_server::web::{AppState, create_router};

/// How often to flush the resolved timezone mapping to disk.
const TIMEZONE_SAVE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Get credentials from environment
    let shipments_key = std::env::var("SHIPMENTS_API_KEY").unwrap_or_else(|_| {
        warn!("SHIPMENTS_API_KEY not set. API calls will fail.");
        String::new()
    });
    let timezone_key = std::env::var("TIMEZONE_API_KEY").unwrap_or_else(|_| {
        warn!("TIMEZONE_API_KEY not set. Timezone lookups will fail.");
        String::new()
    });

    // Stop persistence client
    let mut stops_config = StopsClientConfig::new(&shipments_key);
    if let Ok(url) = std::env::var("SHIPMENTS_API_URL") {
        stops_config = stops_config.with_base_url(url);
    }
    let stops = StopsClient::new(stops_config).expect("Failed to create shipments client");

    // Facility search client, cached
    let mut facility_config = FacilityClientConfig::new(&shipments_key);
    if let Ok(url) = std::env::var("SHIPMENTS_API_URL") {
        facility_config = facility_config.with_base_url(url);
    }
    let facility_client =
        FacilityClient::new(facility_config).expect("Failed to create facility client");
    let facilities = CachedFacilityClient::new(facility_client, &FacilityCacheConfig::default());

    // Timezone resolver, seeded from the disk cache when one is present
    let mut timezone_config = TimezoneClientConfig::new(&timezone_key);
    if let Ok(url) = std::env::var("TIMEZONE_API_URL") {
        timezone_config = timezone_config.with_base_url(url);
    }
    let timezone_client =
        TimezoneClient::new(timezone_config).expect("Failed to create timezone client");

    let disk_cache = TimezoneDiskCache::new(TimezoneCacheConfig::default());
    let resolver = match disk_cache.load() {
        Some(zones) => {
            info!(count = zones.len(), "seeded timezones from disk cache");
            TimezoneResolver::with_entries(timezone_client, zones)
        }
        None => TimezoneResolver::new(timezone_client),
    };

    // Flush the accumulated mapping to disk periodically
    let resolver_save = resolver.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TIMEZONE_SAVE_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            let zones = resolver_save.snapshot().await;
            match disk_cache.save(&zones) {
                Ok(()) => info!(count = zones.len(), "saved timezone cache"),
                Err(e) => error!(error = %e, "failed to save timezone cache"),
            }
        }
    });

    // Build app state and router
    let state = AppState::new(stops, facilities, resolver);
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Shipment stop editor listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
