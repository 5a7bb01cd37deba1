//! Application state for the web layer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::ShipmentId;
use crate::facilities::CachedFacilityClient;
use crate::session::EditingSession;
use crate::timezone::TimezoneResolver;
use crate::transport::StopsClient;

/// Shared application state.
///
/// Sessions live behind one mutex, which serializes operations per process:
/// a second commit for a session cannot start while one is in flight, which
/// is the mutual exclusion the editing flow assumes.
#[derive(Clone)]
pub struct AppState {
    /// Stop persistence client; sessions get their own clone
    pub stops: StopsClient,

    /// Cached facility search client
    pub facilities: Arc<CachedFacilityClient>,

    /// Shared postal-code timezone resolver
    pub resolver: TimezoneResolver,

    /// Editing sessions, one per shipment
    pub sessions: Arc<Mutex<HashMap<ShipmentId, EditingSession<StopsClient>>>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        stops: StopsClient,
        facilities: CachedFacilityClient,
        resolver: TimezoneResolver,
    ) -> Self {
        Self {
            stops,
            facilities: Arc::new(facilities),
            resolver,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
