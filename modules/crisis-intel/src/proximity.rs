use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crisis_common::{CrisisError, CrisisEvent, Result};

use crate::geo::BoundingBox;
use crate::traits::EventStore;
use crate::util::bounded;

/// Approximate "events near a point" over the store. See [`crate::geo`] for
/// the accuracy caveats of the bounding box.
pub struct ProximitySearch {
    store: Arc<dyn EventStore>,
    limit: i64,
    timeout: Duration,
}

impl ProximitySearch {
    pub fn new(store: Arc<dyn EventStore>, limit: i64, timeout: Duration) -> Self {
        Self {
            store,
            limit,
            timeout,
        }
    }

    pub async fn near(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<CrisisEvent>> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CrisisError::Validation(format!(
                "coordinates must be finite: ({latitude}, {longitude})"
            )));
        }
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(CrisisError::Validation(format!(
                "radius must be a non-negative number of km: {radius_km}"
            )));
        }

        let bbox = BoundingBox::around(latitude, longitude, radius_km);
        debug!(?bbox, radius_km, "Proximity lookup");

        bounded(
            self.timeout,
            "proximity lookup",
            self.store.find_in_box(&bbox, self.limit),
        )
        .await
        .map_err(|e| CrisisError::Storage(e.to_string()))
    }
}
