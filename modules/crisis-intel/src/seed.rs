use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crisis_common::{CrisisError, CrisisEvent, NewEvent, Result};

use crate::pipeline::EnrichmentPipeline;
use crate::traits::EventStore;
use crate::util::bounded;

/// Demonstration reports, one per major hazard type, all in India.
pub fn sample_events() -> Vec<NewEvent> {
    vec![
        NewEvent::new(
            "Earthquake Alert in Delhi NCR",
            "A moderate earthquake of magnitude 4.2 was felt in Delhi NCR region. Buildings swayed for about 10 seconds. No major damage reported yet, but authorities are assessing the situation.",
            "Delhi, India",
            28.6139,
            77.2090,
        ),
        NewEvent::new(
            "Heavy Rainfall Warning - Mumbai",
            "IMD has issued a red alert for Mumbai with predictions of extremely heavy rainfall. Waterlogging expected in low-lying areas. Citizens advised to stay indoors unless emergency.",
            "Mumbai, Maharashtra",
            19.0760,
            72.8777,
        ),
        NewEvent::new(
            "Forest Fire in Western Ghats",
            "A large forest fire has been reported in the Western Ghats near Pune. Fire department and forest officials are working to contain the blaze. Nearby villages have been alerted.",
            "Western Ghats, Maharashtra",
            18.5204,
            73.8567,
        ),
        NewEvent::new(
            "Cyclone Alert - Odisha Coast",
            "A cyclonic storm is approaching the Odisha coast. Wind speeds expected to reach 80-90 km/h. Evacuation of coastal areas has begun. Fishermen advised not to venture into the sea.",
            "Bhubaneswar, Odisha",
            20.2961,
            85.8245,
        ),
        NewEvent::new(
            "Industrial Accident - Ahmedabad",
            "A chemical leak has been reported at an industrial facility in Ahmedabad. Emergency teams are on site. Area within 2km radius has been evacuated as a precautionary measure.",
            "Ahmedabad, Gujarat",
            23.0225,
            72.5714,
        ),
    ]
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    Created { events: Vec<CrisisEvent> },
    AlreadySeeded { existing: i64 },
}

impl SeedOutcome {
    /// Events written by this call.
    pub fn created_count(&self) -> usize {
        match self {
            SeedOutcome::Created { events } => events.len(),
            SeedOutcome::AlreadySeeded { .. } => 0,
        }
    }

    /// Events in the store after this call, as far as this call knows.
    pub fn total_count(&self) -> i64 {
        match self {
            SeedOutcome::Created { events } => events.len() as i64,
            SeedOutcome::AlreadySeeded { existing } => *existing,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SeedOutcome::Created { events } => {
                format!("Created {} sample events", events.len())
            }
            SeedOutcome::AlreadySeeded { existing } => {
                format!("Sample data already exists ({existing} events)")
            }
        }
    }
}

/// Populates an empty store once. Any existing event, seeded or not, turns
/// the call into a no-op.
pub struct SeedLoader {
    pipeline: Arc<EnrichmentPipeline>,
    store: Arc<dyn EventStore>,
    timeout: Duration,
}

impl SeedLoader {
    pub fn new(
        pipeline: Arc<EnrichmentPipeline>,
        store: Arc<dyn EventStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            pipeline,
            store,
            timeout,
        }
    }

    pub async fn seed(&self) -> Result<SeedOutcome> {
        let existing = bounded(self.timeout, "event count", self.store.count())
            .await
            .map_err(|e| CrisisError::Storage(e.to_string()))?;

        if existing > 0 {
            info!(existing, "Sample data already present, skipping seed");
            return Ok(SeedOutcome::AlreadySeeded { existing });
        }

        let mut events = Vec::new();
        for submission in sample_events() {
            events.push(self.pipeline.create(submission).await?);
        }

        info!(created = events.len(), "Seeded sample crisis events");
        Ok(SeedOutcome::Created { events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_valid_and_distinct() {
        let samples = sample_events();
        assert_eq!(samples.len(), 5);
        for s in &samples {
            assert!(s.validate().is_ok(), "{}", s.title);
        }
        let titles: std::collections::HashSet<&str> =
            samples.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles.len(), 5);
    }

    #[test]
    fn outcome_messages() {
        let seeded = SeedOutcome::AlreadySeeded { existing: 7 };
        assert_eq!(seeded.message(), "Sample data already exists (7 events)");
        assert_eq!(seeded.created_count(), 0);
        assert_eq!(seeded.total_count(), 7);

        let created = SeedOutcome::Created { events: vec![] };
        assert_eq!(created.message(), "Created 0 sample events");
    }
}
