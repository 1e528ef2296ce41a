use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CrisisError;

/// Lifecycle flag assigned to every newly created event.
pub const DEFAULT_STATUS: &str = "active";

// --- Taxonomy ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Earthquake,
    Flood,
    Fire,
    Storm,
    HealthEmergency,
    InfrastructureFailure,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Earthquake,
        EventType::Flood,
        EventType::Fire,
        EventType::Storm,
        EventType::HealthEmergency,
        EventType::InfrastructureFailure,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Earthquake => "earthquake",
            EventType::Flood => "flood",
            EventType::Fire => "fire",
            EventType::Storm => "storm",
            EventType::HealthEmergency => "health_emergency",
            EventType::InfrastructureFailure => "infrastructure_failure",
            EventType::Other => "other",
        }
    }

    /// Match a loosely formatted label ("Health Emergency", "health-emergency")
    /// against the taxonomy. Anything outside it is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = CrisisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
            .ok_or_else(|| CrisisError::Validation(format!("unknown event type: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == normalized)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = CrisisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
            .ok_or_else(|| CrisisError::Validation(format!("unknown severity: {s}")))
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

// --- Records ---

/// News coverage copied into an event. Owned by the event that embeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Classification of a report. Transient: consumed by the pipeline, never stored alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub event_type: EventType,
    pub severity: Severity,
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Raw submission. Classification fields are never accepted from the submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewEvent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: location.into(),
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<(), CrisisError> {
        if self.title.trim().is_empty() {
            return Err(CrisisError::Validation("title must not be empty".into()));
        }
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Latitude in [-90, 90], longitude in [-180, 180], both finite.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CrisisError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(CrisisError::Validation(format!(
            "latitude out of range: {latitude}"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(CrisisError::Validation(format!(
            "longitude out of range: {longitude}"
        )));
    }
    Ok(())
}

/// The enriched record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub event_type: EventType,
    pub severity: Severity,
    pub ai_summary: String,
    #[serde(default)]
    pub news_articles: Vec<NewsArticle>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl CrisisEvent {
    /// Assemble a new event with a fresh id and creation time.
    ///
    /// The timestamp is truncated to microseconds, the precision storage keeps,
    /// so a stored event reads back unchanged.
    pub fn assemble(
        submission: NewEvent,
        analysis: AnalysisResult,
        news_articles: Vec<NewsArticle>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: submission.title,
            description: submission.description,
            location: submission.location,
            latitude: submission.latitude,
            longitude: submission.longitude,
            event_type: analysis.event_type,
            severity: analysis.severity,
            ai_summary: analysis.summary,
            news_articles,
            status: DEFAULT_STATUS.to_string(),
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_labels_round_trip() {
        for t in EventType::ALL {
            assert_eq!(EventType::from_label(t.as_str()), Some(t));
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn event_type_label_coercion() {
        assert_eq!(
            EventType::from_label(" Health Emergency "),
            Some(EventType::HealthEmergency)
        );
        assert_eq!(
            EventType::from_label("infrastructure-failure"),
            Some(EventType::InfrastructureFailure)
        );
        assert_eq!(EventType::from_label("FLOOD"), Some(EventType::Flood));
        assert_eq!(EventType::from_label("tsunami"), None);
        assert!("volcano".parse::<EventType>().is_err());
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::from_label("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::from_label("severe"), None);
        assert!(Severity::Low < Severity::Critical);
    }

    #[test]
    fn submission_validation() {
        let ok = NewEvent::new("Flood", "", "Patna", 25.59, 85.13);
        assert!(ok.validate().is_ok());

        let blank = NewEvent::new("   ", "", "Patna", 25.59, 85.13);
        assert!(matches!(blank.validate(), Err(CrisisError::Validation(_))));

        let bad_lat = NewEvent::new("Flood", "", "Patna", 91.0, 85.13);
        assert!(bad_lat.validate().is_err());

        let bad_lng = NewEvent::new("Flood", "", "Patna", 25.59, -180.5);
        assert!(bad_lng.validate().is_err());

        let nan = NewEvent::new("Flood", "", "Patna", f64::NAN, 85.13);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn assemble_defaults_status_and_truncates_timestamp() {
        let analysis = AnalysisResult {
            event_type: EventType::Fire,
            severity: Severity::High,
            summary: "Forest fire near Pune".into(),
            recommendations: vec![],
        };
        let event = CrisisEvent::assemble(
            NewEvent::new("Forest Fire", "blaze", "Pune", 18.52, 73.85),
            analysis,
            vec![],
        );
        assert_eq!(event.status, DEFAULT_STATUS);
        assert_eq!(event.event_type, EventType::Fire);
        assert_eq!(event.ai_summary, "Forest fire near Pune");
        assert_eq!(event.timestamp.timestamp_subsec_nanos() % 1_000, 0);
    }
}
