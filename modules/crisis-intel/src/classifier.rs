use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use ai_client::extract_json_object;
use crisis_common::{AnalysisResult, EventType, Severity};

use crate::traits::ReasoningService;

const SYSTEM_INSTRUCTION: &str = "You are a crisis management expert. Analyze events and \
provide structured, actionable information for public safety.";

const MIN_RECOMMENDATIONS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 5;
const FALLBACK_DESCRIPTION_CHARS: usize = 100;

/// Why a reply from the reasoning service was not usable.
/// Never leaves the classifier: every variant collapses to the fallback analysis.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationFailure {
    #[error("reasoning service call failed: {0}")]
    Service(String),

    #[error("reasoning service timed out after {0:?}")]
    Timeout(Duration),

    #[error("unparseable analysis: {0}")]
    Parse(String),

    #[error("{field} outside taxonomy: {value:?}")]
    OutOfTaxonomy { field: &'static str, value: String },

    #[error("incomplete analysis: {0}")]
    Incomplete(&'static str),
}

/// The four keys the model is asked for. Any other shape is a parse failure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnalysis {
    event_type: String,
    severity: String,
    summary: String,
    recommendations: Vec<String>,
}

pub struct Classifier {
    reasoning: Arc<dyn ReasoningService>,
    timeout: Duration,
}

impl Classifier {
    pub fn new(reasoning: Arc<dyn ReasoningService>, timeout: Duration) -> Self {
        Self { reasoning, timeout }
    }

    /// Classify a report. Always returns a taxonomy-valid analysis.
    pub async fn classify(&self, title: &str, description: &str, location: &str) -> AnalysisResult {
        match self.try_classify(title, description, location).await {
            Ok(analysis) => {
                info!(
                    event_type = %analysis.event_type,
                    severity = %analysis.severity,
                    "Classified crisis report"
                );
                analysis
            }
            Err(failure) => {
                warn!(title, location, error = %failure, "Classification failed, using fallback analysis");
                fallback_analysis(title, description, location)
            }
        }
    }

    /// Single call to the reasoning service, no retry.
    pub async fn try_classify(
        &self,
        title: &str,
        description: &str,
        location: &str,
    ) -> Result<AnalysisResult, ClassificationFailure> {
        let prompt = build_prompt(title, description, location);
        let reply = tokio::time::timeout(
            self.timeout,
            self.reasoning.complete(SYSTEM_INSTRUCTION, &prompt),
        )
        .await
        .map_err(|_| ClassificationFailure::Timeout(self.timeout))?
        .map_err(|e| ClassificationFailure::Service(e.to_string()))?;

        debug!(chars = reply.len(), "Reasoning service replied");
        parse_analysis(&reply)
    }
}

pub fn build_prompt(title: &str, description: &str, location: &str) -> String {
    let event_types = EventType::ALL.map(|t| t.as_str()).join(", ");
    let severities = Severity::ALL.map(|s| s.as_str()).join(", ");

    format!(
        "Analyze this crisis event and provide structured information:\n\n\
         Title: {title}\n\
         Description: {description}\n\
         Location: {location}\n\n\
         Please analyze and return:\n\
         1. Event Type ({event_types})\n\
         2. Severity Level ({severities})\n\
         3. Brief Summary (max 150 words)\n\
         4. Safety Recommendations (list of 3-5 actionable items)\n\n\
         Respond in JSON format with keys: event_type, severity, summary, recommendations"
    )
}

/// Parse and validate a model reply against the taxonomy.
pub fn parse_analysis(reply: &str) -> Result<AnalysisResult, ClassificationFailure> {
    let raw: RawAnalysis = serde_json::from_str(extract_json_object(reply))
        .map_err(|e| ClassificationFailure::Parse(e.to_string()))?;

    let event_type =
        EventType::from_label(&raw.event_type).ok_or(ClassificationFailure::OutOfTaxonomy {
            field: "event_type",
            value: raw.event_type.clone(),
        })?;
    let severity =
        Severity::from_label(&raw.severity).ok_or(ClassificationFailure::OutOfTaxonomy {
            field: "severity",
            value: raw.severity.clone(),
        })?;

    let summary = raw.summary.trim().to_string();
    if summary.is_empty() {
        return Err(ClassificationFailure::Incomplete("empty summary"));
    }

    let mut recommendations: Vec<String> = raw
        .recommendations
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if recommendations.len() < MIN_RECOMMENDATIONS {
        return Err(ClassificationFailure::Incomplete("fewer than 3 recommendations"));
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);

    Ok(AnalysisResult {
        event_type,
        severity,
        summary,
        recommendations,
    })
}

/// Deterministic analysis used whenever the reasoning service cannot be used.
pub fn fallback_analysis(title: &str, description: &str, location: &str) -> AnalysisResult {
    let (title, location, description) = (title.trim(), location.trim(), description.trim());

    let mut summary = String::from("Crisis event reported");
    if !location.is_empty() {
        summary.push_str(" in ");
        summary.push_str(location);
    }
    if !title.is_empty() {
        summary.push_str(": ");
        summary.push_str(title);
    }
    summary.push('.');

    if !description.is_empty() {
        let excerpt: String = description.chars().take(FALLBACK_DESCRIPTION_CHARS).collect();
        summary.push(' ');
        summary.push_str(&excerpt);
        if excerpt.len() < description.len() {
            summary.push_str("...");
        }
    }

    AnalysisResult {
        event_type: EventType::Other,
        severity: Severity::Medium,
        summary,
        recommendations: vec![
            "Stay informed through official channels".to_string(),
            "Follow local authorities' instructions".to_string(),
            "Keep emergency supplies ready".to_string(),
            "Stay connected with family and community".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{analysis_json, MockReasoner};

    fn classifier(reasoner: MockReasoner) -> Classifier {
        Classifier::new(Arc::new(reasoner), Duration::from_secs(5))
    }

    #[test]
    fn prompt_embeds_inputs_and_taxonomy() {
        let prompt = build_prompt("Cyclone Alert", "Winds of 90 km/h", "Odisha");
        assert!(prompt.contains("Title: Cyclone Alert"));
        assert!(prompt.contains("Description: Winds of 90 km/h"));
        assert!(prompt.contains("Location: Odisha"));
        for t in EventType::ALL {
            assert!(prompt.contains(t.as_str()));
        }
        assert!(prompt.contains("low, medium, high, critical"));
    }

    #[test]
    fn parses_valid_reply() {
        let analysis = parse_analysis(&analysis_json("flood", "critical")).unwrap();
        assert_eq!(analysis.event_type, EventType::Flood);
        assert_eq!(analysis.severity, Severity::Critical);
        assert_eq!(analysis.recommendations.len(), 3);
    }

    #[test]
    fn parses_fenced_reply_and_coerces_labels() {
        let reply = format!(
            "```json\n{}\n```",
            analysis_json("Health Emergency", "HIGH")
        );
        let analysis = parse_analysis(&reply).unwrap();
        assert_eq!(analysis.event_type, EventType::HealthEmergency);
        assert_eq!(analysis.severity, Severity::High);
    }

    #[test]
    fn rejects_out_of_taxonomy_values() {
        let err = parse_analysis(&analysis_json("tsunami", "high")).unwrap_err();
        assert!(matches!(
            err,
            ClassificationFailure::OutOfTaxonomy { field: "event_type", .. }
        ));

        let err = parse_analysis(&analysis_json("flood", "extreme")).unwrap_err();
        assert!(matches!(
            err,
            ClassificationFailure::OutOfTaxonomy { field: "severity", .. }
        ));
    }

    #[test]
    fn rejects_extra_or_missing_keys() {
        let extra = r#"{"event_type":"fire","severity":"low","summary":"s","recommendations":["a","b","c"],"confidence":0.9}"#;
        assert!(matches!(
            parse_analysis(extra),
            Err(ClassificationFailure::Parse(_))
        ));

        let missing = r#"{"event_type":"fire","severity":"low","summary":"s"}"#;
        assert!(matches!(
            parse_analysis(missing),
            Err(ClassificationFailure::Parse(_))
        ));

        assert!(matches!(
            parse_analysis("I cannot help with that."),
            Err(ClassificationFailure::Parse(_))
        ));
    }

    #[test]
    fn recommendation_bounds() {
        let two = r#"{"event_type":"fire","severity":"low","summary":"s","recommendations":["a","  "," b"]}"#;
        assert!(matches!(
            parse_analysis(two),
            Err(ClassificationFailure::Incomplete(_))
        ));

        let seven = r#"{"event_type":"fire","severity":"low","summary":"s","recommendations":["1","2","3","4","5","6","7"]}"#;
        let analysis = parse_analysis(seven).unwrap();
        assert_eq!(analysis.recommendations, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn blank_summary_is_incomplete() {
        let reply = r#"{"event_type":"fire","severity":"low","summary":"  ","recommendations":["a","b","c"]}"#;
        assert!(matches!(
            parse_analysis(reply),
            Err(ClassificationFailure::Incomplete(_))
        ));
    }

    #[test]
    fn fallback_summary_shape() {
        let description = "A moderate earthquake of magnitude 4.2 was felt in Delhi NCR region. Buildings swayed for about 10 seconds. No major damage reported yet.";
        let analysis = fallback_analysis("Earthquake Alert in Delhi NCR", description, "Delhi, India");
        assert_eq!(analysis.event_type, EventType::Other);
        assert_eq!(analysis.severity, Severity::Medium);
        assert!(analysis
            .summary
            .starts_with("Crisis event reported in Delhi, India: Earthquake Alert in Delhi NCR. A moderate"));
        assert!(analysis.summary.ends_with("..."));
        assert_eq!(analysis.recommendations.len(), 4);
    }

    #[test]
    fn fallback_without_title_or_truncation() {
        let analysis = fallback_analysis("", "Short note", "Patna");
        assert_eq!(analysis.summary, "Crisis event reported in Patna. Short note");

        let analysis = fallback_analysis("", "", "");
        assert_eq!(analysis.summary, "Crisis event reported.");
    }

    #[test]
    fn fallback_ellipsis_only_past_hundred_chars() {
        let exact = "x".repeat(100);
        let analysis = fallback_analysis("Quake", &exact, "Delhi");
        assert_eq!(analysis.summary, format!("Crisis event reported in Delhi: Quake. {exact}"));

        let longer = "x".repeat(101);
        let analysis = fallback_analysis("Quake", &longer, "Delhi");
        assert_eq!(analysis.summary, format!("Crisis event reported in Delhi: Quake. {exact}..."));
    }

    #[test]
    fn fallback_truncates_on_char_boundary() {
        let description = "भूकंप ".repeat(60);
        let analysis = fallback_analysis("Quake", &description, "Delhi");
        assert!(analysis.summary.ends_with("..."));
    }

    #[tokio::test]
    async fn service_failure_falls_back() {
        let analysis = classifier(MockReasoner::failing())
            .classify("Flood in Patna", "River breached", "Patna, Bihar")
            .await;
        assert_eq!(analysis.event_type, EventType::Other);
        assert_eq!(analysis.severity, Severity::Medium);
        assert!(analysis.summary.contains("Patna, Bihar"));
        assert!(analysis.summary.contains("Flood in Patna"));
    }

    #[tokio::test]
    async fn invalid_reply_falls_back() {
        let analysis = classifier(MockReasoner::always(analysis_json("meteor", "high")))
            .classify("Sky event", "", "Pune")
            .await;
        assert_eq!(analysis.event_type, EventType::Other);
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let reasoner = MockReasoner::always(analysis_json("fire", "high"))
            .with_delay(Duration::from_secs(10));
        let classifier = Classifier::new(Arc::new(reasoner), Duration::from_millis(20));
        let err = classifier
            .try_classify("Fire", "", "Pune")
            .await
            .unwrap_err();
        assert!(matches!(err, ClassificationFailure::Timeout(_)));
    }

    #[tokio::test]
    async fn valid_reply_is_used() {
        let reasoner = MockReasoner::always(analysis_json("storm", "high"));
        let analysis = classifier(reasoner)
            .classify("Cyclone Alert - Odisha Coast", "Winds", "Bhubaneswar, Odisha")
            .await;
        assert_eq!(analysis.event_type, EventType::Storm);
        assert_eq!(analysis.severity, Severity::High);
    }
}
