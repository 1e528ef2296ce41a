use crisis_common::EventType;

/// Builds news search queries from a classified event.
///
/// Every query ends with a regional qualifier (`"india"` by default) so that
/// results stay on the covered region. Templates are fixed per event type;
/// `other` and unrecognised labels fall back to `"<label> <location> <region>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    region: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new("india")
    }
}

impl QueryBuilder {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn build_query(&self, event_type: EventType, location: &str) -> String {
        self.compose(keywords(event_type), location)
    }

    /// Like [`build_query`](Self::build_query) for a free-text label.
    pub fn build_query_for_label(&self, label: &str, location: &str) -> String {
        match EventType::from_label(label) {
            Some(event_type) => self.build_query(event_type, location),
            None => self.compose(label.trim(), location),
        }
    }

    fn compose(&self, keywords: &str, location: &str) -> String {
        [keywords, location.trim(), self.region.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn keywords(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Earthquake => "earthquake",
        EventType::Flood => "flood",
        EventType::Fire => "fire",
        EventType::Storm => "storm cyclone",
        EventType::HealthEmergency => "health emergency outbreak",
        EventType::InfrastructureFailure => "infrastructure failure collapse",
        EventType::Other => event_type.as_str(),
    }
}
