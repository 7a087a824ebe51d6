//! Service offerings shown on the Services page.
//!
//! The catalog is content data: loaded once, never mutated by the pipeline.

use serde::{Deserialize, Serialize};

/// One service the business offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOffering {
    pub title: String,
    #[serde(alias = "description")]
    pub blurb: String,
    pub session_length: Option<String>,
    pub delivery_type: Option<String>,
}

impl ServiceOffering {
    /// Caption line such as `Session: 60 min • Delivery: In-person`.
    ///
    /// Only attributes that are present and non-blank are included. Returns
    /// `None` if neither is set.
    pub fn meta_line(&self) -> Option<String> {
        let parts: Vec<String> = [
            ("Session", self.session_length.as_deref()),
            ("Delivery", self.delivery_type.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{label}: {v}"))
        })
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" • "))
        }
    }
}

/// Ordered, read-only list of offerings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCatalog {
    offerings: Vec<ServiceOffering>,
}

impl ServiceCatalog {
    pub fn new(offerings: Vec<ServiceOffering>) -> Self {
        Self { offerings }
    }

    /// Parse a JSON array of offerings.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<ServiceOffering>>(json).map(Self::new)
    }

    pub fn offerings(&self) -> &[ServiceOffering] {
        &self.offerings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceOffering> {
        self.offerings.iter()
    }

    pub fn len(&self) -> usize {
        self.offerings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offerings.is_empty()
    }
}

impl<'a> IntoIterator for &'a ServiceCatalog {
    type Item = &'a ServiceOffering;
    type IntoIter = std::slice::Iter<'a, ServiceOffering>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: &str = r#"[
        {"title": "Private Coaching", "blurb": "One-on-one strength work.", "session_length": "60 min", "delivery_type": "In-person"},
        {"title": "Remote Programming", "description": "Monthly plan with check-ins.", "delivery_type": "Online"},
        {"title": "Small Group"}
    ]"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ServiceCatalog::from_json_str(SERVICES).unwrap();
        assert_eq!(catalog.len(), 3);

        let titles: Vec<&str> = catalog.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Private Coaching", "Remote Programming", "Small Group"]
        );
        assert_eq!(catalog.offerings()[1].blurb, "Monthly plan with check-ins.");
    }

    #[test]
    fn test_meta_line() {
        let catalog = ServiceCatalog::from_json_str(SERVICES).unwrap();
        let offerings = catalog.offerings();

        assert_eq!(
            offerings[0].meta_line().as_deref(),
            Some("Session: 60 min • Delivery: In-person")
        );
        assert_eq!(offerings[1].meta_line().as_deref(), Some("Delivery: Online"));
        assert_eq!(offerings[2].meta_line(), None);
    }

    #[test]
    fn test_blank_attributes_skipped() {
        let offering = ServiceOffering {
            title: "Concierge".to_string(),
            session_length: Some("  ".to_string()),
            delivery_type: Some("Home visits".to_string()),
            ..ServiceOffering::default()
        };
        assert_eq!(offering.meta_line().as_deref(), Some("Delivery: Home visits"));
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(ServiceCatalog::from_json_str(r#"{"title": "x"}"#).is_err());
    }
}
