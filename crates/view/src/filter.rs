//! Row filter: exact-match selectors plus a case-insensitive name search.

use fluxradar_core::{Field, Resource};
use serde::{Deserialize, Serialize};

/// Wildcard token accepted by every selector.
pub const ALL: &str = "all";

/// One selector value; `None` matches everything.
pub type Choice = Option<String>;

/// Parse a selector value, treating `"all"` and the empty string as the wildcard.
pub fn choice(raw: &str) -> Choice {
    if raw.is_empty() || raw == ALL { None } else { Some(raw.to_string()) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub cluster: Choice,
    pub resource_type: Choice,
    /// Compared against the raw status string, not the normalized one.
    pub status: Choice,
    pub namespace: Choice,
    pub kind: Choice,
    pub search: String,
}

impl Filter {
    pub fn matches(&self, r: &Resource) -> bool {
        fn sel(choice: &Choice, r: &Resource, field: Field) -> bool {
            choice.as_deref().map_or(true, |want| r.field_text(field) == want)
        }
        sel(&self.cluster, r, Field::Cluster)
            && sel(&self.resource_type, r, Field::ResourceType)
            && sel(&self.status, r, Field::Status)
            && sel(&self.namespace, r, Field::Namespace)
            && sel(&self.kind, r, Field::Kind)
            && (self.search.is_empty()
                || r.field_text(Field::Name).to_lowercase().contains(&self.search.to_lowercase()))
    }

    pub fn apply<'a>(&self, items: &'a [Resource]) -> Vec<&'a Resource> {
        items.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxradar_core::{ResourceKind, ResourceType};

    #[test]
    fn wildcard_parsing() {
        assert_eq!(choice("all"), None);
        assert_eq!(choice(""), None);
        assert_eq!(choice("prod"), Some("prod".to_string()));
    }

    #[test]
    fn search_is_case_insensitive_substring_of_name() {
        let r = Resource::new("1", &ResourceKind::HelmRelease, ResourceType::Flux, "Ingress-NGINX", "ingress", "Ready");
        let f = |s: &str| Filter { search: s.to_string(), ..Filter::default() };
        assert!(f("nginx").matches(&r));
        assert!(f("SS-ng").matches(&r));
        assert!(!f("ingress ").matches(&r));
        // namespace is not searched
        assert!(!f("ingressx").matches(&r));
    }
}
