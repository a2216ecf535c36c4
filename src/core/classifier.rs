use crate::core::registry::AdapterRegistry;
use crate::domain::model::ClassificationResult;
use crate::utils::error::{Result, RouterError};
use serde::{Deserialize, Serialize};

/// One `(key, markers)` entry. Order inside a table decides ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSet {
    pub key: String,
    pub markers: Vec<String>,
}

impl MarkerSet {
    pub fn new(key: &str, markers: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            markers: markers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Ordered marker table with a fallback key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    entries: Vec<MarkerSet>,
    default_key: String,
}

impl MarkerTable {
    pub fn new(entries: Vec<MarkerSet>, default_key: impl Into<String>) -> Self {
        // 標記一律轉小寫，比對時才會不分大小寫
        let entries = entries
            .into_iter()
            .map(|set| MarkerSet {
                key: set.key,
                markers: set.markers.iter().map(|m| m.to_lowercase()).collect(),
            })
            .collect();

        Self {
            entries,
            default_key: default_key.into(),
        }
    }

    pub fn entries(&self) -> &[MarkerSet] {
        &self.entries
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// First entry with any marker contained in `lowered`, else the default.
    /// Plain substring containment, no word boundaries.
    pub fn detect(&self, lowered: &str) -> &str {
        self.entries
            .iter()
            .find(|set| set.markers.iter().any(|marker| lowered.contains(marker.as_str())))
            .map(|set| set.key.as_str())
            .unwrap_or(&self.default_key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|set| set.key.as_str())
            .chain(std::iter::once(self.default_key.as_str()))
    }
}

/// Keyword-marker classifier for `(language, domain)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClassifier {
    languages: MarkerTable,
    domains: MarkerTable,
}

impl QueryClassifier {
    pub fn new(languages: MarkerTable, domains: MarkerTable) -> Self {
        Self { languages, domains }
    }

    pub fn builtin() -> Self {
        Self::new(
            MarkerTable::new(builtin_language_markers(), "spanish"),
            MarkerTable::new(builtin_domain_markers(), "technical"),
        )
    }

    pub fn languages(&self) -> &MarkerTable {
        &self.languages
    }

    pub fn domains(&self) -> &MarkerTable {
        &self.domains
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lowered = text.to_lowercase();

        // 語言與領域是兩個獨立的判斷
        ClassificationResult {
            language: self.languages.detect(&lowered).to_string(),
            domain: self.domains.detect(&lowered).to_string(),
        }
    }

    /// Checks that every key this classifier can produce exists in `registry`.
    pub fn validate_against(&self, registry: &AdapterRegistry) -> Result<()> {
        if let Some(missing) = self.languages.keys().find(|k| !registry.has_language(k)) {
            return Err(RouterError::configuration(format!(
                "classifier language '{}' has no entry in the adapter registry",
                missing
            )));
        }
        if let Some(missing) = self.domains.keys().find(|k| !registry.has_domain(k)) {
            return Err(RouterError::configuration(format!(
                "classifier domain '{}' has no entry in the adapter registry",
                missing
            )));
        }
        Ok(())
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn builtin_language_markers() -> Vec<MarkerSet> {
    vec![
        MarkerSet::new("spanish", &["hola", "gracias", "por favor"]),
        MarkerSet::new(
            "french",
            &[
                "bonjour",
                "merci",
                "sil vous plait",
                "s'il vous plaît",
                "quelles",
                "je ne",
            ],
        ),
        MarkerSet::new(
            "russian",
            &["привет", "спасибо", "пожалуйста", "сколько", "подписк"],
        ),
    ]
}

pub fn builtin_domain_markers() -> Vec<MarkerSet> {
    vec![
        MarkerSet::new(
            "technical",
            &["error", "broken", "not working", "failed", "сломал", "не работает"],
        ),
        MarkerSet::new(
            "billing",
            &["payment", "charge", "invoice", "cost", "factura", "facture", "стоит", "счет"],
        ),
        MarkerSet::new(
            "product",
            &[
                "features",
                "specifications",
                "compatibility",
                "caractéristiques",
                "características",
                "характеристики",
            ],
        ),
    ]
}
