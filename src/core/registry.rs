use crate::utils::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageAdapter {
    /// Short code used as the adapter name prefix, e.g. `es`.
    pub code: String,
    pub adapter_id: String,
}

/// Immutable language/domain → adapter naming table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRegistry {
    languages: BTreeMap<String, LanguageAdapter>,
    domains: BTreeMap<String, String>,
}

impl AdapterRegistry {
    pub fn new(
        languages: BTreeMap<String, LanguageAdapter>,
        domains: BTreeMap<String, String>,
    ) -> Self {
        Self { languages, domains }
    }

    /// 內建的客服 adapter 對照表
    pub fn builtin() -> Self {
        let languages = [
            ("spanish", "es", "spanish-customer-support"),
            ("french", "fr", "french-customer-support"),
            ("russian", "ru", "russian-customer-support"),
        ]
        .into_iter()
        .map(|(key, code, adapter_id)| {
            (
                key.to_string(),
                LanguageAdapter {
                    code: code.to_string(),
                    adapter_id: adapter_id.to_string(),
                },
            )
        })
        .collect();

        let domains = [
            ("technical", "technical-support"),
            ("billing", "billing-support"),
            ("product", "product-support"),
        ]
        .into_iter()
        .map(|(key, suffix)| (key.to_string(), suffix.to_string()))
        .collect();

        Self::new(languages, domains)
    }

    /// Returns a copy without the given language. Mostly useful for tests
    /// that exercise a registry/classifier mismatch.
    pub fn without_language(&self, key: &str) -> Self {
        let mut registry = self.clone();
        registry.languages.remove(key);
        registry
    }

    pub fn language(&self, key: &str) -> Option<&LanguageAdapter> {
        self.languages.get(key)
    }

    pub fn domain_suffix(&self, key: &str) -> Option<&str> {
        self.domains.get(key).map(String::as_str)
    }

    pub fn has_language(&self, key: &str) -> bool {
        self.languages.contains_key(key)
    }

    pub fn has_domain(&self, key: &str) -> bool {
        self.domains.contains_key(key)
    }

    pub fn language_keys(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn domain_keys(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Resolves the composite adapter name `{code}-{domain suffix}`.
    pub fn resolve(&self, language: &str, domain: &str) -> Result<String> {
        let adapter = self.language(language).ok_or_else(|| {
            RouterError::configuration(format!(
                "language '{}' is not present in the adapter registry",
                language
            ))
        })?;
        let suffix = self.domain_suffix(domain).ok_or_else(|| {
            RouterError::configuration(format!(
                "domain '{}' is not present in the adapter registry",
                domain
            ))
        })?;

        tracing::debug!(
            "Resolved adapter for {}/{} (adapter id: {})",
            language,
            domain,
            adapter.adapter_id
        );
        Ok(format!("{}-{}", adapter.code, suffix))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_builtin_adapters() {
        let registry = AdapterRegistry::builtin();

        assert_eq!(
            registry.resolve("spanish", "technical").unwrap(),
            "es-technical-support"
        );
        assert_eq!(
            registry.resolve("french", "product").unwrap(),
            "fr-product-support"
        );
        assert_eq!(
            registry.resolve("russian", "billing").unwrap(),
            "ru-billing-support"
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let registry = AdapterRegistry::builtin();
        let first = registry.resolve("french", "billing").unwrap();
        let second = registry.resolve("french", "billing").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_unknown_keys_fail() {
        let registry = AdapterRegistry::builtin();

        let err = registry.resolve("german", "technical").unwrap_err();
        assert!(matches!(err, RouterError::Configuration { .. }));
        assert!(err.to_string().contains("german"));

        let err = registry.resolve("spanish", "shipping").unwrap_err();
        assert!(err.to_string().contains("shipping"));
    }

    #[test]
    fn test_without_language() {
        let registry = AdapterRegistry::builtin().without_language("russian");
        assert!(!registry.has_language("russian"));
        assert!(registry.has_language("spanish"));
        assert!(registry.resolve("russian", "technical").is_err());
    }

    #[test]
    fn test_language_metadata() {
        let registry = AdapterRegistry::builtin();
        let spanish = registry.language("spanish").unwrap();
        assert_eq!(spanish.code, "es");
        assert_eq!(spanish.adapter_id, "spanish-customer-support");
        assert_eq!(
            registry.language_keys().collect::<Vec<_>>(),
            vec!["french", "russian", "spanish"]
        );
        assert_eq!(
            registry.domain_keys().collect::<Vec<_>>(),
            vec!["billing", "product", "technical"]
        );
    }
}
