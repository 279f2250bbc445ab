use crate::model::language::LanguageCatalog;

/// Decides whether a source/target language pair is acceptable. Returns the
/// form-level messages, empty when the pair is fine.
pub trait LanguagePairValidator {
    fn validate(&self, source: &str, target: Option<&str>) -> Vec<String>;
}

pub struct CatalogLanguageValidator {
    catalog: LanguageCatalog,
}

impl CatalogLanguageValidator {
    pub fn new(catalog: LanguageCatalog) -> Self {
        Self { catalog }
    }
}

impl LanguagePairValidator for CatalogLanguageValidator {
    fn validate(&self, source: &str, target: Option<&str>) -> Vec<String> {
        let mut errors = Vec::new();

        if source.trim().is_empty() {
            errors.push("a source language is required".to_string());
        } else if !self.catalog.contains(source) {
            errors.push(format!("unknown source language {source:?}"));
        }

        if let Some(target) = target {
            if !self.catalog.contains(target) {
                errors.push(format!("unknown target language {target:?}"));
            } else if target == source {
                errors.push("source and target languages must differ".to_string());
            }
        }

        errors
    }
}
