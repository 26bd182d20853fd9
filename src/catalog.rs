//! Catalog of sensitive fields per entity type.
//!
//! Immutable at runtime and injected at call time rather than held in
//! process-wide state, so multiple tenant configurations can coexist in one
//! process. Changes to the catalog are a data-migration concern.

use std::collections::HashMap;

/// Mapping from entity-type name to the ordered set of field names that must
/// be protected.
///
/// An unrecognized entity type yields an empty set: unknown types default to
/// "nothing is sensitive here". Completeness is a design-review obligation,
/// not a runtime one.
#[derive(Debug, Clone, Default)]
pub struct SensitiveFieldCatalog {
    entries: HashMap<String, Vec<String>>,
}

impl SensitiveFieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog for the standard business entities.
    pub fn business_default() -> Self {
        Self::new()
            .with_entity(
                "employee",
                &["ssn", "bank_account_number", "routing_number", "tax_id"],
            )
            .with_entity("company", &["ein", "bank_account_number", "routing_number"])
            .with_entity("tax_profile", &["withholding_allowances", "state_tax_id"])
            .with_entity("api_credential", &["api_key", "api_secret", "webhook_secret"])
    }

    /// Add or replace the protected fields for one entity type.
    pub fn with_entity(mut self, entity_type: &str, fields: &[&str]) -> Self {
        self.entries.insert(
            entity_type.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// The protected fields for `entity_type`, in declaration order. Empty
    /// for unknown types.
    pub fn fields_for(&self, entity_type: &str) -> &[String] {
        self.entries
            .get(entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_sensitive_field(&self, entity_type: &str, field_name: &str) -> bool {
        self.fields_for(entity_type)
            .iter()
            .any(|f| f == field_name)
    }
}
