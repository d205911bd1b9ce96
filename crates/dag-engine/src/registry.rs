//! Palette registry
//!
//! Maps template ids to [`OperatorTemplate`]s. Built-in templates are
//! discovered at link time through `inventory`; hosts can register more or
//! merge another registry on top.
//!
//! # Usage
//!
//! ```ignore
//! use dag_engine::PaletteRegistry;
//!
//! let mut registry = PaletteRegistry::with_builtins();
//! registry.merge(plugin_registry);
//! let node = registry.instantiate("bash_basic")?;
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::descriptor::{OperatorCategory, OperatorTemplate, TemplateFn};
use crate::error::{EditorError, Result};
use crate::types::DagNode;

/// Registry of palette templates
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    entries: HashMap<String, OperatorTemplate>,
}

impl PaletteRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every template submitted via `inventory`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for TemplateFn(descriptor) in inventory::iter::<TemplateFn> {
            registry.register(descriptor());
        }
        log::debug!("Palette registry loaded {} built-in templates", registry.len());
        registry
    }

    /// Register a template, replacing one with the same id
    pub fn register(&mut self, template: OperatorTemplate) {
        if let Some(previous) = self.entries.insert(template.template_id.clone(), template) {
            log::debug!("Template '{}' was replaced", previous.template_id);
        }
    }

    pub fn get(&self, template_id: &str) -> Option<&OperatorTemplate> {
        self.entries.get(template_id)
    }

    pub fn has_template(&self, template_id: &str) -> bool {
        self.entries.contains_key(template_id)
    }

    /// All templates, sorted by category then label
    pub fn all(&self) -> Vec<&OperatorTemplate> {
        let mut all: Vec<&OperatorTemplate> = self.entries.values().collect();
        all.sort_by(|a, b| {
            (a.category, &a.label, &a.template_id).cmp(&(b.category, &b.label, &b.template_id))
        });
        all
    }

    /// Templates grouped by category, in palette display order
    pub fn by_category(&self) -> BTreeMap<OperatorCategory, Vec<&OperatorTemplate>> {
        let mut grouped: BTreeMap<OperatorCategory, Vec<&OperatorTemplate>> = BTreeMap::new();
        for template in self.all() {
            grouped.entry(template.category).or_default().push(template);
        }
        grouped
    }

    /// Templates flagged for the palette's common section
    pub fn favorites(&self) -> Vec<&OperatorTemplate> {
        self.all().into_iter().filter(|t| t.favorite).collect()
    }

    /// Templates creating nodes of an operator type
    pub fn by_operator_type(&self, operator_type: &str) -> Vec<&OperatorTemplate> {
        self.all()
            .into_iter()
            .filter(|t| t.operator_type == operator_type)
            .collect()
    }

    /// Create a fresh node from a template
    pub fn instantiate(&self, template_id: &str) -> Result<DagNode> {
        self.get(template_id)
            .map(OperatorTemplate::instantiate)
            .ok_or_else(|| EditorError::UnknownTemplate(template_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries with the same template id.
    pub fn merge(&mut self, other: PaletteRegistry) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ParameterSpec, ParameterType};

    fn template(id: &str, operator: &str, category: OperatorCategory) -> OperatorTemplate {
        OperatorTemplate::new(id, operator, id.to_uppercase(), category)
            .with_parameter(ParameterSpec::required("sql", ParameterType::String, "SELECT 1"))
    }

    fn registry() -> PaletteRegistry {
        let mut registry = PaletteRegistry::new();
        registry.register(template("postgres", "PostgresOperator", OperatorCategory::Database));
        registry.register(template("bash", "BashOperator", OperatorCategory::Bash).favorite());
        registry.register(template("mysql", "MySqlOperator", OperatorCategory::Database));
        registry
    }

    #[test]
    fn test_lookup_and_grouping() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.has_template("bash"));

        let grouped = registry.by_category();
        let database: Vec<&str> = grouped[&OperatorCategory::Database]
            .iter()
            .map(|t| t.template_id.as_str())
            .collect();
        assert_eq!(database, vec!["mysql", "postgres"]);
        assert_eq!(grouped.keys().next(), Some(&OperatorCategory::Bash));
    }

    #[test]
    fn test_favorites_and_operator_type() {
        let registry = registry();
        let favorites: Vec<&str> = registry.favorites().iter().map(|t| t.template_id.as_str()).collect();
        assert_eq!(favorites, vec!["bash"]);
        assert_eq!(registry.by_operator_type("MySqlOperator").len(), 1);
    }

    #[test]
    fn test_instantiate() {
        let node = registry().instantiate("postgres").unwrap();
        assert_eq!(node.operator_type, "PostgresOperator");
        assert_eq!(node.attributes["parameters"]["sql"], "SELECT 1");

        let err = registry().instantiate("nope").unwrap_err();
        assert!(matches!(err, EditorError::UnknownTemplate(_)));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = registry();
        let mut other = PaletteRegistry::new();
        other.register(template("bash", "BashOperator", OperatorCategory::Util));
        other.register(template("gcs_copy", "GCSToGCSOperator", OperatorCategory::GoogleCloud));

        base.merge(other);
        assert_eq!(base.len(), 4);
        assert_eq!(base.get("bash").unwrap().category, OperatorCategory::Util);
    }
}
