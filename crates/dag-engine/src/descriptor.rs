//! Operator templates
//!
//! A template is a palette entry: the operator type it creates, how it is
//! shown, and the parameter schema with defaults. Operator crates describe
//! themselves through [`OperatorDescriptor`] and register at link time with
//! [`TemplateFn`], so the palette needs no hand-maintained list.
//!
//! The core never reads parameter values back; they travel inside the
//! node's opaque attribute map.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Attributes, DagNode, OperatorKind};

/// Trait for operators that can describe their palette entry
///
/// # Example
///
/// ```ignore
/// use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};
///
/// impl OperatorDescriptor for BashCommand {
///     fn descriptor() -> OperatorTemplate {
///         OperatorTemplate::new("bash_basic", "BashOperator", "Bash Command", OperatorCategory::Bash)
///             .with_description("Run a single bash command")
///             .with_parameter(ParameterSpec::required("bash_command", ParameterType::String, "echo hi"))
///     }
/// }
///
/// inventory::submit!(dag_engine::TemplateFn(BashCommand::descriptor));
/// ```
pub trait OperatorDescriptor {
    /// Get the static template for this operator
    fn descriptor() -> OperatorTemplate
    where
        Self: Sized;
}

/// Link-time registration of a template
pub struct TemplateFn(pub fn() -> OperatorTemplate);

inventory::collect!(TemplateFn);

/// Palette grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCategory {
    /// The DAG definition block
    Definition,
    /// General-purpose Airflow operators
    Util,
    Bash,
    Python,
    Sql,
    Database,
    Sensor,
    Transfer,
    GoogleCloud,
}

/// Value type of a template parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// Source code of a callable
    Function,
}

/// One entry in a template's parameter schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParameterType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub description: String,
    /// Allowed values, empty when the parameter is free-form
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl ParameterSpec {
    pub fn new(
        name: impl Into<String>,
        param_type: ParameterType,
        required: bool,
        default: Option<serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            required,
            default,
            description: String::new(),
            choices: Vec::new(),
        }
    }

    /// Create a required parameter with a default value
    pub fn required(name: impl Into<String>, param_type: ParameterType, default: impl Into<serde_json::Value>) -> Self {
        Self::new(name, param_type, true, Some(default.into()))
    }

    /// Create an optional parameter with a default value
    pub fn optional(name: impl Into<String>, param_type: ParameterType, default: impl Into<serde_json::Value>) -> Self {
        Self::new(name, param_type, false, Some(default.into()))
    }

    /// Create a required parameter the user must fill in
    pub fn required_no_default(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self::new(name, param_type, true, None)
    }

    /// Create an optional parameter left out of new nodes
    pub fn optional_no_default(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self::new(name, param_type, false, None)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }
}

/// A palette entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorTemplate {
    /// Unique palette id (e.g. "bash_basic")
    pub template_id: String,
    /// Operator type given to created nodes (e.g. "BashOperator")
    pub operator_type: String,
    pub label: String,
    pub category: OperatorCategory,
    #[serde(default)]
    pub description: String,
    /// Shown in the palette's common section
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl OperatorTemplate {
    pub fn new(
        template_id: impl Into<String>,
        operator_type: impl Into<String>,
        label: impl Into<String>,
        category: OperatorCategory,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            operator_type: operator_type.into(),
            label: label.into(),
            category,
            description: String::new(),
            favorite: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn favorite(mut self) -> Self {
        self.favorite = true;
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn kind(&self) -> OperatorKind {
        OperatorKind::classify(&self.operator_type)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameter defaults, skipping parameters without one
    pub fn default_parameters(&self) -> Attributes {
        self.parameters
            .iter()
            .filter_map(|p| p.default.clone().map(|d| (p.name.clone(), d)))
            .collect()
    }

    /// Attributes a freshly created node starts with
    pub fn default_attributes(&self, task_id: impl Into<String>) -> Attributes {
        let task_id: String = task_id.into();
        let mut attributes = Attributes::new();
        attributes.insert("label".into(), self.label.clone().into());
        attributes.insert("task_id".into(), task_id.into());
        attributes.insert("parameters".into(), self.default_parameters().into());
        attributes
    }

    /// Create a node with a fresh random id
    pub fn instantiate(&self) -> DagNode {
        let uuid = Uuid::new_v4().simple().to_string();
        let suffix = &uuid[..8];
        DagNode::new(format!("node_{}", uuid), self.operator_type.clone())
            .with_attributes(self.default_attributes(format!("{}_{}", self.template_id, suffix)))
    }

    /// Create a node with a caller-chosen id
    pub fn instantiate_with_id(&self, node_id: impl Into<String>) -> DagNode {
        let node_id = node_id.into();
        let task_id = format!("{}_{}", self.template_id, node_id);
        DagNode::new(node_id, self.operator_type.clone()).with_attributes(self.default_attributes(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bash() -> OperatorTemplate {
        OperatorTemplate::new("bash_basic", "BashOperator", "Bash Command", OperatorCategory::Bash)
            .favorite()
            .with_parameter(ParameterSpec::required("bash_command", ParameterType::String, "echo hi"))
            .with_parameter(ParameterSpec::optional("env", ParameterType::Object, serde_json::json!({})))
            .with_parameter(ParameterSpec::required_no_default("cwd", ParameterType::String))
    }

    #[test]
    fn test_parameter_helpers() {
        let param = ParameterSpec::required("sql", ParameterType::String, "SELECT 1").with_description("Query");
        assert!(param.required);
        assert_eq!(param.default, Some(serde_json::json!("SELECT 1")));
        assert_eq!(param.description, "Query");
        assert!(!ParameterSpec::optional("x", ParameterType::Integer, 60).required);

        let method = ParameterSpec::optional("method", ParameterType::String, "GET").with_choices(["GET", "POST"]);
        assert_eq!(method.choices, vec!["GET", "POST"]);
        assert!(ParameterSpec::optional_no_default("confirm", ParameterType::Boolean).default.is_none());
    }

    #[test]
    fn test_instantiate() {
        let template = bash();
        let node = template.instantiate();
        assert!(node.id.starts_with("node_"));
        assert_eq!(node.operator_type, "BashOperator");
        assert_eq!(node.attributes["label"], "Bash Command");
        assert!(node.attributes["task_id"].as_str().unwrap().starts_with("bash_basic_"));

        let params = node.attributes["parameters"].as_object().unwrap();
        assert_eq!(params["bash_command"], "echo hi");
        assert!(!params.contains_key("cwd"));

        assert_ne!(template.instantiate().id, node.id);
    }

    #[test]
    fn test_instantiate_with_id() {
        let node = bash().instantiate_with_id("n1");
        assert_eq!(node.id, "n1");
        assert_eq!(node.display_name(), "bash_basic_n1");
    }

    #[test]
    fn test_template_wire_shape() {
        let json = serde_json::to_value(bash()).unwrap();
        assert_eq!(json["templateId"], "bash_basic");
        assert_eq!(json["category"], "bash");
        assert_eq!(json["parameters"][0]["paramType"], "string");
        assert!(json["parameters"][2].get("default").is_none());
        assert!(json["parameters"][0].get("choices").is_none());
    }
}
