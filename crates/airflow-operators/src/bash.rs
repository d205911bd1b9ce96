//! Bash operators
//!
//! Both templates create `BashOperator` nodes; they differ only in the
//! starting parameters.

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};
use serde_json::json;

/// A single bash command
pub struct BashBasic;

impl OperatorDescriptor for BashBasic {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("bash_basic", "BashOperator", "Bash Command", OperatorCategory::Bash)
            .with_description("Runs a simple bash command")
            .with_parameter(ParameterSpec::required(
                "bash_command",
                ParameterType::String,
                "echo 'Hello from Airflow'",
            ))
            .with_parameter(
                ParameterSpec::optional("env", ParameterType::Object, json!({}))
                    .with_description("Extra environment variables"),
            )
            .with_parameter(
                ParameterSpec::optional("cwd", ParameterType::String, "").with_description("Working directory"),
            )
    }
}

inventory::submit!(dag_engine::TemplateFn(BashBasic::descriptor));

/// An inline script or a path to one
pub struct BashScript;

impl OperatorDescriptor for BashScript {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("bash_script", "BashOperator", "Bash Script", OperatorCategory::Bash)
            .with_description("Runs a bash script")
            .with_parameter(
                ParameterSpec::required("bash_command", ParameterType::String, "")
                    .with_description("Script body or path to the script"),
            )
            .with_parameter(ParameterSpec::optional("env", ParameterType::Object, json!({})))
    }
}

inventory::submit!(dag_engine::TemplateFn(BashScript::descriptor));
