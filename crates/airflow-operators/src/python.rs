//! Python operators
//!
//! `BranchPythonOperator` is the only operator whose nodes fan out through
//! `true`/`false` outlets.

use dag_engine::{
    OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType, BRANCH_OPERATOR,
};
use serde_json::json;

/// Conditional fan-out
///
/// The callable returns the task id to follow; the two outlets carry the
/// downstream chains for each outcome.
pub struct Branch;

impl OperatorDescriptor for Branch {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("branch_operator", BRANCH_OPERATOR, "Branch", OperatorCategory::Python)
            .with_description("Follows one of two downstream paths based on a Python condition")
            .favorite()
            .with_parameter(
                ParameterSpec::required(
                    "python_callable",
                    ParameterType::String,
                    "def branch_func(**context):\n    return 'task_a'  # or 'task_b'",
                )
                .with_description("Returns the task id to run next"),
            )
            .with_parameter(ParameterSpec::optional("follow_task_ids_if_true", ParameterType::Array, json!([])))
            .with_parameter(ParameterSpec::optional("follow_task_ids_if_false", ParameterType::Array, json!([])))
    }
}

inventory::submit!(dag_engine::TemplateFn(Branch::descriptor));

pub struct PythonFunction;

impl OperatorDescriptor for PythonFunction {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("python_operator", "PythonOperator", "Python Function", OperatorCategory::Python)
            .with_description("Calls a Python function")
            .with_parameter(ParameterSpec::required_no_default("python_callable", ParameterType::Function))
            .with_parameter(
                ParameterSpec::optional_no_default("op_kwargs", ParameterType::Object)
                    .with_description("Keyword arguments passed to the callable"),
            )
    }
}

inventory::submit!(dag_engine::TemplateFn(PythonFunction::descriptor));

/// Skips everything downstream when the callable returns false
pub struct ShortCircuit;

impl OperatorDescriptor for ShortCircuit {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new(
            "shortcircuit_operator",
            "ShortCircuitOperator",
            "Short Circuit",
            OperatorCategory::Python,
        )
        .with_description("Stops downstream tasks when a condition is false")
        .with_parameter(ParameterSpec::required_no_default("python_callable", ParameterType::Function))
    }
}

inventory::submit!(dag_engine::TemplateFn(ShortCircuit::descriptor));
