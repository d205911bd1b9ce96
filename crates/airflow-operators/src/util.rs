//! General-purpose operators

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};

/// Placeholder task that does nothing
pub struct DummyOperator;

impl OperatorDescriptor for DummyOperator {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("dummy_operator", "DummyOperator", "Dummy Task", OperatorCategory::Util)
            .with_description("Does nothing; marks a point in the DAG")
    }
}

inventory::submit!(dag_engine::TemplateFn(DummyOperator::descriptor));

/// Bash command, offered in the common section of the palette
pub struct BashCommand;

impl OperatorDescriptor for BashCommand {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("bash_operator", "BashOperator", "Bash Command", OperatorCategory::Util)
            .with_description("Runs a bash command on the worker")
            .favorite()
            .with_parameter(ParameterSpec::required_no_default("bash_command", ParameterType::String))
    }
}

inventory::submit!(dag_engine::TemplateFn(BashCommand::descriptor));

/// Successor of `DummyOperator`, used to mark the start or end of a flow
pub struct EmptyOperator;

impl OperatorDescriptor for EmptyOperator {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("empty_operator", "EmptyOperator", "Empty Task", OperatorCategory::Util)
            .with_description("Does nothing; marks the start or end of a flow")
    }
}

inventory::submit!(dag_engine::TemplateFn(EmptyOperator::descriptor));

pub struct TriggerDag;

impl OperatorDescriptor for TriggerDag {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new(
            "trigger_dag_operator",
            "TriggerDagRunOperator",
            "Trigger DAG",
            OperatorCategory::Util,
        )
        .with_description("Starts a run of another DAG")
        .with_parameter(
            ParameterSpec::required_no_default("trigger_dag_id", ParameterType::String)
                .with_description("Id of the DAG to trigger"),
        )
    }
}

inventory::submit!(dag_engine::TemplateFn(TriggerDag::descriptor));
