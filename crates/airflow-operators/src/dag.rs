//! DAG definition block
//!
//! The root of every graph. Its parameters become the arguments of the
//! generated `DAG(...)` context.

use dag_engine::{
    OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType, ROOT_OPERATOR,
};
use serde_json::json;

/// DAG Definition
///
/// Holds the schedule, tags and default task arguments. The editor creates
/// one automatically when the first task is dropped into an empty canvas.
pub struct DagDefinition;

impl OperatorDescriptor for DagDefinition {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("dag_definition", ROOT_OPERATOR, "DAG Definition", OperatorCategory::Definition)
            .with_description("Defines an Airflow DAG and the arguments shared by all of its tasks")
            .with_parameter(
                ParameterSpec::required("dag_id", ParameterType::String, "my_dag").with_description("Unique DAG id"),
            )
            .with_parameter(ParameterSpec::optional("description", ParameterType::String, ""))
            .with_parameter(
                ParameterSpec::optional("schedule_interval", ParameterType::String, "@daily")
                    .with_description("Cron expression or preset such as '@hourly'"),
            )
            .with_parameter(ParameterSpec::optional("tags", ParameterType::Array, json!([])))
            .with_parameter(
                ParameterSpec::optional(
                    "default_args",
                    ParameterType::Object,
                    json!({
                        "owner": "airflow",
                        "email": "",
                        "retries": 1,
                        "retry_delay": "timedelta(minutes=5)",
                    }),
                )
                .with_description("Arguments applied to every task in the DAG"),
            )
            .with_parameter(
                ParameterSpec::optional("catchup", ParameterType::Boolean, false)
                    .with_description("Backfill runs missed since the start date"),
            )
            .with_parameter(ParameterSpec::optional("max_active_runs", ParameterType::Integer, 1))
            .with_parameter(
                ParameterSpec::optional("concurrency", ParameterType::Integer, 16)
                    .with_description("Maximum tasks running at once"),
            )
    }
}

inventory::submit!(dag_engine::TemplateFn(DagDefinition::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let node = DagDefinition::descriptor().instantiate();
        assert!(node.is_root());

        let params = &node.attributes["parameters"];
        assert_eq!(params["dag_id"], "my_dag");
        assert_eq!(params["schedule_interval"], "@daily");
        assert_eq!(params["default_args"]["retries"], 1);
        assert_eq!(params["catchup"], false);
    }
}
