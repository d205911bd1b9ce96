//! SQL operators

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};
use serde_json::json;

/// Append the parameters shared by every SQL-statement operator
///
/// `conn_param` is the provider-specific connection field name.
pub(crate) fn with_statement_parameters(
    template: OperatorTemplate,
    sql_default: &str,
    conn_param: &str,
    conn_default: &str,
) -> OperatorTemplate {
    template
        .with_parameter(ParameterSpec::required("sql", ParameterType::String, sql_default))
        .with_parameter(
            ParameterSpec::required(conn_param, ParameterType::String, conn_default)
                .with_description("Airflow connection id"),
        )
        .with_parameter(
            ParameterSpec::optional("parameters", ParameterType::Object, json!({}))
                .with_description("Values bound into the statement"),
        )
        .with_parameter(ParameterSpec::optional("autocommit", ParameterType::Boolean, false))
}

/// Database-agnostic query through a generic SQL connection
pub struct SqlExecute;

impl OperatorDescriptor for SqlExecute {
    fn descriptor() -> OperatorTemplate {
        let template = OperatorTemplate::new("sql_execute", "SQLExecuteQueryOperator", "SQL Execute", OperatorCategory::Sql)
            .with_description("Runs a SQL query on any supported database");
        with_statement_parameters(template, "SELECT 1", "conn_id", "postgres_default")
    }
}

inventory::submit!(dag_engine::TemplateFn(SqlExecute::descriptor));

pub struct PostgresQuery;

impl OperatorDescriptor for PostgresQuery {
    fn descriptor() -> OperatorTemplate {
        let template = OperatorTemplate::new("postgres_operator", "PostgresOperator", "PostgreSQL", OperatorCategory::Sql)
            .with_description("Runs SQL on PostgreSQL");
        with_statement_parameters(template, "", "postgres_conn_id", "postgres_default").with_parameter(
            ParameterSpec::optional("database", ParameterType::String, "")
                .with_description("Overrides the database of the connection"),
        )
    }
}

inventory::submit!(dag_engine::TemplateFn(PostgresQuery::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_parameters() {
        let template = SqlExecute::descriptor();
        let names: Vec<&str> = template.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sql", "conn_id", "parameters", "autocommit"]);
        assert_eq!(template.default_parameters()["sql"], "SELECT 1");
    }

    #[test]
    fn test_postgres_connection_field() {
        let template = PostgresQuery::descriptor();
        assert!(template.parameter("postgres_conn_id").is_some_and(|p| p.required));
        assert!(template.parameter("conn_id").is_none());
        assert!(template.parameter("database").is_some());
    }
}
