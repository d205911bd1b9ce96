//! Provider-specific database operators

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate};

use crate::sql::with_statement_parameters;

pub struct OracleQuery;

impl OperatorDescriptor for OracleQuery {
    fn descriptor() -> OperatorTemplate {
        let template = OperatorTemplate::new("oracle_operator", "OracleOperator", "Oracle", OperatorCategory::Database)
            .with_description("Runs SQL on Oracle Database");
        with_statement_parameters(template, "", "oracle_conn_id", "oracle_default")
    }
}

inventory::submit!(dag_engine::TemplateFn(OracleQuery::descriptor));

/// Microsoft SQL Server, including Azure SQL
pub struct MsSqlQuery;

impl OperatorDescriptor for MsSqlQuery {
    fn descriptor() -> OperatorTemplate {
        let template = OperatorTemplate::new(
            "mssql_operator",
            "MsSqlOperator",
            "MSSQL / Azure SQL",
            OperatorCategory::Database,
        )
        .with_description("Runs SQL on Microsoft SQL Server or Azure SQL");
        with_statement_parameters(template, "", "mssql_conn_id", "mssql_default")
    }
}

inventory::submit!(dag_engine::TemplateFn(MsSqlQuery::descriptor));

pub struct MySqlQuery;

impl OperatorDescriptor for MySqlQuery {
    fn descriptor() -> OperatorTemplate {
        let template = OperatorTemplate::new("mysql_operator", "MySqlOperator", "MySQL", OperatorCategory::Database)
            .with_description("Runs SQL on MySQL");
        with_statement_parameters(template, "", "mysql_conn_id", "mysql_default")
    }
}

inventory::submit!(dag_engine::TemplateFn(MySqlQuery::descriptor));
