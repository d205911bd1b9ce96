//! Google Cloud operators
//!
//! BigQuery jobs and Cloud Storage copies. Operators that talk to GCP
//! directly take a `gcp_conn_id` connection.

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};
use serde_json::json;

const GCP_CONN_DEFAULT: &str = "google_cloud_default";

fn gcp_conn_id() -> ParameterSpec {
    ParameterSpec::required("gcp_conn_id", ParameterType::String, GCP_CONN_DEFAULT)
}

fn write_disposition() -> ParameterSpec {
    ParameterSpec::optional("write_disposition", ParameterType::String, "WRITE_EMPTY")
        .with_choices(["WRITE_EMPTY", "WRITE_TRUNCATE", "WRITE_APPEND"])
        .with_description("What to do when the destination table exists")
}

pub struct BigQuery;

impl OperatorDescriptor for BigQuery {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("bigquery_operator", "BigQueryOperator", "BigQuery", OperatorCategory::GoogleCloud)
            .with_description("Runs a SQL query in BigQuery")
            .with_parameter(ParameterSpec::required("sql", ParameterType::String, ""))
            .with_parameter(gcp_conn_id())
            .with_parameter(
                ParameterSpec::optional("use_legacy_sql", ParameterType::Boolean, false)
                    .with_description("Standard SQL unless set"),
            )
            .with_parameter(
                ParameterSpec::optional("destination_dataset_table", ParameterType::String, "")
                    .with_description("project.dataset.table"),
            )
            .with_parameter(write_disposition())
    }
}

inventory::submit!(dag_engine::TemplateFn(BigQuery::descriptor));

/// Load Cloud Storage objects into a BigQuery table
pub struct GcsToBigQuery;

impl OperatorDescriptor for GcsToBigQuery {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new(
            "gcs_to_bigquery",
            "GCSToBigQueryOperator",
            "GCS to BigQuery",
            OperatorCategory::GoogleCloud,
        )
        .with_description("Loads data from Cloud Storage into BigQuery")
        .with_parameter(ParameterSpec::required("bucket", ParameterType::String, ""))
        .with_parameter(ParameterSpec::required("source_objects", ParameterType::Array, json!([])))
        .with_parameter(ParameterSpec::required(
            "destination_project_dataset_table",
            ParameterType::String,
            "",
        ))
        .with_parameter(
            ParameterSpec::optional("source_format", ParameterType::String, "CSV")
                .with_choices(["CSV", "JSON", "AVRO", "PARQUET", "ORC"]),
        )
        .with_parameter(write_disposition())
    }
}

inventory::submit!(dag_engine::TemplateFn(GcsToBigQuery::descriptor));

/// Export a BigQuery table to Cloud Storage
pub struct BigQueryToGcs;

impl OperatorDescriptor for BigQueryToGcs {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new(
            "bigquery_to_gcs",
            "BigQueryToGCSOperator",
            "BigQuery to GCS",
            OperatorCategory::GoogleCloud,
        )
        .with_description("Exports a BigQuery table to Cloud Storage")
        .with_parameter(ParameterSpec::required("source_project_dataset_table", ParameterType::String, ""))
        .with_parameter(ParameterSpec::required(
            "destination_cloud_storage_uris",
            ParameterType::Array,
            json!([]),
        ))
        .with_parameter(
            ParameterSpec::optional("export_format", ParameterType::String, "CSV")
                .with_choices(["CSV", "JSON", "AVRO", "PARQUET"]),
        )
        .with_parameter(gcp_conn_id())
    }
}

inventory::submit!(dag_engine::TemplateFn(BigQueryToGcs::descriptor));

pub struct GcsCopy;

impl OperatorDescriptor for GcsCopy {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("gcs_copy", "GCSToGCSOperator", "GCS Copy", OperatorCategory::GoogleCloud)
            .with_description("Copies objects within Cloud Storage")
            .with_parameter(ParameterSpec::required("source_bucket", ParameterType::String, ""))
            .with_parameter(
                ParameterSpec::required("source_object", ParameterType::String, "")
                    .with_description("May contain * wildcards"),
            )
            .with_parameter(ParameterSpec::required("destination_bucket", ParameterType::String, ""))
            .with_parameter(
                ParameterSpec::optional("destination_object", ParameterType::String, "")
                    .with_description("Defaults to the source name"),
            )
            .with_parameter(gcp_conn_id())
    }
}

inventory::submit!(dag_engine::TemplateFn(GcsCopy::descriptor));
