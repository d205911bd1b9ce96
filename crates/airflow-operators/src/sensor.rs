//! Sensors
//!
//! Tasks that poll until an external condition holds. All of them take a
//! `poke_interval` in seconds.

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};

const POKE_INTERVAL_SECS: i64 = 60;
/// One week
const FILE_SENSOR_TIMEOUT_SECS: i64 = 60 * 60 * 24 * 7;

fn poke_interval() -> ParameterSpec {
    ParameterSpec::optional("poke_interval", ParameterType::Integer, POKE_INTERVAL_SECS)
        .with_description("Seconds between checks")
}

/// Waits for a file to exist
pub struct FileSensor;

impl OperatorDescriptor for FileSensor {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("file_sensor", "FileSensor", "File Sensor", OperatorCategory::Sensor)
            .with_description("Waits until a file exists")
            .with_parameter(ParameterSpec::required("filepath", ParameterType::String, ""))
            .with_parameter(ParameterSpec::optional("fs_conn_id", ParameterType::String, "fs_default"))
            .with_parameter(poke_interval())
            .with_parameter(
                ParameterSpec::optional("timeout", ParameterType::Integer, FILE_SENSOR_TIMEOUT_SECS)
                    .with_description("Seconds before the sensor gives up"),
            )
    }
}

inventory::submit!(dag_engine::TemplateFn(FileSensor::descriptor));

pub struct S3KeySensor;

impl OperatorDescriptor for S3KeySensor {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("s3_key_sensor", "S3KeySensor", "S3 Key Sensor", OperatorCategory::Sensor)
            .with_description("Waits until an S3 key exists")
            .with_parameter(ParameterSpec::required("bucket_key", ParameterType::String, ""))
            .with_parameter(ParameterSpec::required("bucket_name", ParameterType::String, ""))
            .with_parameter(ParameterSpec::optional("aws_conn_id", ParameterType::String, "aws_default"))
            .with_parameter(poke_interval())
    }
}

inventory::submit!(dag_engine::TemplateFn(S3KeySensor::descriptor));

/// Waits for a query to return rows
pub struct SqlSensor;

impl OperatorDescriptor for SqlSensor {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("sql_sensor", "SqlSensor", "SQL Sensor", OperatorCategory::Sensor)
            .with_description("Waits until a SQL query returns results")
            .with_parameter(ParameterSpec::required("sql", ParameterType::String, ""))
            .with_parameter(ParameterSpec::required("conn_id", ParameterType::String, "postgres_default"))
            .with_parameter(poke_interval())
    }
}

inventory::submit!(dag_engine::TemplateFn(SqlSensor::descriptor));

pub struct HttpSensor;

impl OperatorDescriptor for HttpSensor {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("http_sensor", "HttpSensor", "HTTP Sensor", OperatorCategory::Sensor)
            .with_description("Waits until an HTTP endpoint responds")
            .with_parameter(ParameterSpec::required("http_conn_id", ParameterType::String, "http_default"))
            .with_parameter(ParameterSpec::required("endpoint", ParameterType::String, ""))
            .with_parameter(
                ParameterSpec::optional("method", ParameterType::String, "GET")
                    .with_choices(["GET", "POST", "PUT", "DELETE"]),
            )
            .with_parameter(ParameterSpec::optional("expected_response", ParameterType::Integer, 200))
    }
}

inventory::submit!(dag_engine::TemplateFn(HttpSensor::descriptor));
