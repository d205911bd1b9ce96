//! SFTP transfer operators

use dag_engine::{OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType};

/// Put, get or delete files on an SFTP server
pub struct SftpTransfer;

impl OperatorDescriptor for SftpTransfer {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("sftp_transfer", "SFTPOperator", "SFTP Transfer", OperatorCategory::Transfer)
            .with_description("Transfers files to or from an SFTP server")
            .with_parameter(ParameterSpec::optional_no_default("ssh_conn_id", ParameterType::String))
            .with_parameter(
                ParameterSpec::optional_no_default("remote_host", ParameterType::String)
                    .with_description("Used when the connection has no host"),
            )
            .with_parameter(ParameterSpec::optional_no_default("local_filepath", ParameterType::String))
            .with_parameter(ParameterSpec::required_no_default("remote_filepath", ParameterType::String))
            .with_parameter(
                ParameterSpec::optional("operation", ParameterType::String, "put").with_choices(["put", "get", "delete"]),
            )
            .with_parameter(ParameterSpec::optional_no_default("create_intermediate_dirs", ParameterType::Boolean))
            .with_parameter(ParameterSpec::optional_no_default("confirm", ParameterType::Boolean))
    }
}

inventory::submit!(dag_engine::TemplateFn(SftpTransfer::descriptor));

/// Waits for a remote path to appear
pub struct SftpSensor;

impl OperatorDescriptor for SftpSensor {
    fn descriptor() -> OperatorTemplate {
        OperatorTemplate::new("sftp_sensor", "SFTPSensor", "SFTP Sensor", OperatorCategory::Transfer)
            .with_description("Waits for a file or directory on an SFTP server")
            .with_parameter(ParameterSpec::required_no_default("path", ParameterType::String))
            .with_parameter(
                ParameterSpec::optional_no_default("file_pattern", ParameterType::String)
                    .with_description("fnmatch pattern"),
            )
            .with_parameter(ParameterSpec::optional_no_default("sftp_conn_id", ParameterType::String))
            .with_parameter(ParameterSpec::optional_no_default("newer_than", ParameterType::String))
    }
}

inventory::submit!(dag_engine::TemplateFn(SftpSensor::descriptor));
