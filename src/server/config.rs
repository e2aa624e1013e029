use std::path::PathBuf;

use super::RequestsLoggingLevel;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Only this origin gets CORS headers; any origin when unset.
    pub allowed_origin: Option<String>,
    /// JSON document served verbatim by `/api/form-data`.
    pub form_data_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 7860,
            metrics_port: 9091,
            allowed_origin: None,
            form_data_path: None,
        }
    }
}
