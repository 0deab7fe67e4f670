use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("required column '{column}' is missing from {path}")]
    MissingColumn { column: String, path: String },

    #[error("input {path} is empty: no header row")]
    EmptyInput { path: String },

    #[error("unsupported table format for {path}: expected .csv or .json")]
    UnsupportedFormat { path: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON input {path} must be an array of objects: {reason}")]
    JsonShape { path: String, reason: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}
