use std::io;
use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`TrendsError`]
pub type Result<T> = std::result::Result<T, TrendsError>;

/// The Error variants used throughout the autotrends crate.
/// Lower level errors from third party crates are wrapped by the `#[from]` variants.
#[derive(Error, Debug)]
pub enum TrendsError {
    /// a query was made while the structured namespace holds no records.
    /// This is advisory: the API reports it with a success status
    #[error("No data in db. Post data to get info")]
    EmptyStore,

    /// a source row is missing one of the fields that make up its composite key
    #[error("row {row} is missing required field `{field}`")]
    MalformedRow {
        /// zero based position of the row in its source
        row: usize,
        /// the missing field name
        field: String,
    },

    /// a chart was requested before it was rendered
    #[error("Plot not found: {0}")]
    ArtifactNotFound(String),

    /// a field required for plotting is neither numeric nor the sentinel
    #[error("could not parse field `{field}` value `{value}` as a number")]
    FieldParse {
        /// the field name
        field: String,
        /// the raw value found in the record
        value: String,
    },

    /// the renderer failed to produce an artifact
    #[error("render error: {0}")]
    Render(String),

    /// a backend reported a failure that is not covered by a typed variant
    #[error("backend error: {0}")]
    Backend(String),

    /// variant for errors caused from IO
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// serde_json (de)serialization error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// error while reading a CSV source
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// a CSV document uploaded by a client could not be read
    #[error("invalid upload: {0}")]
    BadUpload(#[source] csv::Error),

    /// error from the sled backend
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// error from the redis backend
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// invalid command line or query parameter
    #[error("parsing error: {0}")]
    Parsing(String),

    /// an error message returned by a remote autotrends server
    #[error("{0}")]
    StringErr(String),
}
