//! Unified error handling for the rpo-console library.
//!
//! Every failure a webhook or an editor operation can produce is expressed
//! as one variant here. Most variants never reach the caller: the fetch and
//! mapping pipelines catch them at their own boundary and degrade to
//! fallback data. The only blocking errors are `NoUsableRecords` and
//! `SaveFailed` (see the policy notes on [`ScenarioFetcher`] and
//! [`MappingStore`]).
//!
//! [`ScenarioFetcher`]: crate::fetch::ScenarioFetcher
//! [`MappingStore`]: crate::mapping::store::MappingStore

use std::fmt;

/// Unified error type for rpo-console operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleError {
    /// Connection failure, elapsed timeout, or non-2xx status from a webhook
    Network {
        message: String,
        status_code: Option<u16>,
    },
    /// Response body was not valid JSON, or did not match the expected shape
    MalformedResponse { message: String },
    /// Backend answered but explicitly reported failure for the request
    DomainFailure { message: String },
    /// One of the two paired calls in a mapping load failed
    PartialLoad {
        failed_call: String,
        message: String,
    },
    /// Every requested scenario resolved to no usable record
    NoUsableRecords { requested: usize },
    /// Save rejected by a live (non-simulated) backend
    SaveFailed { message: String },
    /// `add_new` attempted on a system field that is already mapped
    FieldAlreadyMapped { field: String },
    /// `add_new` attempted with a field outside the entity vocabulary
    UnknownSystemField { field: String },
    /// `add_new` attempted with an empty field or header
    EmptyMappingEntry,
    /// Client construction or configuration error
    Config { message: String },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Network {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "HTTP {}: {}", code, message)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            ConsoleError::MalformedResponse { message } => {
                write!(f, "Malformed response: {}", message)
            }
            ConsoleError::DomainFailure { message } => {
                write!(f, "{}", message)
            }
            ConsoleError::PartialLoad {
                failed_call,
                message,
            } => {
                write!(f, "Load failed ({}): {}", failed_call, message)
            }
            ConsoleError::NoUsableRecords { requested } => {
                write!(
                    f,
                    "Could not retrieve scenario data ({} requested)",
                    requested
                )
            }
            ConsoleError::SaveFailed { message } => {
                write!(f, "Save operation failed: {}", message)
            }
            ConsoleError::FieldAlreadyMapped { field } => {
                write!(f, "System field '{}' is already mapped", field)
            }
            ConsoleError::UnknownSystemField { field } => {
                write!(f, "'{}' is not a known system field", field)
            }
            ConsoleError::EmptyMappingEntry => {
                write!(f, "Both a system field and a raw header are required")
            }
            ConsoleError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConsoleError {}

/// Result type alias for rpo-console operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;
