//! Error types for srcsync
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Expected non-existence conditions (missing working copy, unresolvable ref,
//! unreachable remote) are never errors: the status evaluator folds them into
//! its three-valued result. Only tool and transport malfunction surfaces here.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for srcsync operations
#[derive(Error, Diagnostic, Debug)]
pub enum SyncError {
    // Tool errors
    #[error("'{tool}' not found on PATH")]
    #[diagnostic(
        code(srcsync::tool::missing),
        help("Install {tool} and retry; srcsync delegates all version control work to it")
    )]
    ToolMissing { tool: &'static str },

    #[error("Failed to run '{tool}': {reason}")]
    #[diagnostic(code(srcsync::tool::spawn_failed))]
    ToolSpawnFailed { tool: &'static str, reason: String },

    #[error("Unexpected output for ref '{reference}': {reason}")]
    #[diagnostic(code(srcsync::tool::ref_parse_failed))]
    RefParseFailed { reference: String, reason: String },

    // Transfer errors
    #[error("Failed to fetch source '{name}': {reason}")]
    #[diagnostic(
        code(srcsync::fetch::transfer_failed),
        help("Check that the upstream URL is correct and you have access to it")
    )]
    TransferFailed { name: String, reason: String },

    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(code(srcsync::fetch::download_failed))]
    DownloadFailed { url: String, reason: String },

    // Pin record errors
    #[error("Failed to parse commit pin record: {reason}")]
    #[diagnostic(code(srcsync::pins::parse_failed))]
    PinParseFailed { reason: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(srcsync::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(err: serde_yaml::Error) -> Self {
        SyncError::PinParseFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::ToolMissing { tool: "hg" };
        assert_eq!(err.to_string(), "'hg' not found on PATH");
    }

    #[test]
    fn test_error_code() {
        let err = SyncError::ToolMissing { tool: "git" };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("srcsync::tool::missing".to_string())
        );
    }

    #[test]
    fn test_transfer_failed_display() {
        let err = SyncError::TransferFailed {
            name: "libfoo".to_string(),
            reason: "git exited with exit status: 128".to_string(),
        };
        assert!(err.to_string().contains("Failed to fetch source 'libfoo'"));
        assert!(err.to_string().contains("exit status: 128"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sync_err: SyncError = io_err.into();
        assert!(matches!(sync_err, SyncError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "commits: [unclosed";
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str(yaml_str);
        let yaml_err = parse_result.unwrap_err();
        let sync_err: SyncError = yaml_err.into();
        assert!(matches!(sync_err, SyncError::PinParseFailed { .. }));
    }
}
