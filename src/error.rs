//! Error types for `GoToApp`
//!
//! This module defines all error types used throughout the crate. Item-level
//! errors (`IconDecodeError`, `IconNotFoundError`, `IconResolveError`,
//! `LaunchError`) are recovered by the operation that owns them and only show
//! up in logs or response values. `EnumerationError` is the one batch-fatal
//! failure: it aborts a scan and is published alongside an empty snapshot.
//!
//! Error variants use `#[source]` to preserve error chains for better
//! observability and debugging.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Failure reported by the process-execution collaborator
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The program could not be started (missing binary, permission denied)
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child process failed
    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        /// Program being waited on
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The child did not exit before the deadline and was killed
    #[error("`{program}` timed out after {}ms", .timeout.as_millis())]
    TimedOut {
        /// Program that timed out
        program: String,
        /// Timeout that elapsed
        timeout: Duration,
    },
}

/// Failure reported by the file-read collaborator
#[derive(Debug, Error)]
pub enum FileReadError {
    /// No file exists at the path
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// The listing command failed, so the whole scan has no candidates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    /// The listing command could not be executed
    #[error("listing command `{command}` could not run: {reason}")]
    CommandFailed {
        /// Rendered listing command
        command: String,
        /// Collaborator failure message
        reason: String,
    },

    /// The listing command exited with a nonzero status
    #[error("listing command `{command}` exited with {}: {stderr}", .code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit {
        /// Rendered listing command
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error (trimmed)
        stderr: String,
    },

    /// The listing command hung past the enumeration timeout
    #[error("listing command `{command}` timed out after {timeout_ms}ms")]
    TimedOut {
        /// Rendered listing command
        command: String,
        /// Enumeration timeout in milliseconds
        timeout_ms: u64,
    },
}

/// A malformed or truncated icon container
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IconDecodeError {
    /// The buffer is shorter than the 8-byte container header
    #[error("icon container too short: {len} bytes")]
    TooShort {
        /// Buffer length
        len: usize,
    },

    /// The first four bytes are not the container magic
    #[error("bad icon container magic: {found:02x?}")]
    BadMagic {
        /// Bytes found in place of the magic
        found: [u8; 4],
    },

    /// The header declares a total length below the header size
    #[error("icon container declares invalid total length {declared}")]
    InvalidTotalLength {
        /// Declared total length
        declared: u32,
    },

    /// The header declares more bytes than the buffer holds
    #[error("icon container truncated: declares {declared} bytes, holds {actual}")]
    Truncated {
        /// Declared total length
        declared: u32,
        /// Actual buffer length
        actual: usize,
    },

    /// Fewer than 8 bytes remain where a chunk header should start
    #[error("truncated chunk header at offset {offset}")]
    TruncatedChunkHeader {
        /// Offset of the incomplete header
        offset: usize,
    },

    /// A chunk declares a length smaller than its own header
    #[error("chunk `{tag}` at offset {offset} declares invalid length {length}")]
    InvalidChunkLength {
        /// Printable chunk tag
        tag: String,
        /// Offset of the chunk header
        offset: usize,
        /// Declared chunk length
        length: u32,
    },

    /// A chunk's payload runs past the end of the container
    #[error("chunk `{tag}` at offset {offset} overruns container: length {length}, remaining {remaining}")]
    ChunkOverrun {
        /// Printable chunk tag
        tag: String,
        /// Offset of the chunk header
        offset: usize,
        /// Declared chunk length
        length: u32,
        /// Bytes left in the container from the chunk header onward
        remaining: usize,
    },
}

/// The icon file referenced by a candidate does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("icon not found: {}", .0.display())]
pub struct IconNotFoundError(pub PathBuf);

/// Why a single candidate's icon degraded to absent
#[derive(Debug, Error)]
pub enum IconResolveError {
    /// The icon file is missing
    #[error(transparent)]
    NotFound(#[from] IconNotFoundError),

    /// The icon file exists but could not be read
    #[error("failed to read icon {}: {source}", .path.display())]
    Read {
        /// Icon path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The icon container is malformed
    #[error("failed to decode icon {}: {source}", .path.display())]
    Decode {
        /// Icon path
        path: PathBuf,
        /// Decoder failure
        #[source]
        source: IconDecodeError,
    },
}

/// The open command for an application failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// An empty path was given
    #[error("no application path given")]
    EmptyPath,

    /// The open command could not be executed
    #[error("launch command `{command}` could not run: {reason}")]
    CommandFailed {
        /// Rendered launch command
        command: String,
        /// Collaborator failure message
        reason: String,
    },

    /// The open command exited with a nonzero status
    #[error("launch command `{command}` exited with {}: {stderr}", .code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit {
        /// Rendered launch command
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error (trimmed)
        stderr: String,
    },

    /// The open command hung past the launch timeout
    #[error("launch command `{command}` timed out after {timeout_ms}ms")]
    TimedOut {
        /// Rendered launch command
        command: String,
        /// Launch timeout in milliseconds
        timeout_ms: u64,
    },
}

/// Main error type for `GoToApp`
#[derive(Debug, Error)]
pub enum GotoAppError {
    /// The running OS has no platform policy
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Application enumeration failed
    #[error("Enumeration failed: {0}")]
    Enumeration(#[from] EnumerationError),

    /// Icon container decoding failed
    #[error("Icon decoding failed: {0}")]
    IconDecode(#[from] IconDecodeError),

    /// Icon file missing
    #[error(transparent)]
    IconNotFound(#[from] IconNotFoundError),

    /// Launching an application failed
    #[error("Launch failed: {0}")]
    Launch(#[from] LaunchError),

    /// Process execution failed
    #[error("Process execution failed: {0}")]
    Execution(#[from] ExecutionError),

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The icon worker pool could not be built
    #[error("Failed to build icon worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for `GoToApp` operations
pub type Result<T> = std::result::Result<T, GotoAppError>;

/// Convert an error to a user-friendly message
///
/// Returns text suitable for showing in the UI shell or on the terminal,
/// with a short hint on how to resolve common issues.
pub fn get_user_friendly_error(error: &GotoAppError) -> String {
    match error {
        GotoAppError::UnsupportedPlatform(os) => format!(
            "GoToApp does not support this operating system ({os}).\n\n\
             Supported platforms are macOS, Windows and Linux desktops."
        ),
        GotoAppError::Enumeration(e) => format!(
            "No applications found.\n\n\
             The application listing could not be read:\n{e}"
        ),
        GotoAppError::IconDecode(_) | GotoAppError::IconNotFound(_) => {
            "The application icon could not be loaded.\n\n\
             A default icon is shown instead. This does not affect launching."
                .to_string()
        }
        GotoAppError::Launch(e) => format!(
            "The application could not be opened.\n\n{e}\n\n\
             It may have been moved or uninstalled."
        ),
        GotoAppError::Execution(e) => format!(
            "A system command failed:\n\n{e}\n\n\
             Please check that the command is installed and on your PATH."
        ),
        GotoAppError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to the GoToApp data directory."
            .to_string(),
        GotoAppError::WorkerPool(e) => format!(
            "GoToApp could not start its background workers:\n\n{e}\n\n\
             Try lowering `worker_limit` in the configuration."
        ),
        GotoAppError::IoError(e) => format!(
            "A file system error occurred:\n\n{e}\n\n\
             Please check file permissions and disk space."
        ),
        GotoAppError::JsonError(e) => format!(
            "Configuration file is corrupted:\n\n{e}\n\n\
             The application will use default settings."
        ),
    }
}
