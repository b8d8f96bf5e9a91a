use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors surfaced by the stores, the cartridge loader and the engine.
#[derive(Debug)]
pub enum CartError {
    /// A mutating call addressed a coordinate outside a store's extent.
    OutOfBounds {
        /// Which store rejected the write ("sprite sheet", "map", ...)
        what: &'static str,
        /// Requested x
        x: i32,
        /// Requested y
        y: i32,
        /// Store width at the time of the call
        width: u32,
        /// Store height at the time of the call
        height: u32,
    },
    /// Cartridge data is missing fields or has mismatched lengths
    MalformedCartridge(String),
    /// `canvas(n)` selected a display layer that does not exist
    NoSuchCanvas(usize),
    /// JSON parse error, with the file it came from when known
    Json {
        /// Source file, if the data was read from disk
        path: Option<PathBuf>,
        /// Underlying serde error
        source: serde_json::Error,
    },
    /// File I/O error
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// Cartridge files must be JSON
    UnsupportedFormat(String),
}

impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartError::OutOfBounds {
                what,
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "({x}, {y}) is outside the {what} ({width}x{height})"
            ),
            CartError::MalformedCartridge(msg) => write!(f, "Malformed cartridge: {msg}"),
            CartError::NoSuchCanvas(n) => write!(f, "No canvas layer {n}"),
            CartError::Json {
                path: Some(path),
                source,
            } => write!(f, "Failed to parse JSON in {}: {}", path.display(), source),
            CartError::Json { path: None, source } => {
                write!(f, "Failed to parse JSON: {}", source)
            }
            CartError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            CartError::UnsupportedFormat(path) => {
                write!(f, "Unsupported cartridge format: {}", path)
            }
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(source: serde_json::Error) -> Self {
        CartError::Json { path: None, source }
    }
}

impl std::error::Error for CartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartError::Json { source, .. } => Some(source),
            CartError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
