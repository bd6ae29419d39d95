//! Error types for topl
//!
//! Errors carry a kind plus optional context: the config path involved,
//! the source location, the underlying cause and an actionable help line.
//! Unresolved placeholders are not errors; they are reported on
//! [`ResolvedConfig`](crate::ResolvedConfig).

use std::fmt;

/// Result type alias for topl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for topl operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Path in the config where the error occurred (e.g., "database.port")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Internal resolution did not reach a fixed point within the pass ceiling
    #[error("Circular reference detected after {passes} passes")]
    CircularReference { passes: usize },
    /// The source document does not exist
    #[error("Source not found")]
    SourceNotFound,
    /// The source document could not be parsed
    #[error("Source malformed")]
    SourceMalformed,
    /// Any other I/O failure while reading a source
    #[error("I/O error")]
    Io,
    /// Accessor path does not exist in the resolved tree
    #[error("Path not found")]
    PathNotFound,
    /// Typed accessor could not convert the value
    #[error("Type coercion failed")]
    TypeCoercion,
    /// Rendering the resolved tree failed
    #[error("Serialization failed")]
    Serialize,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a circular reference error
    ///
    /// `pending` lists the leaves still being rewritten on the final pass.
    pub fn circular_reference(passes: usize, pending: &[String]) -> Self {
        let mut err = Self::new(ErrorKind::CircularReference { passes });
        if !pending.is_empty() {
            err.cause = Some(format!("Still rewriting: {}", pending.join(", ")));
        }
        err.help = Some(
            "Break the circular dependency by removing one of the references, \
             or raise max_passes if the nesting is legitimately this deep"
                .into(),
        );
        err
    }

    /// Create a source not found error
    pub fn source_not_found(file: impl Into<String>) -> Self {
        let file = file.into();
        let mut err = Self::new(ErrorKind::SourceNotFound);
        err.help = Some(format!("Check that '{}' exists and is readable", file));
        err.source_location = Some(SourceLocation { file, line: None });
        err
    }

    /// Create a malformed source error
    pub fn source_malformed(message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::SourceMalformed);
        err.cause = Some(message.into());
        err
    }

    /// Create an I/O error
    pub fn io(file: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Io);
        err.source_location = Some(SourceLocation {
            file: file.into(),
            line: None,
        });
        err.cause = Some(message.into());
        err
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        let path_str = path.into();
        let mut err = Self::new(ErrorKind::PathNotFound);
        err.help = Some(format!(
            "Check that '{}' exists in the configuration",
            path_str
        ));
        err.path = Some(path_str);
        err
    }

    /// Create a type coercion error
    pub fn type_coercion(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        let mut err = Self::new(ErrorKind::TypeCoercion);
        err.path = Some(path.into());
        err.help = Some(format!(
            "Ensure the value can be converted to {}",
            expected.into()
        ));
        err.cause = Some(format!("Got: {}", got.into()));
        err
    }

    /// Create a serialization error
    pub fn serialize(format: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Serialize);
        err.cause = Some(format!("{}: {}", format, message.into()));
        err
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// True for the one fatal outcome of a resolve call
    pub fn is_circular_reference(&self) -> bool {
        matches!(self.kind, ErrorKind::CircularReference { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_reference_error_display() {
        let err = Error::circular_reference(10, &["a".into(), "b".into()]);
        let display = format!("{}", err);

        assert!(display.contains("Circular reference detected after 10 passes"));
        assert!(display.contains("Still rewriting: a, b"));
        assert!(display.contains("Help:"));
        assert!(err.is_circular_reference());
    }

    #[test]
    fn test_circular_reference_without_pending() {
        let err = Error::circular_reference(3, &[]);
        assert_eq!(err.kind, ErrorKind::CircularReference { passes: 3 });
        assert!(err.cause.is_none());
    }

    #[test]
    fn test_source_not_found_display() {
        let err = Error::source_not_found("/etc/missing.toml");
        let display = format!("{}", err);

        assert!(display.starts_with("Source not found"));
        assert!(display.contains("File: /etc/missing.toml"));
        assert!(display.contains("Check that '/etc/missing.toml' exists"));
    }

    #[test]
    fn test_source_malformed_with_location() {
        let err = Error::source_malformed("expected `=`").with_source_location(SourceLocation {
            file: "app.toml".into(),
            line: Some(3),
        });
        let display = format!("{}", err);

        assert!(display.contains("Source malformed"));
        assert!(display.contains("app.toml:3"));
        assert!(display.contains("expected `=`"));
        assert!(!err.is_circular_reference());
    }

    #[test]
    fn test_path_not_found_error() {
        let err = Error::path_not_found("database.host");

        assert_eq!(err.kind, ErrorKind::PathNotFound);
        assert_eq!(err.path, Some("database.host".into()));
    }

    #[test]
    fn test_type_coercion_error() {
        let err = Error::type_coercion("server.port", "integer", "string");
        let display = format!("{}", err);

        assert!(display.contains("Type coercion failed"));
        assert!(display.contains("Path: server.port"));
        assert!(display.contains("Got: string"));
    }

    #[test]
    fn test_with_help_overrides() {
        let err = Error::io("a.toml", "permission denied").with_help("Run as another user");
        let display = format!("{}", err);

        assert!(display.contains("I/O error"));
        assert!(display.contains("permission denied"));
        assert!(display.contains("Help: Run as another user"));
    }

    #[test]
    fn test_serialize_error() {
        let err = Error::serialize("toml", "unsupported None value");
        assert_eq!(err.kind, ErrorKind::Serialize);
        assert!(err.to_string().contains("toml: unsupported None value"));
    }
}
