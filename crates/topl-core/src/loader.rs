//! Source loading
//!
//! Turns a TOML, JSON or YAML document into a [`Value`] tree. The root of
//! every document must be a mapping.

use std::io;
use std::path::Path;

use crate::error::{Error, Result, SourceLocation};
use crate::value::Value;

/// Format of a source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFormat {
    #[default]
    Toml,
    Json,
    Yaml,
}

impl SourceFormat {
    /// Pick a format from the file extension; anything unrecognised is TOML
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => SourceFormat::Json,
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Toml,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Toml => "toml",
            SourceFormat::Json => "json",
            SourceFormat::Yaml => "yaml",
        }
    }
}

/// Parse a TOML document into a tree
pub fn from_toml_str(content: &str) -> Result<Value> {
    parse_str(content, SourceFormat::Toml)
}

/// Parse a document of the given format into a tree
pub fn parse_str(content: &str, format: SourceFormat) -> Result<Value> {
    parse_document(content, format).map_err(|(message, line)| {
        let err = Error::source_malformed(message);
        match line {
            Some(line) => err.with_source_location(SourceLocation {
                file: "<string>".into(),
                line: Some(line),
            }),
            None => err,
        }
    })
}

/// Read and parse a source file, picking the format from its extension
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let file = path.display().to_string();
    let format = SourceFormat::from_path(path);

    log::trace!("Loading {} as {}", file, format.name());

    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::source_not_found(&file),
        io::ErrorKind::InvalidData => Error::source_malformed(format!(
            "File is not valid UTF-8: {}",
            e
        ))
        .with_source_location(SourceLocation {
            file: file.clone(),
            line: None,
        }),
        _ => Error::io(&file, e.to_string()),
    })?;

    let value = parse_document(&content, format).map_err(|(message, line)| {
        Error::source_malformed(message)
            .with_source_location(SourceLocation {
                file: file.clone(),
                line,
            })
            .with_help(format!("Check that '{}' is valid {}", file, format.name()))
    })?;

    log::trace!("Loaded {} ({} bytes)", file, content.len());
    Ok(value)
}

/// Parse into a tree; failures come back as (message, 1-based line)
fn parse_document(
    content: &str,
    format: SourceFormat,
) -> std::result::Result<Value, (String, Option<usize>)> {
    let value = match format {
        SourceFormat::Toml => {
            let table: toml::Table = toml::from_str(content).map_err(|e| {
                let line = e.span().map(|span| line_of(content, span.start));
                (e.message().to_string(), line)
            })?;
            Value::from(toml::Value::Table(table))
        }
        SourceFormat::Json => serde_json::from_str::<Value>(content)
            .map_err(|e| (e.to_string(), Some(e.line()).filter(|line| *line > 0)))?,
        SourceFormat::Yaml => match serde_yaml::from_str::<Value>(content) {
            // An empty YAML document is an empty mapping
            Ok(Value::Null) => Value::Mapping(Default::default()),
            Ok(value) => value,
            Err(e) => {
                let line = e.location().map(|loc| loc.line());
                return Err((e.to_string(), line));
            }
        },
    };

    if !value.is_mapping() {
        return Err((
            format!("Document root must be a table, got {}", value.type_name()),
            None,
        ));
    }
    Ok(value)
}

fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}
