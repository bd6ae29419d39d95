//! Placeholder matching and substitution
//!
//! A placeholder is `{{` + one or more characters other than `{` and `}` +
//! `}}`. The text between the braces, trimmed, is the reference. There is
//! no nesting and no escape syntax; stray braces are plain text.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::params::ParamSource;
use crate::value::Value;

/// Regex source for a single placeholder occurrence
pub const PLACEHOLDER_PATTERN: &str = r"\{\{([^{}]+)\}\}";

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern compiles"))
}

/// One placeholder occurrence inside a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The full match, delimiters included (e.g. `{{ name }}`)
    pub literal: &'a str,
    /// The trimmed inner reference (e.g. `name`)
    pub reference: &'a str,
    /// Byte range of `literal` within the scanned text
    pub span: Range<usize>,
}

/// Find every placeholder in `text`, left to right, non-overlapping
pub fn placeholders(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    placeholder_regex().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        Some(Placeholder {
            literal: whole.as_str(),
            reference: inner.as_str().trim(),
            span: whole.range(),
        })
    })
}

/// Check if a string contains any placeholder
pub fn contains_placeholder(text: &str) -> bool {
    placeholder_regex().is_match(text)
}

/// Outcome of substituting placeholders in one string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution<'a> {
    /// The resulting text (borrowed when nothing was replaced)
    pub text: Cow<'a, str>,
    /// How many placeholder occurrences were replaced
    pub replaced: usize,
}

impl<'a> Substitution<'a> {
    fn unchanged(text: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            replaced: 0,
        }
    }

    /// Whether any placeholder was replaced
    pub fn is_changed(&self) -> bool {
        self.replaced > 0
    }
}

fn substitute_with<'a, F>(text: &'a str, mut resolve: F) -> Substitution<'a>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::new();
    let mut last = 0;
    let mut replaced = 0;

    for placeholder in placeholders(text) {
        if let Some(value) = resolve(placeholder.reference) {
            out.push_str(&text[last..placeholder.span.start]);
            out.push_str(&value);
            last = placeholder.span.end;
            replaced += 1;
        }
    }

    if replaced == 0 {
        return Substitution::unchanged(text);
    }

    out.push_str(&text[last..]);
    Substitution {
        text: Cow::Owned(out),
        replaced,
    }
}

/// Replace placeholders whose reference resolves inside `root`.
///
/// Every occurrence is looked up against the same, unmodified `root`.
/// Missing paths and null values leave the placeholder as it was; anything
/// else is replaced by its display form.
pub fn substitute_internal<'a>(text: &'a str, root: &Value) -> Substitution<'a> {
    substitute_with(text, |reference| {
        root.lookup(reference)
            .filter(|value| !value.is_null())
            .map(ToString::to_string)
    })
}

/// Replace placeholders whose whole reference is a key in `params`
pub fn substitute_external<'a, P>(text: &'a str, params: &P) -> Substitution<'a>
where
    P: ParamSource + ?Sized,
{
    if params.is_empty() {
        return Substitution::unchanged(text);
    }
    substitute_with(text, |reference| params.get_param(reference).map(str::to_owned))
}
