//! Serialization formats.
//!
//! Each format is a unit struct implementing [`XmrsReader`] and/or
//! [`XmrsWriter`]; the format modules also expose `loads`/`dumps` style
//! functions for direct use.

pub mod simpledmrs;
pub mod simplemrs;

use std::fmt;
use std::io::{Read, Write};

use tracing::debug;

use crate::error::{Result, XmrsError};
use crate::xmrs::Xmrs;

pub use simpledmrs::SimpleDmrs;
pub use simplemrs::SimpleMrs;

/// SimpleMRS notation version
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Version {
  /// `LTOP:`, no structure lnk/surface, no ICONS
  V1_0,
  #[default]
  V1_1,
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::V1_0 => write!(f, "1.0"),
      Self::V1_1 => write!(f, "1.1"),
    }
  }
}

/// Turns plain serialized text into colored text
pub type Highlighter = fn(&str) -> String;

#[derive(Debug, Copy, Clone, Default)]
pub struct WriteOptions {
  pub pretty_print: bool,
  /// Only has an effect with a `highlighter`
  pub color: bool,
  pub version: Version,
  pub highlighter: Option<Highlighter>,
}

impl WriteOptions {
  pub fn pretty() -> Self {
    Self {
      pretty_print: true,
      ..Self::default()
    }
  }

  pub fn with_version(mut self, version: Version) -> Self {
    self.version = version;
    self
  }

  pub fn with_color(mut self, highlighter: Option<Highlighter>) -> Self {
    self.color = true;
    self.highlighter = highlighter;
    self
  }

  /// Applies the highlighter if color was asked for. Without one the
  /// text comes back unchanged.
  pub(crate) fn colorize(&self, text: String) -> String {
    if !self.color {
      return text;
    }
    match self.highlighter {
      Some(highlight) => highlight(&text),
      None => {
        debug!("color requested but no highlighter is available; writing plain text");
        text
      }
    }
  }
}

/// Wraps `s` in double quotes, escaping `"` and `\`
pub(crate) fn quote(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 2);
  out.push('"');
  for c in s.chars() {
    if c == '"' || c == '\\' {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('"');
  out
}

/// Strips the quotes (double or single) around `s` and resolves
/// backslash escapes. Unquoted input comes back unchanged.
pub(crate) fn unquote(s: &str) -> String {
  let inner = match s.chars().next() {
    Some(q @ ('"' | '\'')) if s.len() >= 2 && s.ends_with(q) => &s[1..s.len() - 1],
    _ => return s.to_string(),
  };
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(escaped) = chars.next() {
        out.push(escaped);
      }
    } else {
      out.push(c);
    }
  }
  out
}

pub trait XmrsReader {
  /// Lazily decodes every structure in `s`. The iterator stops after the
  /// first error.
  fn decode(&self, s: &str) -> Result<Box<dyn Iterator<Item = Result<Xmrs>>>>;

  /// Decodes the first structure in `s`; fails if there is none
  fn decode_one(&self, s: &str) -> Result<Xmrs> {
    self
      .decode(s)?
      .next()
      .unwrap_or_else(|| Err(XmrsError::deserialization("no structures to read")))
  }

  fn read(&self, source: &mut dyn Read) -> Result<Box<dyn Iterator<Item = Result<Xmrs>>>> {
    let mut s = String::new();
    source.read_to_string(&mut s)?;
    self.decode(&s)
  }
}

pub trait XmrsWriter {
  fn encode(&self, ms: &[Xmrs], options: &WriteOptions) -> Result<String>;

  fn encode_one(&self, m: &Xmrs, options: &WriteOptions) -> Result<String> {
    self.encode(std::slice::from_ref(m), options)
  }

  /// Encodes `ms` and writes it followed by a newline
  fn write(&self, sink: &mut dyn Write, ms: &[Xmrs], options: &WriteOptions) -> Result<()> {
    let s = self.encode(ms, options)?;
    writeln!(sink, "{}", s)?;
    Ok(())
  }
}

/// A format known by name, for callers that pick one at runtime
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
  SimpleMrs,
  SimpleDmrs,
}

impl Format {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_lowercase().as_str() {
      "simplemrs" | "mrs" => Some(Self::SimpleMrs),
      "simpledmrs" | "dmrs" => Some(Self::SimpleDmrs),
      _ => None,
    }
  }

  pub fn reader(&self) -> &'static dyn XmrsReader {
    match self {
      Self::SimpleMrs => &SimpleMrs,
      Self::SimpleDmrs => &SimpleDmrs,
    }
  }

  pub fn writer(&self) -> &'static dyn XmrsWriter {
    match self {
      Self::SimpleMrs => &SimpleMrs,
      Self::SimpleDmrs => &SimpleDmrs,
    }
  }
}
