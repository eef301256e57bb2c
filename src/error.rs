//! Error types for building, querying and (de)serializing semantic structures.

use thiserror::Error;

/// Errors raised by this crate.
#[derive(Debug, Error)]
pub enum XmrsError {
  /// A structure violates an invariant: missing label, missing intrinsic
  /// variable, duplicate ownership, dangling reference.
  #[error("structural error: {0}")]
  Structure(String),

  /// Malformed serialized input.
  #[error("{}", format_deserialization(.message, .token, .line, .column))]
  Deserialization {
    message: String,
    /// The offending token, if there was one
    token: Option<String>,
    /// 1-based line of the offending token (0 when unknown)
    line: usize,
    /// 1-based column of the offending token (0 when unknown)
    column: usize,
  },

  /// A structure cannot be encoded in the requested form.
  #[error("serialization error: {0}")]
  Serialization(String),

  /// The codec doesn't implement the requested direction.
  #[error("unsupported: {0}")]
  Unsupported(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XmrsError>;

impl XmrsError {
  pub fn structure(message: impl Into<String>) -> Self {
    Self::Structure(message.into())
  }

  /// A deserialization error with no token to point at, like premature
  /// end of input.
  pub fn deserialization(message: impl Into<String>) -> Self {
    Self::Deserialization {
      message: message.into(),
      token: None,
      line: 0,
      column: 0,
    }
  }

  pub fn is_structure(&self) -> bool {
    matches!(self, Self::Structure(_))
  }

  pub fn is_deserialization(&self) -> bool {
    matches!(self, Self::Deserialization { .. })
  }
}

fn format_deserialization(
  message: &str,
  token: &Option<String>,
  line: &usize,
  column: &usize,
) -> String {
  let position = if *line > 0 {
    format!("at {}:{}", line, column)
  } else {
    "at ?:?".to_string()
  };
  match token {
    Some(token) => format!("deserialization error {} (token {:?}): {}", position, token, message),
    None => format!("deserialization error {}: {}", position, message),
  }
}
