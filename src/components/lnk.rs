use std::fmt;

use super::{NodeId, Variable};

/// An alignment from a semantic unit back to the source utterance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lnk {
  /// Character span `<from:to>`
  CharSpan(i64, i64),
  /// Chart vertex span `<from#to>`
  ChartSpan(i64, i64),
  /// Token indices `<1 2 3>`
  Tokens(Vec<i64>),
  /// Edge id `<@5>`
  Edge(i64),
}

impl fmt::Display for Lnk {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::CharSpan(from, to) => write!(f, "<{}:{}>", from, to),
      Self::ChartSpan(from, to) => write!(f, "<{}#{}>", from, to),
      Self::Tokens(tokens) => {
        write!(f, "<")?;
        for (idx, t) in tokens.iter().enumerate() {
          if idx > 0 {
            write!(f, " ")?;
          }
          write!(f, "{}", t)?;
        }
        write!(f, ">")
      }
      Self::Edge(e) => write!(f, "<@{}>", e),
    }
  }
}

/// Serializes an optional lnk; absence is the empty string
pub fn lnk_str(lnk: Option<&Lnk>) -> String {
  lnk.map(|l| l.to_string()).unwrap_or_default()
}

/// Anything that may be aligned to the surface string.
///
/// A missing lnk, or one that isn't a character span, gives the span
/// (-1, -1).
pub trait HasLnk {
  fn lnk(&self) -> Option<&Lnk>;

  fn cfrom(&self) -> i64 {
    match self.lnk() {
      Some(Lnk::CharSpan(from, _)) => *from,
      _ => -1,
    }
  }

  fn cto(&self) -> i64 {
    match self.lnk() {
      Some(Lnk::CharSpan(_, to)) => *to,
      _ => -1,
    }
  }
}

/// Anything that may be owned by (anchored to) a node.
pub trait HasNodeId {
  fn nodeid(&self) -> Option<NodeId>;

  /// The RMRS anchor: a handle-sorted variable whose vid is the nodeid
  fn anchor(&self) -> Option<Variable> {
    self.nodeid().map(Variable::handle)
  }
}
