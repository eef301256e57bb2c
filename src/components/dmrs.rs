use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use super::{HasLnk, HasNodeId, Lnk, NodeId, Pred, Properties, Sort};
use crate::config::CVARSORT;
use crate::error::{Result, XmrsError};

/// A DMRS node: an EP without variables.
///
/// `sortinfo` holds the sort of the would-be intrinsic variable under
/// the `cvarsort` key, followed by its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
  pub nodeid: NodeId,
  pub pred: Pred,
  pub sortinfo: IndexMap<String, String>,
  pub lnk: Option<Lnk>,
  pub surface: Option<String>,
  pub base: Option<String>,
  pub carg: Option<String>,
}

impl Node {
  pub fn new(nodeid: NodeId, pred: Pred) -> Self {
    Self {
      nodeid,
      pred,
      sortinfo: IndexMap::new(),
      lnk: None,
      surface: None,
      base: None,
      carg: None,
    }
  }

  pub fn with_sortinfo<I, K, V>(mut self, sortinfo: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    self.sortinfo = sortinfo
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .collect();
    self
  }

  pub fn with_lnk(mut self, lnk: Lnk) -> Self {
    self.lnk = Some(lnk);
    self
  }

  pub fn with_carg(mut self, carg: impl Into<String>) -> Self {
    self.carg = Some(carg.into());
    self
  }

  pub fn is_quantifier(&self) -> bool {
    self.pred.is_quantifier()
  }

  pub fn cvarsort(&self) -> Option<&str> {
    self.sortinfo.get(CVARSORT).map(String::as_str)
  }

  /// Sets the cvarsort, keeping it the first sortinfo entry
  pub fn set_cvarsort(&mut self, sort: Sort) {
    self.sortinfo.shift_remove(CVARSORT);
    self.sortinfo.shift_insert(0, CVARSORT.to_string(), sort.to_string());
  }

  /// The sortinfo without its cvarsort
  pub fn properties(&self) -> Properties {
    self
      .sortinfo
      .iter()
      .filter(|(k, _)| k.as_str() != CVARSORT)
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect()
  }

  pub fn get_property(&self, name: &str) -> Option<&str> {
    if name == CVARSORT {
      return None;
    }
    self.sortinfo.get(name).map(String::as_str)
  }
}

impl HasLnk for Node {
  fn lnk(&self) -> Option<&Lnk> {
    self.lnk.as_ref()
  }
}

impl HasNodeId for Node {
  fn nodeid(&self) -> Option<NodeId> {
    Some(self.nodeid)
  }
}

/// What a link says about the scope of its endpoints
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Post {
  /// Same label
  Eq,
  /// The argument is the end node's label
  Heq,
  /// Different labels
  Neq,
  /// The argument is qeq the end node's label
  H,
  Nil,
}

impl Post {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Eq => "EQ",
      Self::Heq => "HEQ",
      Self::Neq => "NEQ",
      Self::H => "H",
      Self::Nil => "NIL",
    }
  }
}

impl FromStr for Post {
  type Err = XmrsError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_uppercase().as_str() {
      "EQ" => Ok(Self::Eq),
      "HEQ" => Ok(Self::Heq),
      "NEQ" => Ok(Self::Neq),
      "H" => Ok(Self::H),
      "NIL" => Ok(Self::Nil),
      _ => Err(XmrsError::structure(format!("invalid link post: {}", s))),
    }
  }
}

impl fmt::Display for Post {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A DMRS link. A start of [`crate::config::LTOP_NODEID`] means the
/// link comes from the top handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
  pub start: NodeId,
  pub end: NodeId,
  pub argname: Option<String>,
  pub post: Post,
}

impl Link {
  pub fn new(start: NodeId, end: NodeId, argname: Option<&str>, post: Post) -> Self {
    Self {
      start,
      end,
      argname: argname.map(str::to_uppercase),
      post,
    }
  }
}

impl fmt::Display for Link {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}/{} -> {}",
      self.start,
      self.argname.as_deref().unwrap_or(""),
      self.post,
      self.end
    )
  }
}
