use std::fmt;

use super::{HasNodeId, NodeId, Sort, Variable};
use crate::config::IVARG_ROLE;
use crate::xmrs::Xmrs;

/// The value of an argument: a variable, or a literal such as the name `Kim`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgValue {
  Var(Variable),
  Const(String),
}

impl ArgValue {
  pub fn var(&self) -> Option<&Variable> {
    match self {
      Self::Var(v) => Some(v),
      _ => None,
    }
  }

  pub fn constant(&self) -> Option<&str> {
    match self {
      Self::Const(c) => Some(c),
      _ => None,
    }
  }
}

impl From<Variable> for ArgValue {
  fn from(v: Variable) -> Self {
    Self::Var(v)
  }
}

impl fmt::Display for ArgValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Var(v) => write!(f, "{}", v),
      Self::Const(c) => write!(f, "{}", c),
    }
  }
}

/// What an argument's value means structurally
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArgumentType {
  /// The ARG0 of a predication
  Intrinsic,
  /// A non-handle variable
  Variable,
  /// A handle whose role can't be decided without a structure
  Handle,
  /// A hole: the hi side of a handle constraint
  HandleConstraint,
  /// A handle naming a scope label directly
  Label,
  Constant,
}

/// A role/value pair, optionally anchored to the node that owns it.
///
/// Role names are stored upper case. Two arguments are equal when role
/// and value match and, if both are anchored, the anchors match too.
#[derive(Debug, Clone)]
pub struct Argument {
  pub nodeid: Option<NodeId>,
  pub argname: String,
  pub value: ArgValue,
}

impl Argument {
  pub fn new(nodeid: Option<NodeId>, argname: impl AsRef<str>, value: impl Into<ArgValue>) -> Self {
    Self {
      nodeid,
      argname: argname.as_ref().to_uppercase(),
      value: value.into(),
    }
  }

  /// An argument contained in its EP, as in MRS
  pub fn mrs_argument(argname: impl AsRef<str>, value: impl Into<ArgValue>) -> Self {
    Self::new(None, argname, value)
  }

  /// An argument pointing at its EP's anchor, as in RMRS
  pub fn rmrs_argument(
    anchor: &Variable,
    argname: impl AsRef<str>,
    value: impl Into<ArgValue>,
  ) -> Self {
    Self::new(Some(anchor.vid), argname, value)
  }

  pub fn constant(nodeid: Option<NodeId>, argname: impl AsRef<str>, value: impl Into<String>) -> Self {
    Self::new(nodeid, argname, ArgValue::Const(value.into()))
  }

  pub fn is_intrinsic(&self) -> bool {
    self.argname == IVARG_ROLE
  }

  /// Classifies the argument. Telling holes from labels takes a
  /// structure; without one, handles are just [`ArgumentType::Handle`].
  pub fn infer_type(&self, xmrs: Option<&Xmrs>) -> ArgumentType {
    if self.argname == IVARG_ROLE {
      return ArgumentType::Intrinsic;
    }
    match &self.value {
      ArgValue::Const(_) => ArgumentType::Constant,
      ArgValue::Var(v) if v.sort == Sort::Handle => match xmrs {
        Some(x) if x.get_hcons(v).is_some() => ArgumentType::HandleConstraint,
        Some(_) => ArgumentType::Label,
        None => ArgumentType::Handle,
      },
      ArgValue::Var(_) => ArgumentType::Variable,
    }
  }
}

impl PartialEq for Argument {
  fn eq(&self, other: &Self) -> bool {
    let anchors_match = match (self.nodeid, other.nodeid) {
      (Some(a), Some(b)) => a == b,
      _ => true,
    };
    anchors_match && self.argname == other.argname && self.value == other.value
  }
}

impl HasNodeId for Argument {
  fn nodeid(&self) -> Option<NodeId> {
    self.nodeid
  }
}

impl fmt::Display for Argument {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.argname, self.value)
  }
}
