use std::cmp::Ordering;
use std::fmt;

use super::{
  lnk_str, ArgValue, Argument, HasLnk, HasNodeId, Lnk, NodeId, Pred, Properties, Variable,
};
use crate::config::{CONSTARG_ROLE, IVARG_ROLE};

/// A single predication: a predicate, its scope label, and its arguments.
#[derive(Debug, Clone)]
pub struct ElementaryPredication {
  pub nodeid: Option<NodeId>,
  pub pred: Pred,
  pub label: Variable,
  pub args: Vec<Argument>,
  pub lnk: Option<Lnk>,
  pub surface: Option<String>,
  pub base: Option<String>,
}

impl ElementaryPredication {
  pub fn new(pred: Pred, label: Variable) -> Self {
    Self {
      nodeid: None,
      pred,
      label,
      args: Vec::new(),
      lnk: None,
      surface: None,
      base: None,
    }
  }

  pub fn with_nodeid(mut self, nodeid: NodeId) -> Self {
    self.nodeid = Some(nodeid);
    self
  }

  /// Sets the nodeid from an RMRS anchor variable
  pub fn with_anchor(mut self, anchor: &Variable) -> Self {
    self.nodeid = Some(anchor.vid);
    self
  }

  pub fn with_args<I: IntoIterator<Item = Argument>>(mut self, args: I) -> Self {
    self.args = args.into_iter().collect();
    self
  }

  pub fn with_lnk(mut self, lnk: Lnk) -> Self {
    self.lnk = Some(lnk);
    self
  }

  pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
    self.surface = Some(surface.into());
    self
  }

  pub fn with_base(mut self, base: impl Into<String>) -> Self {
    self.base = Some(base.into());
    self
  }

  pub fn is_quantifier(&self) -> bool {
    self.pred.is_quantifier()
  }

  pub fn get_arg(&self, argname: &str) -> Option<&Argument> {
    self
      .args
      .iter()
      .find(|a| a.argname.eq_ignore_ascii_case(argname))
  }

  pub fn arg_value(&self, argname: &str) -> Option<&ArgValue> {
    self.get_arg(argname).map(|a| &a.value)
  }

  fn arg0(&self) -> Option<&Variable> {
    self.arg_value(IVARG_ROLE).and_then(ArgValue::var)
  }

  /// The intrinsic variable. Quantifiers don't have one; see [`Self::bv`].
  pub fn iv(&self) -> Option<&Variable> {
    if self.is_quantifier() {
      None
    } else {
      self.arg0()
    }
  }

  /// The bound variable of a quantifier
  pub fn bv(&self) -> Option<&Variable> {
    if self.is_quantifier() {
      self.arg0()
    } else {
      None
    }
  }

  pub fn carg(&self) -> Option<&str> {
    self.arg_value(CONSTARG_ROLE).and_then(ArgValue::constant)
  }

  /// Canonical order: predicate, then label, then arguments. Nodeids
  /// don't take part.
  pub fn canonical_cmp(&self, other: &Self) -> Ordering {
    let key = |ep: &Self| {
      ep.args
        .iter()
        .map(|a| (a.argname.clone(), a.value.clone()))
        .collect::<Vec<_>>()
    };
    self
      .pred
      .cmp(&other.pred)
      .then_with(|| self.label.cmp(&other.label))
      .then_with(|| key(self).cmp(&key(other)))
  }

  /// Properties of the intrinsic variable, if there is one
  pub fn properties(&self) -> Properties {
    self
      .iv()
      .map(|iv| iv.properties.clone())
      .unwrap_or_default()
  }
}

impl HasLnk for ElementaryPredication {
  fn lnk(&self) -> Option<&Lnk> {
    self.lnk.as_ref()
  }
}

impl HasNodeId for ElementaryPredication {
  fn nodeid(&self) -> Option<NodeId> {
    self.nodeid
  }
}

impl PartialEq for ElementaryPredication {
  fn eq(&self, other: &Self) -> bool {
    self.pred == other.pred && self.label == other.label && self.args == other.args
  }
}

impl PartialOrd for ElementaryPredication {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.canonical_cmp(other))
  }
}

impl fmt::Display for ElementaryPredication {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[ {}{} LBL: {}", self.pred, lnk_str(self.lnk()), self.label)?;
    for arg in self.args.iter() {
      write!(f, " {}", arg)?;
    }
    write!(f, " ]")
  }
}
