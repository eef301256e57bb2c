use std::fmt;
use std::str::FromStr;

use super::Variable;
use crate::error::{Result, XmrsError};

/// Relation of a handle constraint
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HconsRelation {
  Qeq,
  Lheq,
  Outscopes,
}

impl HconsRelation {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Qeq => "qeq",
      Self::Lheq => "lheq",
      Self::Outscopes => "outscopes",
    }
  }
}

/// Case-insensitive: `QEQ`, `Qeq` and `qeq` are all [`HconsRelation::Qeq`]
impl FromStr for HconsRelation {
  type Err = XmrsError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "qeq" => Ok(Self::Qeq),
      "lheq" => Ok(Self::Lheq),
      "outscopes" => Ok(Self::Outscopes),
      _ => Err(XmrsError::structure(format!(
        "invalid handle constraint relation: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for HconsRelation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// `hi relation lo`, both sides handles
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleConstraint {
  pub hi: Variable,
  pub relation: HconsRelation,
  pub lo: Variable,
}

impl HandleConstraint {
  pub fn new(hi: Variable, relation: HconsRelation, lo: Variable) -> Self {
    Self { hi, relation, lo }
  }

  pub fn qeq(hi: Variable, lo: Variable) -> Self {
    Self::new(hi, HconsRelation::Qeq, lo)
  }
}

impl fmt::Display for HandleConstraint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.hi, self.relation, self.lo)
  }
}

/// `target relation clause`, e.g. information-structure constraints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndividualConstraint {
  pub target: Variable,
  pub relation: String,
  pub clause: Variable,
}

impl IndividualConstraint {
  pub fn new(target: Variable, relation: impl Into<String>, clause: Variable) -> Self {
    Self {
      target,
      relation: relation.into(),
      clause,
    }
  }
}

impl fmt::Display for IndividualConstraint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.target, self.relation, self.clause)
  }
}
