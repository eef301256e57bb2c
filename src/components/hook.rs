use super::Variable;

/// Structure-level variables not owned by any single EP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hook {
  pub ltop: Option<Variable>,
  pub index: Option<Variable>,
  pub xarg: Option<Variable>,
}

impl Hook {
  pub fn new(ltop: Option<Variable>, index: Option<Variable>) -> Self {
    Self {
      ltop,
      index,
      xarg: None,
    }
  }

  pub fn with_xarg(mut self, xarg: Variable) -> Self {
    self.xarg = Some(xarg);
    self
  }
}
