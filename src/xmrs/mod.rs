//! The semantic structure shared by the MRS, RMRS and DMRS views.
//!
//! An [`Xmrs`] wraps an [`XmrsGraph`] built by [`build_graph`]. Every
//! notation is a projection of the same graph: [`Xmrs::eps`] and
//! [`Xmrs::hcons`] give the MRS view, [`Xmrs::args`] the RMRS view, and
//! [`Xmrs::nodes`] with [`Xmrs::links`] the DMRS view.

mod check;
mod construct;
mod graph;
mod scope;
mod transform;

use std::collections::BTreeSet;

pub use graph::{build_graph, Edge, EdgeKind, VarId, Vertex, XmrsGraph};

use crate::components::{
  Argument, ElementaryPredication, HandleConstraint, Hook, IndividualConstraint, Lnk, Node,
  NodeId, Variable,
};
use crate::config::{CONSTARG_ROLE, CVARSORT};
use graph::ArgSlot;

/// A semantic structure
#[derive(Debug, Clone)]
pub struct Xmrs {
  graph: XmrsGraph,
  pub lnk: Option<Lnk>,
  pub surface: Option<String>,
  pub identifier: Option<String>,
}

impl Xmrs {
  fn from_graph(graph: XmrsGraph) -> Self {
    Self {
      graph,
      lnk: None,
      surface: None,
      identifier: None,
    }
  }

  pub fn with_lnk(mut self, lnk: Lnk) -> Self {
    self.lnk = Some(lnk);
    self
  }

  pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
    self.surface = Some(surface.into());
    self
  }

  pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
    self.identifier = Some(identifier.into());
    self
  }

  pub fn graph(&self) -> &XmrsGraph {
    &self.graph
  }

  pub fn hook(&self) -> Hook {
    Hook {
      ltop: self.ltop(),
      index: self.index(),
      xarg: self.xarg(),
    }
  }

  pub fn ltop(&self) -> Option<Variable> {
    self.graph.ltop.map(|vid| self.graph.var(vid))
  }

  /// Same as [`Self::ltop`]
  pub fn top(&self) -> Option<Variable> {
    self.ltop()
  }

  pub fn index(&self) -> Option<Variable> {
    self.graph.index.map(|vid| self.graph.var(vid))
  }

  pub fn xarg(&self) -> Option<Variable> {
    self.graph.xarg.map(|vid| self.graph.var(vid))
  }

  /// Nodeids in registration order
  pub fn nodeids(&self) -> &[NodeId] {
    self.graph.nodeids()
  }

  pub fn anchors(&self) -> Vec<Variable> {
    self
      .nodeids()
      .iter()
      .map(|nid| Variable::handle(*nid))
      .collect()
  }

  /// Every variable in the structure, sorted
  pub fn variables(&self) -> Vec<Variable> {
    let mut vars = self
      .graph
      .variables
      .keys()
      .map(|vid| self.graph.var(*vid))
      .collect::<Vec<_>>();
    vars.sort();
    vars
  }

  /// Intrinsic variables, labels and the hi sides of handle constraints
  pub fn introduced_variables(&self) -> Vec<Variable> {
    let mut vids = self
      .graph
      .variables
      .iter()
      .filter(|(_, data)| data.introduced_by.is_some())
      .map(|(vid, _)| *vid)
      .collect::<BTreeSet<_>>();
    vids.extend(self.graph.labels.iter().copied());
    vids.extend(self.graph.hcons.keys().copied());
    self.sorted_vars(vids)
  }

  pub fn intrinsic_variables(&self) -> Vec<Variable> {
    let vids = self
      .graph
      .variables
      .iter()
      .filter(|(_, data)| data.introduced_by.is_some())
      .map(|(vid, _)| *vid);
    self.sorted_vars(vids)
  }

  pub fn bound_variables(&self) -> Vec<Variable> {
    let vids = self
      .graph
      .variables
      .iter()
      .filter(|(_, data)| data.bound_by.is_some())
      .map(|(vid, _)| *vid);
    self.sorted_vars(vids)
  }

  pub fn labels(&self) -> Vec<Variable> {
    self.sorted_vars(self.graph.labels.iter().copied())
  }

  fn sorted_vars(&self, vids: impl IntoIterator<Item = VarId>) -> Vec<Variable> {
    let mut vars = vids
      .into_iter()
      .map(|vid| self.graph.var(vid))
      .collect::<Vec<_>>();
    vars.sort();
    vars
  }

  pub fn get_ep(&self, nodeid: NodeId) -> Option<ElementaryPredication> {
    let data = self.graph.eps.get(&nodeid)?;
    Some(ElementaryPredication {
      nodeid: Some(nodeid),
      pred: data.pred.clone(),
      label: self.graph.var(data.label),
      args: self.arg_list(nodeid, None),
      lnk: data.lnk.clone(),
      surface: data.surface.clone(),
      base: data.base.clone(),
    })
  }

  /// EPs in nodeid registration order
  pub fn eps(&self) -> Vec<ElementaryPredication> {
    self
      .nodeids()
      .iter()
      .filter_map(|nid| self.get_ep(*nid))
      .collect()
  }

  /// The arguments of one EP, anchored to it
  pub fn args(&self, nodeid: NodeId) -> Vec<Argument> {
    self.arg_list(nodeid, Some(nodeid))
  }

  fn arg_list(&self, nodeid: NodeId, anchor: Option<NodeId>) -> Vec<Argument> {
    match self.graph.eps.get(&nodeid) {
      Some(data) => data
        .args
        .iter()
        .map(|(role, slot)| Argument::new(anchor, role, self.graph.arg_value(slot)))
        .collect(),
      None => Vec::new(),
    }
  }

  pub fn get_arg(&self, nodeid: NodeId, argname: &str) -> Option<Argument> {
    let data = self.graph.eps.get(&nodeid)?;
    data
      .args
      .iter()
      .find(|(role, _)| role.eq_ignore_ascii_case(argname))
      .map(|(role, slot)| Argument::new(Some(nodeid), role, self.graph.arg_value(slot)))
  }

  /// The DMRS view of one EP. Quantifiers get no sortinfo since they
  /// don't own their ARG0.
  pub fn get_node(&self, nodeid: NodeId) -> Option<Node> {
    let data = self.graph.eps.get(&nodeid)?;
    let mut node = Node::new(nodeid, data.pred.clone());
    node.lnk = data.lnk.clone();
    node.surface = data.surface.clone();
    node.base = data.base.clone();

    if !data.pred.is_quantifier() {
      let iv = data.args.iter().find_map(|(_, slot)| match slot {
        ArgSlot::Var(vid) if self.graph.introduced_by(*vid) == Some(nodeid) => {
          Some(self.graph.var(*vid))
        }
        _ => None,
      });
      if let Some(iv) = iv {
        node.sortinfo.insert(CVARSORT.to_string(), iv.sort.to_string());
        node.sortinfo.extend(iv.properties);
      }
    }

    node.carg = data.args.iter().find_map(|(role, slot)| match slot {
      ArgSlot::Const(c) if role == CONSTARG_ROLE => Some(c.clone()),
      _ => None,
    });
    Some(node)
  }

  pub fn nodes(&self) -> Vec<Node> {
    self
      .nodeids()
      .iter()
      .filter_map(|nid| self.get_node(*nid))
      .collect()
  }

  /// Handle constraints, sorted by their hi handle
  pub fn hcons(&self) -> Vec<HandleConstraint> {
    self
      .graph
      .hcons
      .iter()
      .map(|(hi, (relation, lo))| {
        HandleConstraint::new(self.graph.var(*hi), *relation, self.graph.var(*lo))
      })
      .collect()
  }

  /// The handle constraint whose hi side is `hi`
  pub fn get_hcons(&self, hi: &Variable) -> Option<HandleConstraint> {
    if !hi.is_handle() {
      return None;
    }
    let (relation, lo) = self.graph.hcons.get(&hi.vid)?;
    Some(HandleConstraint::new(
      self.graph.var(hi.vid),
      *relation,
      self.graph.var(*lo),
    ))
  }

  /// Individual constraints, sorted by target
  pub fn icons(&self) -> Vec<IndividualConstraint> {
    let mut icons = self
      .graph
      .icons
      .iter()
      .map(|(target, relation, clause)| {
        IndividualConstraint::new(
          self.graph.var(*target),
          relation.clone(),
          self.graph.var(*clause),
        )
      })
      .collect::<Vec<_>>();
    icons.sort_by_key(|ic| ic.target.vid);
    icons
  }

  /// The EP whose intrinsic variable is `iv`, or the quantifier binding
  /// it when `quantifier` is set
  pub fn get_nodeid(&self, iv: &Variable, quantifier: bool) -> Option<NodeId> {
    let data = self.graph.variables.get(&iv.vid)?;
    if data.sort != iv.sort {
      return None;
    }
    if quantifier {
      self.graph.bound_by(iv.vid)
    } else {
      self.graph.introduced_by(iv.vid)
    }
  }
}

/// Structural equality: same hook, and the same EPs once both sides are
/// put in canonical order. Nodeids don't matter.
impl PartialEq for Xmrs {
  fn eq(&self, other: &Self) -> bool {
    if self.hook() != other.hook() {
      return false;
    }
    let mut a = self.eps();
    let mut b = other.eps();
    if a.len() != b.len() {
      return false;
    }
    a.sort_by(|x, y| x.canonical_cmp(y));
    b.sort_by(|x, y| x.canonical_cmp(y));
    a == b
  }
}
