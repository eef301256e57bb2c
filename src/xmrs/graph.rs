use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::components::{
  ArgValue, ElementaryPredication, HandleConstraint, HconsRelation, Hook, IndividualConstraint,
  Lnk, NodeId, Pred, Properties, Sort, Variable,
};
use crate::config::LTOP_NODEID;
use crate::error::{Result, XmrsError};

/// Vid of an interned variable
pub type VarId = u32;

/// A vertex of the structure graph. The top handle hangs off
/// `Vertex::Node(LTOP_NODEID)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Vertex {
  Node(NodeId),
  Var(VarId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
  /// top node -> top handle
  Top,
  /// label -> EP
  Label,
  /// EP -> argument value
  Role(String),
  /// hi -> lo
  Hcons(HconsRelation),
  /// target -> clause
  Icons(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
  pub source: Vertex,
  pub target: Vertex,
  pub kind: EdgeKind,
}

/// Argument value as stored in the graph: an index into the variable
/// table, or a constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgSlot {
  Var(VarId),
  Const(String),
}

#[derive(Debug, Clone)]
pub(crate) struct EpData {
  pub pred: Pred,
  pub label: VarId,
  pub args: Vec<(String, ArgSlot)>,
  pub lnk: Option<Lnk>,
  pub surface: Option<String>,
  pub base: Option<String>,
}

/// An entry of the variable table, with its back-references
#[derive(Debug, Clone)]
pub(crate) struct VarData {
  pub sort: Sort,
  pub properties: Properties,
  /// The non-quantifier EP this is the intrinsic variable of
  pub introduced_by: Option<NodeId>,
  /// The quantifier binding this variable
  pub bound_by: Option<NodeId>,
}

/// The owned graph behind an [`crate::xmrs::Xmrs`].
///
/// Records reference variables by vid; the variable table is the only
/// place a variable's sort and properties live, so every holder sees a
/// property update.
#[derive(Debug, Clone, Default)]
pub struct XmrsGraph {
  pub(crate) nodeids: Vec<NodeId>,
  pub(crate) eps: HashMap<NodeId, EpData>,
  pub(crate) variables: BTreeMap<VarId, VarData>,
  pub(crate) labels: BTreeSet<VarId>,
  /// keyed by the hi handle
  pub(crate) hcons: BTreeMap<VarId, (HconsRelation, VarId)>,
  pub(crate) icons: Vec<(VarId, String, VarId)>,
  pub(crate) ltop: Option<VarId>,
  pub(crate) index: Option<VarId>,
  pub(crate) xarg: Option<VarId>,
  edges: Vec<Edge>,
}

impl XmrsGraph {
  pub fn nodeids(&self) -> &[NodeId] {
    &self.nodeids
  }

  pub fn edges(&self) -> &[Edge] {
    &self.edges
  }

  /// Every vertex touched by an edge, plus every EP
  pub fn vertices(&self) -> BTreeSet<Vertex> {
    let mut vs = self
      .nodeids
      .iter()
      .map(|nid| Vertex::Node(*nid))
      .collect::<BTreeSet<_>>();
    for e in self.edges.iter() {
      vs.insert(e.source);
      vs.insert(e.target);
    }
    vs
  }

  /// Rebuilds a variable from the table, properties included
  pub(crate) fn var(&self, vid: VarId) -> Variable {
    match self.variables.get(&vid) {
      Some(data) => Variable {
        vid,
        sort: data.sort,
        properties: data.properties.clone(),
      },
      // every vid stored in the graph was interned
      None => Variable::new(vid, Sort::Unknown),
    }
  }

  /// The non-quantifier EP whose intrinsic variable is `vid`
  pub(crate) fn introduced_by(&self, vid: VarId) -> Option<NodeId> {
    self.variables.get(&vid).and_then(|v| v.introduced_by)
  }

  pub(crate) fn bound_by(&self, vid: VarId) -> Option<NodeId> {
    self.variables.get(&vid).and_then(|v| v.bound_by)
  }

  pub(crate) fn arg_value(&self, slot: &ArgSlot) -> ArgValue {
    match slot {
      ArgSlot::Var(vid) => ArgValue::Var(self.var(*vid)),
      ArgSlot::Const(c) => ArgValue::Const(c.clone()),
    }
  }

  /// Adds a variable to the table or merges its properties into the
  /// existing entry. A vid may only ever have one sort.
  fn intern(&mut self, v: &Variable) -> Result<VarId> {
    match self.variables.get_mut(&v.vid) {
      Some(data) => {
        if data.sort != v.sort {
          return Err(XmrsError::structure(format!(
            "variable {} conflicts with {}{}",
            v, data.sort, v.vid
          )));
        }
        for (k, val) in v.properties.iter() {
          data.properties.insert(k.clone(), val.clone());
        }
      }
      None => {
        self.variables.insert(
          v.vid,
          VarData {
            sort: v.sort,
            properties: v.properties.clone(),
            introduced_by: None,
            bound_by: None,
          },
        );
      }
    }
    Ok(v.vid)
  }

  fn add_edge(&mut self, source: Vertex, target: Vertex, kind: EdgeKind) {
    self.edges.push(Edge {
      source,
      target,
      kind,
    });
  }

  fn add_ep(&mut self, ep: &ElementaryPredication) -> Result<()> {
    let nid = ep.nodeid.ok_or_else(|| {
      XmrsError::structure(format!("EP {} has no nodeid", ep.pred))
    })?;
    if nid == LTOP_NODEID {
      return Err(XmrsError::structure(format!(
        "nodeid {} is reserved for the top handle",
        LTOP_NODEID
      )));
    }
    if self.eps.contains_key(&nid) {
      return Err(XmrsError::structure(format!("duplicate nodeid {}", nid)));
    }
    if !ep.label.is_handle() {
      return Err(XmrsError::structure(format!(
        "label {} of EP {} is not a handle",
        ep.label, nid
      )));
    }

    let label = self.intern(&ep.label)?;
    self.labels.insert(label);
    self.add_edge(Vertex::Var(label), Vertex::Node(nid), EdgeKind::Label);

    let mut args = Vec::with_capacity(ep.args.len());
    for arg in ep.args.iter() {
      let slot = match &arg.value {
        ArgValue::Var(v) => {
          let vid = self.intern(v)?;
          self.add_edge(
            Vertex::Node(nid),
            Vertex::Var(vid),
            EdgeKind::Role(arg.argname.clone()),
          );
          ArgSlot::Var(vid)
        }
        ArgValue::Const(c) => ArgSlot::Const(c.clone()),
      };
      args.push((arg.argname.clone(), slot));
    }

    if let Some(bv) = ep.bv() {
      let data = self.variables.get_mut(&bv.vid).ok_or_else(|| {
        XmrsError::structure(format!("bound variable {} was not registered", bv))
      })?;
      match data.bound_by {
        Some(other) if other != nid => {
          return Err(XmrsError::structure(format!(
            "{} is bound by both {} and {}",
            bv, other, nid
          )));
        }
        _ => data.bound_by = Some(nid),
      }
    } else if let Some(iv) = ep.iv() {
      let data = self.variables.get_mut(&iv.vid).ok_or_else(|| {
        XmrsError::structure(format!("intrinsic variable {} was not registered", iv))
      })?;
      match data.introduced_by {
        Some(other) if other != nid => {
          return Err(XmrsError::structure(format!(
            "{} is the intrinsic variable of both {} and {}",
            iv, other, nid
          )));
        }
        _ => data.introduced_by = Some(nid),
      }
    }

    self.nodeids.push(nid);
    self.eps.insert(
      nid,
      EpData {
        pred: ep.pred.clone(),
        label,
        args,
        lnk: ep.lnk.clone(),
        surface: ep.surface.clone(),
        base: ep.base.clone(),
      },
    );
    Ok(())
  }

  /// A hi handle takes at most one constraint. Repeating the same
  /// constraint is harmless; a different one is an error.
  fn add_hcons(&mut self, hc: &HandleConstraint) -> Result<()> {
    let hi = self.intern(&hc.hi)?;
    let lo = self.intern(&hc.lo)?;
    if let Some((relation, old_lo)) = self.hcons.get(&hi) {
      if *relation == hc.relation && *old_lo == lo {
        warn!("ignoring repeated handle constraint {}", hc);
        return Ok(());
      }
      return Err(XmrsError::structure(format!(
        "{} conflicts with {} {} h{}",
        hc, hc.hi, relation, old_lo
      )));
    }
    self.add_edge(Vertex::Var(hi), Vertex::Var(lo), EdgeKind::Hcons(hc.relation));
    self.hcons.insert(hi, (hc.relation, lo));
    Ok(())
  }

  fn add_icons(&mut self, ic: &IndividualConstraint) -> Result<()> {
    let target = self.intern(&ic.target)?;
    let clause = self.intern(&ic.clause)?;
    self.add_edge(
      Vertex::Var(target),
      Vertex::Var(clause),
      EdgeKind::Icons(ic.relation.clone()),
    );
    self.icons.push((target, ic.relation.clone(), clause));
    Ok(())
  }
}

/// Assembles the graph from a hook, EPs (which must already have
/// nodeids), handle constraints and individual constraints.
///
/// Fails on duplicate nodeids, on a vid used with two sorts, and when an
/// intrinsic variable is owned by two EPs (or bound by two quantifiers).
pub fn build_graph(
  hook: &Hook,
  eps: &[ElementaryPredication],
  hcons: &[HandleConstraint],
  icons: &[IndividualConstraint],
) -> Result<XmrsGraph> {
  let mut g = XmrsGraph::default();

  if let Some(ltop) = &hook.ltop {
    let vid = g.intern(ltop)?;
    g.ltop = Some(vid);
    g.add_edge(Vertex::Node(LTOP_NODEID), Vertex::Var(vid), EdgeKind::Top);
  }
  if let Some(index) = &hook.index {
    g.index = Some(g.intern(index)?);
  }
  if let Some(xarg) = &hook.xarg {
    g.xarg = Some(g.intern(xarg)?);
  }

  for ep in eps.iter() {
    g.add_ep(ep)?;
  }
  for hc in hcons.iter() {
    g.add_hcons(hc)?;
  }
  for ic in icons.iter() {
    g.add_icons(ic)?;
  }

  debug!(
    eps = g.nodeids.len(),
    hcons = g.hcons.len(),
    icons = g.icons.len(),
    variables = g.variables.len(),
    "built graph"
  );

  Ok(g)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::components::Argument;
  use crate::config::IVARG_ROLE;

  fn ep(nid: NodeId, pred: &str, label: u32, args: Vec<Argument>) -> ElementaryPredication {
    ElementaryPredication::new(Pred::string_or_grammar(pred), Variable::handle(label))
      .with_nodeid(nid)
      .with_args(args)
  }

  fn x(vid: u32) -> Variable {
    Variable::new(vid, Sort::RefInd)
  }

  #[test]
  fn test_back_references() {
    let eps = vec![
      ep(10000, "_the_q_rel", 1, vec![
        Argument::mrs_argument(IVARG_ROLE, x(3)),
        Argument::mrs_argument("RSTR", Variable::handle(4)),
      ]),
      ep(10001, "_dog_n_1_rel", 2, vec![Argument::mrs_argument(IVARG_ROLE, x(3))]),
    ];
    let hcons = vec![HandleConstraint::qeq(Variable::handle(4), Variable::handle(2))];
    let g = build_graph(&Hook::default(), &eps, &hcons, &[]).unwrap();

    assert_eq!(g.nodeids(), &[10000, 10001]);
    assert_eq!(g.variables[&3].introduced_by, Some(10001));
    assert_eq!(g.variables[&3].bound_by, Some(10000));
    assert_eq!(g.hcons[&4], (HconsRelation::Qeq, 2));
    assert!(g.labels.contains(&1) && g.labels.contains(&2));
    assert!(g.edges().contains(&Edge {
      source: Vertex::Var(4),
      target: Vertex::Var(2),
      kind: EdgeKind::Hcons(HconsRelation::Qeq),
    }));
  }

  #[test]
  fn test_duplicate_intrinsic_variable_is_fatal() {
    let eps = vec![
      ep(10000, "_dog_n_1_rel", 1, vec![Argument::mrs_argument(IVARG_ROLE, x(3))]),
      ep(10001, "_cat_n_1_rel", 2, vec![Argument::mrs_argument(IVARG_ROLE, x(3))]),
    ];
    let err = build_graph(&Hook::default(), &eps, &[], &[]).unwrap_err();
    assert!(err.is_structure());
  }

  #[test]
  fn test_duplicate_nodeid_is_fatal() {
    let eps = vec![
      ep(10000, "_dog_n_1_rel", 1, vec![Argument::mrs_argument(IVARG_ROLE, x(3))]),
      ep(10000, "_cat_n_1_rel", 2, vec![Argument::mrs_argument(IVARG_ROLE, x(4))]),
    ];
    assert!(build_graph(&Hook::default(), &eps, &[], &[]).is_err());
  }

  #[test]
  fn test_sort_conflict_is_fatal() {
    let eps = vec![ep(10000, "_rain_v_1_rel", 1, vec![Argument::mrs_argument(
      IVARG_ROLE,
      Variable::new(1, Sort::Event),
    )])];
    assert!(build_graph(&Hook::default(), &eps, &[], &[]).is_err());
  }

  #[test]
  fn test_one_constraint_per_hi_handle() {
    let eps = vec![
      ep(10000, "_rain_v_1_rel", 1, vec![Argument::mrs_argument(IVARG_ROLE, Variable::new(2, Sort::Event))]),
      ep(10001, "_snow_v_1_rel", 3, vec![Argument::mrs_argument(IVARG_ROLE, Variable::new(4, Sort::Event))]),
    ];
    let hook = Hook::new(Some(Variable::handle(0)), None);

    let repeated = vec![
      HandleConstraint::qeq(Variable::handle(0), Variable::handle(1)),
      HandleConstraint::qeq(Variable::handle(0), Variable::handle(1)),
    ];
    let g = build_graph(&hook, &eps, &repeated, &[]).unwrap();
    assert_eq!(g.hcons.len(), 1);
    assert_eq!(
      g.edges().iter().filter(|e| matches!(e.kind, EdgeKind::Hcons(_))).count(),
      1
    );

    let conflicting = vec![
      HandleConstraint::qeq(Variable::handle(0), Variable::handle(1)),
      HandleConstraint::new(Variable::handle(0), HconsRelation::Outscopes, Variable::handle(3)),
    ];
    assert!(build_graph(&hook, &eps, &conflicting, &[]).unwrap_err().is_structure());
  }

  #[test]
  fn test_properties_merge_in_table() {
    let hook = Hook::new(
      Some(Variable::handle(0)),
      Some(Variable::with_properties(2, Sort::Event, [("TENSE", "past")])),
    );
    let eps = vec![ep(10000, "_rain_v_1_rel", 1, vec![Argument::mrs_argument(
      IVARG_ROLE,
      Variable::with_properties(2, Sort::Event, [("SF", "prop")]),
    )])];
    let g = build_graph(&hook, &eps, &[], &[]).unwrap();
    let e2 = g.var(2);
    assert_eq!(e2.properties.len(), 2);
    assert_eq!(e2.properties["TENSE"], "past");
    assert_eq!(e2.properties["SF"], "prop");
  }
}
