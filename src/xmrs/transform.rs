use std::collections::{HashMap, HashSet};

use super::{build_graph, Xmrs};
use crate::components::{ArgValue, Hook, NodeId};
use crate::error::{Result, XmrsError};

impl Xmrs {
  /// A new structure holding only the EPs in `nodeids`.
  ///
  /// Handle constraints survive when their hi side is an argument of a
  /// kept EP and their lo side a kept label; individual constraints
  /// survive when both sides are still referenced. The hook and the
  /// structure-level lnk, surface and identifier are not carried over.
  pub fn subgraph(&self, nodeids: &[NodeId]) -> Result<Xmrs> {
    let mut seen = HashSet::new();
    let mut eps = Vec::new();
    for nid in nodeids.iter() {
      if !seen.insert(*nid) {
        continue;
      }
      let ep = self
        .get_ep(*nid)
        .ok_or_else(|| XmrsError::structure(format!("no EP with nodeid {}", nid)))?;
      eps.push(ep);
    }

    let labels = eps.iter().map(|ep| ep.label.vid).collect::<HashSet<_>>();
    let mut referenced = labels.clone();
    let mut hcons = Vec::new();
    for ep in eps.iter() {
      for arg in ep.args.iter() {
        let v = match &arg.value {
          ArgValue::Var(v) => v,
          ArgValue::Const(_) => continue,
        };
        referenced.insert(v.vid);
        if let Some(hc) = self.get_hcons(v) {
          if labels.contains(&hc.lo.vid) && !hcons.contains(&hc) {
            hcons.push(hc);
          }
        }
      }
    }

    let icons = self
      .icons()
      .into_iter()
      .filter(|ic| referenced.contains(&ic.target.vid) && referenced.contains(&ic.clause.vid))
      .collect::<Vec<_>>();

    let graph = build_graph(&Hook::default(), &eps, &hcons, &icons)?;
    Ok(Xmrs::from_graph(graph))
  }

  /// A copy of this structure with nodeids renamed through `mapping`.
  /// Nodeids missing from the mapping are kept.
  pub fn relabel_nodes(&self, mapping: &HashMap<NodeId, NodeId>) -> Result<Xmrs> {
    let eps = self
      .eps()
      .into_iter()
      .map(|mut ep| {
        if let Some(new_id) = ep.nodeid.and_then(|nid| mapping.get(&nid)) {
          ep.nodeid = Some(*new_id);
        }
        ep
      })
      .collect::<Vec<_>>();

    let graph = build_graph(&self.hook(), &eps, &self.hcons(), &self.icons())?;
    Ok(Xmrs {
      graph,
      lnk: self.lnk.clone(),
      surface: self.surface.clone(),
      identifier: self.identifier.clone(),
    })
  }
}
