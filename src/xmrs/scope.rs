use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::graph::ArgSlot;
use super::{VarId, Xmrs};
use crate::components::{Link, NodeId, Post, Variable};
use crate::config::{IVARG_ROLE, LTOP_NODEID};
use crate::error::{Result, XmrsError};

impl Xmrs {
  /// The nodeids of every EP labeled `label`. A label with no EPs (say,
  /// the lo side of a handle constraint that nothing uses) is an error.
  pub fn labelset(&self, label: &Variable) -> Result<BTreeSet<NodeId>> {
    let members = self.labelset_vid(label.vid);
    if members.is_empty() || !label.is_handle() {
      return Err(XmrsError::structure(format!(
        "no EP has the label {}",
        label
      )));
    }
    Ok(members)
  }

  pub(super) fn labelset_vid(&self, label: VarId) -> BTreeSet<NodeId> {
    self
      .nodeids()
      .iter()
      .copied()
      .filter(|nid| self.graph.eps.get(nid).map(|ep| ep.label) == Some(label))
      .collect()
  }

  /// True if every nodeid in `nodeids` is labeled `label`
  pub fn in_labelset(&self, nodeids: &[NodeId], label: &Variable) -> Result<bool> {
    let members = self.labelset(label)?;
    Ok(nodeids.iter().all(|nid| members.contains(nid)))
  }

  /// The heads of a labelset, best first.
  ///
  /// Within the labelset, a member's out-degree counts its own ARG0 plus
  /// arguments pointing at the label itself or at another member's
  /// intrinsic variable; its in-degree counts the other members pointing
  /// at its intrinsic variable. Heads have out-degree at most 1 and are
  /// ordered by in-degree, highest first, then by nodeid.
  pub fn labelset_heads(&self, label: &Variable) -> Result<Vec<NodeId>> {
    let members = self.labelset(label)?;
    if members.len() == 1 {
      return Ok(members.into_iter().collect());
    }

    let mut out_degree = BTreeMap::<NodeId, usize>::new();
    let mut in_degree = BTreeMap::<NodeId, usize>::new();
    for nid in members.iter() {
      out_degree.insert(*nid, 0);
      in_degree.insert(*nid, 0);
    }

    for nid in members.iter() {
      let ep = match self.graph.eps.get(nid) {
        Some(ep) => ep,
        None => continue,
      };
      for (role, slot) in ep.args.iter() {
        let vid = match slot {
          ArgSlot::Var(vid) => *vid,
          ArgSlot::Const(_) => continue,
        };
        let counted = if role == IVARG_ROLE || vid == label.vid {
          true
        } else if let Some(target) = self.graph.introduced_by(vid).filter(|t| members.contains(t)) {
          if target != *nid {
            *in_degree.entry(target).or_default() += 1;
          }
          true
        } else {
          false
        };
        if counted {
          *out_degree.entry(*nid).or_default() += 1;
        }
      }
    }

    let mut heads = members
      .iter()
      .copied()
      .filter(|nid| out_degree.get(nid).copied().unwrap_or(0) <= 1)
      .collect::<Vec<_>>();
    if heads.is_empty() {
      return Err(XmrsError::structure(format!(
        "the labelset of {} has no head",
        label
      )));
    }
    heads.sort_by(|a, b| {
      let ia = in_degree.get(a).copied().unwrap_or(0);
      let ib = in_degree.get(b).copied().unwrap_or(0);
      ib.cmp(&ia).then(a.cmp(b))
    });
    trace!(label = %label, ?heads, "labelset heads");
    Ok(heads)
  }

  /// The single best head of a labelset
  pub fn labelset_head(&self, label: &Variable) -> Result<NodeId> {
    let heads = self.labelset_heads(label)?;
    heads
      .first()
      .copied()
      .ok_or_else(|| XmrsError::structure(format!("the labelset of {} has no head", label)))
  }

  fn head_of(&self, label: VarId) -> Result<NodeId> {
    self.labelset_head(&self.graph.var(label))
  }

  /// Resolves a handle argument: through a handle constraint (H) or
  /// straight to a label (HEQ)
  fn resolve_handle(&self, vid: VarId) -> Result<Option<(NodeId, Post)>> {
    if let Some((_, lo)) = self.graph.hcons.get(&vid) {
      return Ok(Some((self.head_of(*lo)?, Post::H)));
    }
    if self.graph.labels.contains(&vid) {
      return Ok(Some((self.head_of(vid)?, Post::Heq)));
    }
    Ok(None)
  }

  /// The DMRS links this structure implies, sorted by (start, end).
  ///
  /// Arguments valued by another EP's intrinsic variable become EQ or
  /// NEQ links depending on whether the labels match. Handle arguments
  /// become H links through a handle constraint, or HEQ links when they
  /// name a label directly; either way the link ends at the labelset
  /// head. Labelsets with several heads get bare EQ links from the best
  /// head to the others.
  pub fn links(&self) -> Result<Vec<Link>> {
    let mut links = Vec::new();

    if let Some(top) = self.graph.ltop {
      if let Some((end, post)) = self.resolve_handle(top)? {
        links.push(Link::new(LTOP_NODEID, end, None, post));
      }
    }

    for nid in self.nodeids().iter().copied() {
      let ep = match self.graph.eps.get(&nid) {
        Some(ep) => ep,
        None => continue,
      };
      for (role, slot) in ep.args.iter() {
        let vid = match slot {
          ArgSlot::Var(vid) => *vid,
          ArgSlot::Const(_) => continue,
        };
        if role == IVARG_ROLE
          || self.graph.introduced_by(vid) == Some(nid)
          || self.graph.bound_by(vid) == Some(nid)
        {
          continue;
        }

        if let Some(target) = self.graph.introduced_by(vid) {
          let same_label = self.graph.eps.get(&target).map(|t| t.label) == Some(ep.label);
          let post = if same_label { Post::Eq } else { Post::Neq };
          links.push(Link::new(nid, target, Some(role.as_str()), post));
        } else if let Some((end, post)) = self.resolve_handle(vid)? {
          links.push(Link::new(nid, end, Some(role.as_str()), post));
        } else {
          trace!(nodeid = nid, role = %role, vid, "argument has no link");
        }
      }
    }

    for label in self.graph.labels.iter() {
      let heads = self.labelset_heads(&self.graph.var(*label))?;
      if let Some((first, rest)) = heads.split_first() {
        for other in rest {
          links.push(Link::new(*first, *other, None, Post::Eq));
        }
      }
    }

    links.sort_by_key(|l| (l.start, l.end));
    Ok(links)
  }
}
