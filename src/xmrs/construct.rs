use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{build_graph, Xmrs};
use crate::components::{
  Argument, ElementaryPredication, HandleConstraint, Hook, IndividualConstraint, Link, Node,
  NodeId, Post, Sort, VarGenerator, Variable,
};
use crate::config::{CONSTARG_ROLE, FIRST_NODEID, IVARG_ROLE, LTOP_NODEID, RSTR_ROLE};
use crate::error::{Result, XmrsError};

impl Xmrs {
  /// Builds a structure from MRS components. Arguments are expected to
  /// be inside their EPs.
  ///
  /// EPs are put in canonical order first, and any EP without a nodeid
  /// gets one counting up from [`FIRST_NODEID`] (or from one past the
  /// highest explicit nodeid, if that is larger).
  pub fn from_mrs(
    hook: Hook,
    eps: Vec<ElementaryPredication>,
    hcons: Vec<HandleConstraint>,
    icons: Vec<IndividualConstraint>,
  ) -> Result<Self> {
    let mut eps = eps;
    eps.sort_by(|a, b| a.canonical_cmp(b));

    let mut next_nodeid = match eps.iter().filter_map(|ep| ep.nodeid).max() {
      Some(max) => max.checked_add(1).map(|n| n.max(FIRST_NODEID)),
      None => Some(FIRST_NODEID),
    };
    for ep in eps.iter_mut().filter(|ep| ep.nodeid.is_none()) {
      let nid = next_nodeid.ok_or_else(|| {
        XmrsError::structure(format!("no nodeid left to assign to EP {}", ep.pred))
      })?;
      trace!(nodeid = nid, pred = %ep.pred, "assigning nodeid");
      ep.nodeid = Some(nid);
      next_nodeid = nid.checked_add(1);
    }

    let graph = build_graph(&hook, &eps, &hcons, &icons)?;
    Ok(Self::from_graph(graph))
  }

  /// Builds a structure from RMRS components: anchored EPs plus a
  /// separate list of anchored arguments.
  pub fn from_rmrs(
    hook: Hook,
    eps: Vec<ElementaryPredication>,
    args: Vec<Argument>,
    hcons: Vec<HandleConstraint>,
    icons: Vec<IndividualConstraint>,
  ) -> Result<Self> {
    let mut grouped: IndexMap<NodeId, Vec<Argument>> = IndexMap::new();
    for arg in args {
      let nid = arg.nodeid.ok_or_else(|| {
        XmrsError::structure(format!("RMRS argument {} has no anchor", arg))
      })?;
      grouped.entry(nid).or_default().push(arg);
    }

    let mut anchored = Vec::with_capacity(eps.len());
    for mut ep in eps {
      let nid = ep.nodeid.ok_or_else(|| {
        XmrsError::structure(format!("RMRS EP {} has no anchor", ep.pred))
      })?;
      if let Some(args) = grouped.shift_remove(&nid) {
        ep.args.extend(args);
      }
      anchored.push(ep);
    }

    if let Some((nid, _)) = grouped.first() {
      return Err(XmrsError::structure(format!(
        "arguments anchored to h{}, which is not an EP",
        nid
      )));
    }

    Self::from_mrs(hook, anchored, hcons, icons)
  }

  /// Builds a structure from DMRS nodes and links, synthesizing the
  /// labels, variables and handle constraints the links imply.
  ///
  /// `h0` is reserved for the top. EQ links make their endpoints share a
  /// label; every other node gets a fresh one. Non-quantifiers get an
  /// intrinsic variable from their cvarsort (`u` when there is none) and
  /// properties. A quantifier takes the intrinsic variable of its
  /// `RSTR/H` target as its ARG0.
  pub fn from_dmrs(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self> {
    let nodeids = nodes.iter().map(|n| n.nodeid).collect::<HashSet<_>>();
    for link in links.iter() {
      if link.start != LTOP_NODEID && !nodeids.contains(&link.start) {
        return Err(dangling(link, link.start));
      }
      if !nodeids.contains(&link.end) {
        return Err(dangling(link, link.end));
      }
    }

    let mut vgen = VarGenerator::new(0);
    let labels = make_labels(&nodes, &links, &mut vgen)?;
    let mut ivs = make_ivs(&nodes, &mut vgen)?;
    let top = label_of(&labels, LTOP_NODEID)?;

    let mut args: HashMap<NodeId, Vec<Argument>> = HashMap::new();
    for (nid, iv) in ivs.iter() {
      args
        .entry(*nid)
        .or_default()
        .push(Argument::new(Some(*nid), IVARG_ROLE, iv.clone()));
    }

    let mut hcons = Vec::new();
    for link in links.iter() {
      if link.start == LTOP_NODEID {
        if matches!(link.post, Post::H | Post::Nil) {
          hcons.push(HandleConstraint::qeq(top.clone(), label_of(&labels, link.end)?));
        }
        continue;
      }
      let argname = match &link.argname {
        Some(argname) => argname,
        // bare EQ links were handled by label sharing
        None => continue,
      };

      let value = match link.post {
        Post::H => {
          let hole = vgen.new_handle();
          hcons.push(HandleConstraint::qeq(hole.clone(), label_of(&labels, link.end)?));
          if argname == RSTR_ROLE {
            let bv = ivs
              .get(&link.end)
              .cloned()
              .ok_or_else(|| dangling(link, link.end))?;
            ivs.insert(link.start, bv.clone());
            args
              .entry(link.start)
              .or_default()
              .insert(0, Argument::new(Some(link.start), IVARG_ROLE, bv));
          }
          hole
        }
        Post::Heq => label_of(&labels, link.end)?,
        Post::Eq | Post::Neq | Post::Nil => ivs
          .get(&link.end)
          .cloned()
          .ok_or_else(|| dangling(link, link.end))?,
      };
      args
        .entry(link.start)
        .or_default()
        .push(Argument::new(Some(link.start), argname, value));
    }

    let mut eps = Vec::with_capacity(nodes.len());
    for node in nodes {
      let nid = node.nodeid;
      let mut node_args = args.remove(&nid).unwrap_or_default();
      if let Some(carg) = &node.carg {
        node_args.push(Argument::constant(Some(nid), CONSTARG_ROLE, carg.clone()));
      }
      let mut ep = ElementaryPredication::new(node.pred, label_of(&labels, nid)?)
        .with_nodeid(nid)
        .with_args(node_args);
      ep.lnk = node.lnk;
      ep.surface = node.surface;
      ep.base = node.base;
      eps.push(ep);
    }

    debug!(
      eps = eps.len(),
      hcons = hcons.len(),
      "synthesized MRS components from DMRS"
    );

    let hook = Hook::new(Some(top), None);
    Self::from_mrs(hook, eps, hcons, Vec::new())
  }
}

fn dangling(link: &Link, nid: NodeId) -> XmrsError {
  XmrsError::structure(format!("link {} refers to unresolvable node {}", link, nid))
}

fn label_of(labels: &HashMap<NodeId, Variable>, nid: NodeId) -> Result<Variable> {
  labels
    .get(&nid)
    .cloned()
    .ok_or_else(|| XmrsError::structure(format!("node {} has no label", nid)))
}

fn make_labels(
  nodes: &[Node],
  links: &[Link],
  vgen: &mut VarGenerator,
) -> Result<HashMap<NodeId, Variable>> {
  let mut labels = HashMap::new();
  labels.insert(LTOP_NODEID, vgen.new_handle());

  for link in links.iter().filter(|l| l.post == Post::Eq) {
    let label = match (labels.get(&link.start), labels.get(&link.end)) {
      (Some(a), Some(b)) if a != b => {
        return Err(XmrsError::structure(format!(
          "EQ link {} joins nodes already labeled {} and {}",
          link, a, b
        )));
      }
      (Some(l), _) | (None, Some(l)) => l.clone(),
      (None, None) => vgen.new_handle(),
    };
    labels.insert(link.start, label.clone());
    labels.insert(link.end, label);
  }

  for node in nodes.iter() {
    if !labels.contains_key(&node.nodeid) {
      labels.insert(node.nodeid, vgen.new_handle());
    }
  }
  Ok(labels)
}

fn make_ivs(nodes: &[Node], vgen: &mut VarGenerator) -> Result<HashMap<NodeId, Variable>> {
  let mut ivs = HashMap::new();
  for node in nodes.iter().filter(|n| !n.is_quantifier()) {
    let sort = match node.cvarsort() {
      Some(s) => s.parse::<Sort>()?,
      None => Sort::Unknown,
    };
    ivs.insert(node.nodeid, vgen.new_var(sort, node.properties()));
  }
  Ok(ivs)
}
