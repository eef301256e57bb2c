use std::collections::HashMap;

use tracing::debug;

use super::{Vertex, Xmrs};
use crate::components::NodeId;
use crate::error::{Result, XmrsError};

/// Union-find over graph vertices
struct Components {
  parent: HashMap<Vertex, Vertex>,
}

impl Components {
  fn new() -> Self {
    Self {
      parent: HashMap::new(),
    }
  }

  fn find(&mut self, v: Vertex) -> Vertex {
    let mut root = v;
    while let Some(p) = self.parent.get(&root).copied() {
      if p == root {
        break;
      }
      root = p;
    }
    // path compression
    let mut cur = v;
    while cur != root {
      let next = self.parent.get(&cur).copied().unwrap_or(root);
      self.parent.insert(cur, root);
      cur = next;
    }
    self.parent.entry(root).or_insert(root);
    root
  }

  fn union(&mut self, a: Vertex, b: Vertex) {
    let ra = self.find(a);
    let rb = self.find(b);
    if ra != rb {
      self.parent.insert(ra, rb);
    }
  }
}

impl Xmrs {
  /// True if the EPs, labels, variables and the top form one weakly
  /// connected component. Arguments, label sharing, handle constraints
  /// and individual constraints all connect. Undefined (an error) for a
  /// structure with no EPs.
  pub fn is_connected(&self) -> Result<bool> {
    if self.nodeids().is_empty() {
      return Err(XmrsError::structure(
        "connectivity is undefined for a structure with no EPs",
      ));
    }

    let mut components = Components::new();
    for nid in self.nodeids().iter() {
      components.find(Vertex::Node(*nid));
    }
    for edge in self.graph.edges().iter() {
      components.union(edge.source, edge.target);
    }

    let vertices = self.graph.vertices();
    let mut roots = vertices.into_iter().map(|v| components.find(v));
    let first = roots.next();
    Ok(roots.all(|r| Some(r) == first))
  }

  /// Connected, every EP labeled by a known label, and every handle
  /// constraint's lo side a label some EP uses
  pub fn is_well_formed(&self) -> Result<bool> {
    let connected = self.is_connected()?;

    let unlabeled = self
      .graph
      .eps
      .iter()
      .filter(|(_, ep)| !self.graph.labels.contains(&ep.label))
      .map(|(nid, _)| *nid)
      .collect::<Vec<NodeId>>();

    let dangling = self
      .graph
      .hcons
      .iter()
      .filter(|(_, (_, lo))| self.labelset_vid(*lo).is_empty())
      .map(|(hi, _)| *hi)
      .collect::<Vec<_>>();

    if !connected || !unlabeled.is_empty() || !dangling.is_empty() {
      debug!(connected, ?unlabeled, ?dangling, "structure is not well-formed");
      return Ok(false);
    }
    Ok(true)
  }
}
