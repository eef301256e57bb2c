//! Write-only SimpleDMRS:
//!
//! ```text
//! dmrs {
//!   10000 [_the_q_rel<0:3>];
//!   10001 [_dog_n_1_rel<4:7> x NUM=sg];
//!   0:/H -> 10002;
//!   10000:RSTR/H -> 10001;
//! }
//! ```

use std::io::Write;

use tracing::debug;

use super::{quote, WriteOptions, XmrsReader, XmrsWriter};
use crate::components::{lnk_str, Link, Node, Post};
use crate::error::{Result, XmrsError};
use crate::xmrs::Xmrs;

fn serialize_node(node: &Node) -> String {
  let mut s = format!("{} [{}{}", node.nodeid, node.pred, lnk_str(node.lnk.as_ref()));
  if let Some(carg) = &node.carg {
    s.push_str(&format!("({})", quote(carg)));
  }
  if let Some(cvarsort) = node.cvarsort() {
    s.push(' ');
    s.push_str(cvarsort);
    for (k, v) in node.properties().iter() {
      s.push_str(&format!(" {}={}", k, v));
    }
  }
  s.push_str("];");
  s
}

fn serialize_link(link: &Link) -> String {
  let arrow = if link.argname.is_some() || link.post != Post::Eq {
    "->"
  } else {
    "--"
  };
  format!(
    "{}:{}/{} {} {};",
    link.start,
    link.argname.as_deref().unwrap_or(""),
    link.post,
    arrow,
    link.end
  )
}

fn serialize_dmrs(m: &Xmrs, pretty_print: bool) -> Result<String> {
  let (delim, indent) = if pretty_print { ("\n", "  ") } else { ("", " ") };

  let mut lines = vec!["dmrs {".to_string()];
  for node in m.nodes() {
    lines.push(format!("{}{}", indent, serialize_node(&node)));
  }
  for link in m.links()? {
    lines.push(format!("{}{}", indent, serialize_link(&link)));
  }
  lines.push("}".to_string());
  Ok(lines.join(delim))
}

pub fn dumps(ms: &[Xmrs], options: &WriteOptions) -> Result<String> {
  let delim = if options.pretty_print { "\n" } else { " " };
  let out = ms
    .iter()
    .map(|m| serialize_dmrs(m, options.pretty_print))
    .collect::<Result<Vec<_>>>()?
    .join(delim);
  debug!(structures = ms.len(), "wrote SimpleDMRS");
  Ok(options.colorize(out))
}

pub fn dumps_one(m: &Xmrs, options: &WriteOptions) -> Result<String> {
  dumps(std::slice::from_ref(m), options)
}

pub fn dump(sink: &mut impl Write, ms: &[Xmrs], options: &WriteOptions) -> Result<()> {
  writeln!(sink, "{}", dumps(ms, options)?)?;
  Ok(())
}

#[derive(Debug, Copy, Clone, Default)]
pub struct SimpleDmrs;

impl XmrsReader for SimpleDmrs {
  fn decode(&self, _s: &str) -> Result<Box<dyn Iterator<Item = Result<Xmrs>>>> {
    Err(XmrsError::Unsupported("reading SimpleDMRS".to_string()))
  }
}

impl XmrsWriter for SimpleDmrs {
  fn encode(&self, ms: &[Xmrs], options: &WriteOptions) -> Result<String> {
    dumps(ms, options)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::components::Pred;
  use crate::config::{CVARSORT, LTOP_NODEID};

  fn the_dog_barks() -> Xmrs {
    let nodes = vec![
      Node::new(10000, Pred::string("_the_q_rel")).with_lnk(crate::components::Lnk::CharSpan(0, 3)),
      Node::new(10001, Pred::string("_dog_n_1_rel")).with_sortinfo([(CVARSORT, "x"), ("NUM", "sg")]),
      Node::new(10002, Pred::string("_bark_v_1_rel")).with_sortinfo([(CVARSORT, "e")]),
    ];
    let links = vec![
      Link::new(LTOP_NODEID, 10002, None, Post::H),
      Link::new(10000, 10001, Some("RSTR"), Post::H),
      Link::new(10002, 10001, Some("ARG1"), Post::Neq),
    ];
    Xmrs::from_dmrs(nodes, links).unwrap()
  }

  #[test]
  fn test_serialize_node() {
    let node = Node::new(10001, Pred::string("_dog_n_1_rel")).with_sortinfo([(CVARSORT, "x"), ("NUM", "sg")]);
    assert_eq!(serialize_node(&node), "10001 [_dog_n_1_rel x NUM=sg];");
    let node = Node::new(10002, Pred::grammar("named_rel")).with_carg("Kim");
    assert_eq!(serialize_node(&node), "10002 [named_rel(\"Kim\")];");
    let node = Node::new(10003, Pred::grammar("named_rel")).with_carg("Kim \"K\" Lee");
    assert_eq!(serialize_node(&node), r#"10003 [named_rel("Kim \"K\" Lee")];"#);
  }

  #[test]
  fn test_serialize_link() {
    assert_eq!(serialize_link(&Link::new(10000, 10001, Some("rstr"), Post::H)), "10000:RSTR/H -> 10001;");
    assert_eq!(serialize_link(&Link::new(10001, 10002, None, Post::Eq)), "10001:/EQ -- 10002;");
    assert_eq!(serialize_link(&Link::new(0, 10002, None, Post::H)), "0:/H -> 10002;");
  }

  #[test]
  fn test_dumps() {
    let m = the_dog_barks();
    // nodes follow nodeid registration order, which is canonical
    // predicate order
    assert_eq!(
      dumps_one(&m, &WriteOptions::pretty()).unwrap(),
      "dmrs {\n  \
       10002 [_bark_v_1_rel e];\n  \
       10001 [_dog_n_1_rel x NUM=sg];\n  \
       10000 [_the_q_rel<0:3>];\n  \
       0:/H -> 10002;\n  \
       10000:RSTR/H -> 10001;\n  \
       10002:ARG1/NEQ -> 10001;\n\
       }"
    );
    assert_eq!(
      dumps_one(&m, &WriteOptions::default()).unwrap(),
      "dmrs { 10002 [_bark_v_1_rel e]; 10001 [_dog_n_1_rel x NUM=sg]; 10000 [_the_q_rel<0:3>]; \
       0:/H -> 10002; 10000:RSTR/H -> 10001; 10002:ARG1/NEQ -> 10001;}"
    );
  }

  #[test]
  fn test_reading_is_unsupported() {
    assert!(matches!(
      SimpleDmrs.decode_one("dmrs { }"),
      Err(XmrsError::Unsupported(_))
    ));
  }
}
