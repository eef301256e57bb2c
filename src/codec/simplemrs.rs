//! The SimpleMRS format:
//!
//! ```text
//! [ TOP: h0 INDEX: e2 [ e TENSE: past ]
//!   RELS: < [ "_rain_v_1_rel"<3:9> LBL: h1 ARG0: e2 ] >
//!   HCONS: < h0 qeq h1 > ]
//! ```
//!
//! Reading is a recursive descent over a token stream, one function per
//! production. Variables are interned in a per-structure table carried in
//! a [`ParseContext`], so a variable's properties may be spread over
//! several occurrences.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{Read, Write};

use regex::Regex;
use tracing::{debug, trace};

use super::{quote, unquote, Version, WriteOptions, XmrsReader, XmrsWriter};
use crate::components::{
  lnk_str, ArgValue, Argument, ElementaryPredication, HandleConstraint, HconsRelation, Hook,
  IndividualConstraint, Lnk, Pred, Properties, Sort, Variable,
};
use crate::error::{Result, XmrsError};
use crate::xmrs::Xmrs;

const PUNCTUATION: &[&str] = &["[", "]", "<", ">", ":", "#", "@"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
  text: String,
  line: usize,
  column: usize,
}

/// Splits SimpleMRS text into quoted strings, bare symbols and single
/// punctuation characters, remembering where each token started.
///
/// A single quote only opens a string when it is closed on the same line
/// before any bracket, so Lisp-style `'_dog_n_rel` stays a bare symbol.
fn tokenize(s: &str) -> VecDeque<Token> {
  regex_static!(
    TOKEN,
    r#""[^"\\]*(?:\\.[^"\\]*)*"|'[^'\\\n\[\]<>]*(?:\\.[^'\\\n\[\]<>]*)*'|[^\s:#@\[\]<>"]+|[:#@\[\]<>]"#
  );

  let mut tokens = VecDeque::new();
  let mut line = 1;
  let mut line_start = 0;
  let mut scanned = 0;
  for m in TOKEN.find_iter(s) {
    for (idx, c) in s[scanned..m.start()].char_indices() {
      if c == '\n' {
        line += 1;
        line_start = scanned + idx + 1;
      }
    }
    // tokens may themselves span lines (quoted strings)
    let column = s[line_start..m.start()].chars().count() + 1;
    tokens.push_back(Token {
      text: m.as_str().to_string(),
      line,
      column,
    });
    for (idx, c) in m.as_str().char_indices() {
      if c == '\n' {
        line += 1;
        line_start = m.start() + idx + 1;
      }
    }
    scanned = m.end();
  }
  tokens
}

fn is_quoted(token: &str) -> bool {
  token.len() >= 2
    && ((token.starts_with('"') && token.ends_with('"'))
      || (token.starts_with('\'') && token.ends_with('\'')))
}

fn is_punctuation(token: &str) -> bool {
  PUNCTUATION.contains(&token)
}

fn invalid_token(token: &Token, expected: impl Into<String>) -> XmrsError {
  XmrsError::Deserialization {
    message: format!("expected {}", expected.into()),
    token: Some(token.text.clone()),
    line: token.line,
    column: token.column,
  }
}

fn token_error(token: &Token, message: impl Into<String>) -> XmrsError {
  XmrsError::Deserialization {
    message: message.into(),
    token: Some(token.text.clone()),
    line: token.line,
    column: token.column,
  }
}

/// State for reading one structure: the remaining tokens and the
/// variables seen so far
struct ParseContext<'t> {
  tokens: &'t mut VecDeque<Token>,
  variables: HashMap<u32, Variable>,
}

impl<'t> ParseContext<'t> {
  fn new(tokens: &'t mut VecDeque<Token>) -> Self {
    Self {
      tokens,
      variables: HashMap::new(),
    }
  }

  fn peek(&self) -> Result<&Token> {
    self
      .tokens
      .front()
      .ok_or_else(|| XmrsError::deserialization("unexpected end of input"))
  }

  /// Peeks `offset` tokens ahead
  fn peek_at(&self, offset: usize) -> Result<&Token> {
    self
      .tokens
      .get(offset)
      .ok_or_else(|| XmrsError::deserialization("unexpected end of input"))
  }

  /// Case-insensitive check of the next token
  fn peek_is(&self, expected: &str) -> bool {
    self
      .tokens
      .front()
      .is_some_and(|t| t.text.eq_ignore_ascii_case(expected))
  }

  fn next(&mut self) -> Result<Token> {
    self
      .tokens
      .pop_front()
      .ok_or_else(|| XmrsError::deserialization("unexpected end of input"))
  }

  /// Consumes the next token, failing unless it is `expected` (ignoring
  /// case)
  fn expect(&mut self, expected: &str) -> Result<Token> {
    let token = self.next()?;
    if !token.text.eq_ignore_ascii_case(expected) {
      return Err(invalid_token(&token, format!("{:?}", expected)));
    }
    Ok(token)
  }
}

fn read_mrs(ctx: &mut ParseContext) -> Result<Xmrs> {
  ctx.expect("[")?;

  let lnk = read_lnk(ctx)?;
  let surface = read_surface(ctx)?;

  let mut hook = Hook::default();
  if ctx.peek_is("LTOP") || ctx.peek_is("TOP") {
    ctx.next()?;
    ctx.expect(":")?;
    hook.ltop = Some(read_variable(ctx, Some(Sort::Handle))?);
  }
  if ctx.peek_is("INDEX") {
    ctx.next()?;
    ctx.expect(":")?;
    hook.index = Some(read_variable(ctx, None)?);
  }
  if ctx.peek_is("XARG") {
    ctx.next()?;
    ctx.expect(":")?;
    hook.xarg = Some(read_variable(ctx, None)?);
  }

  let eps = read_rels(ctx)?;
  let hcons = if ctx.peek_is("HCONS") {
    read_hcons(ctx)?
  } else {
    Vec::new()
  };
  let icons = if ctx.peek_is("ICONS") {
    read_icons(ctx)?
  } else {
    Vec::new()
  };
  ctx.expect("]")?;

  let mut m = Xmrs::from_mrs(hook, eps, hcons, icons)?;
  m.lnk = lnk;
  m.surface = surface;
  Ok(m)
}

/// A quoted surface string, if one is next, without its quotes
fn read_surface(ctx: &mut ParseContext) -> Result<Option<String>> {
  if !ctx.peek().map(|t| is_quoted(&t.text))? {
    return Ok(None);
  }
  let token = ctx.next()?;
  Ok(Some(unquote(&token.text)))
}

fn read_number(ctx: &mut ParseContext) -> Result<i64> {
  let token = ctx.next()?;
  token
    .text
    .parse::<i64>()
    .map_err(|_| invalid_token(&token, "an integer"))
}

/// `<from:to>`, `<from#to>`, `<@edge>`, `<tok tok ...>`, or `<>` for no
/// lnk at all
fn read_lnk(ctx: &mut ParseContext) -> Result<Option<Lnk>> {
  if !ctx.peek_is("<") {
    return Ok(None);
  }
  ctx.next()?;

  let lnk = if ctx.peek_is(">") {
    None
  } else if ctx.peek_is("@") {
    ctx.next()?;
    Some(Lnk::Edge(read_number(ctx)?))
  } else if ctx.peek_at(1)?.text == ":" {
    let from = read_number(ctx)?;
    ctx.next()?;
    Some(Lnk::CharSpan(from, read_number(ctx)?))
  } else if ctx.peek_at(1)?.text == "#" {
    let from = read_number(ctx)?;
    ctx.next()?;
    Some(Lnk::ChartSpan(from, read_number(ctx)?))
  } else {
    let mut toks = Vec::new();
    while !ctx.peek_is(">") {
      toks.push(read_number(ctx)?);
    }
    Some(Lnk::Tokens(toks))
  };

  ctx.expect(">")?;
  Ok(lnk)
}

/// `[ sort PROP: val ... ]` following a variable
fn read_props(ctx: &mut ParseContext) -> Result<Option<(Token, Properties)>> {
  if !ctx.peek_is("[") {
    return Ok(None);
  }
  ctx.next()?;

  let vartype = ctx.next()?;
  if ctx.peek_is(":") {
    return Err(invalid_token(&vartype, "a variable type"));
  }

  let mut props = Properties::new();
  while !ctx.peek_is("]") {
    let name = ctx.next()?;
    ctx.expect(":")?;
    let value = ctx.next()?;
    props.insert(name.text, value.text);
  }
  ctx.next()?;
  Ok(Some((vartype, props)))
}

/// A variable token and its optional property bracket. The variable is
/// merged into the structure's table; a sort clash with an earlier
/// occurrence is an error.
fn read_variable(ctx: &mut ParseContext, expected: Option<Sort>) -> Result<Variable> {
  let token = ctx.next()?;
  let (sort, vid) =
    Variable::sort_vid_split(&token.text).ok_or_else(|| invalid_token(&token, "a variable"))?;

  if let Some(expected) = expected {
    if sort != expected {
      return Err(token_error(
        &token,
        format!("variable {} has sort {}, expected {}", token.text, sort, expected),
      ));
    }
  }

  let props = match read_props(ctx)? {
    Some((vartype, props)) => {
      if vartype.text != sort.as_str() {
        return Err(token_error(
          &vartype,
          format!("variable {} and its type {} differ", token.text, vartype.text),
        ));
      }
      props
    }
    None => Properties::new(),
  };
  if sort == Sort::Handle && !props.is_empty() {
    return Err(token_error(&token, format!("handle {} has properties", token.text)));
  }

  match ctx.variables.get_mut(&vid) {
    Some(existing) => {
      if existing.sort != sort {
        return Err(token_error(
          &token,
          format!("variable {} conflicts with {}", token.text, existing),
        ));
      }
      existing.merge_properties(&props);
      Ok(existing.clone())
    }
    None => {
      let var = Variable {
        vid,
        sort,
        properties: props,
      };
      ctx.variables.insert(vid, var.clone());
      Ok(var)
    }
  }
}

/// `NAME: value`, where anything that isn't a variable is a constant.
/// Quoted constants lose their quotes.
fn read_argument(ctx: &mut ParseContext) -> Result<Argument> {
  let name = ctx.next()?;
  if is_punctuation(&name.text) {
    return Err(invalid_token(&name, "a role name"));
  }
  ctx.expect(":")?;

  let next = ctx.peek()?;
  if Variable::sort_vid_split(&next.text).is_some() {
    let var = read_variable(ctx, None)?;
    return Ok(Argument::mrs_argument(&name.text, var));
  }
  if is_punctuation(&next.text) {
    return Err(invalid_token(next, "a variable or a constant"));
  }
  let value = ctx.next()?;
  Ok(Argument::mrs_argument(&name.text, ArgValue::Const(unquote(&value.text))))
}

fn read_ep(ctx: &mut ParseContext) -> Result<ElementaryPredication> {
  ctx.expect("[")?;

  let pred = ctx.next()?;
  if is_punctuation(&pred.text) {
    return Err(invalid_token(&pred, "a predicate"));
  }
  let pred = Pred::string_or_grammar(pred.text);
  let lnk = read_lnk(ctx)?;
  let surface = read_surface(ctx)?;

  ctx.expect("LBL")?;
  ctx.expect(":")?;
  let label = read_variable(ctx, Some(Sort::Handle))?;

  let mut args = Vec::new();
  while !ctx.peek_is("]") {
    args.push(read_argument(ctx)?);
  }
  ctx.next()?;

  let mut ep = ElementaryPredication::new(pred, label).with_args(args);
  ep.lnk = lnk;
  ep.surface = surface;
  Ok(ep)
}

fn read_rels(ctx: &mut ParseContext) -> Result<Vec<ElementaryPredication>> {
  ctx.expect("RELS")?;
  ctx.expect(":")?;
  ctx.expect("<")?;
  let mut eps = Vec::new();
  while !ctx.peek_is(">") {
    eps.push(read_ep(ctx)?);
  }
  ctx.next()?;
  Ok(eps)
}

fn read_hcons(ctx: &mut ParseContext) -> Result<Vec<HandleConstraint>> {
  ctx.expect("HCONS")?;
  ctx.expect(":")?;
  ctx.expect("<")?;
  let mut hcons = Vec::new();
  while !ctx.peek_is(">") {
    let hi = read_variable(ctx, Some(Sort::Handle))?;
    let relation = ctx.next()?;
    let relation = relation
      .text
      .parse::<HconsRelation>()
      .map_err(|_| invalid_token(&relation, "one of qeq, lheq, outscopes"))?;
    let lo = read_variable(ctx, Some(Sort::Handle))?;
    hcons.push(HandleConstraint::new(hi, relation, lo));
  }
  ctx.next()?;
  Ok(hcons)
}

fn read_icons(ctx: &mut ParseContext) -> Result<Vec<IndividualConstraint>> {
  ctx.expect("ICONS")?;
  ctx.expect(":")?;
  ctx.expect("<")?;
  let mut icons = Vec::new();
  while !ctx.peek_is(">") {
    let target = read_variable(ctx, None)?;
    let relation = ctx.next()?.text.to_lowercase();
    let clause = read_variable(ctx, None)?;
    icons.push(IndividualConstraint::new(target, relation, clause));
  }
  ctx.next()?;
  Ok(icons)
}

/// Lazily reads structures from a token stream. Stops for good after the
/// first error.
pub struct Decoder {
  tokens: VecDeque<Token>,
  failed: bool,
}

impl Decoder {
  pub fn new(s: &str) -> Self {
    Self {
      tokens: tokenize(s),
      failed: false,
    }
  }
}

impl Iterator for Decoder {
  type Item = Result<Xmrs>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.tokens.is_empty() {
      return None;
    }
    let mut ctx = ParseContext::new(&mut self.tokens);
    let result = read_mrs(&mut ctx);
    match &result {
      Ok(m) => trace!(eps = m.nodeids().len(), "read structure"),
      Err(e) => {
        debug!(error = %e, "abandoning SimpleMRS stream");
        self.failed = true;
      }
    }
    Some(result)
  }
}

pub fn loads(s: &str) -> Decoder {
  Decoder::new(s)
}

pub fn loads_one(s: &str) -> Result<Xmrs> {
  loads(s)
    .next()
    .unwrap_or_else(|| Err(XmrsError::deserialization("no structures to read")))
}

pub fn load(source: &mut impl Read) -> Result<Decoder> {
  let mut s = String::new();
  source.read_to_string(&mut s)?;
  Ok(loads(&s))
}

pub fn load_one(source: &mut impl Read) -> Result<Xmrs> {
  let mut s = String::new();
  source.read_to_string(&mut s)?;
  loads_one(&s)
}

/// Serializes variables, printing a variable's properties only the
/// first time it appears in an argument position
struct VarPrinter {
  listed: HashSet<u32>,
}

impl VarPrinter {
  fn new() -> Self {
    Self {
      listed: HashSet::new(),
    }
  }

  fn var(&mut self, v: &Variable) -> String {
    if v.properties.is_empty() || !self.listed.insert(v.vid) {
      return v.to_canonical_string();
    }
    let props = v
      .properties
      .iter()
      .map(|(k, val)| format!("{}: {}", k, val))
      .collect::<Vec<_>>()
      .join(" ");
    format!("{} [ {} {} ]", v, v.sort, props)
  }

  fn argument(&mut self, name: &str, value: &ArgValue) -> String {
    match value {
      ArgValue::Var(v) => format!("{}: {}", name, self.var(v)),
      ArgValue::Const(c) => format!("{}: {}", name, quote(c)),
    }
  }
}

fn serialize_ep(ep: &ElementaryPredication, printer: &mut VarPrinter, version: Version) -> String {
  let mut s = format!("[ {}{}", ep.pred, lnk_str(ep.lnk.as_ref()));
  if version >= Version::V1_1 {
    if let Some(surface) = &ep.surface {
      s.push(' ');
      s.push_str(&quote(surface));
    }
  }
  s.push_str(&format!(" LBL: {}", ep.label));
  for arg in ep.args.iter() {
    s.push(' ');
    s.push_str(&printer.argument(&arg.argname, &arg.value));
  }
  s.push_str(" ]");
  s
}

fn serialize_mrs(m: &Xmrs, options: &WriteOptions) -> String {
  let version = options.version;
  let mut printer = VarPrinter::new();
  let mut sections = Vec::new();

  if version >= Version::V1_1 {
    let mut header = Vec::new();
    if let Some(lnk) = &m.lnk {
      header.push(lnk.to_string());
    }
    if let Some(surface) = &m.surface {
      header.push(quote(surface));
    }
    if !header.is_empty() {
      sections.push(header.join(" "));
    }
  }

  if let Some(ltop) = m.ltop() {
    let name = if version >= Version::V1_1 { "TOP" } else { "LTOP" };
    sections.push(printer.argument(name, &ArgValue::Var(ltop)));
  }
  if let Some(index) = m.index() {
    sections.push(printer.argument("INDEX", &ArgValue::Var(index)));
  }
  if version >= Version::V1_1 {
    if let Some(xarg) = m.xarg() {
      sections.push(printer.argument("XARG", &ArgValue::Var(xarg)));
    }
  }

  let ep_delim = if options.pretty_print { "\n          " } else { " " };
  let eps = m
    .eps()
    .iter()
    .map(|ep| serialize_ep(ep, &mut printer, version))
    .collect::<Vec<_>>();
  sections.push(format!("RELS: < {} >", eps.join(ep_delim)));

  let mut hcons = vec!["HCONS:".to_string(), "<".to_string()];
  for hc in m.hcons() {
    hcons.push(hc.to_string());
  }
  hcons.push(">".to_string());
  sections.push(hcons.join(" "));

  let icons = m.icons();
  if version >= Version::V1_1 && !icons.is_empty() {
    let mut toks = vec!["ICONS:".to_string(), "<".to_string()];
    for ic in icons.iter() {
      toks.push(printer.var(&ic.target));
      toks.push(ic.relation.clone());
      toks.push(printer.var(&ic.clause));
    }
    toks.push(">".to_string());
    sections.push(toks.join(" "));
  }

  let section_delim = if options.pretty_print { "\n  " } else { " " };
  format!("[ {} ]", sections.join(section_delim))
}

/// Serializes every structure, one per line in compact mode
pub fn dumps(ms: &[Xmrs], options: &WriteOptions) -> String {
  let out = ms
    .iter()
    .map(|m| serialize_mrs(m, options))
    .collect::<Vec<_>>()
    .join("\n");
  debug!(structures = ms.len(), version = %options.version, "wrote SimpleMRS");
  options.colorize(out)
}

pub fn dumps_one(m: &Xmrs, options: &WriteOptions) -> String {
  dumps(std::slice::from_ref(m), options)
}

pub fn dump(sink: &mut impl Write, ms: &[Xmrs], options: &WriteOptions) -> Result<()> {
  writeln!(sink, "{}", dumps(ms, options))?;
  Ok(())
}

pub fn dump_one(sink: &mut impl Write, m: &Xmrs, options: &WriteOptions) -> Result<()> {
  dump(sink, std::slice::from_ref(m), options)
}

#[derive(Debug, Copy, Clone, Default)]
pub struct SimpleMrs;

impl XmrsReader for SimpleMrs {
  fn decode(&self, s: &str) -> Result<Box<dyn Iterator<Item = Result<Xmrs>>>> {
    Ok(Box::new(loads(s)))
  }
}

impl XmrsWriter for SimpleMrs {
  fn encode(&self, ms: &[Xmrs], options: &WriteOptions) -> Result<String> {
    Ok(dumps(ms, options))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  const RAIN: &str =
    r#"[ TOP: h0 INDEX: e2 RELS: < [ "_rain_v_1_rel" LBL: h1 ARG0: e2 ] > HCONS: < h0 qeq h1 > ]"#;

  const KIM_SLEEPS: &str = r#"[ "Kim sleeps." TOP: h0 INDEX: e2 [ e SF: prop TENSE: pres ]
    RELS: < [ proper_q<0:3> LBL: h4 ARG0: x3 [ x PERS: 3 NUM: sg ] RSTR: h5 BODY: h6 ]
            [ named<0:3> LBL: h7 ARG0: x3 CARG: "Kim" ]
            [ "_sleep_v_1_rel"<4:11> LBL: h1 ARG0: e2 ARG1: x3 ] >
    HCONS: < h0 qeq h1 h5 qeq h7 > ]"#;

  fn texts(tokens: &VecDeque<Token>) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
  }

  #[test]
  fn test_tokenize() {
    let tokens = tokenize(r#"[ "_dog_n_rel"<0:3> LBL: h1 CARG: "a \"b\"" ]"#);
    assert_eq!(
      texts(&tokens),
      vec!["[", r#""_dog_n_rel""#, "<", "0", ":", "3", ">", "LBL", ":", "h1", "CARG", ":", r#""a \"b\"""#, "]"]
    );

    let tokens = tokenize("'_dog_n_rel' _o'clock_n_rel\n  x1");
    assert_eq!(texts(&tokens), vec!["'_dog_n_rel'", "_o'clock_n_rel", "x1"]);
    assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
  }

  #[test]
  fn test_rain_round_trip() {
    let m = loads_one(RAIN).unwrap();
    assert_eq!(m.nodeids().len(), 1);
    let ep = &m.eps()[0];
    assert_eq!(ep.pred.string_form(), "\"_rain_v_1_rel\"");
    assert_eq!(ep.label.to_canonical_string(), "h1");
    assert_eq!(ep.args.len(), 1);
    assert_eq!(ep.args[0].argname, "ARG0");
    assert_eq!(ep.args[0].value.to_string(), "e2");
    assert_eq!(m.hcons().len(), 1);
    assert_eq!(m.hcons()[0].to_string(), "h0 qeq h1");

    assert_eq!(dumps_one(&m, &WriteOptions::default()), RAIN);
  }

  #[test]
  fn test_round_trip_is_structural() {
    let m = loads_one(KIM_SLEEPS).unwrap();
    let again = loads_one(&dumps_one(&m, &WriteOptions::default())).unwrap();
    assert_eq!(m, again);
    assert_eq!(m.surface.as_deref(), Some("Kim sleeps."));
    assert_eq!(again.surface.as_deref(), Some("Kim sleeps."));

    let pretty = loads_one(&dumps_one(&m, &WriteOptions::pretty())).unwrap();
    assert_eq!(m, pretty);
  }

  #[test]
  fn test_properties_print_once() {
    let m = loads_one(KIM_SLEEPS).unwrap();
    let out = dumps_one(&m, &WriteOptions::default());
    assert_eq!(out.matches("[ x PERS: 3 NUM: sg ]").count(), 1);
    assert_eq!(out.matches("[ e SF: prop TENSE: pres ]").count(), 1);
    assert!(out.starts_with(r#"[ "Kim sleeps." TOP: h0 INDEX: e2 [ e SF: prop TENSE: pres ] RELS: <"#));
    assert!(out.contains(r#"CARG: "Kim""#));
    assert!(out.contains("[ named<0:3> LBL: h7 ARG0: x3 CARG: \"Kim\" ]"));
  }

  #[test]
  fn test_pretty_print() {
    let m = loads_one(RAIN).unwrap();
    assert_eq!(
      dumps_one(&m, &WriteOptions::pretty()),
      "[ TOP: h0\n  INDEX: e2\n  RELS: < [ \"_rain_v_1_rel\" LBL: h1 ARG0: e2 ] >\n  HCONS: < h0 qeq h1 > ]"
    );
  }

  #[test]
  fn test_version_1_0() {
    let m = loads_one(RAIN).unwrap().with_surface("It rains.");
    let options = WriteOptions::default().with_version(Version::V1_0);
    assert_eq!(
      dumps_one(&m, &options),
      r#"[ LTOP: h0 INDEX: e2 RELS: < [ "_rain_v_1_rel" LBL: h1 ARG0: e2 ] > HCONS: < h0 qeq h1 > ]"#
    );
    let m = loads_one(&RAIN.replace("TOP", "LTOP")).unwrap();
    assert_eq!(m.ltop().map(|v| v.to_canonical_string()), Some("h0".to_string()));
  }

  #[test]
  fn test_variable_sort_conflict() {
    let err = loads_one("[ TOP: h0 INDEX: e2 RELS: < [ _rain_v_rel LBL: h1 ARG0: x2 ] > ]").unwrap_err();
    assert!(err.is_deserialization());
    match err {
      XmrsError::Deserialization { token, .. } => assert_eq!(token.as_deref(), Some("x2")),
      _ => unreachable!(),
    }
  }

  #[test]
  fn test_properties_merge() {
    let m = loads_one(
      "[ TOP: h0 INDEX: e2 [ e TENSE: past ] RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 [ e SF: prop TENSE: pres ] ] > ]",
    )
    .unwrap();
    let e2 = m.index().unwrap();
    assert_eq!(e2.properties.len(), 2);
    assert_eq!(e2.properties["TENSE"], "pres");
    assert_eq!(e2.properties["SF"], "prop");
    assert_eq!(m.eps()[0].properties(), e2.properties);
  }

  #[rstest]
  #[case("<0:5>", Some(Lnk::CharSpan(0, 5)))]
  #[case("<1#3>", Some(Lnk::ChartSpan(1, 3)))]
  #[case("<@7>", Some(Lnk::Edge(7)))]
  #[case("<1 2 3>", Some(Lnk::Tokens(vec![1, 2, 3])))]
  #[case("<>", None)]
  fn test_lnk_forms(#[case] lnk: &str, #[case] expected: Option<Lnk>) {
    let s = format!("[ RELS: < [ _rain_v_rel{} LBL: h1 ARG0: e2 ] > ]", lnk);
    let m = loads_one(&s).unwrap();
    assert_eq!(m.eps()[0].lnk, expected);
    assert_eq!(dumps_one(&m, &WriteOptions::default()), format!(
      "[ RELS: < [ _rain_v_rel{} LBL: h1 ARG0: e2 ] > HCONS: < > ]",
      lnk_str(expected.as_ref())
    ));
  }

  #[rstest]
  #[case("qeq", HconsRelation::Qeq)]
  #[case("QEQ", HconsRelation::Qeq)]
  #[case("LHEQ", HconsRelation::Lheq)]
  #[case("Outscopes", HconsRelation::Outscopes)]
  fn test_hcons_keywords(#[case] keyword: &str, #[case] expected: HconsRelation) {
    let s = format!("[ TOP: h0 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 ] > HCONS: < h0 {} h1 > ]", keyword);
    let m = loads_one(&s).unwrap();
    assert_eq!(m.hcons()[0].relation, expected);
  }

  #[test]
  fn test_invalid_hcons_keyword() {
    let err = loads_one("[ TOP: h0 RELS: < > HCONS: < h0 eq h1 > ]").unwrap_err();
    match err {
      XmrsError::Deserialization { token, line, column, .. } => {
        assert_eq!(token.as_deref(), Some("eq"));
        assert_eq!((line, column), (1, 33));
      }
      e => panic!("unexpected error {}", e),
    }
  }

  #[test]
  fn test_error_positions() {
    let err = loads_one("[ TOP: h0\n  RELS: < [ _rain_v_rel ARG0: e2 ] > ]").unwrap_err();
    match err {
      XmrsError::Deserialization { token, line, column, .. } => {
        assert_eq!(token.as_deref(), Some("ARG0"));
        assert_eq!((line, column), (2, 25));
      }
      e => panic!("unexpected error {}", e),
    }

    let err = loads_one("[ TOP: h0 RELS: < [ _rain_v_rel LBL: h1").unwrap_err();
    assert!(err.is_deserialization());
    assert!(err.to_string().contains("unexpected end of input"));
  }

  #[test]
  fn test_handles_cannot_have_properties() {
    assert!(loads_one("[ TOP: h0 [ h FOO: bar ] RELS: < > ]").is_err());
    assert!(loads_one("[ TOP: h0 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 [ x TENSE: past ] ] > ]").is_err());
    assert!(loads_one("[ INDEX: e2 [ TENSE: past ] RELS: < > ]").is_err());
  }

  #[test]
  fn test_constants() {
    let m = loads_one(r#"[ RELS: < [ card_rel LBL: h1 ARG0: e2 ARG1: x3 CARG: "3" ] [ _x_n_rel LBL: h4 ARG0: x3 YEAR: 1999 ] > ]"#)
      .unwrap();
    let card = m.eps().into_iter().find(|ep| ep.pred.lemma() == "card").unwrap();
    assert_eq!(card.carg(), Some("3"));
    let x = m.eps().into_iter().find(|ep| ep.pred.lemma() == "x").unwrap();
    assert_eq!(x.arg_value("YEAR"), Some(&ArgValue::Const("1999".to_string())));
  }

  #[test]
  fn test_icons() {
    let s = "[ TOP: h0 INDEX: e2 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 ] > HCONS: < h0 qeq h1 > ICONS: < e2 TOPIC x3 > ]";
    let m = loads_one(s).unwrap();
    assert_eq!(m.icons().len(), 1);
    assert_eq!(m.icons()[0].relation, "topic");
    let out = dumps_one(&m, &WriteOptions::default());
    assert!(out.ends_with("HCONS: < h0 qeq h1 > ICONS: < e2 topic x3 > ]"));
    let out = dumps_one(&m, &WriteOptions::default().with_version(Version::V1_0));
    assert!(!out.contains("ICONS"));
  }

  #[test]
  fn test_multiple_structures() {
    let s = format!("{}\n{}", RAIN, KIM_SLEEPS);
    let ms = loads(&s).collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(ms.len(), 2);
    assert_eq!(ms[1].nodeids().len(), 3);

    let out = dumps(&ms, &WriteOptions::default());
    assert_eq!(out.lines().count(), 2);
    assert_eq!(loads(&out).count(), 2);
    assert!(loads("").next().is_none());
    assert!(loads_one("").is_err());
  }

  #[test]
  fn test_stream_stops_after_error() {
    let s = format!("{} [ TOP: h0 RELS: < [ _x_v_rel LBL: x1 ] > ] {}", RAIN, RAIN);
    let results = loads(&s).collect::<Vec<_>>();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
  }

  #[test]
  fn test_constants_are_quoted_on_write() {
    let eps = vec![
      ElementaryPredication::new(Pred::grammar("named_rel"), Variable::handle(1)).with_args([
        Argument::mrs_argument("ARG0", Variable::new(2, Sort::RefInd)),
        Argument::constant(None, "CARG", "Kim Lee"),
      ]),
      ElementaryPredication::new(Pred::grammar("named_rel"), Variable::handle(3)).with_args([
        Argument::mrs_argument("ARG0", Variable::new(4, Sort::RefInd)),
        Argument::constant(None, "CARG", r#"a "b" [c]:<d>"#),
      ]),
    ];
    let m = Xmrs::from_mrs(Hook::new(Some(Variable::handle(0)), None), eps, vec![], vec![]).unwrap();
    let out = dumps_one(&m, &WriteOptions::default());
    assert!(out.contains(r#"CARG: "Kim Lee""#));
    assert!(out.contains(r#"CARG: "a \"b\" [c]:<d>""#));

    let again = loads_one(&out).unwrap();
    assert_eq!(again, m);
    assert_eq!(again.eps()[0].carg(), m.eps()[0].carg());
  }

  #[rstest]
  #[case(r#""It rains.""#, "It rains.")]
  #[case("'It rains.'", "It rains.")]
  #[case(r#"'It\'s raining.'"#, "It's raining.")]
  #[case(r#""say \"rain\"""#, r#"say "rain""#)]
  fn test_surface_quote_styles(#[case] surface: &str, #[case] expected: &str) {
    let s = format!("[ {} TOP: h0 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 ] > ]", surface);
    let m = loads_one(&s).unwrap();
    assert_eq!(m.surface.as_deref(), Some(expected));
    let again = loads_one(&dumps_one(&m, &WriteOptions::default())).unwrap();
    assert_eq!(again.surface.as_deref(), Some(expected));
  }

  #[test]
  fn test_lisp_style_predicates_stay_bare() {
    let tokens = tokenize("[ '_dog_n_rel<0:3> LBL: h1 ] [ '_cat_n_rel LBL: h2 ]");
    assert_eq!(tokens[1].text, "'_dog_n_rel");
    assert_eq!(tokens[12].text, "'_cat_n_rel");
  }

  #[test]
  fn test_xarg_round_trip() {
    let s = "[ TOP: h0 INDEX: e2 XARG: x3 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 ] > HCONS: < h0 qeq h1 > ]";
    let m = loads_one(s).unwrap();
    assert_eq!(m.xarg().map(|v| v.to_canonical_string()), Some("x3".to_string()));
    assert_eq!(dumps_one(&m, &WriteOptions::default()), s);
    assert_eq!(loads_one(&dumps_one(&m, &WriteOptions::default())).unwrap(), m);

    let hook = Hook::new(Some(Variable::handle(0)), Some(Variable::new(2, Sort::Event)))
      .with_xarg(Variable::new(3, Sort::RefInd));
    let eps = vec![ElementaryPredication::new(Pred::string("_rain_v_rel"), Variable::handle(1))
      .with_args([Argument::mrs_argument("ARG0", Variable::new(2, Sort::Event))])];
    let built = Xmrs::from_mrs(hook, eps, vec![], vec![]).unwrap();
    assert_eq!(loads_one(&dumps_one(&built, &WriteOptions::default())).unwrap(), built);
  }

  #[test]
  fn test_icons_keep_properties() {
    let s = "[ TOP: h0 INDEX: e2 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 ] > HCONS: < h0 qeq h1 > ICONS: < e2 topic x3 [ x PERS: 3 ] > ]";
    let m = loads_one(s).unwrap();
    let out = dumps_one(&m, &WriteOptions::default());
    assert_eq!(out, s);
    let again = loads_one(&out).unwrap();
    assert_eq!(again.icons()[0].clause.properties["PERS"], "3");
  }

  #[test]
  fn test_conflicting_hcons_are_rejected() {
    let s = "[ TOP: h0 RELS: < [ _rain_v_rel LBL: h1 ARG0: e2 ] [ _snow_v_rel LBL: h3 ARG0: e4 ] > HCONS: < h0 qeq h1 h0 outscopes h3 > ]";
    assert!(loads_one(s).unwrap_err().is_structure());
  }

  #[test]
  fn test_reader_and_writer_traits() {
    let m = SimpleMrs.decode_one(RAIN).unwrap();
    assert_eq!(SimpleMrs.encode_one(&m, &WriteOptions::default()).unwrap(), RAIN);

    let mut sink = Vec::new();
    dump_one(&mut sink, &m, &WriteOptions::default()).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), format!("{}\n", RAIN));

    let mut source = RAIN.as_bytes();
    assert_eq!(load_one(&mut source).unwrap(), m);
  }
}
