use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::config::QUANTIFIER_POS;

/// How a predicate was written
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PredKind {
  /// A grammar-internal symbol: `udef_q_rel`
  Grammar,
  /// A surface predicate given as a (possibly quoted) string: `"_dog_n_1_rel"`
  String,
  /// A surface predicate given as its parts
  Real,
}

/// A predicate symbol.
///
/// Equality, ordering and hashing use the normalized form (see
/// [`Pred::short_form`]), so `"_dog_n_rel"`, `_dog_n_REL` and
/// `Pred::real("dog", "n", None)` are all the same predicate.
#[derive(Debug, Clone)]
pub struct Pred {
  kind: PredKind,
  string: String,
  lemma: String,
  pos: Option<String>,
  sense: Option<String>,
}

impl Pred {
  pub fn grammar(s: impl Into<String>) -> Self {
    Self::split(PredKind::Grammar, s.into())
  }

  pub fn string(s: impl Into<String>) -> Self {
    Self::split(PredKind::String, s.into())
  }

  pub fn real(lemma: impl Into<String>, pos: impl Into<String>, sense: Option<String>) -> Self {
    let lemma = lemma.into();
    let pos = pos.into();
    let string = match &sense {
      Some(sense) => format!("_{}_{}_{}_rel", lemma, pos, sense),
      None => format!("_{}_{}_rel", lemma, pos),
    };
    Self {
      kind: PredKind::Real,
      string,
      lemma,
      pos: Some(pos),
      sense,
    }
  }

  /// Surface predicates start with `_` once unquoted; anything else is a
  /// grammar predicate.
  pub fn string_or_grammar(s: impl Into<String>) -> Self {
    let s = s.into();
    if unquote(&s).starts_with('_') {
      Self::string(s)
    } else {
      Self::grammar(s)
    }
  }

  fn split(kind: PredKind, string: String) -> Self {
    let mut body = strip_rel(unquote(&string));
    if kind != PredKind::Grammar {
      body = body.strip_prefix('_').unwrap_or(body);
    }

    let parts = body.split('_').collect::<Vec<_>>();
    let n = parts.len();
    let is_pos = |s: &str| s.chars().count() == 1;

    let (lemma, pos, sense) = if n >= 3 && is_pos(parts[n - 2]) {
      (parts[..n - 2].join("_"), Some(parts[n - 2]), Some(parts[n - 1]))
    } else if n >= 2 && is_pos(parts[n - 1]) {
      (parts[..n - 1].join("_"), Some(parts[n - 1]), None)
    } else if n >= 2 {
      (parts[..n - 1].join("_"), None, Some(parts[n - 1]))
    } else {
      (body.to_string(), None, None)
    };

    Self {
      kind,
      lemma,
      pos: pos.map(str::to_string),
      sense: sense.map(str::to_string),
      string,
    }
  }

  pub fn kind(&self) -> PredKind {
    self.kind
  }

  /// The predicate as it was written, quotes and all
  pub fn string_form(&self) -> &str {
    &self.string
  }

  pub fn lemma(&self) -> &str {
    &self.lemma
  }

  pub fn pos(&self) -> Option<&str> {
    self.pos.as_deref()
  }

  pub fn sense(&self) -> Option<&str> {
    self.sense.as_deref()
  }

  pub fn is_quantifier(&self) -> bool {
    self.pos() == Some(QUANTIFIER_POS)
  }

  /// The normalized form: no quotes and no `_rel` suffix. Surface
  /// predicates keep their leading underscore, so `_dog_n` and `dog_n`
  /// stay distinct.
  pub fn short_form(&self) -> String {
    match self.kind {
      PredKind::Grammar => strip_rel(unquote(&self.string)).to_string(),
      PredKind::String | PredKind::Real => {
        let mut s = format!("_{}", self.lemma);
        if let Some(pos) = &self.pos {
          s.push('_');
          s.push_str(pos);
        }
        if let Some(sense) = &self.sense {
          s.push('_');
          s.push_str(sense);
        }
        s
      }
    }
  }
}

fn unquote(s: &str) -> &str {
  let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
  s.strip_suffix(['"', '\'']).unwrap_or(s)
}

fn strip_rel(s: &str) -> &str {
  let n = s.len();
  if n > 4 && s.is_char_boundary(n - 4) && s[n - 4..].eq_ignore_ascii_case("_rel") {
    &s[..n - 4]
  } else {
    s
  }
}

impl PartialEq for Pred {
  fn eq(&self, other: &Self) -> bool {
    self.short_form() == other.short_form()
  }
}

impl Eq for Pred {}

impl Hash for Pred {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.short_form().hash(state);
  }
}

impl PartialOrd for Pred {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Pred {
  fn cmp(&self, other: &Self) -> Ordering {
    self.short_form().cmp(&other.short_form())
  }
}

impl fmt::Display for Pred {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.string)
  }
}
