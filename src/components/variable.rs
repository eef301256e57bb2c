use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Result, XmrsError};

/// Morphosyntactic properties of a variable, in insertion order
pub type Properties = IndexMap<String, String>;

/// The closed set of variable sorts
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
  /// `h`: labels, holes and the top handle
  Handle,
  /// `e`
  Event,
  /// `x`: referential individuals
  RefInd,
  /// `i`: underspecified between event and individual
  Individual,
  /// `u`: nothing is known about the sort
  Unknown,
}

impl Sort {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Handle => "h",
      Self::Event => "e",
      Self::RefInd => "x",
      Self::Individual => "i",
      Self::Unknown => "u",
    }
  }
}

impl FromStr for Sort {
  type Err = XmrsError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "h" => Ok(Self::Handle),
      "e" => Ok(Self::Event),
      "x" => Ok(Self::RefInd),
      "i" => Ok(Self::Individual),
      "u" => Ok(Self::Unknown),
      _ => Err(XmrsError::structure(format!("unknown variable sort: {}", s))),
    }
  }
}

impl fmt::Display for Sort {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A typed variable such as `x4` or `h1`.
///
/// Identity is `(sort, vid)`: equality, ordering and hashing ignore the
/// properties, which belong to the variable table of whatever structure
/// the variable lives in.
#[derive(Debug, Clone)]
pub struct Variable {
  pub vid: u32,
  pub sort: Sort,
  pub properties: Properties,
}

impl Variable {
  pub fn new(vid: u32, sort: Sort) -> Self {
    Self {
      vid,
      sort,
      properties: Properties::new(),
    }
  }

  pub fn with_properties<I, K, V>(vid: u32, sort: Sort, properties: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      vid,
      sort,
      properties: properties
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }

  pub fn handle(vid: u32) -> Self {
    Self::new(vid, Sort::Handle)
  }

  pub fn is_handle(&self) -> bool {
    self.sort == Sort::Handle
  }

  /// Splits `x4` into (`x`, 4). Fails unless the token is a known sort
  /// followed by digits only.
  pub fn sort_vid_split(s: &str) -> Option<(Sort, u32)> {
    regex_static!(SORT_VID, r"^([A-Za-z])(\d+)$");
    let caps = SORT_VID.captures(s)?;
    let sort = caps[1].parse::<Sort>().ok()?;
    let vid = caps[2].parse::<u32>().ok()?;
    Some((sort, vid))
  }

  /// The canonical string form, like `x4`. Compare against strings with
  /// this rather than with `==`.
  pub fn to_canonical_string(&self) -> String {
    format!("{}{}", self.sort, self.vid)
  }

  /// Additively merge properties: existing keys are updated, never removed.
  pub fn merge_properties(&mut self, other: &Properties) {
    for (k, v) in other {
      self.properties.insert(k.clone(), v.clone());
    }
  }
}

impl FromStr for Variable {
  type Err = XmrsError;

  fn from_str(s: &str) -> Result<Self> {
    Self::sort_vid_split(s)
      .map(|(sort, vid)| Self::new(vid, sort))
      .ok_or_else(|| XmrsError::structure(format!("not a variable: {}", s)))
  }
}

impl PartialEq for Variable {
  fn eq(&self, other: &Self) -> bool {
    self.sort == other.sort && self.vid == other.vid
  }
}

impl Eq for Variable {}

impl Hash for Variable {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.sort.hash(state);
    self.vid.hash(state);
  }
}

impl PartialOrd for Variable {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Variable {
  fn cmp(&self, other: &Self) -> Ordering {
    (self.sort, self.vid).cmp(&(other.sort, other.vid))
  }
}

impl fmt::Display for Variable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.sort, self.vid)
  }
}

/// Hands out variables with sequential vids, regardless of sort
#[derive(Debug, Clone)]
pub struct VarGenerator {
  next_vid: u32,
}

impl VarGenerator {
  pub fn new(starting_vid: u32) -> Self {
    Self {
      next_vid: starting_vid,
    }
  }

  pub fn new_var(&mut self, sort: Sort, properties: Properties) -> Variable {
    let vid = self.next_vid;
    self.next_vid += 1;
    Variable {
      vid,
      sort,
      properties,
    }
  }

  pub fn new_handle(&mut self) -> Variable {
    self.new_var(Sort::Handle, Properties::new())
  }
}

impl Default for VarGenerator {
  fn default() -> Self {
    Self::new(0)
  }
}
