//! Constants shared by the constructors, queries and codecs.

use crate::components::NodeId;

/// The nodeid reserved for the top handle. No EP ever has this id.
pub const LTOP_NODEID: NodeId = 0;
/// The nodeid given to the first EP that doesn't bring its own
pub const FIRST_NODEID: NodeId = 10000;

/// Role of the intrinsic argument
pub const IVARG_ROLE: &str = "ARG0";
/// Role of a constant argument, such as the name in `named(Kim)`
pub const CONSTARG_ROLE: &str = "CARG";
/// DMRS quantifiers reach their restriction through this role
pub const RSTR_ROLE: &str = "RSTR";

/// Sortinfo key holding a DMRS node's variable sort
pub const CVARSORT: &str = "cvarsort";

/// Part-of-speech tag of quantifier predicates
pub const QUANTIFIER_POS: &str = "q";
