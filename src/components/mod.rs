mod argument;
mod constraint;
mod dmrs;
mod ep;
mod hook;
mod lnk;
mod pred;
mod variable;

pub use argument::{ArgValue, Argument, ArgumentType};
pub use constraint::{HandleConstraint, HconsRelation, IndividualConstraint};
pub use dmrs::{Link, Node, Post};
pub use ep::ElementaryPredication;
pub use hook::Hook;
pub use lnk::{lnk_str, HasLnk, HasNodeId, Lnk};
pub use pred::{Pred, PredKind};
pub use variable::{Properties, Sort, VarGenerator, Variable};

/// Identifies an EP/node within one structure
pub type NodeId = u32;
