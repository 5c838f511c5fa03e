//! Command gating primitives: declared constraints, invocation context, and verdicts

mod constraints;
mod invocation;
mod verdict;

pub use constraints::{CommandConstraints, Condition};
pub use invocation::{ChannelContext, Invocation, RoleHolder};
pub use verdict::{CooldownHit, CooldownScope, Denial, Verdict, GENERAL_DENIAL};
