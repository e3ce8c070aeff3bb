use std::fmt;

use crate::problem::ProblemPack;

/// Index of a registered company, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompanyId(pub usize);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "company-{}", self.0)
    }
}

/// A source of problem packs and the sink for their solutions.
///
/// `wait_for_pack` and `solved_pack` are called from two different threads
/// owned by the optimizer, possibly at the same time.
pub trait Company: Send + Sync {
    /// Block until the next pack is available. `None` means no more packs.
    fn wait_for_pack(&self) -> Option<ProblemPack>;

    /// Receive a fully solved pack. Packs come back in the order they were handed out.
    fn solved_pack(&self, pack: ProblemPack);
}
