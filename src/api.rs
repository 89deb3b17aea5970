//! On-demand analysis access with per-run caching.

use lazycell::LazyCell;

use crate::analysis::call_counts::{count_direct_calls, CallCounts};
use crate::data::module::Module;

/// Cached, on-demand analyses over one borrowed module.
///
/// Results are computed on first request and reused for the lifetime of the
/// value. Invalidation is dropping the `Analyses` and constructing a fresh
/// one; recomputation over an unchanged module yields an identical result.
/// The module must not be mutated while an `Analyses` borrows it, which the
/// borrow checker enforces.
pub struct Analyses<'m> {
    module: &'m Module,
    call_counts: LazyCell<CallCounts>,
}

impl<'m> Analyses<'m> {
    pub fn new(module: &'m Module) -> Self {
        Analyses {
            module,
            call_counts: LazyCell::new(),
        }
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    /// Direct call counts for the module, computed on first access.
    pub fn call_counts(&self) -> &CallCounts {
        if !self.call_counts.filled() {
            self.call_counts
                .fill(count_direct_calls(self.module))
                .ok();
        }

        // Filled right above, the borrow cannot fail.
        self.call_counts.borrow().unwrap()
    }
}
