//! Instrumentation region markers.
//!
//! A [`Region`] enters a `region` span (field `region` = name) for its
//! lifetime and emits `region begin` / `region end` events at the
//! boundaries. Without a subscriber installed this costs next to nothing.

use tracing::span::EnteredSpan;

/// Name of the region wrapping the timed simulation phase.
pub const SIMULATION_REGION: &str = "simulation";

/// RAII guard for a named region.
///
/// # Examples
///
/// ```rust
/// use xs_kernel::region::{Region, SIMULATION_REGION};
///
/// let region = Region::enter(SIMULATION_REGION);
/// assert_eq!(region.name(), "simulation");
/// drop(region);
/// ```
#[must_use = "the region ends when the guard is dropped"]
pub struct Region {
    name: &'static str,
    _span: EnteredSpan,
}

impl Region {
    /// Enters the region `name`.
    pub fn enter(name: &'static str) -> Self {
        let span = tracing::info_span!("region", region = name).entered();
        tracing::debug!(region = name, "region begin");
        Self { name, _span: span }
    }

    /// Region name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        tracing::debug!(region = self.name, "region end");
    }
}
