//! Tuning knobs and caller-owned counters for BSP/CSG operations.

/// Default limit on BSP tree depth.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Options controlling tree construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsgOptions {
    max_depth: usize,
}

impl Default for CsgOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CsgOptions {
    /// Creates options with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum depth a BSP tree may reach while being built.
    ///
    /// Degenerate input (many near-coplanar fragments) can produce very
    /// unbalanced trees; the build fails with
    /// [`CsgError::DepthLimitExceeded`](crate::CsgError::DepthLimitExceeded)
    /// instead of growing past this limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the maximum tree depth.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Counters collected while building and clipping trees.
///
/// Owned by the caller and passed explicitly to the `*_with` operations, so
/// separate operations never share counter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    /// Nodes allocated while building trees.
    pub nodes_created: usize,
    /// Polygons that crossed a divider and were cut in two.
    pub polygons_split: usize,
    /// Fragments dropped because they ended up inside a solid region.
    pub fragments_clipped: usize,
}

impl SplitStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: &SplitStats) {
        self.nodes_created += other.nodes_created;
        self.polygons_split += other.polygons_split;
        self.fragments_clipped += other.fragments_clipped;
    }
}
