//! Limits enforced while decoding value trees.

/// Bounds applied by [`unpack_value_with_limits`](crate::unpack_value_with_limits).
///
/// Malformed or hostile input can nest containers arbitrarily deep, ask a
/// sparse array to be padded to an absurd length, or use back-references
/// to expand a small input into a huge tree; these limits keep all three
/// bounded before any allocation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum container nesting depth, back-references included.
    pub max_depth: usize,
    /// Maximum slot an explicit array index may address.
    pub max_array_fill: usize,
    /// Maximum number of values one decode may produce, nil padding and
    /// re-decoded back-reference targets included.
    pub max_total_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_array_fill: 1 << 20,
            max_total_nodes: 1 << 20,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_depth: 8,
            max_array_fill: 64,
            max_total_nodes: 256,
        }
    }
}
