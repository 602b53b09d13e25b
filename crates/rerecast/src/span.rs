//! Spans: the linked-list-of-solid-intervals representation used by the
//! uncompacted [`crate::Heightfield`].

use slotmap::new_key_type;

new_key_type! {
    /// A key into a heightfield's span arena.
    pub struct SpanKey;
}

/// A solid voxel interval `[min, max)` within one heightfield column, plus a
/// link to the next span stacked above it in the same column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The lower bound of the span, in voxel units.
    pub min: u16,
    /// The upper bound of the span, in voxel units.
    pub max: u16,
    /// The area type of this span. [`AreaType::NOT_WALKABLE`] for spans that
    /// have been filtered out.
    pub area: AreaType,
    /// The next span stacked above this one in the same column, if any.
    pub next: Option<SpanKey>,
}

impl Span {
    /// Merge threshold: spans whose min/max differ by at most this many
    /// voxels are merged into one span during rasterization.
    pub const MERGE_THRESHOLD: u16 = 1;
}

/// A walkability classification for a span or compact span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaType(pub u8);

impl AreaType {
    /// Not walkable. This is the zero value so that `Default` and
    /// zero-initialized buffers behave correctly.
    pub const NOT_WALKABLE: AreaType = AreaType(0);
    /// The default walkable area, assigned to newly rasterized ground
    /// triangles before any custom area marking is applied.
    pub const DEFAULT_WALKABLE: AreaType = AreaType(u8::MAX);

    /// True if this area type is walkable, i.e. not [`AreaType::NOT_WALKABLE`].
    pub fn is_walkable(&self) -> bool {
        *self != Self::NOT_WALKABLE
    }
}

impl Default for AreaType {
    fn default() -> Self {
        Self::NOT_WALKABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_walkable_is_zero() {
        assert_eq!(AreaType::NOT_WALKABLE, AreaType(0));
        assert!(!AreaType::NOT_WALKABLE.is_walkable());
    }

    #[test]
    fn default_walkable_is_walkable() {
        assert!(AreaType::DEFAULT_WALKABLE.is_walkable());
    }
}
