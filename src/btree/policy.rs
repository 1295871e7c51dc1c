//! Fill policies distinguishing the three multiway variants.
//!
//! The split, search and delete algorithms are shared; a variant only
//! decides whether leaves are chained and when a sibling may lend an entry
//! to an under-full neighbour instead of being merged with it.

/// Per-variant rebalancing knobs for [`MultiwayTree`](super::MultiwayTree)
pub trait FillPolicy {
    /// Short human-readable variant name
    const NAME: &'static str;

    /// Whether leaves are threaded into an ascending `next` chain
    const LEAF_CHAIN: bool;

    /// May a sibling holding `len` entries donate one to a neighbour?
    fn can_lend(len: usize, min_degree: usize) -> bool;

    /// Fewest entries any non-root node may hold under this policy
    fn min_fill(min_degree: usize) -> usize {
        min_degree - 1
    }
}

/// Marker for variants whose leaves form a chain
pub trait LeafChain: FillPolicy {}

/// Classic B-tree: siblings lend only while they stay at `d-1` or above
#[derive(Debug, Clone, Copy, Default)]
pub struct Classic;

impl FillPolicy for Classic {
    const NAME: &'static str = "btree";
    const LEAF_CHAIN: bool = false;

    fn can_lend(len: usize, min_degree: usize) -> bool {
        len >= min_degree
    }
}

/// B+-tree: classic fill rules with chained leaves
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafChained;

impl FillPolicy for LeafChained {
    const NAME: &'static str = "bplus";
    const LEAF_CHAIN: bool = true;

    fn can_lend(len: usize, min_degree: usize) -> bool {
        len >= min_degree
    }
}

impl LeafChain for LeafChained {}

/// B*-tree: a sibling lends while it holds more than two thirds of `d`
#[derive(Debug, Clone, Copy, Default)]
pub struct Redistributing;

impl Redistributing {
    /// `⌊2d/3⌋`
    pub fn two_thirds(min_degree: usize) -> usize {
        2 * min_degree / 3
    }
}

impl FillPolicy for Redistributing {
    const NAME: &'static str = "bstar";
    const LEAF_CHAIN: bool = true;

    fn can_lend(len: usize, min_degree: usize) -> bool {
        len > Self::two_thirds(min_degree)
    }

    // A donor keeps at least ⌊2d/3⌋ entries, which sits below d-1 once d >= 4.
    fn min_fill(min_degree: usize) -> usize {
        (min_degree - 1).min(Self::two_thirds(min_degree))
    }
}

impl LeafChain for Redistributing {}
