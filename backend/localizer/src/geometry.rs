//! Adjacency test and region merging for accepted headline boxes.

use serde::{Deserialize, Serialize};

use broadsheet_core::Region;

/// Maximum separation, in pixels, at which two boxes still count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapTolerance {
    pub horizontal: i32,
    pub vertical: i32,
}

impl Default for GapTolerance {
    fn default() -> Self {
        // Headlines wrap with more line spacing than word spacing.
        Self {
            horizontal: 20,
            vertical: 50,
        }
    }
}

/// Two boxes merge unless they are separated by more than the gap on some axis.
/// Overlapping boxes always merge.
pub fn should_merge(a: &Region, b: &Region, gap: GapTolerance) -> bool {
    let apart = a.right.saturating_add(gap.horizontal) < b.left
        || b.right.saturating_add(gap.horizontal) < a.left
        || a.bottom.saturating_add(gap.vertical) < b.top
        || b.bottom.saturating_add(gap.vertical) < a.top;
    !apart
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Merge until no two regions are adjacent. The result does not depend on
    /// insertion order.
    #[default]
    Fixpoint,
    /// Merge each new box into the first adjacent region and stop, without
    /// re-checking the grown region. Order-dependent.
    FirstMatch,
}

/// A growing set of consolidated regions.
#[derive(Debug, Clone)]
pub struct RegionSet {
    regions: Vec<Region>,
    gap: GapTolerance,
    strategy: MergeStrategy,
}

impl RegionSet {
    pub fn new(gap: GapTolerance, strategy: MergeStrategy) -> Self {
        Self {
            regions: Vec::new(),
            gap,
            strategy,
        }
    }

    pub fn insert(&mut self, region: Region) {
        match self.strategy {
            MergeStrategy::FirstMatch => {
                match self
                    .regions
                    .iter()
                    .position(|existing| should_merge(existing, &region, self.gap))
                {
                    Some(idx) => self.regions[idx] = self.regions[idx].union(&region),
                    None => self.regions.push(region),
                }
            }
            MergeStrategy::Fixpoint => {
                self.regions.push(region);
                self.settle();
            }
        }
    }

    /// Collapse adjacent pairs until none remain.
    fn settle(&mut self) {
        while let Some((i, j)) = self.find_adjacent_pair() {
            let absorbed = self.regions.remove(j);
            self.regions[i] = self.regions[i].union(&absorbed);
        }
    }

    fn find_adjacent_pair(&self) -> Option<(usize, usize)> {
        for i in 0..self.regions.len() {
            for j in (i + 1)..self.regions.len() {
                if should_merge(&self.regions[i], &self.regions[j], self.gap) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Final regions. Fixpoint output is sorted top-to-bottom, left-to-right;
    /// first-match output keeps creation order.
    pub fn into_regions(self) -> Vec<Region> {
        let mut regions = self.regions;
        if self.strategy == MergeStrategy::Fixpoint {
            regions.sort();
        }
        regions
    }
}
