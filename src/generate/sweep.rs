//! Constrained placement sweep for one rectangle size.
//!
//! Starting from every fitting corner `(x0, y0)`, each further rectangle is
//! placed at an integer multiple of the rectangle size away from its
//! predecessor. Multipliers are restricted to
//! `[-floor(W / w), floor(W / w)]` horizontally (likewise vertically) and to
//! placements that keep the rectangle inside the window, so out-of-window
//! candidates are never built. Placements that reuse a position already on
//! the path are skipped.

use crate::generate::set::TemplateSet;
use crate::template::{CanonicalHasher, Rect, WaveletTemplate};
use crate::util::HaarResult;

/// Counters collected while sweeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Fully specified candidates that passed every constraint.
    pub candidates: usize,
    /// Placements discarded because the position was already used.
    pub overlaps: usize,
}

impl SweepStats {
    pub(crate) fn add(&mut self, other: SweepStats) {
        self.candidates += other.candidates;
        self.overlaps += other.overlaps;
    }
}

/// Parameters of one `(dimensions, width, height)` partition.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Partition<'w> {
    pub(crate) sample_size: usize,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) weights: &'w [f32],
}

impl Partition<'_> {
    /// Sweeps the partition into a fresh set.
    pub(crate) fn sweep(&self, hasher: &CanonicalHasher) -> HaarResult<(TemplateSet, SweepStats)> {
        let mut set = TemplateSet::with_hasher(hasher.clone());
        let mut stats = SweepStats::default();
        let mut path = Vec::with_capacity(self.weights.len());

        for y0 in 0..=self.sample_size - self.height {
            for x0 in 0..=self.sample_size - self.width {
                path.push(Rect::new(x0, y0, self.width, self.height));
                self.extend(&mut path, &mut set, &mut stats)?;
                path.pop();
            }
        }
        Ok((set, stats))
    }

    fn extend(
        &self,
        path: &mut Vec<Rect>,
        set: &mut TemplateSet,
        stats: &mut SweepStats,
    ) -> HaarResult<()> {
        if path.len() == self.weights.len() {
            stats.candidates += 1;
            let tpl = WaveletTemplate::new(path.clone(), self.weights.to_vec())?;
            set.insert(tpl)?;
            return Ok(());
        }

        let last = match path.last() {
            Some(rect) => *rect,
            None => return Ok(()),
        };
        let (dx_min, dx_max) = multiplier_range(last.x, self.width, self.sample_size);
        let (dy_min, dy_max) = multiplier_range(last.y, self.height, self.sample_size);

        for dy in dy_min..=dy_max {
            for dx in dx_min..=dx_max {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = offset(last.x, dx, self.width);
                let y = offset(last.y, dy, self.height);
                if path.iter().any(|r| r.x == x && r.y == y) {
                    stats.overlaps += 1;
                    continue;
                }
                path.push(Rect::new(x, y, self.width, self.height));
                self.extend(path, set, stats)?;
                path.pop();
            }
        }
        Ok(())
    }
}

/// Returns the inclusive multiplier range that keeps a rectangle of extent
/// `size` starting at `pos + m * size` inside `[0, window)`.
fn multiplier_range(pos: usize, size: usize, window: usize) -> (isize, isize) {
    let bound = (window / size) as isize;
    // Smallest m with pos + m * size >= 0.
    let lo = -((pos / size) as isize);
    // Largest m with pos + m * size + size <= window.
    let hi = ((window - size - pos) / size) as isize;
    (lo.max(-bound), hi.min(bound))
}

fn offset(pos: usize, multiplier: isize, size: usize) -> usize {
    (pos as isize + multiplier * size as isize) as usize
}
