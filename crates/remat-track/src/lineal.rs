//! Exact lineal-path (L2) segment counts with single-site incremental
//! updates.

use remat_core::{Phase, PhaseGrid, Site};

use crate::support::{line_period, valid_starts};

/// Integer segment counts for one lineal-path descriptor.
///
/// `counts[slot][lag]` is the number of start sites opening a run of
/// `lag + 1` consecutive descriptor-phase sites along direction `slot`.
/// A flip only disturbs segments crossing the flipped site, so deltas are
/// computed from bounded run scans on either side of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinealCounts {
    phase: Phase,
    length: usize,
    steps: Vec<Site>,
    periods: Vec<usize>,
    counts: Vec<Vec<u64>>,
    totals: Vec<Vec<u64>>,
}

impl LinealCounts {
    /// Builds segment counts for `phase` from a full grid scan.
    pub(crate) fn build(grid: &PhaseGrid, phase: Phase, steps: Vec<Site>, length: usize) -> Self {
        let periods = steps
            .iter()
            .map(|step| {
                if grid.is_periodic() {
                    line_period(grid, *step)
                } else {
                    usize::MAX
                }
            })
            .collect();
        let mut counts = vec![vec![0u64; length]; steps.len()];
        let mut totals = vec![vec![0u64; length]; steps.len()];
        for (slot, step) in steps.iter().enumerate() {
            for lag in 0..length {
                totals[slot][lag] = valid_starts(grid, *step, lag);
            }
            for index in 0..grid.len() {
                let site = grid.site_of(index);
                for lag in 0..length {
                    let probe = [
                        site[0] + lag as isize * step[0],
                        site[1] + lag as isize * step[1],
                        site[2] + lag as isize * step[2],
                    ];
                    match grid.resolve(probe) {
                        Some(other) if grid.get(other) == phase => counts[slot][lag] += 1,
                        _ => break,
                    }
                }
            }
        }
        Self {
            phase,
            length,
            steps,
            periods,
            counts,
            totals,
        }
    }

    /// Subtracts every segment crossing the site at `index`. Must run
    /// before the site is written.
    pub(crate) fn remove_site(&mut self, grid: &PhaseGrid, index: usize) {
        self.shift_site(grid, index, false);
    }

    /// Adds every segment crossing the site at `index`. Must run after the
    /// site is written.
    pub(crate) fn add_site(&mut self, grid: &PhaseGrid, index: usize) {
        self.shift_site(grid, index, true);
    }

    fn shift_site(&mut self, grid: &PhaseGrid, index: usize, add: bool) {
        if grid.get(index) != self.phase {
            return;
        }
        let site = grid.site_of(index);
        for slot in 0..self.steps.len() {
            let step = self.steps[slot];
            let period = self.periods[slot];
            let cap = self.length.saturating_sub(1).min(period.saturating_sub(1));
            let ahead = self.run_length(grid, site, step, 1, cap);
            let behind = self.run_length(grid, site, step, -1, cap);

            if ahead + behind + 1 >= period {
                // The whole periodic line holds the phase: every window
                // position crosses the site once it spans the line.
                for lag in 0..self.length {
                    let crossing = (lag + 1).min(period) as u64;
                    shift(&mut self.counts[slot][lag], crossing, add);
                }
                continue;
            }

            for lag in 0..self.length {
                let window = lag + 1;
                let crossing = window
                    .min(ahead + 1)
                    .min(behind + 1)
                    .min((ahead + behind + 2).saturating_sub(window));
                shift(&mut self.counts[slot][lag], crossing as u64, add);
            }
        }
    }

    /// Length of the phase run adjacent to `site` along `sign * step`,
    /// scanning at most `cap` sites.
    fn run_length(
        &self,
        grid: &PhaseGrid,
        site: Site,
        step: Site,
        sign: isize,
        cap: usize,
    ) -> usize {
        let mut run = 0usize;
        while run < cap {
            let reach = (run + 1) as isize * sign;
            let probe = [
                site[0] + reach * step[0],
                site[1] + reach * step[1],
                site[2] + reach * step[2],
            ];
            match grid.resolve(probe) {
                Some(other) if grid.get(other) == self.phase => run += 1,
                _ => break,
            }
        }
        run
    }

    /// Per-direction probability vectors, `counts / totals`.
    pub(crate) fn probabilities(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .zip(self.totals.iter())
            .map(|(counts, totals)| {
                counts
                    .iter()
                    .zip(totals.iter())
                    .map(|(&count, &total)| {
                        if total == 0 {
                            0.0
                        } else {
                            count as f64 / total as f64
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Raw per-direction segment counts, for hashing and consistency checks.
    pub(crate) fn raw_counts(&self) -> &[Vec<u64>] {
        &self.counts
    }
}

#[inline]
fn shift(value: &mut u64, amount: u64, add: bool) {
    if add {
        *value += amount;
    } else {
        *value -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remat_core::Direction;

    #[test]
    fn solid_block_counts_follow_run_arithmetic() {
        // One solid row of length 5 in a clamped 5x3 grid.
        let mut grid = PhaseGrid::new(&[3, 5], false).unwrap();
        for column in 0..5 {
            grid.set(grid.index_of([1, column, 0]), 1);
        }
        let counts = LinealCounts::build(&grid, 1, vec![Direction::Y.step()], 4);
        // A run of n sites opens n - lag windows of size lag + 1.
        assert_eq!(counts.raw_counts()[0], vec![5, 4, 3, 2]);
    }

    #[test]
    fn incremental_update_matches_fresh_build() {
        let mut grid = PhaseGrid::new(&[6, 6], true).unwrap();
        for index in 0..grid.len() {
            grid.set(index, u8::from(index % 3 != 0));
        }
        let steps = vec![Direction::X.step(), Direction::Y.step(), Direction::Yx.step()];
        let mut counts = LinealCounts::build(&grid, 1, steps.clone(), 5);

        let flips = [0usize, 7, 14, 21, 7, 35, 0];
        for &index in &flips {
            let value = 1 - grid.get(index);
            counts.remove_site(&grid, index);
            grid.set(index, value);
            counts.add_site(&grid, index);
            let fresh = LinealCounts::build(&grid, 1, steps.clone(), 5);
            assert_eq!(counts.raw_counts(), fresh.raw_counts());
        }
    }

    #[test]
    fn fully_solid_periodic_line_handles_wrap() {
        let mut grid = PhaseGrid::new(&[4, 4], true).unwrap();
        for column in 0..4 {
            grid.set(grid.index_of([2, column, 0]), 1);
        }
        let steps = vec![Direction::Y.step()];
        // Windows longer than the line keep wrapping through it: every one
        // of the 4 start positions stays solid at every lag.
        let mut counts = LinealCounts::build(&grid, 1, steps.clone(), 6);
        assert_eq!(counts.raw_counts()[0], vec![4, 4, 4, 4, 4, 4]);

        let target = grid.index_of([2, 1, 0]);
        counts.remove_site(&grid, target);
        grid.set(target, 0);
        counts.add_site(&grid, target);
        let fresh = LinealCounts::build(&grid, 1, steps, 6);
        assert_eq!(counts.raw_counts(), fresh.raw_counts());
    }
}
