//! Minimum-cost injection solver
//!
//! Matches a smaller set of sources one-to-one into a larger set of
//! targets so that the total pairing cost is minimal. Targets beyond the
//! source count stand for "no match". The solver is a pure function over
//! an explicit cost matrix and carries no shared state, so it is reusable
//! for any two-sided matching problem in the system.
//!
//! Problem sizes here are tiny (chords per slot, typically under 8), so
//! an exhaustive search with running-best pruning is both exact and fast.

/// Cost marking a pairing as forbidden
///
/// A forbidden pairing is never part of the returned matching as long as
/// any feasible alternative exists: candidate matchings are compared
/// first by their number of forbidden edges, then by total cost, so no
/// amount of aggregate savings elsewhere can buy a forbidden edge back in.
pub const FORBIDDEN: u32 = u32::MAX;

/// Solve the injection problem for an explicit cost matrix
///
/// `costs[source][target]` is the pairing cost; every row must have the
/// same length, and there must be at least as many targets as sources.
/// Returns, for each source index, the distinct target index it is
/// matched to.
pub fn solve_matrix(costs: &[Vec<u32>]) -> Vec<usize> {
    let source_count = costs.len();
    if source_count == 0 {
        return Vec::new();
    }
    let target_count = costs[0].len();
    assert!(
        target_count >= source_count,
        "injection needs at least as many targets ({}) as sources ({})",
        target_count,
        source_count
    );

    let mut search = Search {
        costs,
        used: vec![false; target_count],
        links: vec![0; source_count],
        best_links: vec![0; source_count],
        best: Score {
            forbidden: usize::MAX,
            total: u64::MAX,
        },
    };
    search.descend(0, Score::ZERO);
    search.best_links
}

/// Convenience entry taking a distance callback instead of a matrix
pub fn solve(
    source_count: usize,
    target_count: usize,
    cost: impl Fn(usize, usize) -> u32,
) -> Vec<usize> {
    let costs: Vec<Vec<u32>> = (0..source_count)
        .map(|source| (0..target_count).map(|target| cost(source, target)).collect())
        .collect();
    solve_matrix(&costs)
}

/// Running score of a partial assignment: forbidden edges dominate cost
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Score {
    forbidden: usize,
    total: u64,
}

impl Score {
    const ZERO: Score = Score {
        forbidden: 0,
        total: 0,
    };

    fn plus(self, cost: u32) -> Score {
        if cost == FORBIDDEN {
            Score {
                forbidden: self.forbidden + 1,
                total: self.total,
            }
        } else {
            Score {
                forbidden: self.forbidden,
                total: self.total + u64::from(cost),
            }
        }
    }
}

struct Search<'a> {
    costs: &'a [Vec<u32>],
    used: Vec<bool>,
    links: Vec<usize>,
    best_links: Vec<usize>,
    best: Score,
}

impl Search<'_> {
    fn descend(&mut self, source: usize, score: Score) {
        if source == self.costs.len() {
            if score < self.best {
                self.best = score;
                self.best_links.copy_from_slice(&self.links);
            }
            return;
        }

        for target in 0..self.used.len() {
            if self.used[target] {
                continue;
            }
            let next = score.plus(self.costs[source][target]);
            // Prune: scores only grow as sources are added
            if next >= self.best {
                continue;
            }
            self.used[target] = true;
            self.links[source] = target;
            self.descend(source + 1, next);
            self.used[target] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(solve_matrix(&[]).is_empty());
    }

    #[test]
    fn test_single_source_picks_cheapest() {
        let links = solve_matrix(&[vec![7, 3, 9]]);
        assert_eq!(links, vec![1]);
    }

    #[test]
    fn test_square_optimal_assignment() {
        // Greedy would pick (0,0)=1 then be forced into (1,1)=10;
        // the optimum is (0,1)=2 with (1,0)=2, total 4.
        let links = solve_matrix(&[vec![1, 2], vec![2, 10]]);
        assert_eq!(links, vec![1, 0]);
    }

    #[test]
    fn test_targets_are_distinct() {
        let links = solve_matrix(&[vec![1, 5, 5], vec![1, 5, 5], vec![1, 5, 5]]);
        let mut sorted = links.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_forbidden_never_chosen_when_feasible() {
        // Taking the forbidden edge would make the cheapest total, but
        // a feasible alternative exists and must win regardless of cost.
        let links = solve_matrix(&[vec![FORBIDDEN, 500], vec![1, 400]]);
        assert_eq!(links, vec![1, 0]);
    }

    #[test]
    fn test_callback_entry_matches_matrix_entry() {
        let costs = [vec![4, 1, 6], vec![2, 8, 3]];
        let from_callback = solve(2, 3, |source, target| costs[source][target]);
        assert_eq!(from_callback, solve_matrix(&costs));
    }

    #[test]
    fn test_padding_targets_absorb_extra_sources() {
        // Two sources, one real target (column 0) plus two padding
        // columns at flat cost 20: only one source gets the real target.
        let links = solve_matrix(&[vec![2, 20, 20], vec![30, 20, 20]]);
        assert_eq!(links[0], 0);
        assert!(links[1] >= 1);
    }
}
