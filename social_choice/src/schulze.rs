//! The Schulze method.
//!
//! The strength of a path in the net preference graph is its weakest link.
//! The path preference of `a` over `b` is the strength of the strongest path
//! from `a` to `b`, and `a` beats `b` when its path preference over `b` is
//! greater than the path preference of `b` over `a`.
//!
//! The strongest paths are found by a depth-first walk over the simple paths
//! of the graph. A path is only extended when it is strictly stronger than
//! the best path already found to its last node. Every extension raises that
//! best value to another edge weight, so each source pushes at most `n` frames
//! per edge weight: about `n^5` steps for the whole graph instead of `(n - 1)!`
//! paths per source. Profiles above [`RuleLimits::schulze_max_mayors`] are
//! still rejected before the walk starts.

use log::debug;

use crate::config::*;
use crate::errors::*;
use crate::profile::Profile;

impl Profile {
    /// The number of mayors beaten by the given mayor under the Schulze
    /// method.
    pub fn schulze(&self, mayor: MayorId) -> SocialChoiceResult<i64> {
        let i = self.index_of(mayor)?;
        let graph = self.path_preference_graph()?;
        Ok((0..self.mayors.len())
            .filter(|j| *j != i && graph[i][*j] > graph[*j][i])
            .count() as i64)
    }

    /// The strength of the strongest path from `mayor1` to `mayor2`.
    pub fn path_preference(&self, mayor1: MayorId, mayor2: MayorId) -> SocialChoiceResult<i64> {
        let i = self.index_of(mayor1)?;
        let j = self.index_of(mayor2)?;
        Ok(self.path_preference_graph()?[i][j])
    }

    /// The path preference graph, computed on the first call only.
    pub(crate) fn path_preference_graph(&self) -> SocialChoiceResult<&Vec<Vec<i64>>> {
        if let Some(graph) = self.path_preference_graph.get() {
            return Ok(graph);
        }
        self.check_limit(ScoringRule::Schulze, self.limits.schulze_max_mayors)?;
        Ok(self.path_preference_graph.get_or_init(|| {
            debug!(
                "path_preference_graph: enumerating paths over {} mayors",
                self.mayors.len()
            );
            strongest_paths(&self.net_preference_graph)
        }))
    }
}

/// For every ordered pair of nodes, the strength of the strongest simple path
/// between them. The diagonal is left at zero.
pub(crate) fn strongest_paths(net: &[Vec<i64>]) -> Vec<Vec<i64>> {
    let n = net.len();
    let mut res: Vec<Vec<i64>> = Vec::with_capacity(n);
    for source in 0..n {
        let mut best = strongest_paths_from(net, source);
        best[source] = 0;
        res.push(best);
    }
    res
}

// Depth-first walk of the simple paths starting at the source, with an
// explicit stack. Each frame holds the node, the next neighbour to try and the
// strength of the path leading to the node.
//
// A path reaching `next` no stronger than best[next] is dropped: any
// continuation of it is matched by the continuation of the frame that set
// best[next], once the cycles of that walk are removed.
fn strongest_paths_from(net: &[Vec<i64>], source: usize) -> Vec<i64> {
    let n = net.len();
    let mut best = vec![i64::MIN; n];
    let mut visited = vec![false; n];
    visited[source] = true;
    let mut stack: Vec<(usize, usize, i64)> = vec![(source, 0, i64::MAX)];
    let mut num_paths: u64 = 0;

    while let Some(frame) = stack.last_mut() {
        let (node, next, strength) = *frame;
        if next == n {
            visited[node] = node == source;
            stack.pop();
            continue;
        }
        frame.1 += 1;
        if visited[next] {
            continue;
        }
        let path_strength = strength.min(net[node][next]);
        if path_strength <= best[next] {
            continue;
        }
        num_paths += 1;
        best[next] = path_strength;
        visited[next] = true;
        stack.push((next, 0, path_strength));
    }
    debug!(
        "strongest_paths_from: source {}: {} paths extended",
        source, num_paths
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::random_profile;
    use crate::profile::tests::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    // Widest paths over all the walks of the graph. Removing a cycle from a
    // walk never lowers its weakest link, so this matches the simple paths.
    fn floyd_warshall(net: &[Vec<i64>]) -> Vec<Vec<i64>> {
        let n = net.len();
        let mut p: Vec<Vec<i64>> = net.to_vec();
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if i != j && i != k && j != k {
                        p[i][j] = p[i][j].max(p[i][k].min(p[k][j]));
                    }
                }
            }
        }
        for (i, row) in p.iter_mut().enumerate() {
            row[i] = 0;
        }
        p
    }

    #[test]
    fn matches_widest_paths() {
        let mut rng = StdRng::seed_from_u64(17);
        for num_mayors in 1..10 {
            for _ in 0..10 {
                let p = random_profile(num_mayors, 12, 30, &mut rng).unwrap();
                let expected = floyd_warshall(&p.net_preference_graph);
                assert_eq!(strongest_paths(&p.net_preference_graph), expected);
            }
        }
    }

    #[test]
    fn default_ceiling_is_tractable() {
        init_logs();
        let mut rng = StdRng::seed_from_u64(5);
        let num_mayors = RuleLimits::DEFAULT_LIMITS.schulze_max_mayors;
        let p = random_profile(num_mayors, 40, 30, &mut rng).unwrap();
        assert_eq!(p.mayors().len(), num_mayors);
        let start = Instant::now();
        let ranking = p.rank(ScoringRule::Schulze).unwrap();
        assert!(start.elapsed() < Duration::from_secs(20));
        assert_eq!(ranking.len(), num_mayors);
        assert_eq!(
            strongest_paths(&p.net_preference_graph),
            floyd_warshall(&p.net_preference_graph)
        );
    }

    #[test]
    fn wikipedia_example() {
        // Mayors A..E are 0..4.
        let p = profile(&[
            (5, &[0, 2, 1, 4, 3]),
            (5, &[0, 3, 4, 2, 1]),
            (8, &[1, 4, 3, 0, 2]),
            (3, &[2, 0, 1, 4, 3]),
            (7, &[2, 0, 4, 1, 3]),
            (2, &[2, 1, 0, 3, 4]),
            (7, &[3, 2, 4, 1, 0]),
            (8, &[4, 1, 0, 3, 2]),
        ]);
        // Wins over the 4 other mayors.
        let ranking = p.ranking_by(|m| p.schulze(m)).unwrap();
        assert_eq!(
            ranking,
            vec![
                (MayorId(4), 4),
                (MayorId(0), 3),
                (MayorId(2), 2),
                (MayorId(1), 1),
                (MayorId(3), 0)
            ]
        );
    }

    #[test]
    fn direct_path() {
        let p = profile3();
        // 1 -> 0 directly with 20, or through 2 with min(36, 20).
        assert_eq!(p.path_preference(MayorId(1), MayorId(0)).unwrap(), 20);
        // 0 -> 1 directly with -20, or through 2 with min(-20, -36).
        assert_eq!(p.path_preference(MayorId(0), MayorId(1)).unwrap(), -20);
        assert_eq!(p.schulze(MayorId(1)).unwrap(), 2);
    }

    #[test]
    fn condorcet_winner_is_schulze_winner() {
        let mut rng = StdRng::seed_from_u64(3);
        for num_mayors in 2..6 {
            for _ in 0..30 {
                let p = random_profile(num_mayors, 9, 20, &mut rng).unwrap();
                let has_ties = p
                    .net_preference_graph
                    .iter()
                    .enumerate()
                    .any(|(i, row)| row.iter().enumerate().any(|(j, x)| i != j && *x == 0));
                if has_ties {
                    continue;
                }
                if let Some(w) = p.strict_condorcet_winner() {
                    assert_eq!(p.winners_by(|m| p.schulze(m)).unwrap(), vec![w]);
                    assert_eq!(p.condorcet_winners(), vec![w]);
                }
            }
        }
    }

    #[test]
    fn scale_limit() {
        let p = profile4().with_limits(RuleLimits {
            kemeny_young_max_mayors: 8,
            schulze_max_mayors: 4,
        });
        assert_eq!(
            p.schulze(MayorId(0)),
            Err(SocialChoiceError::ScaleLimitExceeded {
                rule: "schulze".to_string(),
                candidates: 5,
                limit: 4,
            })
        );
        assert!(p.rank(ScoringRule::Schulze).is_err());
    }
}
