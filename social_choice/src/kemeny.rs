//! Kemeny-Young optimal rank aggregation.
//!
//! Every permutation of the mayors is scored by its total Kendall-tau
//! distance to the ballots, each ballot counting as many times as it has
//! voters. The search is exhaustive: `n!` permutations for `n` mayors, which
//! is why profiles above [`RuleLimits::kemeny_young_max_mayors`] are
//! rejected.

use std::collections::HashMap;

use log::{debug, info};

use crate::config::*;
use crate::errors::*;
use crate::profile::Profile;

/// The number of pairs of mayors ordered differently by the two rankings.
///
/// Both rankings must hold the same mayors, each of them once.
///
/// ```
/// use social_choice::{kendall_tau_distance, MayorId};
///
/// let a = [MayorId(0), MayorId(1), MayorId(2)];
/// let b = [MayorId(2), MayorId(0), MayorId(1)];
/// assert_eq!(kendall_tau_distance(&a, &b)?, 2);
/// # Ok::<(), social_choice::SocialChoiceError>(())
/// ```
pub fn kendall_tau_distance(rank_a: &[MayorId], rank_b: &[MayorId]) -> SocialChoiceResult<u64> {
    let positions_b: HashMap<MayorId, usize> = rank_b
        .iter()
        .enumerate()
        .map(|(idx, m)| (*m, idx))
        .collect();
    if rank_a.len() != rank_b.len() || positions_b.len() != rank_b.len() {
        return InvalidBallotShapeSnafu {
            reason: format!("cannot compare rankings {:?} and {:?}", rank_a, rank_b),
        }
        .fail();
    }
    let mut in_b: Vec<usize> = Vec::with_capacity(rank_a.len());
    for m in rank_a.iter() {
        match positions_b.get(m) {
            Some(pos) => in_b.push(*pos),
            None => return UnknownCandidateSnafu { mayor: *m }.fail(),
        }
    }
    let mut tau: u64 = 0;
    for i in 0..in_b.len() {
        for j in (i + 1)..in_b.len() {
            if in_b[i] > in_b[j] {
                tau += 1;
            }
        }
    }
    Ok(tau)
}

impl Profile {
    /// The Kemeny-Young ranking: the mayors of the optimal permutation with the
    /// scores `n, n - 1, ..., 1`.
    pub fn kemeny_young(&self) -> SocialChoiceResult<Ranking> {
        let (best_rank, _) = self.kemeny_young_order()?;
        let n = best_rank.len();
        Ok(best_rank
            .into_iter()
            .enumerate()
            .map(|(idx, m)| (m, (n - idx) as f64))
            .collect())
    }

    /// The permutation of the mayors with the smallest total Kendall-tau
    /// distance to the voters, along with that distance.
    ///
    /// Permutations are visited in lexicographic order of the mayor ids and
    /// the first optimal one is kept.
    pub fn kemeny_young_order(&self) -> SocialChoiceResult<(Vec<MayorId>, u64)> {
        self.check_limit(
            ScoringRule::KemenyYoung,
            self.limits.kemeny_young_max_mayors,
        )?;
        let n = self.mayors.len();
        let disagreements = self.disagreements();

        let mut rank: Vec<usize> = (0..n).collect();
        let mut best_rank: Vec<usize> = rank.clone();
        let mut min_dist = u64::MAX;
        let mut num_permutations: u64 = 0;
        loop {
            num_permutations += 1;
            let dist = permutation_distance(&rank, &disagreements);
            if dist < min_dist {
                min_dist = dist;
                best_rank.copy_from_slice(&rank);
            }
            if !next_permutation(&mut rank) {
                break;
            }
        }
        let best: Vec<MayorId> = best_rank.iter().map(|i| self.mayors[*i]).collect();
        info!(
            "kemeny_young: {} permutations scored, best {:?} at distance {}",
            num_permutations, best, min_dist
        );
        Ok((best, min_dist))
    }

    /// The total Kendall-tau distance between a ranking of the mayors and all
    /// the voters.
    pub fn kemeny_distance(&self, rank: &[MayorId]) -> SocialChoiceResult<u64> {
        let mut indices: Vec<usize> = Vec::with_capacity(rank.len());
        for m in rank.iter() {
            indices.push(self.index_of(*m)?);
        }
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.mayors.len() || indices.len() != self.mayors.len() {
            return InvalidBallotShapeSnafu {
                reason: format!("{:?} is not a ranking of all the mayors", rank),
            }
            .fail();
        }
        Ok(permutation_distance(&indices, &self.disagreements()))
    }

    // disagreements[i][j]: the number of voters who rank j above i, which is
    // the cost of placing i above j.
    fn disagreements(&self) -> Vec<Vec<u64>> {
        let n = self.mayors.len();
        let mut res = vec![vec![0u64; n]; n];
        for (p, pos) in self.pairs.iter().zip(self.positions.iter()) {
            for i in 0..n {
                for j in 0..n {
                    if pos[j] < pos[i] {
                        res[i][j] += p.count;
                    }
                }
            }
        }
        debug!("disagreements: {:?}", res);
        res
    }
}

fn permutation_distance(rank: &[usize], disagreements: &[Vec<u64>]) -> u64 {
    let mut dist = 0;
    for i in 0..rank.len() {
        for j in (i + 1)..rank.len() {
            dist += disagreements[rank[i]][rank[j]];
        }
    }
    dist
}

// Rearranges into the next permutation in lexicographic order. Returns false
// once the last permutation has been reached.
fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::random_profile;
    use crate::profile::tests::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all_permutations(n: usize) -> Vec<Vec<usize>> {
        let mut v: Vec<usize> = (0..n).collect();
        let mut res = vec![v.clone()];
        while next_permutation(&mut v) {
            res.push(v.clone());
        }
        res
    }

    #[test]
    fn permutations_in_lexicographic_order() {
        assert_eq!(
            all_permutations(3),
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0]
            ]
        );
        assert_eq!(all_permutations(5).len(), 120);
        assert_eq!(all_permutations(1), vec![vec![0]]);
    }

    #[test]
    fn kendall_tau() {
        let a = ids(&[0, 1, 2, 3]);
        assert_eq!(kendall_tau_distance(&a, &a).unwrap(), 0);
        assert_eq!(kendall_tau_distance(&a, &ids(&[3, 2, 1, 0])).unwrap(), 6);
        assert_eq!(kendall_tau_distance(&a, &ids(&[1, 0, 2, 3])).unwrap(), 1);
        assert!(kendall_tau_distance(&a, &ids(&[0, 1, 2])).is_err());
        assert!(kendall_tau_distance(&a, &ids(&[0, 1, 2, 4])).is_err());
    }

    #[test]
    fn profile3_ranking() {
        let p = profile3();
        // 1 beats 2 beats 0, and 1 beats 0: the majority order is optimal.
        assert_eq!(
            p.kemeny_young().unwrap(),
            vec![(MayorId(1), 3.0), (MayorId(2), 2.0), (MayorId(0), 1.0)]
        );
        let (_, dist) = p.kemeny_young_order().unwrap();
        assert_eq!(dist, p.kemeny_distance(&ids(&[1, 2, 0])).unwrap());
        let by_ballot: u64 = p
            .pairs()
            .iter()
            .map(|b| b.count * kendall_tau_distance(&ids(&[1, 2, 0]), &b.ballot).unwrap())
            .sum();
        assert_eq!(dist, by_ballot);
    }

    #[test]
    fn ties_keep_first_permutation() {
        // A perfect cycle: the three rotations are equally good.
        let p = profile5();
        let (best, _) = p.kemeny_young_order().unwrap();
        assert_eq!(best, ids(&[0, 1, 2]));
    }

    #[test]
    fn optimal_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        for num_mayors in 1..6 {
            for _ in 0..5 {
                let p = random_profile(num_mayors, 10, 25, &mut rng).unwrap();
                let (best, dist) = p.kemeny_young_order().unwrap();
                assert_eq!(p.kemeny_distance(&best).unwrap(), dist);
                for perm in all_permutations(num_mayors) {
                    let rank: Vec<MayorId> = perm.iter().map(|i| p.mayors()[*i]).collect();
                    let other: u64 = p
                        .pairs()
                        .iter()
                        .map(|b| b.count * kendall_tau_distance(&rank, &b.ballot).unwrap())
                        .sum();
                    assert!(dist <= other);
                }
            }
        }
    }

    #[test]
    fn scale_limit() {
        let p = profile4().with_limits(RuleLimits {
            kemeny_young_max_mayors: 3,
            schulze_max_mayors: 20,
        });
        assert_eq!(
            p.kemeny_young(),
            Err(SocialChoiceError::ScaleLimitExceeded {
                rule: "kemeny_young".to_string(),
                candidates: 5,
                limit: 3,
            })
        );
    }
}
