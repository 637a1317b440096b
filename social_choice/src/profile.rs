use std::cmp::Ordering;
use std::sync::OnceLock;

use log::debug;

use crate::ballot_box::canonicalize;
use crate::config::*;
use crate::errors::*;

/// A profile is a multiset of (number of votes, ballot) pairs, where every
/// ballot is a strict ordering of the same set of mayors.
///
/// ```
/// use social_choice::{MayorId, Profile, WeightedBallot};
///
/// // 40 voters like mayor 0 the most, then mayor 1, and like mayor 2 the least.
/// let profile = Profile::new(&[
///     WeightedBallot::new(40, &[0, 1, 2]),
///     WeightedBallot::new(28, &[1, 2, 0]),
///     WeightedBallot::new(32, &[2, 1, 0]),
/// ])?;
/// assert_eq!(profile.total_votes(), 100);
/// assert_eq!(profile.net_preference(MayorId(1), MayorId(0))?, 20);
/// # Ok::<(), social_choice::SocialChoiceError>(())
/// ```
///
/// A profile never changes after construction. The pairwise graphs are
/// computed once: the net preference graph and the tallies per rank when the
/// profile is built, the Schulze path graph on first use. Rules that remove
/// candidates build new profiles with [`Profile::without`].
#[derive(Debug, Clone)]
pub struct Profile {
    pub(crate) pairs: Vec<WeightedBallot>,
    // Sorted by increasing id. All the dense tables below are indexed by the
    // position of a mayor in this list.
    pub(crate) mayors: Vec<MayorId>,
    pub(crate) total_votes: u64,
    // positions[p][i]: rank of mayor i in ballot p.
    pub(crate) positions: Vec<Vec<usize>>,
    pub(crate) net_preference_graph: Vec<Vec<i64>>,
    // votes_per_mayor[rank][i]: number of voters placing mayor i at this rank.
    pub(crate) votes_per_mayor: Vec<Vec<u64>>,
    pub(crate) path_preference_graph: OnceLock<Vec<Vec<i64>>>,
    pub(crate) limits: RuleLimits,
}

impl Profile {
    /// Builds a profile from weighted ballots. Identical ballots are merged.
    pub fn new(ballots: &[WeightedBallot]) -> SocialChoiceResult<Profile> {
        let pairs = canonicalize(ballots)?;
        let mut mayors: Vec<MayorId> = pairs[0].ballot.clone();
        mayors.sort();
        let total_votes: u64 = pairs.iter().map(|p| p.count).sum();

        let n = mayors.len();
        let mut positions: Vec<Vec<usize>> = Vec::with_capacity(pairs.len());
        for p in pairs.iter() {
            let mut pos = vec![0; n];
            for (rank, m) in p.ballot.iter().enumerate() {
                // Canonical ballots only hold mayors of the profile.
                if let Ok(idx) = mayors.binary_search(m) {
                    pos[idx] = rank;
                }
            }
            positions.push(pos);
        }

        let net_preference_graph = compute_net_preference(&pairs, &positions, n);
        let votes_per_mayor = compute_votes_per_mayor(&pairs, &mayors);
        debug!(
            "Profile::new: {} mayors, {} distinct ballots, {} votes",
            n,
            pairs.len(),
            total_votes
        );

        Ok(Profile {
            pairs,
            mayors,
            total_votes,
            positions,
            net_preference_graph,
            votes_per_mayor,
            path_preference_graph: OnceLock::new(),
            limits: RuleLimits::DEFAULT_LIMITS,
        })
    }

    /// The same profile, with other ceilings for the combinatorial rules.
    pub fn with_limits(self, limits: RuleLimits) -> Profile {
        Profile { limits, ..self }
    }

    pub fn pairs(&self) -> &[WeightedBallot] {
        &self.pairs
    }

    /// All the mayors, in increasing id order.
    pub fn mayors(&self) -> &[MayorId] {
        &self.mayors
    }

    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    pub fn limits(&self) -> RuleLimits {
        self.limits
    }

    pub(crate) fn index_of(&self, mayor: MayorId) -> SocialChoiceResult<usize> {
        self.mayors
            .binary_search(&mayor)
            .map_err(|_| SocialChoiceError::UnknownCandidate { mayor })
    }

    /// Checks that a combinatorial rule can run on this many mayors.
    pub(crate) fn check_limit(&self, rule: ScoringRule, limit: usize) -> SocialChoiceResult<()> {
        if self.mayors.len() > limit {
            return ScaleLimitExceededSnafu {
                rule: rule.name().to_string(),
                candidates: self.mayors.len(),
                limit,
            }
            .fail();
        }
        Ok(())
    }

    // **** Mayor comparisons ****

    /// The number of voters preferring `mayor1` to `mayor2`, minus the number of
    /// voters preferring `mayor2` to `mayor1`.
    pub fn net_preference(&self, mayor1: MayorId, mayor2: MayorId) -> SocialChoiceResult<i64> {
        let i = self.index_of(mayor1)?;
        let j = self.index_of(mayor2)?;
        Ok(self.net_preference_graph[i][j])
    }

    /// True when `mayor1` is ranked above `mayor2` in every ballot, whatever
    /// the number of voters behind each ballot.
    pub fn does_pareto_dominate(
        &self,
        mayor1: MayorId,
        mayor2: MayorId,
    ) -> SocialChoiceResult<bool> {
        let i = self.index_of(mayor1)?;
        let j = self.index_of(mayor2)?;
        Ok(self.positions.iter().all(|pos| pos[i] < pos[j]))
    }

    /// The number of voters placing the mayor at the given rank (0 is the
    /// first choice).
    pub fn votes_per_mayor(&self, rank: usize, mayor: MayorId) -> SocialChoiceResult<u64> {
        let i = self.index_of(mayor)?;
        let row = self
            .votes_per_mayor
            .get(rank)
            .ok_or_else(|| SocialChoiceError::InvalidBallotShape {
                reason: format!(
                    "rank {} is beyond the {} ranks of the ballots",
                    rank,
                    self.mayors.len()
                ),
            })?;
        Ok(row[i])
    }

    // **** Simple scores ****

    pub fn borda(&self, mayor: MayorId) -> SocialChoiceResult<u64> {
        let i = self.index_of(mayor)?;
        let top_score = self.mayors.len() - 1;
        Ok(self
            .pairs
            .iter()
            .zip(self.positions.iter())
            .map(|(p, pos)| p.count * (top_score - pos[i]) as u64)
            .sum())
    }

    /// Borda points divided by the rank (counting from 1).
    pub fn dowdall(&self, mayor: MayorId) -> SocialChoiceResult<f64> {
        let i = self.index_of(mayor)?;
        let top_score = (self.mayors.len() - 1) as f64;
        Ok(self
            .pairs
            .iter()
            .zip(self.positions.iter())
            .map(|(p, pos)| {
                let rank = pos[i] as f64;
                p.count as f64 * (top_score - rank) / (rank + 1.0)
            })
            .sum())
    }

    /// Pairwise victories minus pairwise defeats.
    pub fn copeland(&self, mayor: MayorId) -> SocialChoiceResult<i64> {
        let i = self.index_of(mayor)?;
        Ok(self.net_preference_graph[i].iter().map(|p| p.signum()).sum())
    }

    pub fn symmetric_borda(&self, mayor: MayorId) -> SocialChoiceResult<i64> {
        let i = self.index_of(mayor)?;
        Ok(self.net_preference_graph[i].iter().sum())
    }

    /// The worst pairwise margin of the mayor. A profile with a single mayor
    /// gives it a score of 0.
    pub fn simpson(&self, mayor: MayorId) -> SocialChoiceResult<i64> {
        let i = self.index_of(mayor)?;
        Ok(self.net_preference_graph[i]
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| *p)
            .min()
            .unwrap_or(0))
    }

    /// The number of voters placing the mayor first.
    pub fn plurality(&self, mayor: MayorId) -> SocialChoiceResult<u64> {
        self.votes_per_mayor(0, mayor)
    }

    // **** Generic scoring ****

    /// The score of every mayor, in increasing id order.
    pub fn score_by<S, F>(&self, scorer: F) -> SocialChoiceResult<Vec<(MayorId, S)>>
    where
        F: Fn(MayorId) -> SocialChoiceResult<S>,
    {
        self.mayors.iter().map(|m| Ok((*m, scorer(*m)?))).collect()
    }

    /// The score of every mayor, sorted by decreasing score. Equal scores are
    /// sorted by increasing id.
    pub fn ranking_by<S, F>(&self, scorer: F) -> SocialChoiceResult<Vec<(MayorId, S)>>
    where
        S: PartialOrd,
        F: Fn(MayorId) -> SocialChoiceResult<S>,
    {
        let mut scores = self.score_by(scorer)?;
        sort_ranking(&mut scores);
        Ok(scores)
    }

    /// The mayors reaching the best score, in increasing id order.
    pub fn winners_by<S, F>(&self, scorer: F) -> SocialChoiceResult<Vec<MayorId>>
    where
        S: PartialOrd,
        F: Fn(MayorId) -> SocialChoiceResult<S>,
    {
        let ranking = self.ranking_by(scorer)?;
        let mut winners: Vec<MayorId> = Vec::new();
        if let Some((_, best)) = ranking.first() {
            for (m, s) in ranking.iter() {
                if s.partial_cmp(best) == Some(Ordering::Equal) {
                    winners.push(*m);
                }
            }
        }
        winners.sort();
        Ok(winners)
    }

    // **** Social choice functions ****

    /// The mayors that beat or tie every other mayor. It may be empty.
    pub fn condorcet_winners(&self) -> Vec<MayorId> {
        self.mayors
            .iter()
            .enumerate()
            .filter(|(i, _)| self.net_preference_graph[*i].iter().all(|p| *p >= 0))
            .map(|(_, m)| *m)
            .collect()
    }

    /// The mayor that strictly beats every other mayor, if any.
    pub fn strict_condorcet_winner(&self) -> Option<MayorId> {
        self.mayors
            .iter()
            .enumerate()
            .find(|(i, _)| {
                self.net_preference_graph[*i]
                    .iter()
                    .enumerate()
                    .all(|(j, p)| j == *i || *p > 0)
            })
            .map(|(_, m)| *m)
    }

    /// Sequential majority comparison with the mayors taken in increasing id
    /// order.
    ///
    /// The outcome depends on the agenda: a challenger replaces the current
    /// winner only when a strict majority prefers it, so with a majority cycle
    /// the last mayors of the agenda are favoured. Use
    /// [`Profile::sequential_majority_comparison_with_agenda`] to choose the
    /// order.
    pub fn sequential_majority_comparison(&self) -> MayorId {
        let mut last_winner = 0;
        for i in 1..self.mayors.len() {
            if self.net_preference_graph[i][last_winner] > 0 {
                last_winner = i;
            }
        }
        self.mayors[last_winner]
    }

    /// Sequential majority comparison over the given agenda, which must list
    /// every mayor exactly once.
    pub fn sequential_majority_comparison_with_agenda(
        &self,
        agenda: &[MayorId],
    ) -> SocialChoiceResult<MayorId> {
        let mut indices: Vec<usize> = Vec::with_capacity(agenda.len());
        for m in agenda.iter() {
            indices.push(self.index_of(*m)?);
        }
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.mayors.len() || indices.len() != self.mayors.len() {
            return InvalidBallotShapeSnafu {
                reason: format!(
                    "the agenda {:?} must list each of the {} mayors once",
                    agenda,
                    self.mayors.len()
                ),
            }
            .fail();
        }
        let mut last_winner = indices[0];
        for &i in indices.iter().skip(1) {
            if self.net_preference_graph[i][last_winner] > 0 {
                debug!(
                    "sequential_majority_comparison: {} beats {}",
                    self.mayors[i], self.mayors[last_winner]
                );
                last_winner = i;
            }
        }
        Ok(self.mayors[last_winner])
    }

    /// The first mayor of the Simpson ranking.
    pub fn raynaud(&self) -> SocialChoiceResult<MayorId> {
        let ranking = self.ranking_by(|m| self.simpson(m))?;
        Ok(ranking[0].0)
    }

    // **** Transformations ****

    /// A new profile in which the mayor has been removed from every ballot.
    ///
    /// Ballots that become identical are merged. The current profile is left
    /// untouched.
    pub fn without(&self, mayor: MayorId) -> SocialChoiceResult<Profile> {
        self.index_of(mayor)?;
        if self.mayors.len() == 1 {
            return InvalidBallotShapeSnafu {
                reason: format!("cannot remove {}, the last mayor of the profile", mayor),
            }
            .fail();
        }
        let ballots: Vec<WeightedBallot> = self
            .pairs
            .iter()
            .map(|p| WeightedBallot {
                count: p.count,
                ballot: p.ballot.iter().filter(|m| **m != mayor).cloned().collect(),
            })
            .collect();
        Ok(Profile::new(&ballots)?.with_limits(self.limits))
    }

    // **** Dispatch by rule ****

    /// Scores and ranks all the mayors with the given rule.
    ///
    /// ```
    /// use social_choice::{MayorId, Profile, ScoringRule, WeightedBallot};
    ///
    /// let profile = Profile::new(&[
    ///     WeightedBallot::new(40, &[0, 1, 2]),
    ///     WeightedBallot::new(28, &[1, 2, 0]),
    ///     WeightedBallot::new(32, &[2, 1, 0]),
    /// ])?;
    /// let ranking = profile.rank(ScoringRule::from_name("borda")?)?;
    /// assert_eq!(
    ///     ranking,
    ///     vec![(MayorId(1), 128.0), (MayorId(2), 92.0), (MayorId(0), 80.0)]
    /// );
    /// # Ok::<(), social_choice::SocialChoiceError>(())
    /// ```
    pub fn rank(&self, rule: ScoringRule) -> SocialChoiceResult<Ranking> {
        debug!("rank: applying {}", rule.name());
        match rule {
            ScoringRule::Borda => self.ranking_by(|m| Ok(self.borda(m)? as f64)),
            ScoringRule::Dowdall => self.ranking_by(|m| self.dowdall(m)),
            ScoringRule::Copeland => self.ranking_by(|m| Ok(self.copeland(m)? as f64)),
            ScoringRule::SymmetricBorda => {
                self.ranking_by(|m| Ok(self.symmetric_borda(m)? as f64))
            }
            ScoringRule::Simpson => self.ranking_by(|m| Ok(self.simpson(m)? as f64)),
            ScoringRule::Plurality => self.ranking_by(|m| Ok(self.plurality(m)? as f64)),
            ScoringRule::Schulze => {
                // Builds the path graph once before scoring.
                self.path_preference_graph()?;
                self.ranking_by(|m| Ok(self.schulze(m)? as f64))
            }
            ScoringRule::KemenyYoung => self.kemeny_young(),
        }
    }

    /// The winners designated by the given rule.
    ///
    /// `seats` is only used by the single transferable vote. Condorcet and
    /// Nanson may return several winners (Condorcet may return none), the
    /// other rules always return a single one.
    pub fn elect(&self, rule: ElectionRule, seats: usize) -> SocialChoiceResult<Vec<MayorId>> {
        debug!("elect: applying {}", rule.name());
        match rule {
            ElectionRule::Condorcet => Ok(self.condorcet_winners()),
            ElectionRule::SingleTransferableVote => {
                Ok(self.single_transferable_vote(seats)?.winners)
            }
            ElectionRule::Baldwin => Ok(vec![self.baldwin()?]),
            ElectionRule::Nanson => self.nanson(),
            ElectionRule::SequentialMajority => Ok(vec![self.sequential_majority_comparison()]),
            ElectionRule::Raynaud => Ok(vec![self.raynaud()?]),
        }
    }

    /// Runs several scoring rules on this profile, in the given order.
    pub fn aggregate(
        &self,
        rules: &[ScoringRule],
    ) -> SocialChoiceResult<Vec<(ScoringRule, Ranking)>> {
        rules.iter().map(|r| Ok((*r, self.rank(*r)?))).collect()
    }
}

/// Sorts by decreasing score, then by increasing mayor id.
pub(crate) fn sort_ranking<S: PartialOrd>(scores: &mut [(MayorId, S)]) {
    scores.sort_by(|(m1, s1), (m2, s2)| {
        s2.partial_cmp(s1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| m1.cmp(m2))
    });
}

fn compute_net_preference(
    pairs: &[WeightedBallot],
    positions: &[Vec<usize>],
    n: usize,
) -> Vec<Vec<i64>> {
    let mut graph = vec![vec![0i64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let preference: i64 = pairs
                .iter()
                .zip(positions.iter())
                .map(|(p, pos)| {
                    let votes = p.count as i64;
                    if pos[i] < pos[j] {
                        votes
                    } else {
                        -votes
                    }
                })
                .sum();
            graph[i][j] = preference;
            graph[j][i] = -preference;
        }
    }
    graph
}

fn compute_votes_per_mayor(pairs: &[WeightedBallot], mayors: &[MayorId]) -> Vec<Vec<u64>> {
    let n = mayors.len();
    let mut res = vec![vec![0u64; n]; n];
    for p in pairs.iter() {
        for (rank, m) in p.ballot.iter().enumerate() {
            if let Ok(idx) = mayors.binary_search(m) {
                res[rank][idx] += p.count;
            }
        }
    }
    res
}
