// ********* Input data structures ***********

use std::fmt::Display;

use crate::errors::*;

/// The identifier of a candidate (a "mayor") in a profile.
///
/// Identifiers are indices: the canonicalizer numbers the candidates of a
/// table of scores by column, and ranked input is expected to use the same
/// dense numbering. Labels are only attached for display, outside of the
/// library.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct MayorId(pub u32);

impl Display for MayorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A distinct strict ranking of all the candidates, most preferred first,
/// together with the number of voters who cast it.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct WeightedBallot {
    pub count: u64,
    pub ballot: Vec<MayorId>,
}

impl WeightedBallot {
    pub fn new(count: u64, ballot: &[u32]) -> WeightedBallot {
        WeightedBallot {
            count,
            ballot: ballot.iter().map(|m| MayorId(*m)).collect(),
        }
    }

    /// The position of the mayor in this ballot (0 is the first choice).
    pub fn position(&self, mayor: MayorId) -> Option<usize> {
        self.ballot.iter().position(|m| *m == mayor)
    }
}

// ******** Output data structures *********

/// Mayors with their score, sorted by decreasing score. Ties are sorted by
/// increasing mayor id.
pub type Ranking = Vec<(MayorId, f64)>;

/// Statistics for one round of the single transferable vote.
#[derive(PartialEq, Debug, Clone)]
pub struct StvRound {
    pub round: u32,
    /// The tally of the continuing candidates at the start of the round,
    /// sorted as the ranking.
    pub tally: Vec<(MayorId, u64)>,
    pub elected: Vec<MayorId>,
    pub eliminated: Option<MayorId>,
    /// The votes taken from the elected or eliminated candidates.
    pub released: u64,
    /// The part of the released votes given to the continuing candidates.
    pub transferred: u64,
    /// The part of the released votes dropped by rounding down.
    pub lost: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct StvResult {
    /// The winners, in the order in which they got elected.
    pub winners: Vec<MayorId>,
    pub quota: u64,
    pub rounds: Vec<StvRound>,
}

// ********* Configuration **********

/// Ceilings on the number of candidates accepted by the combinatorial rules.
///
/// Kemeny-Young scores every permutation of the candidates, which grows
/// factorially: 8 candidates take 40 320 permutations. The Schulze path walk
/// only extends paths that improve a strongest path, about `n^5` steps. A
/// profile above the ceiling fails with `ScaleLimitExceeded` instead of
/// running for hours.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RuleLimits {
    pub kemeny_young_max_mayors: usize,
    pub schulze_max_mayors: usize,
}

impl RuleLimits {
    pub const DEFAULT_LIMITS: RuleLimits = RuleLimits {
        kemeny_young_max_mayors: 8,
        schulze_max_mayors: 20,
    };
}

impl Default for RuleLimits {
    fn default() -> Self {
        RuleLimits::DEFAULT_LIMITS
    }
}

/// The social choice functions that score every mayor.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ScoringRule {
    Borda,
    Dowdall,
    Copeland,
    SymmetricBorda,
    Simpson,
    Plurality,
    Schulze,
    /// The synthetic score of the optimal ranking: the first mayor gets the
    /// number of candidates, the last one gets 1.
    KemenyYoung,
}

impl ScoringRule {
    pub const ALL: [ScoringRule; 8] = [
        ScoringRule::Borda,
        ScoringRule::Dowdall,
        ScoringRule::Copeland,
        ScoringRule::SymmetricBorda,
        ScoringRule::Simpson,
        ScoringRule::Plurality,
        ScoringRule::Schulze,
        ScoringRule::KemenyYoung,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScoringRule::Borda => "borda",
            ScoringRule::Dowdall => "dowdall",
            ScoringRule::Copeland => "copeland",
            ScoringRule::SymmetricBorda => "symmetric_borda",
            ScoringRule::Simpson => "simpson",
            ScoringRule::Plurality => "plurality",
            ScoringRule::Schulze => "schulze",
            ScoringRule::KemenyYoung => "kemeny_young",
        }
    }

    pub fn from_name(name: &str) -> SocialChoiceResult<ScoringRule> {
        ScoringRule::ALL
            .iter()
            .find(|r| r.name() == name)
            .copied()
            .ok_or_else(|| SocialChoiceError::UnknownRule {
                name: name.to_string(),
            })
    }
}

/// The social choice functions that only designate winners.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ElectionRule {
    Condorcet,
    SingleTransferableVote,
    Baldwin,
    Nanson,
    /// Sequential majority comparison, with the agenda in increasing id order.
    SequentialMajority,
    Raynaud,
}

impl ElectionRule {
    pub const ALL: [ElectionRule; 6] = [
        ElectionRule::Condorcet,
        ElectionRule::SingleTransferableVote,
        ElectionRule::Baldwin,
        ElectionRule::Nanson,
        ElectionRule::SequentialMajority,
        ElectionRule::Raynaud,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ElectionRule::Condorcet => "condorcet",
            ElectionRule::SingleTransferableVote => "stv",
            ElectionRule::Baldwin => "baldwin",
            ElectionRule::Nanson => "nanson",
            ElectionRule::SequentialMajority => "sequential_majority",
            ElectionRule::Raynaud => "raynaud",
        }
    }

    pub fn from_name(name: &str) -> SocialChoiceResult<ElectionRule> {
        ElectionRule::ALL
            .iter()
            .find(|r| r.name() == name)
            .copied()
            .ok_or_else(|| SocialChoiceError::UnknownRule {
                name: name.to_string(),
            })
    }
}

/// Any of the functions that can be requested by name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Rule {
    Scoring(ScoringRule),
    Election(ElectionRule),
}

impl Rule {
    pub fn from_name(name: &str) -> SocialChoiceResult<Rule> {
        ScoringRule::from_name(name)
            .map(Rule::Scoring)
            .or_else(|_| ElectionRule::from_name(name).map(Rule::Election))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Scoring(r) => r.name(),
            Rule::Election(r) => r.name(),
        }
    }
}
