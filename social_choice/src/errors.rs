use snafu::Snafu;

use crate::config::MayorId;

/// Errors that prevent a rule from completing.
///
/// All of them are raised where they are detected and no partial result is
/// returned alongside them.
#[derive(Debug, Snafu, Eq, PartialEq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum SocialChoiceError {
    /// A ballot disagrees with the candidate set: wrong length, a missing
    /// candidate or a duplicated one.
    #[snafu(display("Invalid ballot: {reason}"))]
    InvalidBallotShape { reason: String },

    #[snafu(display("No ballot was provided"))]
    EmptyProfile,

    /// The profile has too many candidates for a combinatorial rule.
    #[snafu(display(
        "Rule {rule} is limited to {limit} candidates, but the profile has {candidates}"
    ))]
    ScaleLimitExceeded {
        rule: String,
        candidates: usize,
        limit: usize,
    },

    #[snafu(display("Candidate {mayor} is not part of this profile"))]
    UnknownCandidate { mayor: MayorId },

    #[snafu(display("Cannot elect {seats} seats"))]
    InvalidSeatCount { seats: usize },

    #[snafu(display("Mismatched predictions: {reason}"))]
    MismatchedPredictions { reason: String },

    #[snafu(display("Unknown social choice function {name:?}"))]
    UnknownRule { name: String },
}

pub type SocialChoiceResult<T> = Result<T, SocialChoiceError>;
