//! Random profiles, for simulations and tests.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::*;
use crate::errors::*;
use crate::profile::Profile;

/// Draws a profile over the mayors `0..num_mayors`.
///
/// Each of the `num_ballots` ballots is a uniformly shuffled ranking backed by
/// a number of voters drawn uniformly in `1..=max_votes`. Identical ballots are
/// merged, so the profile may hold fewer pairs than `num_ballots`.
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use social_choice::generators::random_profile;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let profile = random_profile(4, 10, 100, &mut rng)?;
/// assert_eq!(profile.mayors().len(), 4);
/// assert!(profile.pairs().len() <= 10);
/// # Ok::<(), social_choice::SocialChoiceError>(())
/// ```
pub fn random_profile(
    num_mayors: usize,
    num_ballots: usize,
    max_votes: u64,
    rng: &mut impl Rng,
) -> SocialChoiceResult<Profile> {
    if max_votes == 0 {
        return InvalidBallotShapeSnafu {
            reason: "ballots need at least one voter".to_string(),
        }
        .fail();
    }
    let mut ballots: Vec<WeightedBallot> = Vec::with_capacity(num_ballots);
    for _ in 0..num_ballots {
        let mut ballot: Vec<MayorId> = (0..num_mayors).map(|i| MayorId(i as u32)).collect();
        ballot.shuffle(rng);
        ballots.push(WeightedBallot {
            count: rng.random_range(1..=max_votes),
            ballot,
        });
    }
    debug!(
        "random_profile: {} ballots over {} mayors",
        num_ballots, num_mayors
    );
    Profile::new(&ballots)
}
