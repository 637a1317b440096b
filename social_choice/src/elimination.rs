//! Elimination rules based on the Borda count.
//!
//! Both rules run on a fresh profile at each round, built with
//! [`Profile::without`], so the Borda scores of a round only count the mayors
//! still in the race.

use log::{debug, info};

use crate::config::*;
use crate::errors::*;
use crate::profile::Profile;

impl Profile {
    /// Baldwin's rule: the mayor with the lowest Borda score is removed until
    /// one mayor remains.
    ///
    /// Among mayors tied for the lowest score, the one with the largest id is
    /// removed first.
    pub fn baldwin(&self) -> SocialChoiceResult<MayorId> {
        let mut profile = self.clone();
        let mut round: u32 = 1;
        while profile.mayors.len() > 1 {
            let ranking = profile.ranking_by(|m| profile.borda(m))?;
            let (loser, score) = match ranking.last() {
                Some(x) => *x,
                None => return EmptyProfileSnafu {}.fail(),
            };
            info!(
                "baldwin: round {}: eliminating {} with a Borda score of {}",
                round, loser, score
            );
            debug!("baldwin: round {}: scores {:?}", round, ranking);
            profile = profile.without(loser)?;
            round += 1;
        }
        Ok(profile.mayors[0])
    }

    /// Nanson's rule: all the mayors strictly below the mean Borda score are
    /// removed at once, until one mayor remains or every remaining mayor sits
    /// exactly at the mean.
    ///
    /// The surviving mayors are returned in increasing id order.
    ///
    /// ```
    /// use social_choice::{MayorId, Profile, WeightedBallot};
    ///
    /// // A majority cycle: everybody has the same Borda score.
    /// let profile = Profile::new(&[
    ///     WeightedBallot::new(20, &[0, 1, 2]),
    ///     WeightedBallot::new(20, &[1, 2, 0]),
    ///     WeightedBallot::new(20, &[2, 0, 1]),
    /// ])?;
    /// assert_eq!(profile.nanson()?, vec![MayorId(0), MayorId(1), MayorId(2)]);
    /// # Ok::<(), social_choice::SocialChoiceError>(())
    /// ```
    pub fn nanson(&self) -> SocialChoiceResult<Vec<MayorId>> {
        let mut profile = self.clone();
        let mut round: u32 = 1;
        while profile.mayors.len() > 1 {
            let scores = profile.score_by(|m| profile.borda(m))?;
            let n = scores.len() as u128;
            let total: u128 = scores.iter().map(|(_, s)| *s as u128).sum();
            // score < total / n, without the division.
            let below: Vec<MayorId> = scores
                .iter()
                .filter(|(_, s)| (*s as u128) * n < total)
                .map(|(m, _)| *m)
                .collect();
            if below.is_empty() {
                debug!("nanson: round {}: all mayors at the mean", round);
                break;
            }
            info!(
                "nanson: round {}: eliminating {:?} below the mean Borda score {}",
                round,
                below,
                total as f64 / n as f64
            );
            for m in below {
                profile = profile.without(m)?;
            }
            round += 1;
        }
        Ok(profile.mayors)
    }
}
