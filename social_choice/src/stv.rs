use log::{debug, info};

use crate::config::*;
use crate::errors::*;
use crate::profile::{sort_ranking, Profile};

impl Profile {
    /// Elects `seats` mayors with the single transferable vote.
    ///
    /// The quota is the Droop quota `total_votes / (seats + 1) + 1`. The
    /// initial tally is the plurality score. At each round, every mayor above
    /// the quota is elected and its surplus is transferred to the continuing
    /// mayors. If nobody is above the quota, the last mayor of the ranking is
    /// eliminated and its whole tally is transferred. Once there are as many
    /// continuing mayors as open seats, they fill the seats in ranking order.
    ///
    /// Transfers use the tallies per rank of the whole profile: at the k-th
    /// transfer, each continuing mayor receives the released votes in
    /// proportion to the number of voters placing it at rank k (capped at the
    /// last rank). Each share is rounded down and the remainders are dropped,
    /// they are reported as `lost` in the round statistics.
    ///
    /// The rank advances after every transfer, surplus or elimination alike,
    /// so the first surplus goes by second preferences. Implementations that
    /// only advance after an elimination hand a first surplus out by first
    /// preferences and can elect differently.
    ///
    /// ```
    /// use social_choice::{MayorId, Profile, WeightedBallot};
    ///
    /// let profile = Profile::new(&[
    ///     WeightedBallot::new(101, &[2, 1, 0]),
    ///     WeightedBallot::new(100, &[0, 2, 1]),
    /// ])?;
    /// let res = profile.single_transferable_vote(1)?;
    /// assert_eq!(res.winners, vec![MayorId(2)]);
    /// assert_eq!(res.quota, 101);
    /// # Ok::<(), social_choice::SocialChoiceError>(())
    /// ```
    pub fn single_transferable_vote(&self, seats: usize) -> SocialChoiceResult<StvResult> {
        if seats == 0 {
            return InvalidSeatCountSnafu { seats }.fail();
        }
        let quota = self.total_votes / (seats as u64 + 1) + 1;
        let mut ranking: Vec<(MayorId, u64)> = self.ranking_by(|m| self.plurality(m))?;
        let mut winners: Vec<MayorId> = Vec::new();
        let mut rounds: Vec<StvRound> = Vec::new();
        let mut choice: usize = 0;
        info!(
            "single_transferable_vote: {} seats, {} votes, quota {}",
            seats, self.total_votes, quota
        );

        while winners.len() < seats && ranking.len() > seats - winners.len() {
            let round_id = (rounds.len() + 1) as u32;
            let tally = ranking.clone();

            let elected: Vec<MayorId> = ranking
                .iter()
                .filter(|(_, votes)| *votes > quota)
                .map(|(m, _)| *m)
                .collect();

            let (released, eliminated) = if !elected.is_empty() {
                let surplus: u64 = ranking
                    .iter()
                    .filter(|(_, votes)| *votes > quota)
                    .map(|(_, votes)| votes - quota)
                    .sum();
                ranking.retain(|(m, _)| !elected.contains(m));
                winners.extend(elected.iter());
                (surplus, None)
            } else {
                // The ranking is sorted: the last mayor has the fewest votes
                // and, among equal tallies, the largest id.
                match ranking.pop() {
                    Some((loser, votes)) => (votes, Some(loser)),
                    None => break,
                }
            };

            choice = (choice + 1).min(self.mayors.len() - 1);
            let transferred = self.distribute_votes(choice, &mut ranking, released);
            sort_ranking(&mut ranking);

            let round = StvRound {
                round: round_id,
                tally,
                elected,
                eliminated,
                released,
                transferred,
                lost: released - transferred,
            };
            info!(
                "Round {}: elected {:?}, eliminated {:?}, {} votes released, {} transferred, {} lost",
                round.round,
                round.elected,
                round.eliminated,
                round.released,
                round.transferred,
                round.lost
            );
            debug!("Round {}: ranking after transfer: {:?}", round_id, ranking);
            rounds.push(round);
        }

        let open_seats = seats.saturating_sub(winners.len());
        winners.extend(ranking.iter().take(open_seats).map(|(m, _)| *m));
        Ok(StvResult {
            winners,
            quota,
            rounds,
        })
    }

    // Returns the number of votes actually given to the continuing mayors.
    fn distribute_votes(&self, choice: usize, ranking: &mut [(MayorId, u64)], votes: u64) -> u64 {
        let votes_nchoice = &self.votes_per_mayor[choice];
        let mut transferred: u64 = 0;
        for (mayor, n_votes) in ranking.iter_mut() {
            if let Ok(i) = self.index_of(*mayor) {
                let share =
                    (votes as u128 * votes_nchoice[i] as u128 / self.total_votes as u128) as u64;
                *n_votes += share;
                transferred += share;
            }
        }
        transferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::random_profile;
    use crate::profile::tests::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn elimination_rounds() {
        init_logs();
        let res = profile3().single_transferable_vote(1).unwrap();
        assert_eq!(res.quota, 51);
        assert_eq!(res.winners, ids(&[0]));
        assert_eq!(res.rounds.len(), 2);

        let r1 = &res.rounds[0];
        assert_eq!(
            r1.tally,
            vec![(MayorId(0), 40), (MayorId(2), 32), (MayorId(1), 28)]
        );
        assert_eq!(r1.eliminated, Some(MayorId(1)));
        // Second ranks: 28 voters for mayor 2, none for mayor 0.
        assert_eq!((r1.released, r1.transferred, r1.lost), (28, 7, 21));

        let r2 = &res.rounds[1];
        assert_eq!(r2.tally, vec![(MayorId(0), 40), (MayorId(2), 39)]);
        assert_eq!(r2.eliminated, Some(MayorId(2)));
        // Third ranks: 60 voters for mayor 0.
        assert_eq!((r2.released, r2.transferred, r2.lost), (39, 23, 16));
    }

    #[test]
    fn surplus_transfer() {
        init_logs();
        let res = profile4().single_transferable_vote(2).unwrap();
        assert_eq!(res.quota, 163);
        assert_eq!(res.winners, ids(&[1, 0]));
        assert_eq!(res.rounds.len(), 4);
        let r1 = &res.rounds[0];
        assert_eq!(r1.elected, ids(&[1]));
        assert_eq!(r1.eliminated, None);
        assert_eq!((r1.released, r1.transferred, r1.lost), (103, 78, 25));
        // The surplus follows the second preferences (0: 52, 2: 172, 3: 0,
        // 4: 147 of 485), not the first ones.
        assert_eq!(
            res.rounds[1].tally,
            vec![
                (MayorId(0), 93),
                (MayorId(2), 78),
                (MayorId(4), 74),
                (MayorId(3), 52)
            ]
        );
        assert_eq!(res.rounds[1].eliminated, Some(MayorId(3)));
        assert_eq!(res.rounds[2].eliminated, Some(MayorId(4)));
        assert_eq!(res.rounds[3].eliminated, Some(MayorId(2)));
    }

    #[test]
    fn more_seats_than_mayors() {
        let res = profile3().single_transferable_vote(3).unwrap();
        assert_eq!(res.winners, ids(&[0, 2, 1]));
        assert!(res.rounds.is_empty());
        let res = profile3().single_transferable_vote(5).unwrap();
        assert_eq!(res.winners, ids(&[0, 2, 1]));
    }

    #[test]
    fn no_seats() {
        assert_eq!(
            profile3().single_transferable_vote(0),
            Err(SocialChoiceError::InvalidSeatCount { seats: 0 })
        );
    }

    #[test]
    fn votes_are_never_created() {
        let mut rng = StdRng::seed_from_u64(5);
        for num_mayors in 1..7 {
            for seats in 1..4 {
                for _ in 0..10 {
                    let p = random_profile(num_mayors, 15, 40, &mut rng).unwrap();
                    let res = p.single_transferable_vote(seats).unwrap();
                    assert_eq!(res.winners.len(), seats.min(num_mayors));
                    let mut sorted = res.winners.clone();
                    sorted.sort();
                    sorted.dedup();
                    assert_eq!(sorted.len(), res.winners.len());
                    for r in res.rounds.iter() {
                        let in_play: u64 = r.tally.iter().map(|(_, v)| *v).sum();
                        assert!(in_play <= p.total_votes());
                        assert!(r.transferred <= r.released);
                        assert_eq!(r.transferred + r.lost, r.released);
                    }
                    assert!(res.rounds.len() <= num_mayors);
                }
            }
        }
    }
}
