//! Conversion of raw voter rows into a multiset of weighted ballots.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::config::*;
use crate::errors::*;

/// The raw choices of the voters, one row per voter.
#[derive(PartialEq, Debug, Clone)]
pub enum RawChoices {
    /// Each row lists the mayors from the most preferred to the least preferred.
    Ranked(Vec<Vec<MayorId>>),
    /// Each row holds one score per mayor, indexed by mayor id. Higher is better.
    Scores(Vec<Vec<f64>>),
}

/// Builds the weighted ballots of the given voters.
///
/// Voters with the exact same ranking are merged into a single ballot whose
/// count is the number of such voters. The ballots are returned in the order
/// in which each ranking first appeared.
///
/// ```
/// use social_choice::ballot_box::{ballot_box, RawChoices};
/// use social_choice::WeightedBallot;
///
/// let ballots = ballot_box(&RawChoices::Scores(vec![
///     vec![0.2, 0.7, 0.1],
///     vec![0.3, 0.9, 0.2],
///     vec![0.5, 0.5, 0.9],
/// ]))?;
/// assert_eq!(
///     ballots,
///     vec![
///         WeightedBallot::new(2, &[1, 0, 2]),
///         WeightedBallot::new(1, &[2, 0, 1]),
///     ]
/// );
/// # Ok::<(), social_choice::SocialChoiceError>(())
/// ```
pub fn ballot_box(choices: &RawChoices) -> SocialChoiceResult<Vec<WeightedBallot>> {
    let rankings: Vec<Vec<MayorId>> = match choices {
        RawChoices::Ranked(rows) => rows.clone(),
        RawChoices::Scores(rows) => {
            let mut res = Vec::with_capacity(rows.len());
            for row in rows.iter() {
                res.push(rank_scores(row)?);
            }
            res
        }
    };
    debug!("ballot_box: {} voters", rankings.len());
    canonicalize(
        &rankings
            .into_iter()
            .map(|ballot| WeightedBallot { count: 1, ballot })
            .collect::<Vec<_>>(),
    )
}

/// Turns one row of scores into a ranking: mayors sorted by decreasing score,
/// equal scores keeping their column order.
pub fn rank_scores(row: &[f64]) -> SocialChoiceResult<Vec<MayorId>> {
    if let Some(idx) = row.iter().position(|s| s.is_nan()) {
        return InvalidBallotShapeSnafu {
            reason: format!("score of mayor {} is not a number", idx),
        }
        .fail();
    }
    let mut indexed: Vec<(MayorId, f64)> = row
        .iter()
        .enumerate()
        .map(|(idx, s)| (MayorId(idx as u32), *s))
        .collect();
    // sort_by is stable: ties stay in column order.
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(indexed.into_iter().map(|(m, _)| m).collect())
}

/// Validates a collection of weighted ballots and merges the identical ones.
///
/// The candidate set is taken from the first ballot. Every other ballot must
/// rank exactly the same candidates, each of them once. Applying this
/// function to its own output returns the output unchanged.
///
/// The total number of votes times the number of pairs of candidates must fit
/// in an `i64`, which bounds every pairwise margin, Borda score and Kendall-tau
/// distance of the profile.
pub fn canonicalize(ballots: &[WeightedBallot]) -> SocialChoiceResult<Vec<WeightedBallot>> {
    let first = match ballots.first() {
        Some(b) => b,
        None => return EmptyProfileSnafu {}.fail(),
    };
    let mayors: BTreeSet<MayorId> = first.ballot.iter().cloned().collect();
    if mayors.is_empty() {
        return InvalidBallotShapeSnafu {
            reason: "a ballot must rank at least one mayor".to_string(),
        }
        .fail();
    }

    let mut index: HashMap<&[MayorId], usize> = HashMap::new();
    let mut res: Vec<WeightedBallot> = Vec::new();
    let mut total_votes: u64 = 0;
    for (idx, wb) in ballots.iter().enumerate() {
        check_ballot(idx, wb, &mayors)?;
        total_votes = match total_votes.checked_add(wb.count) {
            Some(t) => t,
            None => return too_many_votes(),
        };
        match index.get(wb.ballot.as_slice()) {
            Some(&pos) => {
                res[pos].count += wb.count;
            }
            None => {
                index.insert(wb.ballot.as_slice(), res.len());
                res.push(wb.clone());
            }
        }
    }
    let num_pairs = (mayors.len() as u64 * (mayors.len() as u64 - 1) / 2).max(1);
    match total_votes.checked_mul(num_pairs) {
        Some(t) if t <= i64::MAX as u64 => {}
        _ => return too_many_votes(),
    }
    debug!(
        "canonicalize: {} ballots merged into {} distinct ballots over {} mayors",
        ballots.len(),
        res.len(),
        mayors.len()
    );
    Ok(res)
}

fn too_many_votes<T>() -> SocialChoiceResult<T> {
    InvalidBallotShapeSnafu {
        reason: "too many votes for the scores to fit in 64 bits".to_string(),
    }
    .fail()
}

fn check_ballot(
    idx: usize,
    wb: &WeightedBallot,
    mayors: &BTreeSet<MayorId>,
) -> SocialChoiceResult<()> {
    if wb.count == 0 {
        return InvalidBallotShapeSnafu {
            reason: format!("ballot #{} has a count of zero", idx),
        }
        .fail();
    }
    if wb.ballot.len() != mayors.len() {
        return InvalidBallotShapeSnafu {
            reason: format!(
                "ballot #{} ranks {} mayors, expected {}",
                idx,
                wb.ballot.len(),
                mayors.len()
            ),
        }
        .fail();
    }
    let mut seen: BTreeSet<MayorId> = BTreeSet::new();
    for m in wb.ballot.iter() {
        if !mayors.contains(m) {
            return InvalidBallotShapeSnafu {
                reason: format!("ballot #{} ranks unexpected mayor {}", idx, m),
            }
            .fail();
        }
        if !seen.insert(*m) {
            return InvalidBallotShapeSnafu {
                reason: format!("ballot #{} ranks mayor {} twice", idx, m),
            }
            .fail();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(rows: &[&[u32]]) -> RawChoices {
        RawChoices::Ranked(
            rows.iter()
                .map(|r| r.iter().map(|m| MayorId(*m)).collect())
                .collect(),
        )
    }

    #[test]
    fn merges_identical_rankings() {
        let res = ballot_box(&ranked(&[&[0, 1, 2], &[2, 1, 0], &[0, 1, 2], &[0, 1, 2]])).unwrap();
        assert_eq!(
            res,
            vec![
                WeightedBallot::new(3, &[0, 1, 2]),
                WeightedBallot::new(1, &[2, 1, 0])
            ]
        );
    }

    #[test]
    fn scores_ties_keep_column_order() {
        assert_eq!(
            rank_scores(&[1.0, 3.0, 1.0, 3.0]).unwrap(),
            vec![MayorId(1), MayorId(3), MayorId(0), MayorId(2)]
        );
    }

    #[test]
    fn scores_reject_nan() {
        assert!(matches!(
            rank_scores(&[1.0, f64::NAN]),
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
    }

    #[test]
    fn inconsistent_lengths() {
        let res = ballot_box(&ranked(&[&[0, 1, 2], &[1, 0]]));
        assert!(matches!(
            res,
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
        let res = ballot_box(&RawChoices::Scores(vec![vec![1.0, 2.0], vec![1.0]]));
        assert!(matches!(
            res,
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
    }

    #[test]
    fn duplicated_or_missing_mayor() {
        let res = ballot_box(&ranked(&[&[0, 1, 2], &[1, 1, 0]]));
        assert!(matches!(
            res,
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
        let res = ballot_box(&ranked(&[&[0, 1, 2], &[1, 3, 0]]));
        assert!(matches!(
            res,
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
    }

    #[test]
    fn no_voters() {
        assert_eq!(
            ballot_box(&RawChoices::Ranked(vec![])),
            Err(SocialChoiceError::EmptyProfile)
        );
    }

    #[test]
    fn zero_count_rejected() {
        let res = canonicalize(&[
            WeightedBallot::new(3, &[0, 1]),
            WeightedBallot::new(0, &[1, 0]),
        ]);
        assert!(matches!(
            res,
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
    }

    #[test]
    fn vote_totals_fit_in_scores() {
        let too_many = |res: SocialChoiceResult<Vec<WeightedBallot>>| {
            matches!(res, Err(SocialChoiceError::InvalidBallotShape { .. }))
        };
        let max = i64::MAX as u64;
        assert!(canonicalize(&[WeightedBallot::new(max, &[0, 1])]).is_ok());
        assert!(too_many(canonicalize(&[WeightedBallot::new(max + 1, &[0, 1])])));
        // The sum itself overflows.
        assert!(too_many(canonicalize(&[
            WeightedBallot::new(u64::MAX, &[0, 1]),
            WeightedBallot::new(1, &[1, 0]),
        ])));
        // 3 mayors make 3 pairs.
        assert!(canonicalize(&[WeightedBallot::new(max / 3, &[0, 1, 2])]).is_ok());
        assert!(too_many(canonicalize(&[WeightedBallot::new(
            max / 3 + 1,
            &[0, 1, 2]
        )])));
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let ballots = vec![
            WeightedBallot::new(40, &[0, 1, 2]),
            WeightedBallot::new(28, &[1, 2, 0]),
            WeightedBallot::new(32, &[2, 1, 0]),
        ];
        let once = canonicalize(&ballots).unwrap();
        assert_eq!(once, ballots);
        assert_eq!(canonicalize(&once).unwrap(), once);
    }
}
