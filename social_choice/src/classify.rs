//! Plurality voting over the outputs of several classifiers.
//!
//! Each voter is a classifier that predicted a class for every instance, with
//! the probability it gave to its prediction. For each instance, the class
//! predicted by the most voters wins.

use std::hash::Hash;

use log::debug;

use crate::errors::*;

/// The outcome of the vote on one instance.
#[derive(PartialEq, Debug, Clone)]
pub struct ClassVote<C> {
    pub instance: usize,
    pub class: C,
    /// The number of voters who predicted `class`.
    pub votes: usize,
    /// The mean probability given to `class` by the voters who predicted it.
    pub score: f64,
}

/// Votes on every instance and returns `(instance index, score)` pairs, in
/// instance order.
///
/// `predictions[v][i]` is the class predicted by voter `v` for instance `i`
/// and `probabilities[v][i]` the probability attached to it. See
/// [`classify_detailed`] for the tie-break rule.
///
/// ```
/// use social_choice::classify;
///
/// let predictions = vec![vec!["cat", "dog"], vec!["cat", "cat"], vec!["dog", "dog"]];
/// let probabilities = vec![vec![0.9, 0.6], vec![0.7, 0.5], vec![0.8, 0.8]];
/// let res = classify(&predictions, &probabilities)?;
/// assert_eq!(res.len(), 2);
/// assert_eq!(res[0].0, 0);
/// assert!((res[0].1 - 0.8).abs() < 1e-12);
/// assert!((res[1].1 - 0.7).abs() < 1e-12);
/// # Ok::<(), social_choice::SocialChoiceError>(())
/// ```
pub fn classify<C: Eq + Hash + Clone>(
    predictions: &[Vec<C>],
    probabilities: &[Vec<f64>],
) -> SocialChoiceResult<Vec<(usize, f64)>> {
    Ok(classify_detailed(predictions, probabilities)?
        .into_iter()
        .map(|cv| (cv.instance, cv.score))
        .collect())
}

/// Votes on every instance and keeps the winning class.
///
/// When several classes get the same number of votes, the class predicted
/// first (by the voter with the lowest index) wins.
pub fn classify_detailed<C: Eq + Hash + Clone>(
    predictions: &[Vec<C>],
    probabilities: &[Vec<f64>],
) -> SocialChoiceResult<Vec<ClassVote<C>>> {
    let num_instances = check_shapes(predictions, probabilities)?;
    let mut res: Vec<ClassVote<C>> = Vec::with_capacity(num_instances);
    for instance in 0..num_instances {
        // Classes in order of first appearance, with their votes and the sum
        // of their probabilities.
        let mut tally: Vec<(&C, usize, f64)> = Vec::new();
        for (preds, probs) in predictions.iter().zip(probabilities.iter()) {
            let class = &preds[instance];
            match tally.iter_mut().find(|(c, _, _)| *c == class) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 += probs[instance];
                }
                None => tally.push((class, 1, probs[instance])),
            }
        }
        let mut best = 0;
        for (idx, (_, votes, _)) in tally.iter().enumerate() {
            if *votes > tally[best].1 {
                best = idx;
            }
        }
        let (class, votes, sum) = tally[best];
        res.push(ClassVote {
            instance,
            class: class.clone(),
            votes,
            score: sum / votes as f64,
        });
    }
    debug!(
        "classify: {} instances voted by {} voters",
        num_instances,
        predictions.len()
    );
    Ok(res)
}

// Returns the number of instances.
fn check_shapes<C>(predictions: &[Vec<C>], probabilities: &[Vec<f64>]) -> SocialChoiceResult<usize> {
    let num_instances = match predictions.first() {
        Some(row) => row.len(),
        None => return EmptyProfileSnafu {}.fail(),
    };
    if predictions.len() != probabilities.len() {
        return MismatchedPredictionsSnafu {
            reason: format!(
                "{} voters have predictions but {} have probabilities",
                predictions.len(),
                probabilities.len()
            ),
        }
        .fail();
    }
    for (voter, (preds, probs)) in predictions.iter().zip(probabilities.iter()).enumerate() {
        if preds.len() != num_instances || probs.len() != num_instances {
            return MismatchedPredictionsSnafu {
                reason: format!(
                    "voter {} has {} predictions and {} probabilities, expected {}",
                    voter,
                    preds.len(),
                    probs.len(),
                    num_instances
                ),
            }
            .fail();
        }
    }
    Ok(num_instances)
}
