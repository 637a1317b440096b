use log::debug;

use crate::ballot_box::{canonicalize, rank_scores};
use crate::config::*;
use crate::errors::*;
use crate::profile::Profile;

/// A builder for assembling a profile one voter at a time.
///
/// Mayors may be given labels. Labelled ballots are then translated into
/// identifiers following the order of the labels.
///
/// ```
/// use social_choice::builder::Builder;
/// use social_choice::{MayorId, RuleLimits};
/// # use social_choice::SocialChoiceError;
///
/// let mut builder = Builder::new(&RuleLimits::DEFAULT_LIMITS)?
///     .mayors(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_ranking_simple(&["Bob".to_string(), "Anna".to_string(), "Clara".to_string()])?;
/// builder.add_scores(&[0.5, 0.1, 0.9])?;
/// builder.add_scores(&[0.2, 0.8, 0.1])?;
///
/// let profile = builder.build()?;
/// assert_eq!(profile.total_votes(), 3);
/// assert_eq!(builder.label(MayorId(2)), Some("Clara"));
/// # Ok::<(), SocialChoiceError>(())
/// ```
pub struct Builder {
    pub(crate) _limits: RuleLimits,
    pub(crate) _labels: Option<Vec<String>>,
    pub(crate) _ballots: Vec<WeightedBallot>,
}

impl Builder {
    pub fn new(limits: &RuleLimits) -> SocialChoiceResult<Builder> {
        Ok(Builder {
            _limits: *limits,
            _labels: None,
            _ballots: Vec::new(),
        })
    }

    /// Declares the labels of the mayors. The mayor at position `i` gets the
    /// identifier `i`. Ballots added so far are dropped.
    pub fn mayors(self, labels: &[String]) -> SocialChoiceResult<Builder> {
        for (idx, l) in labels.iter().enumerate() {
            if labels[..idx].contains(l) {
                return InvalidBallotShapeSnafu {
                    reason: format!("mayor label {:?} is declared twice", l),
                }
                .fail();
            }
        }
        Ok(Builder {
            _limits: self._limits,
            _labels: Some(labels.to_vec()),
            _ballots: Vec::new(),
        })
    }

    pub fn labels(&self) -> Option<&[String]> {
        self._labels.as_deref()
    }

    /// The label of a mayor, if labels were declared.
    pub fn label(&self, mayor: MayorId) -> Option<&str> {
        self._labels
            .as_ref()
            .and_then(|l| l.get(mayor.0 as usize))
            .map(|s| s.as_str())
    }

    /// Adds the ranking of one voter, given by labels.
    pub fn add_ranking_simple(&mut self, labels: &[String]) -> SocialChoiceResult<()> {
        let known = match self._labels.as_deref() {
            Some(l) => l,
            None => {
                return InvalidBallotShapeSnafu {
                    reason: "mayor labels must be declared before adding labelled rankings"
                        .to_string(),
                }
                .fail()
            }
        };
        let mut ranking: Vec<MayorId> = Vec::with_capacity(labels.len());
        for s in labels.iter() {
            match known.iter().position(|k| k == s) {
                Some(idx) => ranking.push(MayorId(idx as u32)),
                None => {
                    return InvalidBallotShapeSnafu {
                        reason: format!("unknown mayor label {:?}", s),
                    }
                    .fail()
                }
            }
        }
        self.add_ranking(&ranking, 1)
    }

    /// Adds a ranking, with a number of voters attached to it.
    pub fn add_ranking(&mut self, ranking: &[MayorId], count: u64) -> SocialChoiceResult<()> {
        self.add_ballot(&WeightedBallot {
            count,
            ballot: ranking.to_vec(),
        })
    }

    /// Adds the scores given by one voter to every mayor, in mayor order.
    pub fn add_scores(&mut self, scores: &[f64]) -> SocialChoiceResult<()> {
        let ranking = rank_scores(scores)?;
        self.add_ranking(&ranking, 1)
    }

    pub fn add_ballot(&mut self, ballot: &WeightedBallot) -> SocialChoiceResult<()> {
        if let Some(labels) = self._labels.as_deref() {
            if ballot.ballot.len() != labels.len() {
                return InvalidBallotShapeSnafu {
                    reason: format!(
                        "ballot ranks {} mayors, but {} labels were declared",
                        ballot.ballot.len(),
                        labels.len()
                    ),
                }
                .fail();
            }
            if let Some(m) = ballot.ballot.iter().find(|m| m.0 as usize >= labels.len()) {
                return InvalidBallotShapeSnafu {
                    reason: format!("mayor {} has no label among {:?}", m, labels),
                }
                .fail();
            }
        }
        self._ballots.push(ballot.clone());
        Ok(())
    }

    /// The merged ballots added so far.
    pub fn ballots(&self) -> SocialChoiceResult<Vec<WeightedBallot>> {
        canonicalize(&self._ballots)
    }

    pub fn build(&self) -> SocialChoiceResult<Profile> {
        debug!("build: {} ballots", self._ballots.len());
        Ok(Profile::new(&self._ballots)?.with_limits(self._limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn labelled_rankings() {
        let mut b = Builder::new(&RuleLimits::DEFAULT_LIMITS)
            .unwrap()
            .mayors(&labels(&["a", "b", "c"]))
            .unwrap();
        b.add_ranking_simple(&labels(&["c", "a", "b"])).unwrap();
        b.add_ranking_simple(&labels(&["c", "a", "b"])).unwrap();
        b.add_scores(&[0.0, 1.0, 0.5]).unwrap();
        assert_eq!(
            b.ballots().unwrap(),
            vec![
                WeightedBallot::new(2, &[2, 0, 1]),
                WeightedBallot::new(1, &[1, 2, 0])
            ]
        );
        assert_eq!(b.label(MayorId(1)), Some("b"));
        assert_eq!(b.label(MayorId(3)), None);
    }

    #[test]
    fn unknown_label() {
        let mut b = Builder::new(&RuleLimits::DEFAULT_LIMITS)
            .unwrap()
            .mayors(&labels(&["a", "b"]))
            .unwrap();
        assert!(b.add_ranking_simple(&labels(&["a", "z"])).is_err());
        assert!(b.add_scores(&[0.1, 0.2, 0.3]).is_err());
    }

    #[test]
    fn ids_must_have_a_label() {
        let mut b = Builder::new(&RuleLimits::DEFAULT_LIMITS)
            .unwrap()
            .mayors(&labels(&["a", "b"]))
            .unwrap();
        assert!(matches!(
            b.add_ranking(&[MayorId(5), MayorId(7)], 1),
            Err(SocialChoiceError::InvalidBallotShape { .. })
        ));
        assert!(b.add_ranking(&[MayorId(1), MayorId(0)], 1).is_ok());
        assert_eq!(b.ballots().unwrap(), vec![WeightedBallot::new(1, &[1, 0])]);
    }

    #[test]
    fn duplicated_label() {
        let b = Builder::new(&RuleLimits::DEFAULT_LIMITS).unwrap();
        assert!(b.mayors(&labels(&["a", "b", "a"])).is_err());
    }

    #[test]
    fn limits_are_kept() {
        let limits = RuleLimits {
            kemeny_young_max_mayors: 2,
            schulze_max_mayors: 3,
        };
        let mut b = Builder::new(&limits).unwrap();
        b.add_ranking(&[MayorId(0), MayorId(1), MayorId(2)], 4)
            .unwrap();
        let p = b.build().unwrap();
        assert_eq!(p.limits(), limits);
        assert!(p.kemeny_young().is_err());
    }

    #[test]
    fn empty_builder() {
        let b = Builder::new(&RuleLimits::DEFAULT_LIMITS).unwrap();
        assert_eq!(b.build().err(), Some(SocialChoiceError::EmptyProfile));
    }
}
