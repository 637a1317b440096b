/*!

This is the long-form manual for `social_choice` and `socho`.

## Profiles

A profile is a list of distinct strict rankings of the same candidates
("mayors"), each with the number of voters who cast it. Mayors are numbered
`0..n`. When the votes come as a table of scores, the canonicalizer ranks the
mayors of each voter by decreasing score. Equal scores keep the column order,
so the mayor with the smaller id comes first.

## Scoring rules

These rules give a score to every mayor. Rankings are sorted by decreasing
score, and equal scores by increasing id.

| name              | score of mayor `m`                                              |
|-------------------|-----------------------------------------------------------------|
| `borda`           | `n - 1 - rank` points per voter                                 |
| `dowdall`         | the Borda points divided by `rank + 1`                          |
| `copeland`        | pairwise victories minus pairwise defeats                       |
| `symmetric_borda` | the sum of the net preferences of `m` over every other mayor    |
| `simpson`         | the smallest net preference of `m` over another mayor           |
| `plurality`       | the number of voters placing `m` first                          |
| `schulze`         | the number of mayors beaten through strongest paths             |
| `kemeny_young`    | `n` for the first mayor of the optimal ranking, down to `1`     |

The net preference of `a` over `b` is the number of voters preferring `a` to
`b` minus the number of voters preferring `b` to `a`.

## Election rules

These rules only designate winners.

| name                  | winners                                                       |
|-----------------------|---------------------------------------------------------------|
| `condorcet`           | the mayors that beat or tie every other mayor (maybe none)    |
| `stv`                 | `seats` mayors, by single transferable vote                   |
| `baldwin`             | the last mayor standing after removing the lowest Borda score |
| `nanson`              | the mayors left after removing all the scores below the mean  |
| `sequential_majority` | the survivor of pairwise duels in increasing id order         |
| `raynaud`             | the first mayor of the Simpson ranking                        |

### Tie-breaking

- Baldwin removes the mayor with the largest id among those tied for the
  lowest score.
- The single transferable vote eliminates the last mayor of its ranking, which
  is also the largest id among the lowest tallies.
- In sequential majority comparison, a challenger replaces the current winner
  only with a strict majority. With a majority cycle, the result depends on
  the agenda: `Profile::sequential_majority_comparison_with_agenda` takes an
  explicit order.

### Single transferable vote

The quota is `total_votes / (seats + 1) + 1` and a mayor is elected when its
tally is strictly above it. Votes are not followed ballot by ballot: at the
k-th transfer, the released votes are split among the continuing mayors in
proportion to how many voters placed each of them at rank k in the original
profile. Shares are rounded down and the remainders are lost. Each round
reports the released, transferred and lost votes.

## Scaling limits

`kemeny_young` scores every permutation of the mayors, which is factorial
in the number of mayors. `schulze` walks the simple paths of the preference
graph but only extends a path when it beats the strongest path known to its
last node, which keeps it polynomial (about `n^5` steps). A profile with more
mayors than the configured ceiling fails with `ScaleLimitExceeded`. The defaults are 20 mayors for Schulze and 8
for Kemeny-Young (see `RuleLimits::DEFAULT_LIMITS`).

## Classification

`classify` is plurality voting over the outputs of several classifiers. For
each instance, the class predicted by the most voters wins, the first
predicted class winning ties. The score of the instance is the mean
probability given by the voters who predicted the winning class.

## Command line

```text
socho --input votes.csv --function borda --output ranking.txt
socho --input votes.tsv --sep '\t' --function stv --seats 2
socho --input votes.csv --function plurality --predictions probs.csv
socho --input votes.csv --function copeland --compare reference.txt
```

The input table has one row per mayor and one column per voter. The first row
holds the voter names. If the data rows have one more field than the header,
the first field of each row is the label of the mayor, otherwise mayors are
labelled by their row number. The cells are the scores given by the voters.

Scoring rules write one `"label" score` line per mayor, sorted by decreasing
score. Election rules write one `"label"` line per winner.

With `--compare`, the output is checked against a reference file written in
the same format. Every line that differs is reported and the program fails
with the number of errors.

A JSON configuration file may be given with `--config`:

```text
{
  "function": "kemeny_young",
  "separator": ",",
  "seats": 1,
  "inputType": "csv",
  "limits": { "kemenyYoungMaxMayors": 9, "schulzeMaxMayors": 12 }
}
```

All the keys are optional and the command line flags take precedence.

 */
