/*!

This is the long-form manual for `ward_results` and `ulbres`.

## Input format

The feed is a single JSON object:

```json
{
  "summary": { "total_ulbs": 49, "total_wards": 1091, "turnout": 62.5 },
  "last_updated": "2026-02-24T14:30:00",
  "municipalities": [
    {
      "name": "Ranchi",
      "type": "Municipal Corporation",
      "total_wards": 53,
      "mayor_race": {
        "status": "Counting", "leading": "Asha Devi", "leading_party": "JMM",
        "trailing": "Ramesh Oraon", "trailing_party": "BJP", "margin": 1520
      },
      "wards": [
        {
          "ward_no": 1,
          "ward_name": "Lalpur",
          "status": "Declared",
          "winner": "Sunita Kumari",
          "winner_party": "JMM",
          "winner_votes": 2450,
          "vote_pct": 48.2,
          "margin": 310,
          "turnout": 61.3,
          "votes_counted_pct": 100,
          "evm_processed": 100,
          "category": "General",
          "gender": "Female",
          "candidates": [
            { "name": "Sunita Kumari", "party": "JMM", "votes": 2450, "prev_votes": 2300, "pct": 48.2 },
            { "name": "Rita Singh", "party": "BJP", "votes": 2140, "pct": 42.1 }
          ]
        }
      ]
    }
  ]
}
```

The camelCase spellings (`wardNo`, `winnerParty`, `turnoutPct`, `totalWards`, ...) are
accepted as well.

Only `municipalities`, the municipality `name` and `total_wards`, and the ward
`ward_no` are required. Everything else may be missing while the count is in
progress.

## Fallback rules

For each ward:
- the winner (or the leading candidate while counting) is `winner`, or else the
  first candidate of the list. The list is expected to be sorted by votes.
- the party is `winner_party`, or else the party of the first candidate.
- the votes are `winner_votes` if it is not zero, or else the votes of the first candidate.
- the margin is `margin`, or zero. It is not recomputed from the candidates.
- the turnout, counted and EVM percentages default to zero.

A ward without `status`, or without both `candidates` and `winner`, cannot be
resolved. It is shown as a placeholder row and does not affect the other wards.
A declared ward must designate a winner.

## Summary overrides

The fields of `summary` replace the values computed from the wards, one by one:
`total_ulbs`, `total_wards`, `declared`, `turnout` and `last_updated`.

## Party tally

Only declared wards count. Parties with the same number of seats are listed in the
order in which they first appear in the feed.
*/
