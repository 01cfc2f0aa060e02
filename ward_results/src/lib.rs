pub mod analytics;
mod config;
pub mod builder;
pub mod format;
pub mod manual;
pub mod table;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::config::*;

// **** Private helpers ****

// Ratio with a guard on the denominator. Never NaN or infinite.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn round_1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), values.len() as f64)
}

// Percentages from the feed are not trusted to be in range.
fn clamp_pct(x: Option<f64>) -> f64 {
    match x {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn is_declared(ward: &Ward) -> bool {
    ward.status == Some(WardStatus::Declared)
}

// **** Ward resolver ****

/// Normalizes one ward into its effective result.
///
/// The explicit fields of the record always win. Otherwise the first
/// candidate (the list is sorted by votes) provides the winner or leader.
/// The margin is taken as published and never recomputed from the candidates.
pub fn resolve_ward(ward: &Ward) -> Result<EffectiveWardResult, ResolveError> {
    let status = ward.status.ok_or(ResolveError::MissingField {
        ward_no: ward.ward_no,
        field: "status",
    })?;
    let winner_field = non_empty(&ward.winner);
    if ward.candidates.is_none() && winner_field.is_none() {
        return Err(ResolveError::MissingField {
            ward_no: ward.ward_no,
            field: "candidates",
        });
    }
    let first = ward.candidates.as_deref().and_then(|cs| cs.first());

    let winner = winner_field.or_else(|| first.map(|c| c.name.clone()).filter(|n| !n.is_empty()));
    if status == WardStatus::Declared && winner.is_none() {
        return Err(ResolveError::MissingField {
            ward_no: ward.ward_no,
            field: "winner",
        });
    }
    let winner_party = non_empty(&ward.winner_party)
        .or_else(|| first.map(|c| c.party.clone()).filter(|p| !p.is_empty()));
    let winner_votes = match ward.winner_votes {
        Some(v) if v > 0 => v,
        _ => first.map(|c| c.votes).unwrap_or(0),
    };

    Ok(EffectiveWardResult {
        ward_no: ward.ward_no,
        ward_name: ward_display_name(ward),
        status,
        winner,
        winner_party,
        winner_votes,
        vote_pct: clamp_pct(ward.vote_pct.or_else(|| first.and_then(|c| c.pct))),
        margin: ward.margin.unwrap_or(0),
        turnout_pct: clamp_pct(ward.turnout_pct),
        votes_counted_pct: clamp_pct(ward.votes_counted_pct),
        evm_processed_pct: clamp_pct(ward.evm_processed_pct),
        category: non_empty(&ward.category),
        gender: non_empty(&ward.gender),
    })
}

/// The name of the ward, or `Ward <number>` when the feed does not provide one.
pub fn ward_display_name(ward: &Ward) -> String {
    non_empty(&ward.ward_name).unwrap_or_else(|| format!("Ward {}", ward.ward_no))
}

/// The vote movement of each candidate of the ward, in feed order.
pub fn candidate_changes(ward: &Ward) -> Vec<CandidateChange> {
    changes_of(ward.candidates.as_deref().unwrap_or(&[]))
}

/// Same as [`candidate_changes`], for a candidate list borrowed on its own.
pub fn changes_of(candidates: &[Candidate]) -> Vec<CandidateChange> {
    candidates
        .iter()
        .map(|c| CandidateChange {
            name: c.name.clone(),
            party: c.party.clone(),
            votes: c.votes,
            pct: c.pct,
            change: match c.prev_votes {
                Some(prev) => c.votes as i64 - prev as i64,
                None => 0,
            },
        })
        .collect()
}

// **** Municipality rollup ****

/// Progress of one municipality.
///
/// A feed may list more wards than `total_wards`. The declared count is then
/// capped at `total_wards`, so that the progress never goes beyond 100%.
pub fn rollup_municipality(municipality: &Municipality) -> MunicipalityProgress {
    let total = municipality.total_wards;
    let listed_declared = municipality.wards.iter().filter(|w| is_declared(w)).count() as u32;
    let declared = listed_declared.min(total);
    let completion = if declared == total {
        Completion::Complete
    } else {
        Completion::Counting { declared, total }
    };
    let turnouts: Vec<f64> = municipality
        .wards
        .iter()
        .map(|w| clamp_pct(w.turnout_pct))
        .collect();

    debug!(
        "rollup_municipality: {}: declared {} of {}",
        municipality.name, declared, total
    );
    if municipality.wards.len() > total as usize {
        warn!(
            "rollup_municipality: {} lists {} wards ({} declared) but only {} are expected",
            municipality.name,
            municipality.wards.len(),
            listed_declared,
            total
        );
    }

    MunicipalityProgress {
        name: municipality.name.clone(),
        kind: municipality.kind.clone(),
        total_wards: total,
        declared,
        counting: total.saturating_sub(declared),
        completion,
        percent_complete: round_1(ratio(declared as f64, total as f64) * 100.0),
        avg_turnout: mean(&turnouts),
        mayor_race: municipality.mayor_race.clone(),
    }
}

// **** State summary ****

/// Aggregates the whole snapshot. Each override published by the source
/// replaces the corresponding derived value, independently of the others.
pub fn summarize(data: &ElectionData) -> StateSummary {
    let overrides = &data.summary;
    let all_wards: Vec<&Ward> = data
        .municipalities
        .iter()
        .flat_map(|m| m.wards.iter())
        .collect();
    let turnouts: Vec<f64> = all_wards.iter().map(|w| clamp_pct(w.turnout_pct)).collect();

    let derived_declared = all_wards.iter().filter(|w| is_declared(w)).count() as u32;
    let derived_total_wards: u32 = data.municipalities.iter().map(|m| m.total_wards).sum();

    let summary = StateSummary {
        total_ulbs: overrides
            .total_ulbs
            .unwrap_or(data.municipalities.len() as u32),
        total_wards: overrides.total_wards.unwrap_or(derived_total_wards),
        declared: overrides.declared.unwrap_or(derived_declared),
        reported_wards: all_wards.len() as u32,
        avg_turnout: overrides.turnout.unwrap_or_else(|| mean(&turnouts)),
        last_updated: non_empty(&overrides.last_updated).or_else(|| non_empty(&data.last_updated)),
    };
    info!("summarize: {:?}", summary);
    summary
}

// **** Party tally ****

/// Seats won per party, over the declared wards.
///
/// Parties are ranked by decreasing number of seats. Parties with the same
/// number of seats keep the order in which they were first seen in the feed.
pub fn party_tally(data: &ElectionData) -> Vec<PartySeats> {
    tally_declared(
        data.municipalities
            .iter()
            .flat_map(|m| m.wards.iter().map(move |w| (m.name.as_str(), w))),
    )
}

// Seats per party over the declared wards given with their municipality,
// ranked as described on `party_tally`.
pub(crate) fn tally_declared<'a>(
    wards: impl Iterator<Item = (&'a str, &'a Ward)>,
) -> Vec<PartySeats> {
    let mut tally: Vec<PartySeats> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (name, w) in wards.filter(|(_, w)| is_declared(w)) {
        let party = match resolve_ward(w) {
            Ok(EffectiveWardResult {
                winner_party: Some(p),
                ..
            }) => p,
            Ok(_) => continue,
            Err(e) => {
                debug!("party_tally: {}: skipping ward: {}", name, e);
                continue;
            }
        };
        match positions.get(&party) {
            Some(idx) => tally[*idx].seats += 1,
            None => {
                positions.insert(party.clone(), tally.len());
                tally.push(PartySeats { party, seats: 1 });
            }
        }
    }
    // sort_by is stable: ties stay in first-seen order.
    tally.sort_by(|a, b| b.seats.cmp(&a.seats));
    tally
}

pub fn leading_party(tally: &[PartySeats]) -> Option<&PartySeats> {
    tally.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{candidate, Builder};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ward(ward_no: u32, status: WardStatus) -> Ward {
        Ward {
            ward_no,
            status: Some(status),
            candidates: Some(vec![]),
            ..Ward::default()
        }
    }

    #[test]
    fn resolve_falls_back_to_first_candidate() {
        init();
        let w = Ward {
            candidates: Some(vec![
                candidate("A", "JMM", 300),
                candidate("B", "BJP", 200),
            ]),
            ..ward(4, WardStatus::Declared)
        };
        let r = resolve_ward(&w).unwrap();
        assert_eq!(r.winner.as_deref(), Some("A"));
        assert_eq!(r.winner_party.as_deref(), Some("JMM"));
        assert_eq!(r.winner_votes, 300);
        assert_eq!(r.ward_name, "Ward 4");
        assert_eq!(r.margin, 0);
        assert_eq!(r.turnout_pct, 0.0);
    }

    #[test]
    fn resolve_prefers_explicit_fields() {
        let w = Ward {
            winner: Some("B".to_string()),
            winner_party: Some("BJP".to_string()),
            winner_votes: Some(210),
            ward_name: Some("Lalpur".to_string()),
            candidates: Some(vec![candidate("A", "JMM", 300)]),
            ..ward(1, WardStatus::Declared)
        };
        let r = resolve_ward(&w).unwrap();
        assert_eq!(r.winner.as_deref(), Some("B"));
        assert_eq!(r.winner_party.as_deref(), Some("BJP"));
        assert_eq!(r.winner_votes, 210);
        assert_eq!(r.ward_name, "Lalpur");
    }

    #[test]
    fn resolve_zero_winner_votes_falls_back() {
        let w = Ward {
            winner_votes: Some(0),
            candidates: Some(vec![candidate("A", "JMM", 300)]),
            ..ward(1, WardStatus::Counting)
        };
        assert_eq!(resolve_ward(&w).unwrap().winner_votes, 300);
    }

    #[test]
    fn resolve_keeps_explicit_margin_over_vote_gap() {
        // The candidate gap is 100 but the feed says 40: the feed wins.
        let w = Ward {
            margin: Some(40),
            candidates: Some(vec![
                candidate("A", "JMM", 300),
                candidate("B", "BJP", 200),
            ]),
            ..ward(1, WardStatus::Declared)
        };
        assert_eq!(resolve_ward(&w).unwrap().margin, 40);
    }

    #[test]
    fn resolve_counting_without_candidates() {
        let r = resolve_ward(&ward(2, WardStatus::Counting)).unwrap();
        assert_eq!(r.winner, None);
        assert_eq!(r.winner_party, None);
        assert_eq!(r.winner_votes, 0);
    }

    #[test]
    fn resolve_missing_status() {
        let w = Ward {
            status: None,
            ..ward(3, WardStatus::Counting)
        };
        assert_eq!(
            resolve_ward(&w),
            Err(ResolveError::MissingField {
                ward_no: 3,
                field: "status"
            })
        );
    }

    #[test]
    fn resolve_missing_candidates_and_winner() {
        let w = Ward {
            candidates: None,
            ..ward(5, WardStatus::Counting)
        };
        assert_eq!(
            resolve_ward(&w),
            Err(ResolveError::MissingField {
                ward_no: 5,
                field: "candidates"
            })
        );
        // An explicit winner is enough.
        let w2 = Ward {
            candidates: None,
            winner: Some("C".to_string()),
            ..ward(5, WardStatus::Declared)
        };
        assert_eq!(resolve_ward(&w2).unwrap().winner.as_deref(), Some("C"));
    }

    #[test]
    fn resolve_declared_needs_a_winner() {
        let err = resolve_ward(&ward(6, WardStatus::Declared)).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingField {
                ward_no: 6,
                field: "winner"
            }
        );
        assert_eq!(err.to_string(), "ward 6: missing field winner");
    }

    #[test]
    fn resolve_clamps_percentages() {
        let w = Ward {
            turnout_pct: Some(104.2),
            votes_counted_pct: Some(-3.0),
            evm_processed_pct: Some(f64::NAN),
            vote_pct: Some(55.5),
            ..ward(1, WardStatus::Counting)
        };
        let r = resolve_ward(&w).unwrap();
        assert_eq!(r.turnout_pct, 100.0);
        assert_eq!(r.votes_counted_pct, 0.0);
        assert_eq!(r.evm_processed_pct, 0.0);
        assert_eq!(r.vote_pct, 55.5);
    }

    #[test]
    fn candidate_change_defaults_to_zero() {
        let mut a = candidate("A", "JMM", 300);
        a.prev_votes = Some(250);
        let mut b = candidate("B", "BJP", 200);
        b.prev_votes = Some(260);
        let c = candidate("C", "IND", 20);
        let w = Ward {
            candidates: Some(vec![a, b, c]),
            ..ward(1, WardStatus::Counting)
        };
        let changes: Vec<i64> = candidate_changes(&w).iter().map(|c| c.change).collect();
        assert_eq!(changes, vec![50, -60, 0]);
        assert!(candidate_changes(&Ward::default()).is_empty());
    }

    #[test]
    fn rollup_ranchi() {
        init();
        let m = Municipality {
            name: "Ranchi".to_string(),
            total_wards: 2,
            wards: vec![
                Ward {
                    ward_no: 1,
                    status: Some(WardStatus::Declared),
                    winner_votes: Some(500),
                    margin: Some(50),
                    ..Ward::default()
                },
                Ward {
                    ward_no: 2,
                    status: Some(WardStatus::Counting),
                    ..Ward::default()
                },
            ],
            ..Municipality::default()
        };
        let p = rollup_municipality(&m);
        assert_eq!(p.declared, 1);
        assert_eq!(p.counting, 1);
        assert_eq!(p.completion.to_string(), "Counting (1/2)");
        assert_eq!(p.percent_complete, 50.0);
    }

    #[test]
    fn rollup_zero_wards() {
        let m = Municipality {
            name: "Empty".to_string(),
            ..Municipality::default()
        };
        let p = rollup_municipality(&m);
        assert_eq!(p.percent_complete, 0.0);
        assert_eq!(p.avg_turnout, 0.0);
        assert_eq!(p.completion, Completion::Complete);
    }

    #[test]
    fn rollup_complete_and_rounding() {
        let m = Municipality {
            name: "Dumka".to_string(),
            total_wards: 3,
            wards: vec![
                ward(1, WardStatus::Declared),
                ward(2, WardStatus::Counting),
                ward(3, WardStatus::Counting),
            ],
            ..Municipality::default()
        };
        assert_eq!(rollup_municipality(&m).percent_complete, 33.3);

        let done = Municipality {
            name: "Done".to_string(),
            total_wards: 1,
            wards: vec![ward(1, WardStatus::Declared)],
            ..Municipality::default()
        };
        let p = rollup_municipality(&done);
        assert_eq!(p.completion, Completion::Complete);
        assert_eq!(p.completion.to_string(), "Complete");
        assert_eq!(p.percent_complete, 100.0);
    }

    #[test]
    fn rollup_caps_extra_declared_wards() {
        let m = Municipality {
            name: "Chas".to_string(),
            total_wards: 2,
            wards: vec![
                ward(1, WardStatus::Declared),
                ward(2, WardStatus::Declared),
                ward(3, WardStatus::Declared),
            ],
            ..Municipality::default()
        };
        let p = rollup_municipality(&m);
        assert_eq!(p.declared, 2);
        assert_eq!(p.counting, 0);
        assert_eq!(p.completion, Completion::Complete);
        assert_eq!(p.percent_complete, 100.0);

        let m2 = Municipality {
            wards: vec![
                ward(1, WardStatus::Declared),
                ward(2, WardStatus::Declared),
                ward(3, WardStatus::Counting),
            ],
            ..m
        };
        let p2 = rollup_municipality(&m2);
        assert_eq!(p2.completion.to_string(), "Complete");
        assert_eq!(p2.percent_complete, 100.0);
    }

    #[test]
    fn summary_turnout_override_wins() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 2)
            .declared(1, "A", "JMM", 300)
            .turnout(58.0)
            .counting(2, "B", "BJP", 200)
            .turnout(58.2)
            .overrides(SummaryOverrides {
                turnout: Some(62.5),
                ..SummaryOverrides::default()
            })
            .build();
        let s = summarize(&data);
        assert_eq!(s.avg_turnout, 62.5);
        // The other fields are still derived.
        assert_eq!(s.total_ulbs, 1);
        assert_eq!(s.total_wards, 2);
        assert_eq!(s.declared, 1);
    }

    #[test]
    fn summary_derived_values() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 3)
            .declared(1, "A", "JMM", 300)
            .turnout(60.0)
            .counting(2, "B", "BJP", 200)
            .turnout(50.0)
            .municipality("Giridih", "Nagar Parishad", 5)
            .declared(1, "C", "BJP", 100)
            .turnout(70.0)
            .last_updated("2026-02-24T14:30:00")
            .build();
        let s = summarize(&data);
        assert_eq!(s.total_ulbs, 2);
        assert_eq!(s.total_wards, 8);
        assert_eq!(s.declared, 2);
        assert_eq!(s.reported_wards, 3);
        assert_eq!(s.avg_turnout, 60.0);
        assert_eq!(s.last_updated.as_deref(), Some("2026-02-24T14:30:00"));
    }

    #[test]
    fn summary_overrides_are_independent() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 2)
            .declared(1, "A", "JMM", 300)
            .overrides(SummaryOverrides {
                total_ulbs: Some(49),
                declared: Some(0),
                ..SummaryOverrides::default()
            })
            .build();
        let s = summarize(&data);
        assert_eq!(s.total_ulbs, 49);
        assert_eq!(s.declared, 0);
        assert_eq!(s.total_wards, 2);
    }

    #[test]
    fn summary_empty_snapshot() {
        let s = summarize(&ElectionData::default());
        assert_eq!(s.total_ulbs, 0);
        assert_eq!(s.avg_turnout, 0.0);
        assert!(s.avg_turnout.is_finite());
    }

    #[test]
    fn tally_ranks_and_breaks_ties_in_feed_order() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 6)
            .declared(1, "A", "INC", 300)
            .declared(2, "B", "BJP", 300)
            .declared(3, "C", "JMM", 300)
            .declared(4, "D", "JMM", 300)
            .declared(5, "E", "BJP", 300)
            .counting(6, "F", "AJSU", 300)
            .build();
        let t = party_tally(&data);
        assert_eq!(
            t,
            vec![
                PartySeats {
                    party: "BJP".to_string(),
                    seats: 2
                },
                PartySeats {
                    party: "JMM".to_string(),
                    seats: 2
                },
                PartySeats {
                    party: "INC".to_string(),
                    seats: 1
                },
            ]
        );
        assert_eq!(leading_party(&t).map(|p| p.party.as_str()), Some("BJP"));
    }

    #[test]
    fn tally_sum_matches_declared_wards_with_party() {
        let mut data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 4)
            .declared(1, "A", "INC", 300)
            .declared(2, "B", "BJP", 300)
            .counting(3, "C", "JMM", 300)
            .build();
        // A declared ward with no designated winner does not count.
        data.municipalities[0].wards.push(ward(4, WardStatus::Declared));

        let seats: u32 = party_tally(&data).iter().map(|p| p.seats).sum();
        let expected = data.municipalities[0]
            .wards
            .iter()
            .filter(|w| is_declared(w))
            .filter(|w| matches!(resolve_ward(w), Ok(r) if r.winner_party.is_some()))
            .count() as u32;
        assert_eq!(seats, expected);
        assert_eq!(seats, 2);
        assert!(leading_party(&[]).is_none());
    }
}
