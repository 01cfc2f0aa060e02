//! Breakdowns of the results across the whole snapshot: seats per party in
//! each municipality, winners by gender and by category, the wards with the
//! highest turnout and the spread of the victory margins.
//!
//! Like the party tally, the breakdowns of winners only consider the declared
//! wards that resolve. Wards that cannot be resolved are left out of every
//! breakdown.

use log::debug;

use crate::config::*;
use crate::{resolve_ward, tally_declared};

/// Number of wards listed by [`top_turnout_wards`] in the summaries.
pub const TOP_TURNOUT_WARDS: usize = 10;

/// Number of bins of the margin histogram in the summaries.
pub const MARGIN_BINS: usize = 20;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MunicipalitySeats {
    pub municipality: String,
    pub parties: Vec<PartySeats>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupCount {
    pub label: String,
    pub count: u32,
}

/// Counts per label. The winners without a value for the attribute are
/// counted apart in `unknown`.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Breakdown {
    pub groups: Vec<GroupCount>,
    pub unknown: u32,
}

#[derive(PartialEq, Debug, Clone)]
pub struct TurnoutEntry {
    pub municipality: String,
    pub ward_no: u32,
    pub ward_name: String,
    pub winner: Option<String>,
    pub winner_party: Option<String>,
    pub turnout_pct: f64,
}

/// Wards whose margin is in `[lower, upper)`. The last bin includes `upper`.
#[derive(PartialEq, Debug, Clone)]
pub struct MarginBin {
    pub lower: f64,
    pub upper: f64,
    pub wards: u32,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct MarginSpread {
    pub wards: u32,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub median: f64,
    pub bins: Vec<MarginBin>,
}

// The declared wards that resolve, with their municipality.
fn declared_results(data: &ElectionData) -> Vec<(&str, EffectiveWardResult)> {
    let mut res = Vec::new();
    for m in data.municipalities.iter() {
        for w in m.wards.iter() {
            if w.status != Some(WardStatus::Declared) {
                continue;
            }
            match resolve_ward(w) {
                Ok(r) => res.push((m.name.as_str(), r)),
                Err(e) => debug!("declared_results: {}: skipping ward: {}", m.name, e),
            }
        }
    }
    res
}

/// Seats won by each party within each municipality, in feed order of the
/// municipalities. Parties are ranked as in [`crate::party_tally`].
/// Municipalities without any seat are left out.
pub fn municipality_party_seats(data: &ElectionData) -> Vec<MunicipalitySeats> {
    data.municipalities
        .iter()
        .map(|m| MunicipalitySeats {
            municipality: m.name.clone(),
            parties: tally_declared(m.wards.iter().map(|w| (m.name.as_str(), w))),
        })
        .filter(|ms| !ms.parties.is_empty())
        .collect()
}

fn breakdown<'a>(labels: impl Iterator<Item = Option<&'a str>>) -> Breakdown {
    let mut res = Breakdown::default();
    for label in labels {
        match label {
            None => res.unknown += 1,
            Some(l) => match res.groups.iter_mut().find(|g| g.label == l) {
                Some(g) => g.count += 1,
                None => res.groups.push(GroupCount {
                    label: l.to_string(),
                    count: 1,
                }),
            },
        }
    }
    // Stable: ties keep the order of first appearance.
    res.groups.sort_by(|a, b| b.count.cmp(&a.count));
    res
}

pub fn winners_by_gender(data: &ElectionData) -> Breakdown {
    let results = declared_results(data);
    breakdown(results.iter().map(|(_, r)| r.gender.as_deref()))
}

pub fn winners_by_category(data: &ElectionData) -> Breakdown {
    let results = declared_results(data);
    breakdown(results.iter().map(|(_, r)| r.category.as_deref()))
}

/// The `n` wards with the highest turnout, declared or still counting.
/// Wards with the same turnout keep their feed order.
pub fn top_turnout_wards(data: &ElectionData, n: usize) -> Vec<TurnoutEntry> {
    let mut entries: Vec<TurnoutEntry> = Vec::new();
    for m in data.municipalities.iter() {
        for w in m.wards.iter() {
            if let Ok(r) = resolve_ward(w) {
                entries.push(TurnoutEntry {
                    municipality: m.name.clone(),
                    ward_no: r.ward_no,
                    ward_name: r.ward_name,
                    winner: r.winner,
                    winner_party: r.winner_party,
                    turnout_pct: r.turnout_pct,
                });
            }
        }
    }
    entries.sort_by(|a, b| b.turnout_pct.total_cmp(&a.turnout_pct));
    entries.truncate(n);
    entries
}

/// Statistics and histogram of the margins of the declared wards.
///
/// The bins split `[min, max]` in `bins` intervals of equal width. When all
/// the margins are equal, there is a single bin.
pub fn margin_spread(data: &ElectionData, bins: usize) -> MarginSpread {
    let mut margins: Vec<u64> = declared_results(data)
        .iter()
        .map(|(_, r)| r.margin)
        .collect();
    if margins.is_empty() || bins == 0 {
        return MarginSpread {
            wards: margins.len() as u32,
            ..MarginSpread::default()
        };
    }
    margins.sort_unstable();
    let count = margins.len();
    let min = margins[0];
    let max = margins[count - 1];
    let mean = margins.iter().map(|m| *m as f64).sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        margins[count / 2] as f64
    } else {
        (margins[count / 2 - 1] as f64 + margins[count / 2] as f64) / 2.0
    };

    let bins = if min == max { 1 } else { bins };
    let width = (max - min) as f64 / bins as f64;
    let mut hist: Vec<MarginBin> = (0..bins)
        .map(|i| MarginBin {
            lower: min as f64 + i as f64 * width,
            upper: if i + 1 == bins {
                max as f64
            } else {
                min as f64 + (i + 1) as f64 * width
            },
            wards: 0,
        })
        .collect();
    for m in margins.iter() {
        let idx = if width == 0.0 {
            0
        } else {
            (((*m - min) as f64 / width).floor() as usize).min(bins - 1)
        };
        hist[idx].wards += 1;
    }

    MarginSpread {
        wards: count as u32,
        min,
        max,
        mean,
        median,
        bins: hist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn with_attributes(
        mut data: ElectionData,
        attrs: &[(Option<&str>, Option<&str>)],
    ) -> ElectionData {
        let wards = data.municipalities.iter_mut().flat_map(|m| m.wards.iter_mut());
        for (w, (gender, category)) in wards.zip(attrs.iter()) {
            w.gender = gender.map(|s| s.to_string());
            w.category = category.map(|s| s.to_string());
        }
        data
    }

    #[test]
    fn seats_per_municipality() {
        let mut data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 5)
            .declared(1, "A", "BJP", 10)
            .declared(2, "B", "JMM", 10)
            .declared(3, "C", "JMM", 10)
            .counting(4, "D", "INC", 10)
            .declared(5, "E", "INC", 10)
            .municipality("Chas", "Nagar Parishad", 1)
            .counting(1, "F", "BJP", 10)
            .municipality("Dumka", "Nagar Parishad", 1)
            .declared(1, "G", "IND", 10)
            .build();
        // Unresolvable: skipped.
        data.municipalities[0].wards[4].candidates = Some(vec![]);
        let seats = municipality_party_seats(&data);
        assert_eq!(seats.len(), 2);
        assert_eq!(seats[0].municipality, "Ranchi");
        assert_eq!(
            seats[0].parties,
            vec![
                PartySeats {
                    party: "JMM".to_string(),
                    seats: 2
                },
                PartySeats {
                    party: "BJP".to_string(),
                    seats: 1
                },
            ]
        );
        assert_eq!(seats[1].municipality, "Dumka");
    }

    #[test]
    fn gender_and_category_with_missing_values() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 5)
            .declared(1, "A", "BJP", 10)
            .declared(2, "B", "JMM", 10)
            .declared(3, "C", "JMM", 10)
            .declared(4, "D", "INC", 10)
            .counting(5, "E", "INC", 10)
            .build();
        let data = with_attributes(
            data,
            &[
                (Some("Male"), Some("OBC")),
                (Some("Female"), None),
                (None, Some("General")),
                (Some("Female"), Some("OBC")),
                // Counting: not a winner.
                (Some("Male"), Some("SC")),
            ],
        );
        let by_gender = winners_by_gender(&data);
        assert_eq!(by_gender.unknown, 1);
        assert_eq!(
            by_gender.groups,
            vec![
                GroupCount {
                    label: "Female".to_string(),
                    count: 2
                },
                GroupCount {
                    label: "Male".to_string(),
                    count: 1
                },
            ]
        );
        let by_category = winners_by_category(&data);
        assert_eq!(by_category.unknown, 1);
        assert_eq!(by_category.groups[0].label, "OBC");
        assert_eq!(by_category.groups[0].count, 2);
        assert_eq!(by_category.groups[1].label, "General");
        assert_eq!(by_category.groups.len(), 2);

        assert_eq!(
            winners_by_gender(&ElectionData::default()),
            Breakdown::default()
        );
    }

    #[test]
    fn top_turnout_keeps_feed_order_on_ties() {
        let mut b = Builder::new().municipality("Ranchi", "Municipal Corporation", 12);
        for i in 1..=12 {
            let turnout = match i {
                3 | 7 | 11 => 70.0,
                _ => 50.0 + i as f64,
            };
            b = b.counting(i, "X", "BJP", 10).turnout(turnout);
        }
        let mut data = b.build();
        // Unresolvable wards are not listed.
        data.municipalities[0].wards[0].status = None;

        let top = top_turnout_wards(&data, TOP_TURNOUT_WARDS);
        assert_eq!(top.len(), 10);
        let order: Vec<u32> = top.iter().map(|e| e.ward_no).collect();
        assert_eq!(order, vec![3, 7, 11, 12, 10, 9, 8, 6, 5, 4]);
        assert_eq!(top[0].turnout_pct, 70.0);
        assert_eq!(top[0].ward_name, "Ward 3");

        assert_eq!(top_turnout_wards(&data, 2).len(), 2);
        assert!(top_turnout_wards(&ElectionData::default(), 10).is_empty());
    }

    #[test]
    fn margins() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 5)
            .declared(1, "A", "BJP", 10)
            .margin(0)
            .declared(2, "B", "JMM", 10)
            .margin(100)
            .declared(3, "C", "JMM", 10)
            .margin(40)
            .declared(4, "D", "INC", 10)
            .margin(50)
            .counting(5, "E", "INC", 10)
            .margin(1000)
            .build();
        let spread = margin_spread(&data, 4);
        assert_eq!(spread.wards, 4);
        assert_eq!(spread.min, 0);
        assert_eq!(spread.max, 100);
        assert_eq!(spread.mean, 47.5);
        assert_eq!(spread.median, 45.0);
        let counts: Vec<u32> = spread.bins.iter().map(|b| b.wards).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
        assert_eq!(spread.bins[1].lower, 25.0);
        assert_eq!(spread.bins[3].upper, 100.0);

        let one = Builder::new()
            .municipality("Chas", "Nagar Parishad", 2)
            .declared(1, "A", "BJP", 10)
            .margin(7)
            .declared(2, "B", "BJP", 10)
            .margin(7)
            .build();
        let spread = margin_spread(&one, MARGIN_BINS);
        assert_eq!(spread.bins.len(), 1);
        assert_eq!(spread.bins[0].wards, 2);
        assert_eq!(spread.median, 7.0);

        assert_eq!(
            margin_spread(&ElectionData::default(), MARGIN_BINS),
            MarginSpread::default()
        );
    }
}
