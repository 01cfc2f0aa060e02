use log::warn;

pub use crate::config::*;

/// A builder for assembling a snapshot by hand.
///
/// Wards are added to the last municipality declared, and the ward-level
/// setters (`turnout`, `margin`, ...) apply to the last ward added.
///
/// ```
/// use ward_results::builder::Builder;
///
/// let data = Builder::new()
///     .municipality("Ranchi", "Municipal Corporation", 2)
///     .declared(1, "Asha Devi", "JMM", 1_250)
///     .margin(310)
///     .counting(2, "Ramesh Oraon", "BJP", 840)
///     .build();
///
/// let progress = ward_results::rollup_municipality(&data.municipalities[0]);
/// assert_eq!(progress.completion.to_string(), "Counting (1/2)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    data: ElectionData,
}

/// A candidate without previous count or vote share.
pub fn candidate(name: &str, party: &str, votes: u64) -> Candidate {
    Candidate {
        name: name.to_string(),
        party: party.to_string(),
        votes,
        prev_votes: None,
        pct: None,
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn municipality(mut self, name: &str, kind: &str, total_wards: u32) -> Builder {
        self.data.municipalities.push(Municipality {
            name: name.to_string(),
            kind: kind.to_string(),
            total_wards,
            wards: Vec::new(),
            mayor_race: None,
        });
        self
    }

    /// Adds a declared ward whose only candidate is the winner.
    pub fn declared(self, ward_no: u32, name: &str, party: &str, votes: u64) -> Builder {
        self.ward(
            ward_no,
            WardStatus::Declared,
            vec![candidate(name, party, votes)],
        )
    }

    /// Adds a ward still counting, led by the given candidate.
    pub fn counting(self, ward_no: u32, name: &str, party: &str, votes: u64) -> Builder {
        self.ward(
            ward_no,
            WardStatus::Counting,
            vec![candidate(name, party, votes)],
        )
    }

    pub fn ward(mut self, ward_no: u32, status: WardStatus, candidates: Vec<Candidate>) -> Builder {
        match self.data.municipalities.last_mut() {
            Some(m) => m.wards.push(Ward {
                ward_no,
                status: Some(status),
                candidates: Some(candidates),
                ..Ward::default()
            }),
            None => warn!("Builder: ward {} added before any municipality", ward_no),
        }
        self
    }

    pub fn turnout(self, pct: f64) -> Builder {
        self.with_last_ward(|w| w.turnout_pct = Some(pct))
    }

    pub fn margin(self, margin: u64) -> Builder {
        self.with_last_ward(|w| w.margin = Some(margin))
    }

    pub fn mayor_race(mut self, race: MayorRace) -> Builder {
        if let Some(m) = self.data.municipalities.last_mut() {
            m.mayor_race = Some(race);
        }
        self
    }

    pub fn overrides(mut self, overrides: SummaryOverrides) -> Builder {
        self.data.summary = overrides;
        self
    }

    pub fn last_updated(mut self, ts: &str) -> Builder {
        self.data.last_updated = Some(ts.to_string());
        self
    }

    pub fn build(self) -> ElectionData {
        self.data
    }

    fn with_last_ward(mut self, f: impl FnOnce(&mut Ward)) -> Builder {
        match self
            .data
            .municipalities
            .last_mut()
            .and_then(|m| m.wards.last_mut())
        {
            Some(w) => f(w),
            None => warn!("Builder: no ward to update"),
        }
        self
    }
}
