// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The counting state of a ward.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum WardStatus {
    /// Votes are still being counted. The first candidate is only leading.
    Counting,
    /// The result is final.
    Declared,
}

impl WardStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WardStatus::Counting => "Counting",
            WardStatus::Declared => "Declared",
        }
    }
}

impl Display for WardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    /// Party code, for example `JMM` or `IND`.
    pub party: String,
    pub votes: u64,
    /// The vote count at the previous refresh of the feed, if known.
    pub prev_votes: Option<u64>,
    pub pct: Option<f64>,
}

/// One ward as it appears in the feed.
///
/// All the fields beyond the ward number are optional: a live feed fills them
/// progressively. `status` and `candidates` keep the difference between an
/// absent field and an empty one.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Ward {
    pub ward_no: u32,
    pub ward_name: Option<String>,
    pub status: Option<WardStatus>,
    /// Sorted by decreasing number of votes.
    pub candidates: Option<Vec<Candidate>>,
    pub winner: Option<String>,
    pub winner_party: Option<String>,
    pub winner_votes: Option<u64>,
    pub margin: Option<u64>,
    pub vote_pct: Option<f64>,
    pub turnout_pct: Option<f64>,
    pub votes_counted_pct: Option<f64>,
    pub evm_processed_pct: Option<f64>,
    pub category: Option<String>,
    pub gender: Option<String>,
}

/// The municipality-wide mayor contest. It is only displayed, never derived.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MayorRace {
    pub status: Option<String>,
    pub leading: Option<String>,
    pub leading_party: Option<String>,
    pub trailing: Option<String>,
    pub trailing_party: Option<String>,
    pub margin: Option<u64>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct Municipality {
    pub name: String,
    /// The classification of the body (Municipal Corporation, Nagar Panchayat, ...).
    pub kind: String,
    pub total_wards: u32,
    pub wards: Vec<Ward>,
    pub mayor_race: Option<MayorRace>,
}

/// Values published by the source that take precedence over the derived ones.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SummaryOverrides {
    pub total_ulbs: Option<u32>,
    pub total_wards: Option<u32>,
    pub declared: Option<u32>,
    pub turnout: Option<f64>,
    pub last_updated: Option<String>,
}

/// A full snapshot of the feed.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ElectionData {
    pub summary: SummaryOverrides,
    pub last_updated: Option<String>,
    pub municipalities: Vec<Municipality>,
}

// ******** Output data structures *********

/// The canonical view of a ward after applying all the fallback rules.
#[derive(PartialEq, Debug, Clone)]
pub struct EffectiveWardResult {
    pub ward_no: u32,
    pub ward_name: String,
    pub status: WardStatus,
    /// The winner, or the leading candidate while counting. `None` if nothing
    /// in the record designates one.
    pub winner: Option<String>,
    pub winner_party: Option<String>,
    pub winner_votes: u64,
    pub vote_pct: f64,
    pub margin: u64,
    pub turnout_pct: f64,
    pub votes_counted_pct: f64,
    pub evm_processed_pct: f64,
    pub category: Option<String>,
    pub gender: Option<String>,
}

/// Vote movement of a candidate since the previous refresh.
#[derive(PartialEq, Debug, Clone)]
pub struct CandidateChange {
    pub name: String,
    pub party: String,
    pub votes: u64,
    pub pct: Option<f64>,
    pub change: i64,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Completion {
    Complete,
    Counting { declared: u32, total: u32 },
}

impl Display for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Complete => write!(f, "Complete"),
            Completion::Counting { declared, total } => {
                write!(f, "Counting ({}/{})", declared, total)
            }
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct MunicipalityProgress {
    pub name: String,
    pub kind: String,
    pub total_wards: u32,
    pub declared: u32,
    pub counting: u32,
    pub completion: Completion,
    /// Rounded to one decimal place.
    pub percent_complete: f64,
    pub avg_turnout: f64,
    pub mayor_race: Option<MayorRace>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct StateSummary {
    pub total_ulbs: u32,
    pub total_wards: u32,
    pub declared: u32,
    /// Number of ward records actually present in the feed.
    pub reported_wards: u32,
    pub avg_turnout: f64,
    pub last_updated: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartySeats {
    pub party: String,
    pub seats: u32,
}

/// Errors that prevent a single ward from being resolved.
///
/// They never affect the other wards of the snapshot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ResolveError {
    MissingField { ward_no: u32, field: &'static str },
}

impl Error for ResolveError {}

impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::MissingField { ward_no, field } => {
                write!(f, "ward {}: missing field {}", ward_no, field)
            }
        }
    }
}
