// Schema of the JSON snapshot, and its conversion to the typed records of the
// ward_results library.
//
// Only the top level is checked strictly. Below it, every value is read
// leniently: a field of the wrong type counts as absent, and an entity that
// cannot be read is dropped or replaced without affecting its siblings.

use crate::results::*;

use serde::{Deserialize, Deserializer};

use ward_results::{
    Candidate, MayorRace, Municipality, SummaryOverrides, Ward, WardStatus,
};

// **** Lenient scalar readers ****

/// Non-negative integers. Integer-valued floats and numeric strings are
/// accepted. Negative, fractional and out-of-range values are absent.
fn as_u64(js: &JSValue) -> Option<u64> {
    match js {
        JSValue::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float_to_u64)),
        JSValue::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_u64))
        }
        _ => None,
    }
}

fn float_to_u64(x: f64) -> Option<u64> {
    if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x <= u64::MAX as f64 {
        Some(x as u64)
    } else {
        None
    }
}

fn as_u32(js: &JSValue) -> Option<u32> {
    as_u64(js).and_then(|x| u32::try_from(x).ok())
}

fn as_f64(js: &JSValue) -> Option<f64> {
    let x = match js {
        JSValue::Number(n) => n.as_f64(),
        JSValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    x.filter(|v| v.is_finite())
}

fn as_string(js: &JSValue) -> Option<String> {
    match js {
        JSValue::String(s) => Some(s.clone()),
        JSValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(as_u64(&JSValue::deserialize(d)?))
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(as_u32(&JSValue::deserialize(d)?))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(as_f64(&JSValue::deserialize(d)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(as_string(&JSValue::deserialize(d)?))
}

// Any value other than a list counts as absent. Entries that are not
// candidate objects are dropped.
fn lenient_candidates<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<FeedCandidate>>, D::Error> {
    let js = JSValue::deserialize(d)?;
    let entries = match js.as_array() {
        Some(entries) => entries,
        None => return Ok(None),
    };
    let mut res: Vec<FeedCandidate> = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        match entry.as_object().map(|_| FeedCandidate::deserialize(entry)) {
            Some(Ok(c)) => res.push(c),
            _ => warn!("lenient_candidates: dropping candidate #{}: {}", idx, entry),
        }
    }
    Ok(Some(res))
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<JSValue>, D::Error> {
    match JSValue::deserialize(d)? {
        JSValue::Array(entries) => Ok(entries),
        _ => Ok(Vec::new()),
    }
}

// **** Feed schema ****

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct FeedCandidate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub party: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub votes: Option<u64>,
    #[serde(
        rename = "prev_votes",
        alias = "prevVotes",
        default,
        deserialize_with = "lenient_u64"
    )]
    pub prev_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pct: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct FeedWard {
    #[serde(
        rename = "ward_no",
        alias = "wardNo",
        default,
        deserialize_with = "lenient_u32"
    )]
    pub ward_no: Option<u32>,
    #[serde(
        rename = "ward_name",
        alias = "wardName",
        default,
        deserialize_with = "lenient_string"
    )]
    pub ward_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_candidates")]
    pub candidates: Option<Vec<FeedCandidate>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub winner: Option<String>,
    #[serde(
        rename = "winner_party",
        alias = "winnerParty",
        default,
        deserialize_with = "lenient_string"
    )]
    pub winner_party: Option<String>,
    #[serde(
        rename = "winner_votes",
        alias = "winnerVotes",
        default,
        deserialize_with = "lenient_u64"
    )]
    pub winner_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub margin: Option<u64>,
    #[serde(
        rename = "vote_pct",
        alias = "votePct",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub vote_pct: Option<f64>,
    #[serde(
        rename = "turnout",
        alias = "turnoutPct",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub turnout: Option<f64>,
    #[serde(
        rename = "votes_counted_pct",
        alias = "votesCountedPct",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub votes_counted_pct: Option<f64>,
    #[serde(
        rename = "evm_processed",
        alias = "evmProcessedPct",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub evm_processed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Deserialize)]
pub struct FeedMayorRace {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub leading: Option<String>,
    #[serde(
        rename = "leading_party",
        alias = "leadingParty",
        default,
        deserialize_with = "lenient_string"
    )]
    pub leading_party: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trailing: Option<String>,
    #[serde(
        rename = "trailing_party",
        alias = "trailingParty",
        default,
        deserialize_with = "lenient_string"
    )]
    pub trailing_party: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub margin: Option<u64>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct FeedMunicipality {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(
        rename = "total_wards",
        alias = "totalWards",
        default,
        deserialize_with = "lenient_u32"
    )]
    pub total_wards: Option<u32>,
    /// Each ward is read on its own, see `read_ward`.
    #[serde(default, deserialize_with = "lenient_list")]
    pub wards: Vec<JSValue>,
    #[serde(rename = "mayor_race", alias = "mayorRace")]
    pub mayor_race: Option<JSValue>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct FeedSummary {
    #[serde(
        rename = "total_ulbs",
        alias = "totalUlbs",
        default,
        deserialize_with = "lenient_u32"
    )]
    pub total_ulbs: Option<u32>,
    #[serde(
        rename = "total_wards",
        alias = "totalWards",
        default,
        deserialize_with = "lenient_u32"
    )]
    pub total_wards: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub declared: Option<u32>,
    #[serde(
        rename = "turnout",
        alias = "turnoutPct",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub turnout: Option<f64>,
    #[serde(
        rename = "last_updated",
        alias = "lastUpdated",
        default,
        deserialize_with = "lenient_string"
    )]
    pub last_updated: Option<String>,
}

/// The top level of the snapshot. This is the only strict part: the
/// municipalities must be a list when present.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct FeedSnapshot {
    pub summary: Option<JSValue>,
    #[serde(
        rename = "last_updated",
        alias = "lastUpdated",
        default,
        deserialize_with = "lenient_string"
    )]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub municipalities: Vec<JSValue>,
}

/// Parses the text of a snapshot.
///
/// Returns the JSON document as it was received (for the raw feed) along with
/// the typed records. The snapshot is rejected only when its top level is not
/// recognizable. Problems inside a municipality or a ward stay there.
pub fn parse_snapshot(contents: &str, origin: &str) -> ResultsResult<(JSValue, ElectionData)> {
    let raw: JSValue = match serde_json::from_str(contents) {
        Ok(js) => js,
        Err(e) => {
            return MalformedSnapshotSnafu {
                origin,
                message: e.to_string(),
            }
            .fail()
        }
    };
    if !raw.is_object() {
        return MalformedSnapshotSnafu {
            origin,
            message: "the snapshot is not a JSON object",
        }
        .fail();
    }
    let feed = match FeedSnapshot::deserialize(&raw) {
        Ok(feed) => feed,
        Err(e) => {
            return MalformedSnapshotSnafu {
                origin,
                message: e.to_string(),
            }
            .fail()
        }
    };
    debug!("parse_snapshot: {} municipalities", feed.municipalities.len());
    Ok((raw, read_snapshot(feed)))
}

fn read_snapshot(feed: FeedSnapshot) -> ElectionData {
    let summary = match &feed.summary {
        None | Some(JSValue::Null) => SummaryOverrides::default(),
        Some(js) => match FeedSummary::deserialize(js) {
            Ok(s) => s.into(),
            Err(e) => {
                warn!("read_snapshot: ignoring the summary overrides: {}", e);
                SummaryOverrides::default()
            }
        },
    };
    let municipalities = feed
        .municipalities
        .iter()
        .enumerate()
        .filter_map(|(idx, js)| read_municipality(idx, js))
        .collect();
    ElectionData {
        summary,
        last_updated: feed.last_updated,
        municipalities,
    }
}

// A municipality without a name cannot be displayed and is dropped.
fn read_municipality(idx: usize, js: &JSValue) -> Option<Municipality> {
    let feed = match js.as_object().map(|_| FeedMunicipality::deserialize(js)) {
        Some(Ok(m)) => m,
        _ => {
            warn!("read_municipality: dropping municipality #{}: not an object", idx);
            return None;
        }
    };
    let name = match feed.name {
        Some(name) if !name.is_empty() => name,
        _ => {
            warn!("read_municipality: dropping municipality #{}: no name", idx);
            return None;
        }
    };
    let wards: Vec<Ward> = feed
        .wards
        .iter()
        .enumerate()
        .map(|(pos, w)| read_ward(&name, pos, w))
        .collect();
    let total_wards = match feed.total_wards {
        Some(t) => t,
        None => {
            warn!(
                "read_municipality: {}: no usable total_wards, using the {} listed wards",
                name,
                wards.len()
            );
            wards.len() as u32
        }
    };
    let mayor_race = feed
        .mayor_race
        .as_ref()
        .filter(|js| js.is_object())
        .and_then(|js| FeedMayorRace::deserialize(js).ok())
        .map(MayorRace::from);
    Some(Municipality {
        name,
        kind: feed.kind.unwrap_or_default(),
        total_wards,
        wards,
        mayor_race,
    })
}

/// Reads one ward. A ward that cannot be read at all (not an object, or no
/// usable ward number) becomes a record without status, numbered by its
/// position in the list. It resolves to a `MissingField` error like any
/// other incomplete ward.
fn read_ward(municipality: &str, pos: usize, js: &JSValue) -> Ward {
    let placeholder = || Ward {
        ward_no: pos as u32 + 1,
        ..Ward::default()
    };
    let feed = match js.as_object().map(|_| FeedWard::deserialize(js)) {
        Some(Ok(w)) => w,
        _ => {
            warn!(
                "read_ward: {}: ward at position {} is not an object: {}",
                municipality, pos, js
            );
            return placeholder();
        }
    };
    let ward_no = match feed.ward_no {
        Some(n) => n,
        None => {
            warn!(
                "read_ward: {}: ward at position {} has no usable ward number",
                municipality, pos
            );
            return placeholder();
        }
    };
    Ward {
        ward_no,
        ward_name: feed.ward_name,
        status: feed.status.as_deref().map(|s| read_status(ward_no, s)),
        candidates: feed
            .candidates
            .map(|cs| cs.into_iter().map(Candidate::from).collect()),
        winner: feed.winner,
        winner_party: feed.winner_party,
        winner_votes: feed.winner_votes,
        margin: feed.margin,
        vote_pct: feed.vote_pct,
        turnout_pct: feed.turnout,
        votes_counted_pct: feed.votes_counted_pct,
        evm_processed_pct: feed.evm_processed,
        category: feed.category,
        gender: feed.gender,
    }
}

fn read_status(ward_no: u32, label: &str) -> WardStatus {
    if label.eq_ignore_ascii_case("declared") {
        WardStatus::Declared
    } else {
        if !label.eq_ignore_ascii_case("counting") {
            warn!(
                "read_status: ward {}: unknown status {:?}, treated as counting",
                ward_no, label
            );
        }
        WardStatus::Counting
    }
}

impl From<FeedCandidate> for Candidate {
    fn from(c: FeedCandidate) -> Candidate {
        Candidate {
            name: c.name.unwrap_or_default(),
            party: c.party.unwrap_or_default(),
            votes: c.votes.unwrap_or(0),
            prev_votes: c.prev_votes,
            pct: c.pct,
        }
    }
}

impl From<FeedMayorRace> for MayorRace {
    fn from(m: FeedMayorRace) -> MayorRace {
        MayorRace {
            status: m.status,
            leading: m.leading,
            leading_party: m.leading_party,
            trailing: m.trailing,
            trailing_party: m.trailing_party,
            margin: m.margin,
        }
    }
}

impl From<FeedSummary> for SummaryOverrides {
    fn from(s: FeedSummary) -> SummaryOverrides {
        SummaryOverrides {
            total_ulbs: s.total_ulbs,
            total_wards: s.total_wards,
            declared: s.declared,
            turnout: s.turnout,
            last_updated: s.last_updated,
        }
    }
}
