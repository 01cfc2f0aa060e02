use log::debug;

use crate::config::*;
use crate::{resolve_ward, ward_display_name};

/// One ward of the snapshot, flattened with its municipality.
///
/// The candidate list is borrowed from the snapshot for the detail views. It
/// is not part of the scalar columns written by the exports.
#[derive(PartialEq, Debug, Clone)]
pub struct FlatWardRow<'a> {
    pub municipality: &'a str,
    pub municipality_kind: &'a str,
    pub ward_no: u32,
    pub ward_name: String,
    pub result: Result<EffectiveWardResult, ResolveError>,
    pub candidates: &'a [Candidate],
}

impl<'a> FlatWardRow<'a> {
    pub fn winner(&self) -> Option<&str> {
        self.result.as_ref().ok().and_then(|r| r.winner.as_deref())
    }
}

/// All the wards of the snapshot, in feed order.
pub fn flatten_wards(data: &ElectionData) -> Vec<FlatWardRow<'_>> {
    let mut rows: Vec<FlatWardRow<'_>> = Vec::new();
    for m in data.municipalities.iter() {
        for w in m.wards.iter() {
            let result = resolve_ward(w);
            if let Err(e) = &result {
                debug!("flatten_wards: {}: {}", m.name, e);
            }
            rows.push(FlatWardRow {
                municipality: m.name.as_str(),
                municipality_kind: m.kind.as_str(),
                ward_no: w.ward_no,
                ward_name: ward_display_name(w),
                result,
                candidates: w.candidates.as_deref().unwrap_or(&[]),
            });
        }
    }
    rows
}

/// Keeps the rows whose ward name or winner contains the query, ignoring case.
/// An empty query keeps everything.
pub fn filter_rows<'a>(rows: Vec<FlatWardRow<'a>>, query: &str) -> Vec<FlatWardRow<'a>> {
    if query.is_empty() {
        return rows;
    }
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|r| {
            r.ward_name.to_lowercase().contains(&needle)
                || r
                    .winner()
                    .map(|w| w.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}

pub fn filter_municipality<'a>(rows: Vec<FlatWardRow<'a>>, name: &str) -> Vec<FlatWardRow<'a>> {
    rows.into_iter().filter(|r| r.municipality == name).collect()
}

pub fn sort_by_ward_no(mut rows: Vec<FlatWardRow<'_>>) -> Vec<FlatWardRow<'_>> {
    rows.sort_by_key(|r| r.ward_no);
    rows
}
