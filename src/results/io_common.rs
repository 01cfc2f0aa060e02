// The scalar columns shared by the CSV and spreadsheet exports.

use serde::Serialize;

use ward_results::format::{or_placeholder, PLACEHOLDER};
use ward_results::table::FlatWardRow;

pub const EXPORT_TITLES: [&str; 15] = [
    "Municipality",
    "Type",
    "Ward No.",
    "Ward Name",
    "Status",
    "Winner/Leading",
    "Party",
    "Votes",
    "Vote %",
    "Margin",
    "Turnout %",
    "EVM %",
    "Counted %",
    "Category",
    "Gender",
];

/// One exported line. The numbers are absent for the wards that could not be
/// resolved.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Municipality")]
    pub municipality: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Ward No.")]
    pub ward_no: u32,
    #[serde(rename = "Ward Name")]
    pub ward_name: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Winner/Leading")]
    pub winner: String,
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "Votes")]
    pub votes: Option<u64>,
    #[serde(rename = "Vote %")]
    pub vote_pct: Option<f64>,
    #[serde(rename = "Margin")]
    pub margin: Option<u64>,
    #[serde(rename = "Turnout %")]
    pub turnout_pct: Option<f64>,
    #[serde(rename = "EVM %")]
    pub evm_processed_pct: Option<f64>,
    #[serde(rename = "Counted %")]
    pub votes_counted_pct: Option<f64>,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Gender")]
    pub gender: String,
}

impl From<&FlatWardRow<'_>> for ExportRow {
    fn from(row: &FlatWardRow<'_>) -> ExportRow {
        let mut res = ExportRow {
            municipality: row.municipality.to_string(),
            kind: row.municipality_kind.to_string(),
            ward_no: row.ward_no,
            ward_name: row.ward_name.clone(),
            status: PLACEHOLDER.to_string(),
            winner: PLACEHOLDER.to_string(),
            party: PLACEHOLDER.to_string(),
            votes: None,
            vote_pct: None,
            margin: None,
            turnout_pct: None,
            evm_processed_pct: None,
            votes_counted_pct: None,
            category: PLACEHOLDER.to_string(),
            gender: PLACEHOLDER.to_string(),
        };
        if let Ok(r) = &row.result {
            res.status = r.status.to_string();
            res.winner = or_placeholder(r.winner.as_deref()).to_string();
            res.party = or_placeholder(r.winner_party.as_deref()).to_string();
            res.votes = Some(r.winner_votes);
            res.vote_pct = Some(r.vote_pct);
            res.margin = Some(r.margin);
            res.turnout_pct = Some(r.turnout_pct);
            res.evm_processed_pct = Some(r.evm_processed_pct);
            res.votes_counted_pct = Some(r.votes_counted_pct);
            res.category = or_placeholder(r.category.as_deref()).to_string();
            res.gender = or_placeholder(r.gender.as_deref()).to_string();
        }
        res
    }
}

/// A spreadsheet cell of an exported line.
#[derive(PartialEq, Debug, Clone)]
pub enum ExportCell {
    Text(String),
    Number(f64),
    Blank,
}

fn number<T: Into<f64>>(x: Option<T>) -> ExportCell {
    match x {
        Some(v) => ExportCell::Number(v.into()),
        None => ExportCell::Blank,
    }
}

impl ExportRow {
    /// The cells in the order of `EXPORT_TITLES`.
    pub fn cells(&self) -> Vec<ExportCell> {
        vec![
            ExportCell::Text(self.municipality.clone()),
            ExportCell::Text(self.kind.clone()),
            ExportCell::Number(self.ward_no.into()),
            ExportCell::Text(self.ward_name.clone()),
            ExportCell::Text(self.status.clone()),
            ExportCell::Text(self.winner.clone()),
            ExportCell::Text(self.party.clone()),
            number(self.votes.map(|v| v as f64)),
            number(self.vote_pct),
            number(self.margin.map(|v| v as f64)),
            number(self.turnout_pct),
            number(self.evm_processed_pct),
            number(self.votes_counted_pct),
            ExportCell::Text(self.category.clone()),
            ExportCell::Text(self.gender.clone()),
        ]
    }
}

pub fn export_rows(rows: &[FlatWardRow]) -> Vec<ExportRow> {
    rows.iter().map(ExportRow::from).collect()
}
