// JSON views of the results, and the responses of the HTTP endpoints.

use std::sync::Arc;

use serde_json::json;

use ward_results::analytics::{
    margin_spread, municipality_party_seats, top_turnout_wards, winners_by_category,
    winners_by_gender, Breakdown, MARGIN_BINS, TOP_TURNOUT_WARDS,
};
use ward_results::format::party_color;
use ward_results::{leading_party, party_tally, rollup_municipality, summarize};

use crate::results::loader::LoadedSnapshot;
use crate::results::render_html;
use crate::results::*;

pub const API_DATA_PATH: &str = "/api/data";

/// The derived figures of the snapshot: state summary, party tally, the
/// progress of each municipality and the analytics.
pub fn summary_json(data: &ElectionData) -> JSValue {
    let summary = summarize(data);
    let tally = party_tally(data);

    let parties: Vec<JSValue> = tally
        .iter()
        .map(|ps| {
            json!({
                "party": ps.party,
                "seats": ps.seats,
                "color": party_color(&ps.party),
            })
        })
        .collect();

    let municipalities: Vec<JSValue> = data
        .municipalities
        .iter()
        .map(|m| {
            let progress = rollup_municipality(m);
            json!({
                "name": progress.name,
                "type": progress.kind,
                "total_wards": progress.total_wards,
                "declared": progress.declared,
                "counting": progress.counting,
                "status": progress.completion.to_string(),
                "percent_complete": progress.percent_complete,
                "avg_turnout": progress.avg_turnout,
            })
        })
        .collect();

    json!({
        "summary": {
            "total_ulbs": summary.total_ulbs,
            "total_wards": summary.total_wards,
            "declared": summary.declared,
            "reported_wards": summary.reported_wards,
            "avg_turnout": summary.avg_turnout,
            "last_updated": summary.last_updated,
        },
        "leading_party": leading_party(&tally).map(|ps| ps.party.clone()),
        "parties": parties,
        "municipalities": municipalities,
        "analytics": analytics_json(data),
    })
}

fn breakdown_json(b: &Breakdown) -> JSValue {
    let groups: Vec<JSValue> = b
        .groups
        .iter()
        .map(|g| json!({ "label": g.label, "count": g.count }))
        .collect();
    json!({ "groups": groups, "unknown": b.unknown })
}

fn analytics_json(data: &ElectionData) -> JSValue {
    let seats: Vec<JSValue> = municipality_party_seats(data)
        .iter()
        .map(|ms| {
            let parties: Vec<JSValue> = ms
                .parties
                .iter()
                .map(|ps| json!({ "party": ps.party, "seats": ps.seats }))
                .collect();
            json!({ "municipality": ms.municipality, "parties": parties })
        })
        .collect();

    let top_turnout: Vec<JSValue> = top_turnout_wards(data, TOP_TURNOUT_WARDS)
        .iter()
        .map(|e| {
            json!({
                "municipality": e.municipality,
                "ward_no": e.ward_no,
                "ward_name": e.ward_name,
                "winner": e.winner,
                "winner_party": e.winner_party,
                "turnout": e.turnout_pct,
            })
        })
        .collect();

    let spread = margin_spread(data, MARGIN_BINS);
    let bins: Vec<JSValue> = spread
        .bins
        .iter()
        .map(|b| json!({ "lower": b.lower, "upper": b.upper, "wards": b.wards }))
        .collect();

    json!({
        "municipality_seats": seats,
        "winners_by_gender": breakdown_json(&winners_by_gender(data)),
        "winners_by_category": breakdown_json(&winners_by_category(data)),
        "top_turnout_wards": top_turnout,
        "margins": {
            "wards": spread.wards,
            "min": spread.min,
            "max": spread.max,
            "mean": spread.mean,
            "median": spread.median,
            "bins": bins,
        },
    })
}

/// The snapshot exactly as it was received, without escaping non-ASCII text.
pub fn raw_json(raw: &JSValue) -> ResultsResult<String> {
    serde_json::to_string(raw).context(SerializingJsonSnafu {})
}

/// A complete answer to a GET request.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    fn new(status: u16, content_type: &str, body: String) -> ApiResponse {
        ApiResponse {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The response as written on the wire by an HTTP/1.1 server.
    pub fn to_http_string(&self) -> String {
        let reason = match self.status {
            200 => "OK",
            _ => "Internal Server Error",
        };
        let mut res = format!("HTTP/1.1 {} {}\r\n", self.status, reason);
        for (k, v) in self.headers.iter() {
            res.push_str(&format!("{}: {}\r\n", k, v));
        }
        res.push_str(&format!("Content-Length: {}\r\n\r\n", self.body.len()));
        res.push_str(&self.body);
        res
    }
}

fn error_response(e: &ResultsError) -> ApiResponse {
    let message = match e {
        ResultsError::SourceUnavailable { reason, .. } => reason.clone(),
        _ => e.to_string(),
    };
    let body = match e.searched() {
        Some(searched) => json!({ "error": message, "searched": searched }),
        None => json!({ "error": message }),
    };
    ApiResponse::new(500, "application/json", body.to_string())
}

/// Answers a GET request for the given path.
///
/// `/api/data` serves the raw snapshot to any origin. Every other path serves
/// the HTML page. A snapshot that failed to load is a 500 error for all paths.
pub fn api_response(path: &str, loaded: &ResultsResult<Arc<LoadedSnapshot>>) -> ApiResponse {
    let snapshot = match loaded {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("api_response: {}: {}", path, e);
            return error_response(e);
        }
    };
    let route = path.split('?').next().unwrap_or("");
    debug!("api_response: route {:?}", route);
    if route == API_DATA_PATH || route == "/api/data/" {
        match raw_json(&snapshot.raw) {
            Ok(body) => {
                let mut response = ApiResponse::new(200, "application/json", body);
                response
                    .headers
                    .push(("Access-Control-Allow-Origin".to_string(), "*".to_string()));
                response
            }
            Err(e) => error_response(&e),
        }
    } else {
        ApiResponse::new(
            200,
            "text/html; charset=utf-8",
            render_html::render_page(&snapshot.data),
        )
    }
}
