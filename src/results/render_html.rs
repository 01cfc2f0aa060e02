// The static HTML page: summary, party seats, municipality progress, the
// wards of each municipality and the analytics.

use ward_results::analytics::{
    margin_spread, municipality_party_seats, top_turnout_wards, winners_by_category,
    winners_by_gender, Breakdown, MARGIN_BINS, TOP_TURNOUT_WARDS,
};
use ward_results::format::{
    format_pct, format_thousands, or_placeholder, party_color, PLACEHOLDER,
};
use ward_results::table::{flatten_wards, sort_by_ward_no, FlatWardRow};
use ward_results::{
    party_tally, rollup_municipality, summarize, Completion, ElectionData, WardStatus,
};

use crate::results::render_json::API_DATA_PATH;

const TITLE: &str = "Municipal Election Results – Live";

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background: #0E1117;
           color: #e0e0e0; display: flex; flex-direction: column; align-items: center; padding: 1.5rem; }
    .header { background: linear-gradient(135deg, #FF9933, #138808, #000080); padding: 1.8rem 2rem;
              border-radius: 16px; text-align: center; width: 100%; max-width: 1000px; margin-bottom: 1.5rem; }
    .header h1 { color: white; font-size: 1.7rem; }
    .card { background: #1E1E1E; border: 1px solid #333; border-radius: 12px; padding: 1.3rem 1.5rem;
            margin-bottom: 1rem; width: 100%; max-width: 1000px; }
    .card h2 { color: #FF9933; margin-bottom: 0.8rem; font-size: 1.15rem; }
    .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 1rem; }
    .stat { text-align: center; padding: 0.8rem; background: #161622; border-radius: 10px; }
    .stat .val { font-size: 2rem; font-weight: 800; color: #FF9933; }
    .stat .lbl { font-size: 0.82rem; opacity: 0.7; }
    .party-chip { display: inline-block; padding: 0.35rem 0.9rem; margin: 0.2rem; border-radius: 20px;
                  color: white; font-weight: 700; }
    table { width: 100%; border-collapse: collapse; }
    th, td { padding: 0.5rem; border-bottom: 1px solid #333; text-align: left; }
    .badge { padding: 0.15rem 0.6rem; border-radius: 10px; font-size: 0.8rem; font-weight: 600; }
    .badge-declared { background: #2E7D32; color: white; }
    .badge-counting { background: #F9A825; color: black; }
    .badge-invalid { background: #555; color: white; }
    .groups li { list-style: none; padding: 0.2rem 0; }
    .hist { display: flex; align-items: flex-end; gap: 2px; height: 120px; margin-top: 0.8rem; }
    .hist .bar { flex: 1; background: #FF9933; min-height: 1px; }
    .footer { margin-top: 1rem; font-size: 0.8rem; opacity: 0.7; text-align: center; }
    .footer a { color: #FF9933; }
"#;

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }
    res
}

fn stat(value: &str, label: &str) -> String {
    format!(
        r#"<div class="stat"><div class="val">{}</div><div class="lbl">{}</div></div>"#,
        escape(value),
        label
    )
}

fn status_badge(status: WardStatus) -> String {
    let cls = match status {
        WardStatus::Declared => "badge-declared",
        WardStatus::Counting => "badge-counting",
    };
    format!(r#"<span class="badge {}">{}</span>"#, cls, status)
}

fn ward_row(row: &FlatWardRow) -> String {
    match &row.result {
        Ok(r) => {
            let party = or_placeholder(r.winner_party.as_deref());
            format!(
                r#"<tr><td>{}</td><td>{}</td><td><strong>{}</strong></td><td style="color:{};font-weight:700">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(&r.ward_name),
                status_badge(r.status),
                escape(or_placeholder(r.winner.as_deref())),
                party_color(party),
                escape(party),
                format_thousands(r.winner_votes),
                format_thousands(r.margin),
                format_pct(r.turnout_pct),
            )
        }
        Err(e) => format!(
            r#"<tr title="{}"><td>{}</td><td><span class="badge badge-invalid">{}</span></td><td>{p}</td><td>{p}</td><td>{p}</td><td>{p}</td><td>{p}</td></tr>"#,
            escape(&e.to_string()),
            escape(&row.ward_name),
            PLACEHOLDER,
            p = PLACEHOLDER,
        ),
    }
}

fn summary_card(data: &ElectionData) -> String {
    let summary = summarize(data);
    format!(
        r#"<div class="card"><h2>Overall Summary</h2><div class="stats">{}{}{}{}</div></div>"#,
        stat(&summary.total_ulbs.to_string(), "Total ULBs"),
        stat(&summary.total_wards.to_string(), "Total Wards"),
        stat(&summary.declared.to_string(), "Results Declared"),
        stat(&format_pct(summary.avg_turnout), "Avg. Turnout"),
    )
}

fn party_card(data: &ElectionData) -> String {
    let chips: String = party_tally(data)
        .iter()
        .map(|ps| {
            format!(
                r#"<span class="party-chip" style="background:{}">{}: {}</span>"#,
                party_color(&ps.party),
                escape(&ps.party),
                ps.seats
            )
        })
        .collect();
    format!(
        r#"<div class="card"><h2>Party-wise Seats Won</h2><div class="party-bar">{}</div></div>"#,
        chips
    )
}

fn progress_card(data: &ElectionData) -> String {
    let rows: String = data
        .municipalities
        .iter()
        .map(|m| {
            let progress = rollup_municipality(m);
            let cls = match progress.completion {
                Completion::Complete => "badge-declared",
                Completion::Counting { .. } => "badge-counting",
            };
            format!(
                r#"<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td><span class="badge {}">{}</span></td><td>{}</td></tr>"#,
                escape(&progress.name),
                escape(&progress.kind),
                progress.total_wards,
                progress.declared,
                cls,
                progress.completion,
                format_pct(progress.percent_complete),
            )
        })
        .collect();
    format!(
        r#"<div class="card"><h2>Municipality Progress</h2><table><thead><tr><th>Municipality</th><th>Type</th><th>Total Wards</th><th>Declared</th><th>Status</th><th>Complete</th></tr></thead><tbody>{}</tbody></table></div>"#,
        rows
    )
}

fn ward_sections(data: &ElectionData) -> String {
    // Rows come out of flatten_wards grouped by municipality, in feed order.
    let mut rows = flatten_wards(data).into_iter();
    let mut res = String::new();
    for m in data.municipalities.iter() {
        let wards = sort_by_ward_no(rows.by_ref().take(m.wards.len()).collect());
        if wards.is_empty() {
            continue;
        }
        res.push_str(&format!(r#"<div class="card"><h2>{}</h2>"#, escape(&m.name)));
        res.push_str("<table><thead><tr><th>Ward</th><th>Status</th><th>Winner / Leading</th><th>Party</th><th>Votes</th><th>Margin</th><th>Turnout</th></tr></thead><tbody>");
        for row in wards.iter() {
            res.push_str(&ward_row(row));
        }
        res.push_str("</tbody></table></div>");
    }
    res
}

fn breakdown_list(title: &str, b: &Breakdown) -> String {
    let mut items: String = b
        .groups
        .iter()
        .map(|g| format!("<li>{}: <strong>{}</strong></li>", escape(&g.label), g.count))
        .collect();
    if b.unknown > 0 {
        items.push_str(&format!(
            "<li>{}: <strong>{}</strong></li>",
            PLACEHOLDER, b.unknown
        ));
    }
    format!(
        r#"<div><h3>{}</h3><ul class="groups">{}</ul></div>"#,
        title, items
    )
}

fn analytics_cards(data: &ElectionData) -> String {
    let mut res = String::new();

    let seat_rows: String = municipality_party_seats(data)
        .iter()
        .map(|ms| {
            let chips: Vec<String> = ms
                .parties
                .iter()
                .map(|ps| {
                    format!(
                        r#"<span style="color:{};font-weight:700">{}</span>: {}"#,
                        party_color(&ps.party),
                        escape(&ps.party),
                        ps.seats
                    )
                })
                .collect();
            format!(
                "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
                escape(&ms.municipality),
                chips.join(", ")
            )
        })
        .collect();
    res.push_str(&format!(
        r#"<div class="card"><h2>Seats by Municipality</h2><table><thead><tr><th>Municipality</th><th>Seats</th></tr></thead><tbody>{}</tbody></table></div>"#,
        seat_rows
    ));

    res.push_str(&format!(
        r#"<div class="card"><h2>Winners</h2><div class="stats">{}{}</div></div>"#,
        breakdown_list("By Gender", &winners_by_gender(data)),
        breakdown_list("By Category", &winners_by_category(data)),
    ));

    let turnout_rows: String = top_turnout_wards(data, TOP_TURNOUT_WARDS)
        .iter()
        .map(|e| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&e.municipality),
                escape(&e.ward_name),
                escape(or_placeholder(e.winner.as_deref())),
                escape(or_placeholder(e.winner_party.as_deref())),
                format_pct(e.turnout_pct),
            )
        })
        .collect();
    res.push_str(&format!(
        r#"<div class="card"><h2>Highest Turnout</h2><table><thead><tr><th>Municipality</th><th>Ward</th><th>Winner / Leading</th><th>Party</th><th>Turnout</th></tr></thead><tbody>{}</tbody></table></div>"#,
        turnout_rows
    ));

    let spread = margin_spread(data, MARGIN_BINS);
    let tallest = spread.bins.iter().map(|b| b.wards).max().unwrap_or(0).max(1);
    let bars: String = spread
        .bins
        .iter()
        .map(|b| {
            format!(
                r#"<div class="bar" title="{}–{}: {}" style="height:{:.0}%"></div>"#,
                format_thousands(b.lower.round() as u64),
                format_thousands(b.upper.round() as u64),
                b.wards,
                100.0 * b.wards as f64 / tallest as f64,
            )
        })
        .collect();
    res.push_str(&format!(
        r#"<div class="card"><h2>Victory Margins</h2><div class="stats">{}{}{}{}</div><div class="hist">{}</div></div>"#,
        stat(&format_thousands(spread.min), "Smallest"),
        stat(&format_thousands(spread.median.round() as u64), "Median"),
        stat(&format_thousands(spread.mean.round() as u64), "Mean"),
        stat(&format_thousands(spread.max), "Largest"),
        bars
    ));
    res
}

/// The full page for the snapshot.
pub fn render_page(data: &ElectionData) -> String {
    let last_updated = summarize(data)
        .last_updated
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="header"><h1>{title}</h1></div>
{summary}
{parties}
{progress}
{wards}
{analytics}
<div class="footer">Last updated: {last_updated} | <a href="{api}">JSON API</a></div>
</body>
</html>"#,
        title = TITLE,
        style = STYLE,
        summary = summary_card(data),
        parties = party_card(data),
        progress = progress_card(data),
        wards = ward_sections(data),
        analytics = analytics_cards(data),
        last_updated = escape(&last_updated),
        api = API_DATA_PATH,
    )
}
