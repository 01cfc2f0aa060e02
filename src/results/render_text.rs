// Plain-text views for the terminal: the ward table, the header of a
// municipality and the detail of one ward.

use ward_results::format::{format_pct, format_thousands, or_placeholder, PLACEHOLDER};
use ward_results::table::FlatWardRow;
use ward_results::{changes_of, rollup_municipality, Municipality, WardStatus};

const TABLE_TITLES: [&str; 9] = [
    "Municipality",
    "Ward",
    "Name",
    "Status",
    "Winner/Leading",
    "Party",
    "Votes",
    "Margin",
    "Turnout",
];

const BAR_WIDTH: usize = 20;

fn table_cells(row: &FlatWardRow) -> Vec<String> {
    let mut cells = vec![
        row.municipality.to_string(),
        row.ward_no.to_string(),
        row.ward_name.clone(),
    ];
    match &row.result {
        Ok(r) => cells.extend([
            r.status.to_string(),
            or_placeholder(r.winner.as_deref()).to_string(),
            or_placeholder(r.winner_party.as_deref()).to_string(),
            format_thousands(r.winner_votes),
            format_thousands(r.margin),
            format_pct(r.turnout_pct),
        ]),
        Err(_) => cells.extend((0..6).map(|_| PLACEHOLDER.to_string())),
    }
    cells
}

// Aligns the cells in columns. Numbers are right-aligned.
fn layout(lines: &[Vec<String>]) -> String {
    let mut widths = vec![0; TABLE_TITLES.len()];
    for line in lines.iter() {
        for (idx, cell) in line.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    let mut res = String::new();
    for line in lines.iter() {
        let padded: Vec<String> = line
            .iter()
            .enumerate()
            .map(|(idx, cell)| match idx {
                1 | 6 | 7 | 8 => format!("{:>width$}", cell, width = widths[idx]),
                _ => format!("{:<width$}", cell, width = widths[idx]),
            })
            .collect();
        res.push_str(padded.join("  ").trim_end());
        res.push('\n');
    }
    res
}

pub fn ward_table(rows: &[FlatWardRow]) -> String {
    let mut lines: Vec<Vec<String>> = vec![TABLE_TITLES.iter().map(|s| s.to_string()).collect()];
    lines.extend(rows.iter().map(table_cells));
    let mut res = layout(&lines);
    res.push_str(&format!("{} wards\n", rows.len()));
    res
}

/// Progress and mayor contest of a municipality.
pub fn municipality_header(municipality: &Municipality) -> String {
    let progress = rollup_municipality(municipality);
    let mut res = format!("{} ({})\n", progress.name, progress.kind);
    res.push_str(&format!(
        "Wards: {}  Declared: {}  Counting: {}  Status: {}  Complete: {}  Avg. turnout: {}\n",
        progress.total_wards,
        progress.declared,
        progress.counting,
        progress.completion,
        format_pct(progress.percent_complete),
        format_pct(progress.avg_turnout),
    ));
    if let Some(race) = &progress.mayor_race {
        res.push_str(&format!(
            "Mayor ({}): {} ({}) leads {} ({}) by {}\n",
            or_placeholder(race.status.as_deref()),
            or_placeholder(race.leading.as_deref()),
            or_placeholder(race.leading_party.as_deref()),
            or_placeholder(race.trailing.as_deref()),
            or_placeholder(race.trailing_party.as_deref()),
            race.margin
                .map(format_thousands)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ));
    }
    res.push('\n');
    res
}

fn progress_bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Everything known about one ward, with the vote movement of each candidate.
pub fn ward_detail(row: &FlatWardRow) -> String {
    let mut res = format!(
        "{} ({}) - Ward {}: {}\n",
        row.municipality, row.municipality_kind, row.ward_no, row.ward_name
    );
    let r = match &row.result {
        Ok(r) => r,
        Err(e) => {
            res.push_str(&format!("Result unavailable: {}\n", e));
            return res;
        }
    };
    let role = match r.status {
        WardStatus::Declared => "Winner",
        WardStatus::Counting => "Leading",
    };
    res.push_str(&format!("Status: {}\n", r.status));
    res.push_str(&format!(
        "{}: {} ({})\n",
        role,
        or_placeholder(r.winner.as_deref()),
        or_placeholder(r.winner_party.as_deref())
    ));
    res.push_str(&format!(
        "Votes: {}  Vote share: {}  Margin: {}  Turnout: {}\n",
        format_thousands(r.winner_votes),
        format_pct(r.vote_pct),
        format_thousands(r.margin),
        format_pct(r.turnout_pct)
    ));
    res.push_str(&format!(
        "Counted:       {} {:.0}%\n",
        progress_bar(r.votes_counted_pct),
        r.votes_counted_pct
    ));
    res.push_str(&format!(
        "EVM processed: {} {:.0}%\n",
        progress_bar(r.evm_processed_pct),
        r.evm_processed_pct
    ));
    res.push_str(&format!(
        "Category: {}  Gender: {}\n",
        or_placeholder(r.category.as_deref()),
        or_placeholder(r.gender.as_deref())
    ));

    let changes = changes_of(row.candidates);
    if !changes.is_empty() {
        res.push_str("\nCandidates:\n");
        let name_width = changes.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
        let party_width = changes.iter().map(|c| c.party.chars().count()).max().unwrap_or(0);
        for c in changes.iter() {
            res.push_str(&format!(
                "  {:<nw$}  {:<pw$}  {:>9}  {:>6}  {:+}\n",
                c.name,
                c.party,
                format_thousands(c.votes),
                c.pct.map(format_pct).unwrap_or_else(|| PLACEHOLDER.to_string()),
                c.change,
                nw = name_width,
                pw = party_width,
            ));
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_results::builder::{candidate, Builder};
    use ward_results::table::flatten_wards;
    use ward_results::{Candidate, MayorRace};

    #[test]
    fn table_aligns_columns() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 12)
            .declared(1, "Asha Devi", "JMM", 1250)
            .margin(310)
            .turnout(61.0)
            .counting(12, "Ramesh Oraon", "BJP", 84)
            .build();
        let rows = flatten_wards(&data);
        let table = ward_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Municipality  Ward  Name"));
        assert!(lines[1].contains("Asha Devi"));
        assert!(lines[1].contains("1,250"));
        assert!(lines[1].ends_with("61.0%"));
        assert!(lines[2].contains("Counting"));
        assert_eq!(lines[3], "2 wards");
        // Right-aligned ward numbers.
        assert_eq!(lines[1].find(" 1 "), lines[2].find("12 "));
    }

    #[test]
    fn malformed_rows_use_placeholders() {
        let mut data = Builder::new()
            .municipality("Chas", "Nagar Parishad", 1)
            .declared(1, "X", "IND", 10)
            .build();
        data.municipalities[0].wards[0].status = None;
        let rows = flatten_wards(&data);
        let table = ward_table(&rows);
        assert!(table.lines().nth(1).unwrap().contains("—"));
        assert!(ward_detail(&rows[0]).contains("Result unavailable: ward 1: missing field status"));
    }

    #[test]
    fn header_with_mayor_race() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 2)
            .declared(1, "Asha Devi", "JMM", 1250)
            .mayor_race(MayorRace {
                status: Some("Counting".to_string()),
                leading: Some("R. Singh".to_string()),
                leading_party: Some("BJP".to_string()),
                trailing: Some("M. Toppo".to_string()),
                trailing_party: Some("JMM".to_string()),
                margin: Some(12000),
            })
            .build();
        let header = municipality_header(&data.municipalities[0]);
        assert!(header.starts_with("Ranchi (Municipal Corporation)\n"));
        assert!(header.contains("Status: Counting (1/2)"));
        assert!(header.contains("Complete: 50.0%"));
        assert!(header.contains("Mayor (Counting): R. Singh (BJP) leads M. Toppo (JMM) by 12,000"));
    }

    #[test]
    fn detail_shows_vote_changes() {
        let data = Builder::new()
            .municipality("Ranchi", "Municipal Corporation", 2)
            .ward(
                3,
                WardStatus::Counting,
                vec![
                    Candidate {
                        prev_votes: Some(380),
                        pct: Some(52.5),
                        ..candidate("Ramesh Oraon", "BJP", 410)
                    },
                    Candidate {
                        prev_votes: Some(400),
                        ..candidate("Asha Devi", "JMM", 395)
                    },
                    candidate("Kamal Mahto", "IND", 12),
                ],
            )
            .build();
        let rows = flatten_wards(&data);
        let detail = ward_detail(&rows[0]);
        assert!(detail.contains("Ward 3: Ward 3"));
        assert!(detail.contains("Leading: Ramesh Oraon (BJP)"));
        assert!(detail.contains("Vote share: 52.5%"));
        assert!(detail.contains("+30"));
        assert!(detail.contains("-5"));
        assert!(detail.contains("+0"));
        assert!(detail.contains(&format!("[{}] 0%", "-".repeat(BAR_WIDTH))));
    }

    #[test]
    fn bars() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
    }
}
