use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use ward_results::table::{filter_municipality, filter_rows, flatten_wards, sort_by_ward_no};
use ward_results::table::FlatWardRow;
use ward_results::ElectionData;

use crate::args::Args;
use crate::results::loader::{DataSource, LoadedSnapshot, SnapshotCache, DEFAULT_CACHE_TTL};

mod io_common;
mod io_csv;
mod io_xlsx;
pub mod loader;
mod render_html;
pub mod render_json;
mod render_text;
pub mod snapshot_reader;

#[derive(Debug, Snafu)]
pub enum ResultsError {
    #[snafu(display("Data source unavailable: {reason}"))]
    SourceUnavailable {
        reason: String,
        searched: Vec<String>,
    },
    #[snafu(display("Malformed snapshot from {origin}: {message}"))]
    MalformedSnapshot { origin: String, message: String },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the output"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing the output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the CSV output"))]
    WritingCsv { source: csv::Error },
    #[snafu(display("Error writing the spreadsheet {path}"))]
    WritingXlsx {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },

    #[snafu(display("The {output_type} output must be written to a file (use --out)"))]
    MissingOutputPath { output_type: String },
    #[snafu(display("Unknown output type {name}"))]
    UnknownOutputType { name: String },
    #[snafu(display("Municipality {name} not found"))]
    UnknownMunicipality { name: String },
    #[snafu(display("Ward {ward_no} not found in {municipality}"))]
    UnknownWard { municipality: String, ward_no: u32 },
    #[snafu(display("The ward view requires --municipality and --ward"))]
    MissingWardSelection {},

    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

impl ResultsError {
    /// The locations that were probed, when the snapshot could not be found.
    pub fn searched(&self) -> Option<&[String]> {
        match self {
            ResultsError::SourceUnavailable { searched, .. } if !searched.is_empty() => {
                Some(searched.as_slice())
            }
            _ => None,
        }
    }
}

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputType {
    Summary,
    Html,
    Json,
    Table,
    Ward,
    Csv,
    Xlsx,
    Http,
}

impl OutputType {
    pub fn parse(name: Option<&str>) -> ResultsResult<OutputType> {
        match name.unwrap_or("summary") {
            "summary" => Ok(OutputType::Summary),
            "html" => Ok(OutputType::Html),
            "json" => Ok(OutputType::Json),
            "table" => Ok(OutputType::Table),
            "ward" => Ok(OutputType::Ward),
            "csv" => Ok(OutputType::Csv),
            "xlsx" => Ok(OutputType::Xlsx),
            "http" => Ok(OutputType::Http),
            x => UnknownOutputTypeSnafu { name: x }.fail(),
        }
    }
}

/// Runs one rendering pass, or keeps polling the source when --watch is set.
pub fn run_dashboard(args: &Args) -> ResultsResult<()> {
    let output_type = OutputType::parse(args.output_type.as_deref())?;
    let source = DataSource::from_settings(args.url.clone(), args.data.clone());
    info!("run_dashboard: source: {:?}", source);
    let ttl = args
        .cache_ttl
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CACHE_TTL);
    let mut cache = SnapshotCache::new(ttl);

    let interval = match args.watch {
        None => return render_pass(args, output_type, &source, &mut cache),
        Some(secs) => Duration::from_secs(secs.max(1)),
    };
    loop {
        // A failed pass does not stop the polling loop.
        if let Err(e) = render_pass(args, output_type, &source, &mut cache) {
            warn!("run_dashboard: pass failed: {:?}", e);
            eprintln!("An error occured {}", e);
        }
        thread::sleep(interval);
    }
}

fn render_pass(
    args: &Args,
    output_type: OutputType,
    source: &DataSource,
    cache: &mut SnapshotCache,
) -> ResultsResult<()> {
    let snapshot = match cache.get_or_load(source) {
        Ok(snapshot) => snapshot,
        // Load failures are part of the HTTP answer, not an error of the pass.
        Err(e) if output_type == OutputType::Http => return write_http(args, &Err(e)),
        Err(e) => return Err(e),
    };
    let data = &snapshot.data;

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &render_json::summary_json(data))?;
    }

    match output_type {
        OutputType::Summary => {
            let js = render_json::summary_json(data);
            let pretty = serde_json::to_string_pretty(&js).context(SerializingJsonSnafu {})?;
            write_output(&args.out, &pretty)
        }
        OutputType::Html => write_output(&args.out, &render_html::render_page(data)),
        OutputType::Json => write_output(&args.out, &render_json::raw_json(&snapshot.raw)?),
        OutputType::Table => {
            let rows = selected_rows(data, args)?;
            let mut content = String::new();
            if let Some(name) = &args.municipality {
                content.push_str(&render_text::municipality_header(find_municipality(data, name)?));
            }
            content.push_str(&render_text::ward_table(&rows));
            write_output(&args.out, &content)
        }
        OutputType::Ward => {
            let (name, ward_no) = match (&args.municipality, args.ward) {
                (Some(name), Some(ward_no)) => (name, ward_no),
                _ => return MissingWardSelectionSnafu {}.fail(),
            };
            let rows = filter_municipality(flatten_wards(data), find_municipality(data, name)?.name.as_str());
            let row = rows
                .iter()
                .find(|r| r.ward_no == ward_no)
                .context(UnknownWardSnafu {
                    municipality: name.clone(),
                    ward_no,
                })?;
            write_output(&args.out, &render_text::ward_detail(row))
        }
        OutputType::Csv => {
            let rows = selected_rows(data, args)?;
            match out_path(&args.out) {
                Some(path) => {
                    let f = File::create(path).context(WritingOutputSnafu { path })?;
                    io_csv::write_csv(&rows, f)
                }
                None => io_csv::write_csv(&rows, std::io::stdout().lock()),
            }
        }
        OutputType::Xlsx => {
            let rows = selected_rows(data, args)?;
            let path = out_path(&args.out).context(MissingOutputPathSnafu {
                output_type: "xlsx",
            })?;
            io_xlsx::write_xlsx(&rows, path)
        }
        OutputType::Http => write_http(args, &Ok(snapshot.clone())),
    }
}

fn write_http(args: &Args, loaded: &ResultsResult<Arc<LoadedSnapshot>>) -> ResultsResult<()> {
    let path = args.path.as_deref().unwrap_or("/");
    let response = render_json::api_response(path, loaded);
    write_output(&args.out, &response.to_http_string())
}

fn find_municipality<'a>(
    data: &'a ElectionData,
    name: &str,
) -> ResultsResult<&'a ward_results::Municipality> {
    data.municipalities
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
        .context(UnknownMunicipalitySnafu { name })
}

// The wards selected by the --municipality and --search options, by ward number.
fn selected_rows<'a>(data: &'a ElectionData, args: &Args) -> ResultsResult<Vec<FlatWardRow<'a>>> {
    let mut rows = flatten_wards(data);
    if let Some(name) = &args.municipality {
        let m = find_municipality(data, name)?;
        rows = sort_by_ward_no(filter_municipality(rows, m.name.as_str()));
    }
    let rows = filter_rows(rows, args.search.as_deref().unwrap_or(""));
    debug!("selected_rows: {} rows", rows.len());
    Ok(rows)
}

fn out_path(out: &Option<String>) -> Option<&str> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => None,
        Some(p) => Some(p),
    }
}

fn write_output(out: &Option<String>, content: &str) -> ResultsResult<()> {
    match out_path(out) {
        Some(path) => {
            info!("Writing output to {}", path);
            fs::write(path, content).context(WritingOutputSnafu { path })
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content).context(WritingOutputSnafu { path: "stdout" })
        }
    }
}

/// Compares the computed summary with a reference file, printing the differences.
fn check_reference(path: &str, summary_js: &JSValue) -> ResultsResult<()> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let reference: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    info!("check_reference: reference: {:?}", reference);

    let pretty_reference =
        serde_json::to_string_pretty(&reference).context(SerializingJsonSnafu {})?;
    let pretty_summary = serde_json::to_string_pretty(summary_js).context(SerializingJsonSnafu {})?;
    if pretty_reference != pretty_summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_reference.as_str(), pretty_summary.as_str(), "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}
