use clap::Parser;

/// This is a results dashboard for municipal (urban local body) elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON snapshot of the results. If not provided, the file
    /// data/sample_data.json is searched in the current directory and next to the executable.
    #[clap(short, long, value_parser)]
    pub data: Option<String>,

    /// (URL, optional) A remote endpoint serving the JSON snapshot. When set, it takes
    /// precedence over the --data option.
    #[clap(long, env = "ELECTION_DATA_URL", value_parser)]
    pub url: Option<String>,

    /// (default summary) The view to produce: summary, html, json, table, ward, csv, xlsx or http.
    #[clap(long, value_parser)]
    pub output_type: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the output is written to the given location.
    /// Required for the xlsx output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (text) Only keeps the wards whose name or winner contains this text (case insensitive).
    #[clap(short, long, value_parser)]
    pub search: Option<String>,

    /// (name) Restricts the table, the exports and the ward view to one municipality.
    #[clap(short, long, value_parser)]
    pub municipality: Option<String>,

    /// (number) The ward to show with the 'ward' output. Requires --municipality.
    #[clap(short, long, value_parser)]
    pub ward: Option<u32>,

    /// (default /) The request path answered by the 'http' output: / or /api/data.
    #[clap(long, value_parser)]
    pub path: Option<String>,

    /// (file path) A reference file containing the summary in JSON format. If provided, ulbres will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (seconds) If specified, reloads the data and renders again at this interval until interrupted.
    #[clap(long, value_parser)]
    pub watch: Option<u64>,

    /// (seconds, default 10) How long a loaded snapshot is reused before fetching it again.
    #[clap(long, value_parser)]
    pub cache_ttl: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
