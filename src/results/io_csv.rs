// Export of the ward table to CSV.

use std::io::Write;

use csv::Writer;

use ward_results::table::FlatWardRow;

use crate::results::io_common::export_rows;
use crate::results::*;

/// Writes one header line and one line per ward.
pub fn write_csv<W: Write>(rows: &[FlatWardRow], w: W) -> ResultsResult<()> {
    let mut writer = Writer::from_writer(w);
    let export = export_rows(rows);
    for row in export.iter() {
        writer.serialize(row).context(WritingCsvSnafu {})?;
    }
    if export.is_empty() {
        // serialize() only writes the header along with the first record.
        writer
            .write_record(io_common::EXPORT_TITLES)
            .context(WritingCsvSnafu {})?;
    }
    writer
        .flush()
        .context(WritingOutputSnafu { path: "csv output" })?;
    debug!("write_csv: {} rows", export.len());
    Ok(())
}
