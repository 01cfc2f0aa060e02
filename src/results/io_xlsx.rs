// Export of the ward table to an Excel workbook.

use rust_xlsxwriter::{Format, Workbook};

use ward_results::table::FlatWardRow;

use crate::results::io_common::{export_rows, ExportCell, EXPORT_TITLES};
use crate::results::*;

pub const SHEET_NAME: &str = "Ward Results";

pub fn write_xlsx(rows: &[FlatWardRow], path: &str) -> ResultsResult<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let export = export_rows(rows);
    {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .context(WritingXlsxSnafu { path })?;
        for (col, title) in EXPORT_TITLES.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *title, &bold)
                .context(WritingXlsxSnafu { path })?;
        }
        for (idx, row) in export.iter().enumerate() {
            let r = idx as u32 + 1;
            for (col, cell) in row.cells().into_iter().enumerate() {
                let c = col as u16;
                match cell {
                    ExportCell::Text(s) => {
                        worksheet
                            .write_string(r, c, s)
                            .context(WritingXlsxSnafu { path })?;
                    }
                    ExportCell::Number(x) => {
                        worksheet
                            .write_number(r, c, x)
                            .context(WritingXlsxSnafu { path })?;
                    }
                    ExportCell::Blank => {}
                }
            }
        }
        worksheet.autofit();
    }
    workbook.save(path).context(WritingXlsxSnafu { path })?;
    info!("write_xlsx: {} rows written to {}", export.len(), path);
    Ok(())
}
