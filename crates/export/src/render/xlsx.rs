use std::borrow::Cow;

use rust_xlsxwriter::{Format, Workbook};

use super::SpreadsheetWriter;
use crate::error::ExportError;
use crate::tabular::{ReportRow, COLUMNS, SHEET_NAME};

/// Column widths in characters, in [`COLUMNS`] order.
const COLUMN_WIDTHS: [f64; 9] = [5.0, 32.0, 10.0, 40.0, 48.0, 40.0, 32.0, 8.0, 20.0];

/// Excel rejects cells holding more characters than this.
const MAX_CELL_CHARS: usize = 32_767;

const TRUNCATED_MARKER: &str = " [truncated]";

/// Cap `text` at [`MAX_CELL_CHARS`] characters, cutting on a char boundary
/// and ending with [`TRUNCATED_MARKER`].
fn fit_cell(text: &str) -> Cow<'_, str> {
    if text.char_indices().nth(MAX_CELL_CHARS).is_none() {
        return Cow::Borrowed(text);
    }
    let keep = MAX_CELL_CHARS - TRUNCATED_MARKER.chars().count();
    let cut = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    Cow::Owned(format!("{}{TRUNCATED_MARKER}", &text[..cut]))
}

/// `.xlsx` writer with a bold frozen header row.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxWriter;

impl SpreadsheetWriter for XlsxWriter {
    fn write(&self, rows: &[ReportRow]) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let wrapped = Format::new().set_text_wrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        sheet.set_freeze_panes(1, 0)?;

        for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, width)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_number(r, 0, row.number as f64)?;
            sheet.write_string(r, 1, fit_cell(&row.title))?;
            sheet.write_string(r, 2, fit_cell(&row.status))?;
            sheet.write_string_with_format(r, 3, fit_cell(&row.description), &wrapped)?;
            sheet.write_string_with_format(r, 4, fit_cell(&row.steps), &wrapped)?;
            sheet.write_string_with_format(r, 5, fit_cell(&row.observations), &wrapped)?;
            sheet.write_string(r, 6, fit_cell(&row.log_file))?;
            sheet.write_number(r, 7, row.image_count as f64)?;
            sheet.write_string(r, 8, fit_cell(&row.created_at))?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}
