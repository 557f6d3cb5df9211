//! Exchange the BAF and LRR values of every sample in a converted VCF.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::output::vcf::FORMAT;
use crate::output::OutputError;
use crate::parsing::trim_line_end;

/// Index of the FORMAT column
const FORMAT_COLUMN: usize = 8;

/// Swap the second and third FORMAT values of each sample on one data line
///
/// # Errors
///
/// Returns `OutputError::InvalidVcf` if the line has no FORMAT column or its
/// FORMAT is not `GT:BAF:LRR`.
pub fn swap_line(line: &str, line_num: usize) -> Result<String, OutputError> {
    let invalid = |message: String| OutputError::InvalidVcf {
        line: line_num,
        message,
    };

    let mut fields: Vec<String> = line.split('\t').map(ToString::to_string).collect();
    let format = fields
        .get(FORMAT_COLUMN)
        .ok_or_else(|| invalid(format!("expected at least {} columns", FORMAT_COLUMN + 1)))?;
    if format != FORMAT {
        return Err(invalid(format!(
            "FORMAT is '{format}', BAF and LRR out of order or not found"
        )));
    }

    for sample in fields.iter_mut().skip(FORMAT_COLUMN + 1) {
        let mut values: Vec<&str> = sample.split(':').collect();
        if values.len() < 3 {
            return Err(invalid(format!("sample '{sample}' has fewer than 3 values")));
        }
        values.swap(1, 2);
        *sample = values.join(":");
    }
    Ok(fields.join("\t"))
}

/// Copy a VCF, swapping BAF and LRR on every data line
///
/// Header lines pass through unchanged. Returns the number of data lines.
///
/// # Errors
///
/// Returns an error on IO failure or a line whose FORMAT is not `GT:BAF:LRR`.
pub fn swap_baf_lrr<R: BufRead, W: Write>(reader: R, writer: &mut W) -> Result<u64, OutputError> {
    let mut records = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = trim_line_end(&line);
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            writeln!(writer, "{line}")?;
        } else {
            writeln!(writer, "{}", swap_line(line, idx + 1)?)?;
            records += 1;
        }
    }
    debug!(records, "Swapped BAF and LRR");
    Ok(records)
}
