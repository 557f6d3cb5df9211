//! Rewrite an Affymetrix genotyping VCF into the `GT:BAF:LRR` layout written
//! by a conversion, so both platforms can be analyzed together.
//!
//! Per data line:
//!
//! - ID becomes the `DBSNP_RS_ID` INFO value when one is present
//! - INFO keeps only its first three entries
//! - FORMAT collapses to `GT:BAF:LRR`, picking those keys out of each sample

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::output::vcf::{FORMAT, FORMAT_META_LINES};
use crate::output::OutputError;
use crate::parsing::trim_line_end;

/// INFO key holding the dbSNP identifier
pub const RS_ID_KEY: &str = "DBSNP_RS_ID";

const KEPT_INFO_ENTRIES: usize = 3;

const ID_COLUMN: usize = 2;
const INFO_COLUMN: usize = 7;
const FORMAT_COLUMN: usize = 8;

/// Counters for one reformatting pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReformatSummary {
    pub records: u64,
    /// Records without a usable `DBSNP_RS_ID`; their ID is left as is
    pub missing_rs_id: u64,
}

/// One rewritten data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReformattedLine {
    pub text: String,
    pub has_rs_id: bool,
}

/// The `DBSNP_RS_ID` value of an INFO column, if set
#[must_use]
pub fn rs_id(info: &str) -> Option<&str> {
    info.split(';')
        .filter_map(|entry| entry.split_once('='))
        .find(|(key, _)| *key == RS_ID_KEY)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty() && *value != ".")
}

/// Rewrite one data line
///
/// # Errors
///
/// Returns `OutputError::InvalidVcf` if the line has no FORMAT column, the
/// FORMAT does not start with `GT`, or it lacks `BAF` or `LRR`.
pub fn reformat_line(line: &str, line_num: usize) -> Result<ReformattedLine, OutputError> {
    let invalid = |message: String| OutputError::InvalidVcf {
        line: line_num,
        message,
    };

    let mut fields: Vec<String> = line.split('\t').map(ToString::to_string).collect();
    if fields.len() <= FORMAT_COLUMN {
        return Err(invalid(format!("expected at least {} columns", FORMAT_COLUMN + 1)));
    }

    let keys: Vec<&str> = fields[FORMAT_COLUMN].split(':').collect();
    let position = |key: &str| keys.iter().position(|k| *k == key);
    let (Some(0), Some(baf), Some(lrr)) = (position("GT"), position("BAF"), position("LRR")) else {
        return Err(invalid(format!(
            "FORMAT is '{}', expected GT first and both BAF and LRR",
            fields[FORMAT_COLUMN]
        )));
    };

    let info = fields[INFO_COLUMN].clone();
    let id = rs_id(&info).map(ToString::to_string);
    if let Some(id) = &id {
        fields[ID_COLUMN].clone_from(id);
    }
    if info != "." {
        fields[INFO_COLUMN] = info
            .split(';')
            .take(KEPT_INFO_ENTRIES)
            .collect::<Vec<_>>()
            .join(";");
    }
    fields[FORMAT_COLUMN] = FORMAT.to_string();

    for sample in fields.iter_mut().skip(FORMAT_COLUMN + 1) {
        let values: Vec<&str> = sample.split(':').collect();
        let value = |index: usize| values.get(index).copied().unwrap_or(".");
        *sample = format!("{}:{}:{}", value(0), value(baf), value(lrr));
    }

    Ok(ReformattedLine {
        text: fields.join("\t"),
        has_rs_id: id.is_some(),
    })
}

/// Copy an Affymetrix VCF, rewriting every data line.
///
/// Meta lines pass through except the `##FORMAT` definitions, which are
/// replaced by those of `GT:BAF:LRR` ahead of the `#CHROM` line.
///
/// # Errors
///
/// Returns an error on IO failure or a line [`reformat_line`] rejects.
pub fn reformat_affy<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
) -> Result<ReformatSummary, OutputError> {
    let mut summary = ReformatSummary::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = trim_line_end(&line);
        if line.is_empty() || line.starts_with("##FORMAT=") {
            continue;
        }
        if line.starts_with("#CHROM") {
            for meta in FORMAT_META_LINES {
                writeln!(writer, "{meta}")?;
            }
            writeln!(writer, "{line}")?;
        } else if line.starts_with('#') {
            writeln!(writer, "{line}")?;
        } else {
            let reformatted = reformat_line(line, idx + 1)?;
            if !reformatted.has_rs_id {
                debug!(line = idx + 1, "No {RS_ID_KEY} in INFO, keeping ID");
                summary.missing_rs_id += 1;
            }
            writeln!(writer, "{}", reformatted.text)?;
            summary.records += 1;
        }
    }

    if summary.missing_rs_id > 0 {
        warn!(
            records = summary.missing_rs_id,
            "Records without {RS_ID_KEY} kept their original ID"
        );
    }
    debug!(records = summary.records, "Reformatted Affymetrix VCF");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const VCF: &str = "##fileformat=VCFv4.1\n\
##INFO=<ID=AFFY_SNP_ID,Number=1,Type=String,Description=\"Affymetrix SNP ID\">\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
##FORMAT=<ID=CONF,Number=1,Type=Float,Description=\"Confidence\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts1\ts2\n\
1\t752566\tAX-11086525\tG\tA\t.\t.\tAFFY_SNP_ID=AX-11086525;PROBESET_ID=AX-11086525;CR=99.1;DBSNP_RS_ID=rs3094315\tGT:CONF:SIG_A:SIG_B:CN:NF:BAF:LRR\t0/1:0.002:1200:1100:2:0.9:0.4871:0.0212\t1/1:0.01:300:2500:2:0.8:0.9912:-0.1532\n\
1\t776546\tAX-11095478\tA\tG\t.\t.\tAFFY_SNP_ID=AX-11095478;DBSNP_RS_ID=.\tGT:CONF:SIG_A:SIG_B:CN:NF:BAF:LRR\t0/0:0.003:2100:150:2:0.9:0.0113:0.1\t./.\n";

    #[test]
    fn test_reformat_line() {
        let line = VCF.lines().nth(5).unwrap();
        let reformatted = reformat_line(line, 6).unwrap();
        assert!(reformatted.has_rs_id);

        let fields: Vec<&str> = reformatted.text.split('\t').collect();
        assert_eq!(fields[2], "rs3094315");
        assert_eq!(fields[7], "AFFY_SNP_ID=AX-11086525;PROBESET_ID=AX-11086525;CR=99.1");
        assert_eq!(fields[8], "GT:BAF:LRR");
        assert_eq!(fields[9], "0/1:0.4871:0.0212");
        assert_eq!(fields[10], "1/1:0.9912:-0.1532");
    }

    #[test]
    fn test_missing_rs_id_and_short_sample() {
        let line = VCF.lines().nth(6).unwrap();
        let reformatted = reformat_line(line, 7).unwrap();
        assert!(!reformatted.has_rs_id);

        let fields: Vec<&str> = reformatted.text.split('\t').collect();
        assert_eq!(fields[2], "AX-11095478");
        assert_eq!(fields[7], "AFFY_SNP_ID=AX-11095478;DBSNP_RS_ID=.");
        assert_eq!(fields[9], "0/0:0.0113:0.1");
        assert_eq!(fields[10], "./.:.:.");
    }

    #[test]
    fn test_rs_id() {
        assert_eq!(rs_id("A=1;DBSNP_RS_ID=rs1"), Some("rs1"));
        assert_eq!(rs_id("DBSNP_RS_ID="), None);
        assert_eq!(rs_id("."), None);
        assert_eq!(rs_id("XDBSNP_RS_ID=rs1"), None);
    }

    #[test]
    fn test_reformat_affy_header() {
        let mut out = Vec::new();
        let summary = reformat_affy(Cursor::new(VCF), &mut out).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.missing_rs_id, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "##fileformat=VCFv4.1");
        assert!(lines[1].starts_with("##INFO=<ID=AFFY_SNP_ID"));
        assert_eq!(&lines[2..5], &FORMAT_META_LINES);
        assert!(lines[5].starts_with("#CHROM"));
        assert!(!text.contains("ID=CONF"));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_format_without_baf_is_rejected() {
        let line = "1\t100\trs1\tA\tG\t.\t.\t.\tGT:CONF\t0/0:0.1";
        assert!(matches!(
            reformat_line(line, 9),
            Err(OutputError::InvalidVcf { line: 9, .. })
        ));
        let line = "1\t100\trs1\tA\tG\t.\t.\t.\tBAF:GT:LRR\t0.1:0/0:0.2";
        assert!(reformat_line(line, 1).is_err());
        assert!(reformat_line("1\t100", 1).is_err());
    }
}
