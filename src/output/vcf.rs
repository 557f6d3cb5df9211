//! VCF sink for converted array data.

use std::io::Write;

use crate::core::record::OutputRecord;
use crate::output::{OutputError, RecordSink};
use crate::utils::format::format_metric;

/// FORMAT column shared by every row
pub const FORMAT: &str = "GT:BAF:LRR";

const META_LINES: [&str; 4] = [
    "##fileformat=VCFv4.2",
    "##INFO=<ID=ALLELE_A,Number=1,Type=Integer,Description=\"A allele\">",
    "##INFO=<ID=ALLELE_B,Number=1,Type=Integer,Description=\"B allele\">",
    "##INFO=<ID=GC,Number=1,Type=Float,Description=\"GC ratio content around the variant\">",
];

/// Definitions of the [`FORMAT`] keys
pub const FORMAT_META_LINES: [&str; 3] = [
    "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">",
    "##FORMAT=<ID=BAF,Number=1,Type=Float,Description=\"B Allele Frequency\">",
    "##FORMAT=<ID=LRR,Number=1,Type=Float,Description=\"Log R Ratio\">",
];

const FIXED_COLUMNS: [&str; 9] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

/// Header lines for the given sample columns
#[must_use]
pub fn header_lines(samples: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = META_LINES
        .iter()
        .chain(FORMAT_META_LINES.iter())
        .map(ToString::to_string)
        .collect();
    let columns: Vec<&str> = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(samples.iter().map(String::as_str))
        .collect();
    lines.push(columns.join("\t"));
    lines
}

/// Render one data row, without the trailing newline
#[must_use]
pub fn format_record(record: &OutputRecord) -> String {
    let mut fields = vec![
        record.chromosome.clone(),
        record.position.to_string(),
        record.id.clone(),
        record.reference.clone(),
        record.alternates.join(","),
        ".".to_string(),
        ".".to_string(),
        format!(
            "ALLELE_A={};ALLELE_B={};GC={}",
            record.allele_a_index,
            record.allele_b_index,
            format_metric(record.gc)
        ),
        FORMAT.to_string(),
    ];
    fields.extend(record.samples.iter().map(|sample| {
        format!(
            "{}:{}:{}",
            sample.genotype,
            format_metric(sample.b_allele_freq),
            format_metric(sample.log_r_ratio)
        )
    }));
    fields.join("\t")
}

/// Writes a VCF header on creation, then one row per record
pub struct VcfWriter<W: Write> {
    inner: W,
}

impl<W: Write> VcfWriter<W> {
    /// # Errors
    ///
    /// Returns `OutputError::Io` if the header cannot be written.
    pub fn new(mut inner: W, samples: &[String]) -> Result<Self, OutputError> {
        for line in header_lines(samples) {
            writeln!(inner, "{line}")?;
        }
        Ok(Self { inner })
    }

    /// # Errors
    ///
    /// Returns `OutputError::Io` if flushing fails.
    pub fn into_inner(mut self) -> Result<W, OutputError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> RecordSink for VcfWriter<W> {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), OutputError> {
        writeln!(self.inner, "{}", format_record(record))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Genotype, SampleCall};

    fn record() -> OutputRecord {
        OutputRecord {
            chromosome: "chr1".to_string(),
            position: 100,
            id: "rs1".to_string(),
            reference: "A".to_string(),
            alternates: vec!["G".to_string()],
            allele_a_index: 0,
            allele_b_index: 1,
            gc: 0.416_666_67,
            samples: vec![
                SampleCall {
                    genotype: Genotype::new(Some(0), Some(0)),
                    b_allele_freq: 0.0123,
                    log_r_ratio: -0.254_321,
                },
                SampleCall {
                    genotype: Genotype::new(None, Some(1)),
                    b_allele_freq: 1.0,
                    log_r_ratio: f64::NAN,
                },
            ],
        }
    }

    #[test]
    fn test_header() {
        let lines = header_lines(&["NA12878.txt".to_string(), "NA12891.txt".to_string()]);
        assert_eq!(lines[0], "##fileformat=VCFv4.2");
        assert_eq!(
            lines.last().unwrap(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA12878.txt\tNA12891.txt"
        );
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(&record()),
            "chr1\t100\trs1\tA\tG\t.\t.\tALLELE_A=0;ALLELE_B=1;GC=0.4167\tGT:BAF:LRR\t0/0:0.0123:-0.2543\t./1:1:NaN"
        );
    }

    #[test]
    fn test_multi_allelic_alt() {
        let mut record = record();
        record.reference = "T".to_string();
        record.alternates = vec!["A".to_string(), "G".to_string()];
        assert!(format_record(&record).contains("\tT\tA,G\t"));
    }

    #[test]
    fn test_writer() {
        let mut writer = VcfWriter::new(Vec::new(), &["s1".to_string()]).unwrap();
        writer.write_record(&record()).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[7].ends_with("FORMAT\ts1"));
        assert!(lines[8].starts_with("chr1\t100\trs1"));
    }
}
