//! Parser for per-sample genotype reports (tab-delimited).
//!
//! Reports may open with a `[Header]` block and a `[Data]` marker; the first
//! line starting with `SNP Name` is the column header and selects one
//! [`ReportSchema`]. A `SNP Name` header that matches no known layout is fatal.
//!
//! | Schema | Calls | Columns |
//! |--------|-------|---------|
//! | `ForwardWithIntensity` | forward | SNP Name, Chromosome, Position, Al1Fwd, Al2Fwd, X, Y, B Allele Freq, Log R Ratio |
//! | `Forward` | forward | SNP Name, Chromosome, Position, Allele1 - Forward, Allele2 - Forward, B Allele Freq, Log R Ratio |
//! | `Top` | TOP strand | SNP Name, Chromosome, Position, Allele1 - Top, Allele2 - Top, B Allele Freq, Log R Ratio |
//! | `FinalReport` | forward | SNP Name, Sample ID, Allele1 - Forward, Allele2 - Forward, Chr, Position, B Allele Freq, Log R Ratio |

use std::io::{BufRead, Lines};
use std::path::Path;

use tracing::debug;

use crate::core::chrom::is_placeholder_chromosome;
use crate::core::report::ReportRecord;
use crate::parsing::{open_text, trim_line_end, ParseError};

const HEADER_PREFIX: &str = "SNP Name";

const FORWARD_WITH_INTENSITY_COLUMNS: &[&str] = &[
    "SNP Name",
    "Chromosome",
    "Position",
    "Al1Fwd",
    "Al2Fwd",
    "X",
    "Y",
    "B Allele Freq",
    "Log R Ratio",
];

const FORWARD_COLUMNS: &[&str] = &[
    "SNP Name",
    "Chromosome",
    "Position",
    "Allele1 - Forward",
    "Allele2 - Forward",
    "B Allele Freq",
    "Log R Ratio",
];

const TOP_COLUMNS: &[&str] = &[
    "SNP Name",
    "Chromosome",
    "Position",
    "Allele1 - Top",
    "Allele2 - Top",
    "B Allele Freq",
    "Log R Ratio",
];

const FINAL_REPORT_COLUMNS: &[&str] = &[
    "SNP Name",
    "Sample ID",
    "Allele1 - Forward",
    "Allele2 - Forward",
    "Chr",
    "Position",
    "B Allele Freq",
    "Log R Ratio",
];

/// Column positions of the fields a report must provide
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    probe: usize,
    chromosome: usize,
    position: usize,
    allele1: usize,
    allele2: usize,
    b_allele_freq: usize,
    log_r_ratio: usize,
    /// Numeric columns that are validated but not kept
    validated: &'static [(usize, &'static str)],
}

/// Recognized report column layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSchema {
    ForwardWithIntensity,
    Forward,
    Top,
    FinalReport,
}

impl ReportSchema {
    pub const ALL: [Self; 4] = [
        Self::ForwardWithIntensity,
        Self::Forward,
        Self::Top,
        Self::FinalReport,
    ];

    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::ForwardWithIntensity => FORWARD_WITH_INTENSITY_COLUMNS,
            Self::Forward => FORWARD_COLUMNS,
            Self::Top => TOP_COLUMNS,
            Self::FinalReport => FINAL_REPORT_COLUMNS,
        }
    }

    #[must_use]
    pub fn field_count(self) -> usize {
        self.columns().len()
    }

    /// Whether allele calls in this layout are on the forward strand
    #[must_use]
    pub fn is_forward(self) -> bool {
        !matches!(self, Self::Top)
    }

    fn layout(self) -> ColumnLayout {
        match self {
            Self::ForwardWithIntensity => ColumnLayout {
                probe: 0,
                chromosome: 1,
                position: 2,
                allele1: 3,
                allele2: 4,
                b_allele_freq: 7,
                log_r_ratio: 8,
                validated: &[(5, "X"), (6, "Y")],
            },
            Self::Forward | Self::Top => ColumnLayout {
                probe: 0,
                chromosome: 1,
                position: 2,
                allele1: 3,
                allele2: 4,
                b_allele_freq: 5,
                log_r_ratio: 6,
                validated: &[],
            },
            Self::FinalReport => ColumnLayout {
                probe: 0,
                chromosome: 4,
                position: 5,
                allele1: 2,
                allele2: 3,
                b_allele_freq: 6,
                log_r_ratio: 7,
                validated: &[],
            },
        }
    }

    /// Select the layout from a header line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedHeader` if the columns match no known layout.
    pub fn detect(header: &str) -> Result<Self, ParseError> {
        let columns: Vec<&str> = header.trim_end().split('\t').map(str::trim).collect();
        Self::ALL
            .into_iter()
            .find(|schema| schema.columns() == columns.as_slice())
            .ok_or_else(|| ParseError::UnexpectedHeader(header.trim_end().to_string()))
    }

    /// Parse one data line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::FieldCount` on a wrong number of columns, or
    /// `ParseError::InvalidNumber` if a numeric column does not parse.
    pub fn parse_line(self, line: &str, line_num: usize) -> Result<ReportRecord, ParseError> {
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != self.field_count() {
            return Err(ParseError::FieldCount {
                line: line_num,
                expected: self.field_count(),
                found: fields.len(),
            });
        }

        let layout = self.layout();
        let chromosome = fields[layout.chromosome].to_string();

        // No-call rows may leave the position blank
        let position = match fields[layout.position].parse::<u64>() {
            Ok(position) => position,
            Err(_) if is_placeholder_chromosome(&chromosome) => 0,
            Err(_) => {
                return Err(ParseError::InvalidNumber {
                    line: line_num,
                    field: "Position",
                    value: fields[layout.position].to_string(),
                })
            }
        };

        for &(index, field) in layout.validated {
            parse_float(fields[index], field, line_num)?;
        }

        Ok(ReportRecord {
            probe: fields[layout.probe].to_string(),
            chromosome,
            position,
            allele1: fields[layout.allele1].to_uppercase(),
            allele2: fields[layout.allele2].to_uppercase(),
            b_allele_freq: parse_float(fields[layout.b_allele_freq], "B Allele Freq", line_num)?,
            log_r_ratio: parse_float(fields[layout.log_r_ratio], "Log R Ratio", line_num)?,
            forward: self.is_forward(),
        })
    }
}

fn parse_float(value: &str, field: &'static str, line_num: usize) -> Result<f64, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        line: line_num,
        field,
        value: value.to_string(),
    })
}

/// Lazy reader over the data lines of one sample's report
pub struct ReportReader<R> {
    lines: Lines<R>,
    schema: ReportSchema,
    line_num: usize,
    finished: bool,
}

impl ReportReader<Box<dyn BufRead + Send>> {
    /// Open a report file (plain or gzip)
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or a header error
    /// if no recognized header line is found.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        Self::new(open_text(path)?)
    }
}

impl<R: BufRead> ReportReader<R> {
    /// Skip any preamble and select the schema from the header line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedHeader` if the `SNP Name` line does not
    /// match a known layout, or `ParseError::MissingHeader` if there is none.
    pub fn new(reader: R) -> Result<Self, ParseError> {
        let mut lines = reader.lines();
        let mut line_num = 0;

        while let Some(line) = lines.next() {
            let line = line?;
            line_num += 1;
            let line = trim_line_end(&line);
            if line.starts_with(HEADER_PREFIX) {
                let schema = ReportSchema::detect(line)?;
                debug!(?schema, line = line_num, "Detected report layout");
                return Ok(Self {
                    lines,
                    schema,
                    line_num,
                    finished: false,
                });
            }
        }

        Err(ParseError::MissingHeader)
    }

    #[must_use]
    pub fn schema(&self) -> ReportSchema {
        self.schema
    }
}

impl<R: BufRead> Iterator for ReportReader<R> {
    type Item = Result<ReportRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };
            self.line_num += 1;

            let line = trim_line_end(&line);
            if line.trim().is_empty() {
                continue;
            }

            let parsed = self.schema.parse_line(line, self.line_num);
            if parsed.is_err() {
                self.finished = true;
            }
            return Some(parsed);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_all_schemas() {
        for schema in ReportSchema::ALL {
            let header = schema.columns().join("\t");
            assert_eq!(ReportSchema::detect(&header).unwrap(), schema);
        }
    }

    #[test]
    fn test_detect_unknown_header() {
        let header = "SNP Name\tChromosome\tPosition\tGType";
        assert!(matches!(
            ReportSchema::detect(header),
            Err(ParseError::UnexpectedHeader(_))
        ));
    }

    #[test]
    fn test_parse_forward_with_intensity() {
        let text = "SNP Name\tChromosome\tPosition\tAl1Fwd\tAl2Fwd\tX\tY\tB Allele Freq\tLog R Ratio\n\
                    rs1\t1\t100\ta\tG\t0.5\t0.6\t0.4912\t-0.0123\n\
                    \n\
                    rs2\t0\t0\t-\t-\t0.0\t0.0\tNaN\tNaN\n";

        let reader = ReportReader::new(Cursor::new(text)).unwrap();
        assert_eq!(reader.schema(), ReportSchema::ForwardWithIntensity);
        let records: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.probe, "rs1");
        assert_eq!(first.chromosome, "1");
        assert_eq!(first.position, 100);
        assert_eq!(first.allele1, "A");
        assert_eq!(first.allele2, "G");
        assert!((first.b_allele_freq - 0.4912).abs() < 1e-12);
        assert!((first.log_r_ratio + 0.0123).abs() < 1e-12);
        assert!(first.forward);

        assert!(records[1].is_placeholder());
        assert!(records[1].b_allele_freq.is_nan());
    }

    #[test]
    fn test_parse_final_report_with_preamble() {
        let text = "[Header]\nGSGT Version\t2.0.4\nNum SNPs\t2\n[Data]\n\
                    SNP Name\tSample ID\tAllele1 - Forward\tAllele2 - Forward\tChr\tPosition\tB Allele Freq\tLog R Ratio\n\
                    rs1\tS1\tA\tA\t1\t100\t0.01\t0.2\n";

        let records: Vec<_> = ReportReader::new(Cursor::new(text))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chromosome, "1");
        assert_eq!(records[0].position, 100);
        assert_eq!(records[0].allele1, "A");
    }

    #[test]
    fn test_top_schema_is_not_forward() {
        let text = "SNP Name\tChromosome\tPosition\tAllele1 - Top\tAllele2 - Top\tB Allele Freq\tLog R Ratio\n\
                    rs1\tXY\t5\tA\tG\t0.5\t0.1\n";
        let records: Vec<_> = ReportReader::new(Cursor::new(text))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(!records[0].forward);
        assert_eq!(records[0].chromosome, "XY");
    }

    #[test]
    fn test_blank_position_only_allowed_on_placeholders() {
        let placeholder = ReportSchema::Forward
            .parse_line("rs1\t0\t\t-\t-\t0\t0", 3)
            .unwrap();
        assert_eq!(placeholder.position, 0);

        assert!(matches!(
            ReportSchema::Forward.parse_line("rs1\t1\t\tA\tA\t0\t0", 4),
            Err(ParseError::InvalidNumber { field: "Position", line: 4, .. })
        ));
    }

    #[test]
    fn test_unparseable_numbers_are_fatal() {
        assert!(matches!(
            ReportSchema::Forward.parse_line("rs1\t1\t100\tA\tA\tabc\t0", 2),
            Err(ParseError::InvalidNumber { field: "B Allele Freq", .. })
        ));
        assert!(matches!(
            ReportSchema::ForwardWithIntensity.parse_line("rs1\t1\t100\tA\tA\tx\t0\t0\t0", 2),
            Err(ParseError::InvalidNumber { field: "X", .. })
        ));
    }

    #[test]
    fn test_wrong_field_count_stops_reader() {
        let text = "SNP Name\tChromosome\tPosition\tAllele1 - Top\tAllele2 - Top\tB Allele Freq\tLog R Ratio\n\
                    rs1\t1\t5\tA\n\
                    rs2\t1\t6\tA\tG\t0.5\t0.1\n";
        let mut reader = ReportReader::new(Cursor::new(text)).unwrap();
        assert!(matches!(
            reader.next(),
            Some(Err(ParseError::FieldCount { line: 2, expected: 7, found: 4 }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            ReportReader::new(Cursor::new("rs1\t1\t100\n")),
            Err(ParseError::MissingHeader)
        ));
    }
}
