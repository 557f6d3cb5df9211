//! Parser for Illumina-style array manifests (`.csv`).
//!
//! A manifest starts with a free-form preamble (`[Heading]`, `[Assay]`),
//! followed by a column header line beginning with `IlmnID`, one line per
//! probe, and finally a `[Controls]` section that is not read.
//!
//! The header line selects one of the recognized [`ManifestSchema`]s:
//!
//! | Schema | Columns | Extra columns |
//! |--------|---------|---------------|
//! | Standard | 19 | none |
//! | Extended | 22 | `Exp_Clusters`, `Intensity_Only`, `RefStrand` |
//!
//! Both schemas share the leading 19 columns, so one set of column positions
//! serves both.

use std::io::{BufRead, Lines};
use std::path::Path;

use tracing::debug;

use crate::core::manifest::ManifestRecord;
use crate::core::sequence::gc_fraction;
use crate::core::types::Strand;
use crate::parsing::{open_text, trim_line_end, ParseError};

/// Column header of the 19-column manifest layout
pub const STANDARD_HEADER: &str = "IlmnID,Name,IlmnStrand,SNP,AddressA_ID,AlleleA_ProbeSeq,\
AddressB_ID,AlleleB_ProbeSeq,GenomeBuild,Chr,MapInfo,Ploidy,Species,Source,SourceVersion,\
SourceStrand,SourceSeq,TopGenomicSeq,BeadSetId";

/// Column header of the 22-column manifest layout
pub const EXTENDED_HEADER: &str = "IlmnID,Name,IlmnStrand,SNP,AddressA_ID,AlleleA_ProbeSeq,\
AddressB_ID,AlleleB_ProbeSeq,GenomeBuild,Chr,MapInfo,Ploidy,Species,Source,SourceVersion,\
SourceStrand,SourceSeq,TopGenomicSeq,BeadSetID,Exp_Clusters,Intensity_Only,RefStrand";

const HEADER_PREFIX: &str = "IlmnID";
const CONTROLS_SECTION: &str = "[Controls]";

// Column positions shared by both layouts
const ILMN_ID: usize = 0;
const NAME: usize = 1;
const ILMN_STRAND: usize = 2;
const SNP: usize = 3;
const GENOME_BUILD: usize = 8;
const CHR: usize = 9;
const MAP_INFO: usize = 10;
const SOURCE_STRAND: usize = 15;
const TOP_GENOMIC_SEQ: usize = 17;

/// Recognized manifest column layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSchema {
    Standard,
    Extended,
}

impl ManifestSchema {
    /// Select the layout from a header line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedHeader` if the line matches no known layout.
    pub fn detect(header: &str) -> Result<Self, ParseError> {
        match header.trim_end() {
            STANDARD_HEADER => Ok(Self::Standard),
            EXTENDED_HEADER => Ok(Self::Extended),
            other => Err(ParseError::UnexpectedHeader(other.to_string())),
        }
    }

    #[must_use]
    pub fn field_count(self) -> usize {
        match self {
            Self::Standard => 19,
            Self::Extended => 22,
        }
    }

    /// Parse one probe line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::FieldCount` on a wrong number of columns,
    /// `ParseError::InvalidStrand` on an unknown strand token,
    /// `ParseError::InvalidNumber` on a bad position, or
    /// `ParseError::InvalidFormat` on a malformed allele pair or flanking sequence.
    pub fn parse_line(self, line: &str, line_num: usize) -> Result<ManifestRecord, ParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != self.field_count() {
            return Err(ParseError::FieldCount {
                line: line_num,
                expected: self.field_count(),
                found: fields.len(),
            });
        }

        let strand = parse_strand(fields[ILMN_STRAND], line_num)?;
        let source_strand = parse_strand(fields[SOURCE_STRAND], line_num)?;
        let (allele_a, allele_b) = parse_allele_pair(fields[SNP], line_num)?;

        let position: u64 =
            fields[MAP_INFO]
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidNumber {
                    line: line_num,
                    field: "MapInfo",
                    value: fields[MAP_INFO].to_string(),
                })?;

        let (seq_before, seq_after) = parse_flanks(fields[TOP_GENOMIC_SEQ], line_num)?;
        let gc = gc_fraction(&seq_before, &seq_after);

        Ok(ManifestRecord {
            ilmn_id: fields[ILMN_ID].to_string(),
            name: fields[NAME].to_string(),
            strand,
            source_strand,
            allele_a,
            allele_b,
            seq_before,
            seq_after,
            genome_build: fields[GENOME_BUILD].to_string(),
            chromosome: fields[CHR].trim().to_string(),
            position,
            gc,
        })
    }
}

fn parse_strand(value: &str, line_num: usize) -> Result<Strand, ParseError> {
    Strand::parse(value).ok_or_else(|| ParseError::InvalidStrand {
        line: line_num,
        value: value.to_string(),
    })
}

/// Split a bracketed `[A/B]` allele pair
fn parse_allele_pair(value: &str, line_num: usize) -> Result<(String, String), ParseError> {
    let inner = value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');

    match inner.split_once('/') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() && !b.contains('/') => {
            Ok((a.to_uppercase(), b.to_uppercase()))
        }
        _ => Err(ParseError::InvalidFormat {
            line: line_num,
            message: format!("invalid allele pair '{value}'"),
        }),
    }
}

/// Extract the context before and after the bracketed variant
fn parse_flanks(value: &str, line_num: usize) -> Result<(String, String), ParseError> {
    let malformed = || ParseError::InvalidFormat {
        line: line_num,
        message: format!("flanking sequence has no bracketed variant: '{value}'"),
    };

    let open = value.find('[').ok_or_else(malformed)?;
    let close = value[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or_else(malformed)?;

    Ok((
        value[..open].trim().to_uppercase(),
        value[close + 1..].trim().to_uppercase(),
    ))
}

/// Lazy reader over the probe lines of a manifest
pub struct ManifestReader<R> {
    lines: Lines<R>,
    schema: ManifestSchema,
    line_num: usize,
    finished: bool,
}

impl ManifestReader<Box<dyn BufRead + Send>> {
    /// Open a manifest file (plain or gzip)
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or a header error
    /// if no recognized header line is found.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        Self::new(open_text(path)?)
    }
}

impl<R: BufRead> ManifestReader<R> {
    /// Skip the preamble and select the schema from the header line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedHeader` if the `IlmnID` line does not
    /// match a known layout, or `ParseError::MissingHeader` if there is none.
    pub fn new(reader: R) -> Result<Self, ParseError> {
        let mut lines = reader.lines();
        let mut line_num = 0;

        while let Some(line) = lines.next() {
            let line = line?;
            line_num += 1;
            let line = trim_line_end(&line);
            if line.starts_with(HEADER_PREFIX) {
                let schema = ManifestSchema::detect(line)?;
                debug!(?schema, line = line_num, "Detected manifest layout");
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
    pub fn schema(&self) -> ManifestSchema {
        self.schema
    }
}

impl<R: BufRead> Iterator for ManifestReader<R> {
    type Item = Result<ManifestRecord, ParseError>;

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
            if line.starts_with(CONTROLS_SECTION) {
                self.finished = true;
                return None;
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
