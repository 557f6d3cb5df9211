use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::convert::assembler::RecordAssembler;
use crate::convert::strand::{StrandResolver, StrandThresholds};
use crate::convert::sync::{ManifestSource, SampleStream, Synchronizer};
use crate::convert::ConvertError;
use crate::core::types::SyncMode;
use crate::output::vcf::VcfWriter;
use crate::output::{OutputTarget, RecordSink};
use crate::parsing::manifest::ManifestReader;
use crate::parsing::reference::{open_reference, ReferenceAccessor};
use crate::parsing::report::ReportReader;
use crate::utils::validation::{find_duplicate_name, sample_name_from_path};

/// Configuration for a conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionConfig {
    /// How sample streams are matched to the manifest
    pub mode: SyncMode,
    /// Silence data-quality warnings; fatal errors are always reported
    pub suppress_warnings: bool,
    pub thresholds: StrandThresholds,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub samples: usize,
    pub manifest_records: u64,
    pub written: u64,
    /// Manifest records the primary sample did not report
    pub dropped: u64,
    /// Primary-sample probes absent from the manifest
    pub not_found: u64,
    /// Probes whose context matched the reference on neither strand
    pub context_mismatches: u64,
    /// Probes whose reference base is neither probe allele
    pub reference_mismatches: u64,
    pub mito_excluded: u64,
    pub duplicate_names: u64,
}

/// Input and output paths of a file-to-file conversion
#[derive(Debug, Clone)]
pub struct ConversionPaths {
    /// Report files in sample order
    pub reports: Vec<PathBuf>,
    pub manifest: PathBuf,
    pub reference: PathBuf,
    /// Output VCF; `-` for stdout
    pub output: PathBuf,
}

/// Drives synchronized probes through assembly into a sink
pub struct ConversionEngine<'a> {
    reference: &'a dyn ReferenceAccessor,
    config: ConversionConfig,
}

impl<'a> ConversionEngine<'a> {
    pub fn new(reference: &'a dyn ReferenceAccessor, config: ConversionConfig) -> Self {
        Self { reference, config }
    }

    /// Build a synchronizer over in-memory or file-backed sources
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NoSamples` if `samples` is empty.
    pub fn synchronizer(
        &self,
        manifest: ManifestSource,
        samples: Vec<SampleStream>,
    ) -> Result<Synchronizer, ConvertError> {
        Ok(Synchronizer::new(
            self.config.mode,
            manifest,
            samples,
            self.config.suppress_warnings,
        )?)
    }

    /// Consume every synchronized probe, writing one record per probe.
    ///
    /// The first fatal error aborts the run; records already written stay in
    /// the sink.
    ///
    /// # Errors
    ///
    /// Returns the first parse, ordering, reference, or sink error.
    pub fn run(
        &self,
        mut sync: Synchronizer,
        sink: &mut dyn RecordSink,
    ) -> Result<ConversionSummary, ConvertError> {
        let samples = sync.sample_names().len();
        let resolver = StrandResolver::new(
            self.reference,
            self.config.thresholds,
            self.config.suppress_warnings,
        );
        let assembler = RecordAssembler::new(resolver, samples);

        let mut summary = ConversionSummary {
            samples,
            ..ConversionSummary::default()
        };
        for probe in sync.by_ref() {
            let probe = probe?;
            let prepared = assembler.prepare(&probe.manifest)?;
            if !prepared.orientation.is_resolved() {
                summary.context_mismatches += 1;
            }
            if !prepared.harmonized.reference_is_probe_allele() {
                summary.reference_mismatches += 1;
            }
            let record = assembler.assemble(&probe, &prepared)?;
            sink.write_record(&record)?;
            summary.written += 1;
        }

        let stats = sync.stats();
        summary.manifest_records = stats.manifest_records;
        summary.dropped = stats.dropped;
        summary.not_found = stats.not_found;
        summary.mito_excluded = stats.mito_excluded;
        summary.duplicate_names = stats.duplicate_names;

        info!(
            written = summary.written,
            manifest = summary.manifest_records,
            dropped = summary.dropped,
            not_found = summary.not_found,
            "Conversion finished"
        );
        Ok(summary)
    }
}

/// Convert report files against a manifest and reference into a VCF file
///
/// # Errors
///
/// Returns an error if any input cannot be opened or parsed, two reports map
/// to the same sample name, or the run hits a fatal condition.
pub fn convert_files(
    paths: &ConversionPaths,
    config: ConversionConfig,
) -> Result<ConversionSummary, ConvertError> {
    let names: Vec<String> = paths
        .reports
        .iter()
        .map(|path| sample_name_from_path(path))
        .collect();
    if let Some(name) = find_duplicate_name(&names) {
        return Err(ConvertError::DuplicateSample(name.to_string()));
    }

    let reference = open_reference(&paths.reference)?;
    let manifest = ManifestReader::from_path(&paths.manifest)?;
    debug!(schema = ?manifest.schema(), path = %paths.manifest.display(), "Opened manifest");

    let mut samples = Vec::with_capacity(paths.reports.len());
    for (path, name) in paths.reports.iter().zip(&names) {
        let report = ReportReader::from_path(path)?;
        debug!(sample = %name, schema = ?report.schema(), "Opened report");
        samples.push(SampleStream::new(name.clone(), Box::new(report)));
    }

    let engine = ConversionEngine::new(reference.as_ref(), config);
    let sync = engine.synchronizer(Box::new(manifest), samples)?;

    let target = OutputTarget::create(&paths.output)?;
    let mut writer = VcfWriter::new(target, &names)?;
    let summary = engine.run(sync, &mut writer)?;
    writer.into_inner()?.finish()?;
    Ok(summary)
}

/// Convenience wrapper taking individual paths
///
/// # Errors
///
/// See [`convert_files`].
pub fn convert(
    reports: &[PathBuf],
    manifest: &Path,
    reference: &Path,
    output: &Path,
    config: ConversionConfig,
) -> Result<ConversionSummary, ConvertError> {
    convert_files(
        &ConversionPaths {
            reports: reports.to_vec(),
            manifest: manifest.to_path_buf(),
            reference: reference.to_path_buf(),
            output: output.to_path_buf(),
        },
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::ManifestRecord;
    use crate::core::record::OutputRecord;
    use crate::core::report::ReportRecord;
    use crate::core::types::Strand;
    use crate::parsing::reference::InMemoryReference;

    const CHR1: &str = "TTTTTTTTTTGGGGGGGGGACATGCATGCA";

    fn manifest(records: Vec<ManifestRecord>) -> ManifestSource {
        Box::new(records.into_iter().map(Ok))
    }

    fn probe(name: &str, chrom: &str, pos: u64) -> ManifestRecord {
        let mut m = ManifestRecord::for_test(name, chrom, pos, ("A", "G"), Strand::Top);
        m.seq_before = "TGGGGGGGGG".to_string();
        m.seq_after = "CATGCATGCA".to_string();
        m
    }

    #[test]
    fn test_run_counts() {
        let reference = InMemoryReference::from_sequences([("chr1", CHR1), ("chrM", CHR1)]);
        let engine = ConversionEngine::new(&reference, ConversionConfig::default());

        let records = vec![probe("rs1", "1", 20), probe("mt1", "MT", 20), probe("rs2", "1", 20)];
        let samples = vec![SampleStream::new(
            "s1",
            Box::new(
                vec![
                    ReportRecord::for_test("rs1", "1", 20, ("A", "G")),
                    ReportRecord::for_test("mt1", "MT", 20, ("A", "A")),
                ]
                .into_iter()
                .map(Ok),
            ),
        )];
        let sync = engine.synchronizer(manifest(records), samples).unwrap();

        let mut sink: Vec<OutputRecord> = Vec::new();
        let summary = engine.run(sync, &mut sink).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].samples[0].genotype.to_string(), "0/1");
        assert_eq!(summary.written, 1);
        assert_eq!(summary.mito_excluded, 1);
        assert_eq!(summary.manifest_records, 3);
        assert_eq!(summary.context_mismatches, 0);
        assert_eq!(summary.reference_mismatches, 0);
    }

    #[test]
    fn test_run_counts_reference_mismatch() {
        let reference = InMemoryReference::from_sequences([("chr1", CHR1)]);
        let engine = ConversionEngine::new(&reference, ConversionConfig::default());

        // Reference base at 20 is A; the probe reports C/G
        let mut record = probe("rs1", "1", 20);
        record.allele_a = "C".to_string();
        let samples = vec![SampleStream::new(
            "s1",
            Box::new(vec![ReportRecord::for_test("rs1", "1", 20, ("C", "G"))].into_iter().map(Ok)),
        )];
        let sync = engine.synchronizer(manifest(vec![record]), samples).unwrap();

        let mut sink: Vec<OutputRecord> = Vec::new();
        let summary = engine.run(sync, &mut sink).unwrap();
        assert_eq!(summary.reference_mismatches, 1);
        assert_eq!(sink[0].alternates, vec!["C", "G"]);
        assert_eq!(sink[0].samples[0].genotype.to_string(), "1/2");
    }

    #[test]
    fn test_run_counts_context_mismatch() {
        let reference = InMemoryReference::from_sequences([("chr1", CHR1)]);
        let config = ConversionConfig {
            suppress_warnings: true,
            ..ConversionConfig::default()
        };
        let engine = ConversionEngine::new(&reference, config);

        let mut unrelated = probe("rs1", "1", 20);
        unrelated.seq_before = "CCCCCCCCCCCC".to_string();
        unrelated.seq_after = "ACACACACACAC".to_string();
        let samples = vec![SampleStream::new(
            "s1",
            Box::new(vec![ReportRecord::for_test("rs1", "1", 20, ("A", "A"))].into_iter().map(Ok)),
        )];
        let sync = engine.synchronizer(manifest(vec![unrelated]), samples).unwrap();

        let mut sink: Vec<OutputRecord> = Vec::new();
        let summary = engine.run(sync, &mut sink).unwrap();
        assert_eq!(summary.context_mismatches, 1);
        assert_eq!(summary.reference_mismatches, 0);
        assert_eq!(sink.len(), 1);
    }
}
