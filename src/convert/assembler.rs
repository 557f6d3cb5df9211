//! Record assembly: combine a synchronized probe with the reference into one
//! output row.

use thiserror::Error;

use crate::convert::alleles::{harmonize, HarmonizedAlleles, ResolvedAlleles};
use crate::convert::strand::{ResolvedOrientation, StrandResolver};
use crate::convert::sync::SyncedProbe;
use crate::core::chrom::output_chromosome;
use crate::core::manifest::ManifestRecord;
use crate::core::record::{Genotype, OutputRecord, SampleCall};
use crate::core::report::ReportRecord;
use crate::core::sequence::reverse_complement;
use crate::core::types::Strand;
use crate::parsing::reference::ReferenceError;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("No reference contig for chromosome '{chromosome}' (probe '{probe}')")]
    MissingContig { probe: String, chromosome: String },

    #[error("Invalid reference base '{base}' for probe '{probe}' at {contig}:{position}")]
    InvalidReference {
        probe: String,
        contig: String,
        position: u64,
        base: String,
    },

    #[error("Probe '{probe}' has {found} sample blocks, expected {expected}")]
    SampleCount {
        probe: String,
        expected: usize,
        found: usize,
    },
}

/// Reference-anchored view of one manifest probe
#[derive(Debug, Clone)]
pub struct PreparedProbe {
    /// Normalized chromosome
    pub chromosome: String,
    /// Contig name in the reference
    pub contig: String,
    /// Upper-case reference base at the probe position
    pub reference: String,
    pub orientation: ResolvedOrientation,
    pub alleles: ResolvedAlleles,
    pub harmonized: HarmonizedAlleles,
}

/// Bring a sample's call into manifest orientation.
///
/// Forward-strand calls are flipped when the probe was designed on the other
/// strand from its source sequence; TOP-strand calls are flipped for BOT probes.
#[must_use]
pub fn orient_call(call: &str, forward: bool, manifest: &ManifestRecord) -> String {
    let flip = if forward {
        manifest.strand != manifest.source_strand
    } else {
        manifest.strand == Strand::Bot
    };
    if flip {
        reverse_complement(call)
    } else {
        call.to_string()
    }
}

/// Map one sample's two calls to REF/ALT indices
#[must_use]
pub fn genotype(sample: &ReportRecord, manifest: &ManifestRecord, probe: &PreparedProbe) -> Genotype {
    let index = |call: &str| {
        let oriented = probe
            .orientation
            .orient(&orient_call(call, sample.forward, manifest));
        probe.alleles.index_of(&oriented, &probe.harmonized)
    };
    Genotype::new(index(&sample.allele1), index(&sample.allele2))
}

/// Builds output rows for synchronized probes
pub struct RecordAssembler<'a> {
    resolver: StrandResolver<'a>,
    sample_count: usize,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(resolver: StrandResolver<'a>, sample_count: usize) -> Self {
        Self {
            resolver,
            sample_count,
        }
    }

    /// Look up the reference base, resolve the strand and harmonize alleles
    ///
    /// # Errors
    ///
    /// Returns an error if the chromosome is missing from the reference, the
    /// position is outside the contig, or the reference base is not a
    /// nucleotide.
    pub fn prepare(&self, manifest: &ManifestRecord) -> Result<PreparedProbe, AssemblyError> {
        let chromosome = manifest.normalized_chromosome();
        let contig = self
            .resolver
            .reference()
            .resolve_contig(&chromosome)
            .ok_or_else(|| AssemblyError::MissingContig {
                probe: manifest.name.clone(),
                chromosome: manifest.chromosome.clone(),
            })?;

        let invalid = |base: String| AssemblyError::InvalidReference {
            probe: manifest.name.clone(),
            contig: contig.clone(),
            position: manifest.position,
            base,
        };
        if manifest.position == 0 {
            return Err(invalid(String::new()));
        }
        let reference = self
            .resolver
            .reference()
            .fetch(&contig, manifest.position - 1, manifest.position)?;
        if reference.len() != 1 || !reference.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(invalid(reference));
        }

        let orientation = self.resolver.resolve(&contig, manifest)?;
        let alleles = ResolvedAlleles::from_manifest(manifest, &orientation);
        let harmonized = harmonize(&alleles, &reference);

        Ok(PreparedProbe {
            chromosome,
            contig,
            reference,
            orientation,
            alleles,
            harmonized,
        })
    }

    /// Assemble an output row from a prepared probe and its sample records
    ///
    /// # Errors
    ///
    /// Returns `AssemblyError::SampleCount` if the probe does not carry one
    /// record per sample.
    pub fn assemble(
        &self,
        synced: &SyncedProbe,
        probe: &PreparedProbe,
    ) -> Result<OutputRecord, AssemblyError> {
        let manifest = &synced.manifest;
        if synced.samples.len() != self.sample_count {
            return Err(AssemblyError::SampleCount {
                probe: manifest.name.clone(),
                expected: self.sample_count,
                found: synced.samples.len(),
            });
        }

        let samples = synced
            .samples
            .iter()
            .map(|sample| SampleCall {
                genotype: genotype(sample, manifest, probe),
                b_allele_freq: sample.b_allele_freq,
                log_r_ratio: sample.log_r_ratio,
            })
            .collect();

        Ok(OutputRecord {
            chromosome: output_chromosome(&probe.chromosome),
            position: manifest.position,
            id: manifest.name.clone(),
            reference: probe.reference.clone(),
            alternates: probe.harmonized.alternates.clone(),
            allele_a_index: probe.harmonized.allele_a_index,
            allele_b_index: probe.harmonized.allele_b_index,
            gc: manifest.gc,
            samples,
        })
    }
}
