use crate::core::chrom::{is_placeholder_chromosome, same_chromosome};
use crate::core::manifest::ManifestRecord;

/// One genotype observation for one probe in one sample
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    /// Probe name (`SNP Name`)
    pub probe: String,

    pub chromosome: String,

    pub position: u64,

    /// First observed allele call, upper case
    pub allele1: String,

    /// Second observed allele call, upper case
    pub allele2: String,

    pub b_allele_freq: f64,

    pub log_r_ratio: f64,

    /// Calls are on the forward strand (as opposed to the Illumina TOP strand)
    pub forward: bool,
}

impl ReportRecord {
    /// No-call rows carry a blank or zero chromosome and must be skipped
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        is_placeholder_chromosome(&self.chromosome)
    }

    /// Check whether this observation refers to the given probe.
    ///
    /// Probe names are compared case-insensitively and chromosomes after
    /// normalization; positions must be equal.
    #[must_use]
    pub fn matches_manifest(&self, manifest: &ManifestRecord) -> bool {
        self.probe.eq_ignore_ascii_case(&manifest.name)
            && same_chromosome(&self.chromosome, &manifest.chromosome)
            && self.position == manifest.position
    }

    #[cfg(test)]
    pub fn for_test(probe: &str, chromosome: &str, position: u64, calls: (&str, &str)) -> Self {
        Self {
            probe: probe.to_string(),
            chromosome: chromosome.to_string(),
            position,
            allele1: calls.0.to_string(),
            allele2: calls.1.to_string(),
            b_allele_freq: 0.0,
            log_r_ratio: 0.0,
            forward: true,
        }
    }
}

impl std::fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{}", self.probe, self.chromosome, self.position)
    }
}
