use crate::core::chrom::normalize_chromosome;
use crate::core::types::Strand;

/// One probe definition from an array manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    /// Vendor probe identifier (`IlmnID`)
    pub ilmn_id: String,

    /// Probe name, matched against report `SNP Name`
    pub name: String,

    /// Strand the probe allele codes are written on
    pub strand: Strand,

    /// Strand of the source sequence the probe was designed from
    pub source_strand: Strand,

    /// First probe allele code (the "A" allele)
    pub allele_a: String,

    /// Second probe allele code (the "B" allele)
    pub allele_b: String,

    /// Flanking context preceding the variant, upper case
    pub seq_before: String,

    /// Flanking context following the variant, upper case
    pub seq_after: String,

    pub genome_build: String,

    /// Chromosome as written in the manifest
    pub chromosome: String,

    /// 1-based position
    pub position: u64,

    /// G/C fraction of the flanking context
    pub gc: f64,
}

impl ManifestRecord {
    /// Declared lengths of the before/after context
    #[must_use]
    pub fn context_lengths(&self) -> (usize, usize) {
        (self.seq_before.len(), self.seq_after.len())
    }

    #[must_use]
    pub fn normalized_chromosome(&self) -> String {
        normalize_chromosome(&self.chromosome)
    }

    /// Lookup key used by map mode
    #[must_use]
    pub fn lookup_key(&self) -> String {
        self.name.to_lowercase()
    }

    #[cfg(test)]
    pub fn for_test(
        name: &str,
        chromosome: &str,
        position: u64,
        alleles: (&str, &str),
        strand: Strand,
    ) -> Self {
        Self {
            ilmn_id: format!("{name}-131_T_F_0000000000"),
            name: name.to_string(),
            strand,
            source_strand: strand,
            allele_a: alleles.0.to_string(),
            allele_b: alleles.1.to_string(),
            seq_before: String::new(),
            seq_after: String::new(),
            genome_build: "38".to_string(),
            chromosome: chromosome.to_string(),
            position,
            gc: 0.0,
        }
    }
}
