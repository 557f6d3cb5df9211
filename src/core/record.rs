/// Unphased diploid genotype as a pair of allele indices into REF + ALT.
///
/// A slot is `None` when the corresponding observed call matched neither
/// probe allele.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Genotype(pub [Option<u8>; 2]);

impl Genotype {
    #[must_use]
    pub fn new(first: Option<u8>, second: Option<u8>) -> Self {
        Self([first, second])
    }
}

impl std::fmt::Display for Genotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match slot {
                Some(index) => write!(f, "{index}")?,
                None => write!(f, ".")?,
            }
        }
        Ok(())
    }
}

/// Per-sample FORMAT block
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCall {
    pub genotype: Genotype,
    pub b_allele_freq: f64,
    pub log_r_ratio: f64,
}

/// One assembled variant row
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// CHROM column, `chr`-prefixed
    pub chromosome: String,

    /// 1-based position
    pub position: u64,

    /// Probe name
    pub id: String,

    /// Reference base at `position`
    pub reference: String,

    /// Ordered ALT alleles
    pub alternates: Vec<String>,

    /// Index of the probe A allele in REF + ALT
    pub allele_a_index: u8,

    /// Index of the probe B allele in REF + ALT
    pub allele_b_index: u8,

    /// G/C fraction of the probe context
    pub gc: f64,

    /// One block per sample, in sample order
    pub samples: Vec<SampleCall>,
}
