//! Allele harmonization: place the two probe alleles into REF/ALT index space.

use crate::convert::strand::ResolvedOrientation;
use crate::core::manifest::ManifestRecord;

/// Probe alleles after the strand flip has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlleles {
    pub a: String,
    pub b: String,
}

impl ResolvedAlleles {
    /// Orient the manifest's A/B codes to the reference-forward strand
    #[must_use]
    pub fn from_manifest(manifest: &ManifestRecord, orientation: &ResolvedOrientation) -> Self {
        Self {
            a: orientation.orient(&manifest.allele_a),
            b: orientation.orient(&manifest.allele_b),
        }
    }

    /// Index of an observed call among the resolved alleles, by exact equality
    #[must_use]
    pub fn index_of(&self, call: &str, harmonized: &HarmonizedAlleles) -> Option<u8> {
        if call == self.a {
            Some(harmonized.allele_a_index)
        } else if call == self.b {
            Some(harmonized.allele_b_index)
        } else {
            None
        }
    }
}

/// REF/ALT placement of a probe's alleles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarmonizedAlleles {
    pub allele_a_index: u8,
    pub allele_b_index: u8,
    pub alternates: Vec<String>,
}

impl HarmonizedAlleles {
    /// The A or B allele is the reference base
    #[must_use]
    pub fn reference_is_probe_allele(&self) -> bool {
        self.allele_a_index == 0 || self.allele_b_index == 0
    }
}

/// Map resolved alleles onto REF/ALT indices.
///
/// Rules apply in order, using exact string equality:
///
/// | condition            | A | B | ALT      |
/// |----------------------|---|---|----------|
/// | REF == A             | 0 | 1 | `[B]`    |
/// | REF == B             | 1 | 0 | `[A]`    |
/// | A == B               | 1 | 1 | `[A]`    |
/// | otherwise            | 1 | 2 | `[A, B]` |
#[must_use]
pub fn harmonize(alleles: &ResolvedAlleles, reference: &str) -> HarmonizedAlleles {
    let (allele_a_index, allele_b_index, alternates) = if reference == alleles.a {
        (0, 1, vec![alleles.b.clone()])
    } else if reference == alleles.b {
        (1, 0, vec![alleles.a.clone()])
    } else if alleles.a == alleles.b {
        (1, 1, vec![alleles.a.clone()])
    } else {
        (1, 2, vec![alleles.a.clone(), alleles.b.clone()])
    };

    HarmonizedAlleles {
        allele_a_index,
        allele_b_index,
        alternates,
    }
}
