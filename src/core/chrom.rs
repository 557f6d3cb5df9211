//! Chromosome naming as reported by array manifests and genotype reports.
//!
//! Array vendors mix UCSC (`chr1`) and NCBI (`1`) names and use a few
//! special contigs of their own:
//!
//! | Raw name | Normalized |
//! |----------|------------|
//! | `chr1`, `1` | `1` |
//! | `XY`, `chrXY` | `X` (pseudoautosomal probes) |
//! | `MT`, `chrMT`, `chrM` | `M` |
//! | `0`, empty | placeholder (no-call row) |

/// Normalized name of the mitochondrial contig
pub const MITOCHONDRIAL: &str = "M";

/// Normalize a chromosome name for comparison.
///
/// Strips any `chr` prefix, folds the pseudoautosomal `XY` onto `X` and the
/// mitochondrial `MT` onto `M`. The result never carries a `chr` prefix, so
/// normalizing twice is a no-op.
#[must_use]
pub fn normalize_chromosome(name: &str) -> String {
    let mut bare = name.trim();
    while let Some(rest) = strip_chr_prefix(bare) {
        bare = rest;
    }

    if bare.eq_ignore_ascii_case("XY") || bare.eq_ignore_ascii_case("X") {
        "X".to_string()
    } else if bare.eq_ignore_ascii_case("MT") || bare.eq_ignore_ascii_case("M") {
        MITOCHONDRIAL.to_string()
    } else if bare.eq_ignore_ascii_case("Y") {
        "Y".to_string()
    } else {
        bare.to_string()
    }
}

fn strip_chr_prefix(name: &str) -> Option<&str> {
    let prefix = name.get(..3)?;
    if prefix.eq_ignore_ascii_case("chr") {
        Some(&name[3..])
    } else {
        None
    }
}

/// Name written to the CHROM column for a normalized chromosome
#[must_use]
pub fn output_chromosome(normalized: &str) -> String {
    format!("chr{normalized}")
}

/// Check whether two raw chromosome names refer to the same contig
#[must_use]
pub fn same_chromosome(a: &str, b: &str) -> bool {
    normalize_chromosome(a).eq_ignore_ascii_case(&normalize_chromosome(b))
}

/// Check if a raw chromosome name normalizes to the mitochondrial contig
#[must_use]
pub fn is_mitochondrial(name: &str) -> bool {
    normalize_chromosome(name) == MITOCHONDRIAL
}

/// Placeholder rows carry a blank or zero chromosome
#[must_use]
pub fn is_placeholder_chromosome(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == "0"
}
