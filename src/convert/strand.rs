//! Strand resolution: decide whether a probe's allele codes must be
//! reverse-complemented to read on the reference-forward strand.
//!
//! The manifest's flanking context is compared with the reference around the
//! probe position:
//!
//! 1. **Direct match**: either flank is within `forward_max_distance` edits of
//!    the reference flank on the same side. The probe reads forward when the
//!    manifest strand is TOP, so a BOT probe is flipped.
//! 2. **Reverse match**: the reverse complement of a reference flank matches
//!    the opposite manifest flank within `anchor_max_distance` edits, compared
//!    only over an `anchor_len` window next to the variant. An off-center probe
//!    has flanks of unequal length once flipped, so the full flanks cannot be
//!    compared. A TOP probe is flipped.
//! 3. Otherwise the orientation is unresolved; no flip is applied.

use tracing::warn;

use crate::core::manifest::ManifestRecord;
use crate::core::sequence::{levenshtein, prefix, reverse_complement, suffix};
use crate::parsing::reference::{ReferenceAccessor, ReferenceError};

/// Edit-distance thresholds for context matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrandThresholds {
    /// Largest distance accepted for a full-flank direct match
    pub forward_max_distance: usize,
    /// Number of bases next to the variant compared for a reverse match
    pub anchor_len: usize,
    /// Largest distance accepted over the anchor window
    pub anchor_max_distance: usize,
}

impl Default for StrandThresholds {
    fn default() -> Self {
        Self {
            forward_max_distance: 5,
            anchor_len: 5,
            anchor_max_distance: 1,
        }
    }
}

/// Reference bases immediately before and after a probe position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceContext {
    pub before: String,
    pub after: String,
}

/// Which comparison corroborated the manifest strand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMatch {
    Direct,
    Reverse,
    Unresolved,
}

/// Per-probe orientation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOrientation {
    /// Probe allele codes must be reverse-complemented
    pub needs_flip: bool,
    pub evidence: ContextMatch,
}

impl ResolvedOrientation {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.evidence != ContextMatch::Unresolved
    }

    /// Apply the decision to an allele code
    #[must_use]
    pub fn orient(&self, allele: &str) -> String {
        if self.needs_flip {
            reverse_complement(allele)
        } else {
            allele.to_string()
        }
    }
}

/// Decide orientation from an already-fetched reference context
#[must_use]
pub fn resolve_with_context(
    manifest: &ManifestRecord,
    context: &ReferenceContext,
    thresholds: &StrandThresholds,
) -> ResolvedOrientation {
    let direct = levenshtein(&context.before, &manifest.seq_before)
        <= thresholds.forward_max_distance
        || levenshtein(&context.after, &manifest.seq_after) <= thresholds.forward_max_distance;
    if direct {
        return ResolvedOrientation {
            needs_flip: !manifest.strand.is_top(),
            evidence: ContextMatch::Direct,
        };
    }

    let n = thresholds.anchor_len;
    let before_rc = reverse_complement(&context.before);
    let after_rc = reverse_complement(&context.after);
    let reverse = levenshtein(prefix(&before_rc, n), prefix(&manifest.seq_after, n))
        <= thresholds.anchor_max_distance
        || levenshtein(suffix(&after_rc, n), suffix(&manifest.seq_before, n))
            <= thresholds.anchor_max_distance;
    if reverse {
        return ResolvedOrientation {
            needs_flip: manifest.strand.is_top(),
            evidence: ContextMatch::Reverse,
        };
    }

    ResolvedOrientation {
        needs_flip: false,
        evidence: ContextMatch::Unresolved,
    }
}

/// Strand resolver bound to a reference
pub struct StrandResolver<'a> {
    reference: &'a dyn ReferenceAccessor,
    thresholds: StrandThresholds,
    suppress_warnings: bool,
}

impl<'a> StrandResolver<'a> {
    pub fn new(
        reference: &'a dyn ReferenceAccessor,
        thresholds: StrandThresholds,
        suppress_warnings: bool,
    ) -> Self {
        Self {
            reference,
            thresholds,
            suppress_warnings,
        }
    }

    #[must_use]
    pub fn reference(&self) -> &'a dyn ReferenceAccessor {
        self.reference
    }

    /// Fetch the reference flanks matching the manifest's declared context
    /// lengths, clamped to the contig
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::UnknownContig` if the contig is missing, or
    /// `ReferenceError::OutOfBounds` if the position lies beyond it.
    pub fn fetch_context(
        &self,
        contig: &str,
        manifest: &ManifestRecord,
    ) -> Result<ReferenceContext, ReferenceError> {
        let length = self
            .reference
            .contig_length(contig)
            .ok_or_else(|| ReferenceError::UnknownContig(contig.to_string()))?;
        let (before_len, after_len) = manifest.context_lengths();

        // 0-based offset of the variant base
        let variant = manifest.position.saturating_sub(1);
        let before_start = variant.saturating_sub(before_len as u64);
        let after_start = (variant + 1).min(length);
        let after_end = (variant + 1 + after_len as u64).min(length);

        Ok(ReferenceContext {
            before: self.reference.fetch(contig, before_start, variant.min(length))?,
            after: self.reference.fetch(contig, after_start, after_end)?,
        })
    }

    /// Resolve one probe against the reference; logs when the context does
    /// not corroborate either strand
    ///
    /// # Errors
    ///
    /// Returns a `ReferenceError` if the context cannot be fetched.
    pub fn resolve(
        &self,
        contig: &str,
        manifest: &ManifestRecord,
    ) -> Result<ResolvedOrientation, ReferenceError> {
        let context = self.fetch_context(contig, manifest)?;
        let orientation = resolve_with_context(manifest, &context, &self.thresholds);

        if !orientation.is_resolved() && !self.suppress_warnings {
            warn!(
                probe = %manifest.name,
                chrom = %manifest.chromosome,
                pos = manifest.position,
                reference = %format!("{}+{}", context.before, context.after),
                manifest = %format!("{}+{}", manifest.seq_before, manifest.seq_after),
                "Context sequences did not match reference, assuming no flip"
            );
        }
        Ok(orientation)
    }
}
