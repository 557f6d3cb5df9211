//! Merge-join of the per-sample report streams against the manifest.
//!
//! Every input is a pull-based iterator; the [`Synchronizer`] advances them in
//! lockstep and yields one [`SyncedProbe`] per manifest probe that every sample
//! reported. Two policies are supported (see [`SyncMode`]):
//!
//! - **Index-free**: reports follow manifest order exactly. The primary
//!   (first) sample may skip manifest probes; any other sample that diverges is
//!   a fatal ordering violation.
//! - **Map**: the manifest is loaded into a name-keyed table and the primary
//!   sample drives iteration. Secondary samples must report the same probe
//!   name, row for row.
//!
//! Only the primary stream is allowed to desynchronize. Secondary streams have
//! no key to resynchronize on without re-sorting, so a mismatch there aborts
//! the run.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::chrom::is_mitochondrial;
use crate::core::manifest::ManifestRecord;
use crate::core::report::ReportRecord;
use crate::core::types::SyncMode;
use crate::parsing::ParseError;

/// Boxed producer of manifest records
pub type ManifestSource = Box<dyn Iterator<Item = Result<ManifestRecord, ParseError>> + Send>;

/// Boxed producer of one sample's report records
pub type ReportSource = Box<dyn Iterator<Item = Result<ReportRecord, ParseError>> + Send>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Manifest: {0}")]
    Manifest(#[source] ParseError),

    #[error("Sample '{sample}': {source}")]
    Sample {
        sample: String,
        #[source]
        source: ParseError,
    },

    #[error(
        "Sample '{sample}' is out of order: expected probe '{expected}', found '{found}'"
    )]
    OrderingViolation {
        sample: String,
        expected: String,
        found: String,
    },

    #[error("Sample '{sample}' ended before the primary sample (at probe '{expected}')")]
    TruncatedStream { sample: String, expected: String },

    #[error("At least one sample report is required")]
    NoSamples,
}

/// One sample's report records with a single-record pushback slot
pub struct SampleStream {
    name: String,
    records: ReportSource,
    pending: Option<ReportRecord>,
}

impl SampleStream {
    pub fn new(name: impl Into<String>, records: ReportSource) -> Self {
        Self {
            name: name.into(),
            records,
            pending: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next record, placeholders included
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Sample` if the underlying report fails to parse.
    pub fn next_raw(&mut self) -> Result<Option<ReportRecord>, SyncError> {
        if let Some(record) = self.pending.take() {
            return Ok(Some(record));
        }
        match self.records.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(source)) => Err(SyncError::Sample {
                sample: self.name.clone(),
                source,
            }),
            None => Ok(None),
        }
    }

    /// Next usable call, skipping placeholder rows
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Sample` if the underlying report fails to parse.
    pub fn next_call(&mut self) -> Result<Option<ReportRecord>, SyncError> {
        while let Some(record) = self.next_raw()? {
            if !record.is_placeholder() {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Return a record so the next pull yields it again
    pub fn push_back(&mut self, record: ReportRecord) {
        self.pending = Some(record);
    }

    /// Next usable call from a secondary stream; running dry here is fatal
    fn require(&mut self, expected: &str) -> Result<ReportRecord, SyncError> {
        self.next_call()?.ok_or_else(|| SyncError::TruncatedStream {
            sample: self.name.clone(),
            expected: expected.to_string(),
        })
    }
}

/// A manifest probe with one report record per sample, in sample order
#[derive(Debug, Clone)]
pub struct SyncedProbe {
    pub manifest: ManifestRecord,
    pub samples: Vec<ReportRecord>,
}

/// Counters collected while synchronizing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Manifest records read
    pub manifest_records: u64,
    /// Probes yielded to the caller
    pub synced: u64,
    /// Manifest records dropped because the primary sample did not report them
    pub dropped: u64,
    /// Primary-sample probes missing from the manifest (map mode)
    pub not_found: u64,
    /// Probes on the mitochondrial contig
    pub mito_excluded: u64,
    /// Later manifest records sharing an earlier probe name (map mode)
    pub duplicate_names: u64,
}

enum Cursor {
    IndexFree(ManifestSource),
    Map {
        pending: Option<ManifestSource>,
        table: HashMap<String, ManifestRecord>,
    },
}

/// Lockstep iterator over the manifest and all sample streams
pub struct Synchronizer {
    cursor: Cursor,
    samples: Vec<SampleStream>,
    suppress_warnings: bool,
    stats: SyncStats,
    done: bool,
}

impl Synchronizer {
    /// # Errors
    ///
    /// Returns `SyncError::NoSamples` when `samples` is empty.
    pub fn new(
        mode: SyncMode,
        manifest: ManifestSource,
        samples: Vec<SampleStream>,
        suppress_warnings: bool,
    ) -> Result<Self, SyncError> {
        if samples.is_empty() {
            return Err(SyncError::NoSamples);
        }
        let cursor = match mode {
            SyncMode::IndexFree => Cursor::IndexFree(manifest),
            SyncMode::Map => Cursor::Map {
                pending: Some(manifest),
                table: HashMap::new(),
            },
        };
        Ok(Self {
            cursor,
            samples,
            suppress_warnings,
            stats: SyncStats::default(),
            done: false,
        })
    }

    #[must_use]
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    #[must_use]
    pub fn sample_names(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.name().to_string()).collect()
    }

    fn next_index_free(&mut self) -> Result<Option<SyncedProbe>, SyncError> {
        let Cursor::IndexFree(source) = &mut self.cursor else {
            return Ok(None);
        };

        loop {
            let manifest = match source.next() {
                Some(record) => record.map_err(SyncError::Manifest)?,
                None => {
                    warn_trailing(&mut self.samples, self.suppress_warnings)?;
                    return Ok(None);
                }
            };
            self.stats.manifest_records += 1;

            let (primary, secondary) = self.samples.split_at_mut(1);
            let primary = &mut primary[0];
            let Some(first) = primary.next_call()? else {
                info!(
                    sample = %primary.name(),
                    probe = %manifest.name,
                    "Primary sample exhausted, ignoring remaining manifest records"
                );
                warn_trailing(secondary, self.suppress_warnings)?;
                return Ok(None);
            };

            if !first.matches_manifest(&manifest) {
                if !self.suppress_warnings {
                    warn!(
                        probe = %manifest.name,
                        chrom = %manifest.chromosome,
                        pos = manifest.position,
                        found = %first,
                        "Primary sample does not report manifest probe, dropping it"
                    );
                }
                primary.push_back(first);
                self.stats.dropped += 1;
                continue;
            }

            let mut samples = Vec::with_capacity(secondary.len() + 1);
            samples.push(first);
            for stream in secondary.iter_mut() {
                let record = stream.require(&manifest.name)?;
                if !record.matches_manifest(&manifest) {
                    return Err(SyncError::OrderingViolation {
                        sample: stream.name().to_string(),
                        expected: format!(
                            "{} {}:{}",
                            manifest.name, manifest.chromosome, manifest.position
                        ),
                        found: record.to_string(),
                    });
                }
                samples.push(record);
            }

            if is_mitochondrial(&manifest.chromosome) {
                self.stats.mito_excluded += 1;
                continue;
            }
            return Ok(Some(SyncedProbe { manifest, samples }));
        }
    }

    fn load_table(&mut self) -> Result<(), SyncError> {
        let Cursor::Map { pending, table } = &mut self.cursor else {
            return Ok(());
        };
        let Some(manifest) = pending.take() else {
            return Ok(());
        };

        for record in manifest {
            let record = record.map_err(SyncError::Manifest)?;
            self.stats.manifest_records += 1;
            let key = record.lookup_key();
            if table.contains_key(&key) {
                // First occurrence wins
                debug!(probe = %record.name, "Duplicate probe name in manifest, keeping first");
                self.stats.duplicate_names += 1;
            } else {
                table.insert(key, record);
            }
        }
        debug!(
            probes = table.len(),
            duplicates = self.stats.duplicate_names,
            "Loaded manifest lookup table"
        );
        if self.stats.duplicate_names > 0 && !self.suppress_warnings {
            warn!(
                duplicates = self.stats.duplicate_names,
                "Manifest has duplicate probe names; only the first of each is used"
            );
        }
        Ok(())
    }

    fn next_mapped(&mut self) -> Result<Option<SyncedProbe>, SyncError> {
        self.load_table()?;
        let Cursor::Map { table, .. } = &self.cursor else {
            return Ok(None);
        };

        loop {
            let (primary, secondary) = self.samples.split_at_mut(1);
            let Some(first) = primary[0].next_raw()? else {
                warn_trailing(secondary, self.suppress_warnings)?;
                return Ok(None);
            };

            let manifest = if first.is_placeholder() {
                None
            } else {
                let found = table.get(&first.probe.to_lowercase());
                if found.is_none() {
                    debug!(probe = %first.probe, "Probe not in manifest");
                    self.stats.not_found += 1;
                }
                found
            };
            let Some(manifest) = manifest else {
                // Keep secondary rows aligned with the primary. A secondary
                // that is already dry only fails once a probe needs its call.
                for stream in secondary.iter_mut() {
                    if stream.next_raw()?.is_none() {
                        debug!(
                            sample = %stream.name(),
                            probe = %first.probe,
                            "Sample exhausted while skipping an unmapped row"
                        );
                    }
                }
                continue;
            };

            if !first.matches_manifest(manifest) && !self.suppress_warnings {
                warn!(
                    probe = %manifest.name,
                    chrom = %manifest.chromosome,
                    pos = manifest.position,
                    found = %first,
                    "Sample coordinates disagree with manifest"
                );
            }

            let mut samples = Vec::with_capacity(secondary.len() + 1);
            samples.push(first);
            for stream in secondary.iter_mut() {
                let record = stream.require(&manifest.name)?;
                if !record.probe.eq_ignore_ascii_case(&manifest.name) {
                    return Err(SyncError::OrderingViolation {
                        sample: stream.name().to_string(),
                        expected: manifest.name.clone(),
                        found: record.probe,
                    });
                }
                samples.push(record);
            }

            if is_mitochondrial(&manifest.chromosome) {
                self.stats.mito_excluded += 1;
                continue;
            }
            return Ok(Some(SyncedProbe {
                manifest: manifest.clone(),
                samples,
            }));
        }
    }
}

/// Warn about usable records left in the given streams
fn warn_trailing(streams: &mut [SampleStream], suppress_warnings: bool) -> Result<(), SyncError> {
    for stream in streams {
        if let Some(record) = stream.next_call()? {
            if !suppress_warnings {
                warn!(
                    sample = %stream.name(),
                    next = %record,
                    "Sample has records left after the run ended"
                );
            }
        }
    }
    Ok(())
}

impl Iterator for Synchronizer {
    type Item = Result<SyncedProbe, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.cursor {
            Cursor::IndexFree(_) => self.next_index_free(),
            Cursor::Map { .. } => self.next_mapped(),
        };
        match result {
            Ok(Some(probe)) => {
                self.stats.synced += 1;
                Some(Ok(probe))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
