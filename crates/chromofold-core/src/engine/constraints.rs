use crate::core::io::contacts::ContactRecord;
use crate::core::models::{ChromosomeSpans, Constraint};
use crate::engine::config::FilterConfig;
use std::collections::BTreeMap;
use tracing::debug;

/// Why an ingested record was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    SelfPair,
    NonFinite,
    BelowThreshold,
    OutsideSeparationWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted,
    /// The pair was already present; its frequency was overwritten.
    Replaced,
    Rejected(RejectReason),
}

/// Per-reason tallies over everything offered to [`ConstraintSet::ingest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: usize,
    pub replaced: usize,
    pub rejected_self_pairs: usize,
    pub rejected_non_finite: usize,
    pub rejected_threshold: usize,
    pub rejected_separation: usize,
}

impl IngestStats {
    pub fn rejected(&self) -> usize {
        self.rejected_self_pairs
            + self.rejected_non_finite
            + self.rejected_threshold
            + self.rejected_separation
    }

    pub fn total_records(&self) -> usize {
        self.accepted + self.replaced + self.rejected()
    }
}

/// Result of the adjacency augmentation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AugmentationSummary {
    pub inserted: usize,
    pub raised: usize,
    /// Mean frequency over the adjacent pairs the pass was calibrated on.
    pub adjacent_mean: f64,
}

/// The canonical store of pairwise constraints.
///
/// Pairs are keyed `(pos1, pos2)` with `pos1 < pos2`, so iteration order is
/// deterministic and duplicates collapse to the most recently ingested
/// frequency. The store is mutated only during ingestion and augmentation;
/// optimizer runs work on read-only exports from [`ConstraintSet::to_constraints`].
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    map: BTreeMap<(u32, u32), f64>,
    stats: IngestStats,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(
        &mut self,
        pos1: u32,
        pos2: u32,
        frequency: f64,
        filter: &FilterConfig,
    ) -> IngestOutcome {
        let (lo, hi) = if pos1 <= pos2 {
            (pos1, pos2)
        } else {
            (pos2, pos1)
        };

        if lo == hi {
            self.stats.rejected_self_pairs += 1;
            return IngestOutcome::Rejected(RejectReason::SelfPair);
        }
        if !frequency.is_finite() {
            self.stats.rejected_non_finite += 1;
            return IngestOutcome::Rejected(RejectReason::NonFinite);
        }
        if frequency <= filter.frequency_threshold {
            self.stats.rejected_threshold += 1;
            return IngestOutcome::Rejected(RejectReason::BelowThreshold);
        }
        let separation = hi - lo;
        let too_far = filter.max_separation.is_some_and(|max| separation > max);
        if separation < filter.min_separation || too_far {
            self.stats.rejected_separation += 1;
            return IngestOutcome::Rejected(RejectReason::OutsideSeparationWindow);
        }

        match self.map.insert((lo, hi), frequency) {
            Some(_) => {
                self.stats.replaced += 1;
                IngestOutcome::Replaced
            }
            None => {
                self.stats.accepted += 1;
                IngestOutcome::Accepted
            }
        }
    }

    pub fn ingest_records(&mut self, records: &[ContactRecord], filter: &FilterConfig) -> IngestStats {
        for record in records {
            self.ingest(record.pos1, record.pos2, record.frequency, filter);
        }
        self.stats
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of loci implied by the highest stored index.
    pub fn num_loci(&self) -> usize {
        self.map
            .keys()
            .map(|&(_, hi)| hi as usize + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn mean_frequency(&self) -> Option<f64> {
        if self.map.is_empty() {
            return None;
        }
        Some(self.map.values().sum::<f64>() / self.map.len() as f64)
    }

    /// Mean frequency over adjacent pairs that stay inside one chromosome.
    pub fn mean_adjacent_frequency(&self, spans: &ChromosomeSpans) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for (&(lo, hi), &frequency) in &self.map {
            if hi - lo == 1 && spans.same_chromosome(lo as usize, hi as usize) {
                sum += frequency;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }

    /// Ensures every chromosome is a connected chain.
    ///
    /// Missing adjacent intra-chromosome pairs are inserted at the mean
    /// adjacent frequency, and weaker-than-mean adjacent pairs are raised to
    /// it. Without any adjacent pair to calibrate on this is a no-op.
    pub fn augment_adjacency(&mut self, spans: &ChromosomeSpans) -> Option<AugmentationSummary> {
        let adjacent_mean = self.mean_adjacent_frequency(spans)?;

        let mut inserted = 0usize;
        let mut raised = 0usize;
        for span in spans.spans() {
            for locus in span.start..span.end.saturating_sub(1) {
                let key = (locus as u32, locus as u32 + 1);
                match self.map.get_mut(&key) {
                    None => {
                        self.map.insert(key, adjacent_mean);
                        inserted += 1;
                    }
                    Some(frequency) if *frequency < adjacent_mean => {
                        *frequency = adjacent_mean;
                        raised += 1;
                    }
                    Some(_) => {}
                }
            }
        }

        debug!(
            inserted,
            raised, adjacent_mean, "augmented adjacent contacts"
        );
        Some(AugmentationSummary {
            inserted,
            raised,
            adjacent_mean,
        })
    }

    /// Ordered read-only export for conversion and optimization.
    pub fn to_constraints(&self) -> Vec<Constraint> {
        self.map
            .iter()
            .map(|(&(lo, hi), &frequency)| Constraint::new(lo, hi, frequency))
            .collect()
    }
}
