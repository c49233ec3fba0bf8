use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("chromosome {index} has zero length")]
pub struct ZeroLengthChromosome {
    pub index: usize,
}

/// Partition of the locus index range `0..num_loci` into chromosomes.
///
/// Built from per-chromosome locus counts; stored as cumulative end bounds, so
/// locus lookups are a binary search. Genome-wide runs use this to keep
/// adjacency augmentation from bridging chromosome ends and to annotate
/// exported models; single-chromosome runs use [`ChromosomeSpans::single`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeSpans {
    bounds: Vec<usize>,
}

impl ChromosomeSpans {
    pub fn from_lengths(lengths: &[usize]) -> Result<Self, ZeroLengthChromosome> {
        let mut bounds = Vec::with_capacity(lengths.len());
        let mut total = 0usize;
        for (index, &length) in lengths.iter().enumerate() {
            if length == 0 {
                return Err(ZeroLengthChromosome { index });
            }
            total += length;
            bounds.push(total);
        }
        Ok(Self { bounds })
    }

    /// One span covering all `num_loci` loci.
    pub fn single(num_loci: usize) -> Self {
        let bounds = if num_loci == 0 { vec![] } else { vec![num_loci] };
        Self { bounds }
    }

    #[inline]
    pub fn num_loci(&self) -> usize {
        self.bounds.last().copied().unwrap_or(0)
    }

    #[inline]
    pub fn num_chromosomes(&self) -> usize {
        self.bounds.len()
    }

    /// Index of the chromosome containing `locus`, if in range.
    pub fn chromosome_of(&self, locus: usize) -> Option<usize> {
        let idx = self.bounds.partition_point(|&end| end <= locus);
        (idx < self.bounds.len()).then_some(idx)
    }

    /// Chromosome index and offset within that chromosome for `locus`.
    pub fn local_index(&self, locus: usize) -> Option<(usize, usize)> {
        let chromosome = self.chromosome_of(locus)?;
        let start = if chromosome == 0 {
            0
        } else {
            self.bounds[chromosome - 1]
        };
        Some((chromosome, locus - start))
    }

    pub fn same_chromosome(&self, a: usize, b: usize) -> bool {
        match (self.chromosome_of(a), self.chromosome_of(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    pub fn span(&self, chromosome: usize) -> Range<usize> {
        let start = if chromosome == 0 {
            0
        } else {
            self.bounds[chromosome - 1]
        };
        start..self.bounds[chromosome]
    }

    pub fn spans(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.bounds.len()).map(|i| self.span(i))
    }
}
