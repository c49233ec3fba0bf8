use std::cmp::Ordering;

/// One pairwise restraint between two loci.
///
/// The pair is unordered: `pos1 <= pos2` is enforced at construction, so two
/// constraints built from swapped indices are identical. Equality and ordering
/// consider only the pair, which makes `(pos1, pos2)` the deduplication and
/// iteration key for the whole engine.
#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    pos1: u32,
    pos2: u32,
    /// Observed interaction frequency, as ingested.
    pub frequency: f64,
    /// Distance the optimizer should realize for this pair. Assigned by the
    /// distance conversion (or taken verbatim from a distance file).
    pub target_distance: f64,
    /// Euclidean distance between the two loci in the current model.
    /// Recomputed every optimizer iteration; owned by exactly one run.
    pub structural_distance: f64,
}

impl Constraint {
    pub fn new(pos1: u32, pos2: u32, frequency: f64) -> Self {
        let (pos1, pos2) = if pos1 <= pos2 {
            (pos1, pos2)
        } else {
            (pos2, pos1)
        };
        Self {
            pos1,
            pos2,
            frequency,
            target_distance: 0.0,
            structural_distance: 0.0,
        }
    }

    /// Builds a constraint with a preassigned target distance, for callers
    /// that bypass the frequency conversion.
    pub fn with_target(pos1: u32, pos2: u32, frequency: f64, target_distance: f64) -> Self {
        let mut constraint = Self::new(pos1, pos2, frequency);
        constraint.target_distance = target_distance;
        constraint
    }

    #[inline]
    pub fn pos1(&self) -> u32 {
        self.pos1
    }

    #[inline]
    pub fn pos2(&self) -> u32 {
        self.pos2
    }

    #[inline]
    pub fn pair(&self) -> (u32, u32) {
        (self.pos1, self.pos2)
    }

    /// Genomic separation of the pair, in bins.
    #[inline]
    pub fn separation(&self) -> u32 {
        self.pos2 - self.pos1
    }

    #[inline]
    pub fn is_adjacent(&self) -> bool {
        self.separation() == 1
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.pair() == other.pair()
    }
}
impl Eq for Constraint {}

impl PartialOrd for Constraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pair().cmp(&other.pair())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_canonicalizes_pair_order() {
        let forward = Constraint::new(2, 5, 3.5);
        let swapped = Constraint::new(5, 2, 3.5);

        assert_eq!(forward.pair(), (2, 5));
        assert_eq!(swapped.pair(), (2, 5));
        assert_eq!(forward, swapped);
    }

    #[test]
    fn ordering_follows_pair_lexicographically() {
        let mut constraints = vec![
            Constraint::new(3, 1, 1.0),
            Constraint::new(0, 7, 1.0),
            Constraint::new(1, 2, 1.0),
        ];
        constraints.sort();

        let pairs: Vec<_> = constraints.iter().map(Constraint::pair).collect();
        assert_eq!(pairs, vec![(0, 7), (1, 2), (1, 3)]);
    }

    #[test]
    fn equality_ignores_distances_and_frequency() {
        let mut a = Constraint::new(1, 4, 10.0);
        let b = Constraint::new(4, 1, 2.0);
        a.target_distance = 8.0;
        a.structural_distance = 7.5;

        assert_eq!(a, b);
    }

    #[test]
    fn separation_and_adjacency() {
        assert_eq!(Constraint::new(9, 4, 1.0).separation(), 5);
        assert!(Constraint::new(6, 5, 1.0).is_adjacent());
        assert!(!Constraint::new(5, 7, 1.0).is_adjacent());
    }
}
