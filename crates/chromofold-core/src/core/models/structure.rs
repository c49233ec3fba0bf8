use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A 3D genome model: one coordinate per locus, indexed `0..len()`.
///
/// A model is exclusively owned by the optimizer run mutating it; clones are
/// cheap enough to serve as immutable snapshots for scoring and export.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    coordinates: Vec<Point3<f64>>,
}

impl Model {
    pub fn from_coordinates(coordinates: Vec<Point3<f64>>) -> Self {
        Self { coordinates }
    }

    /// Seeds `num_loci` coordinates uniformly inside the unit cube.
    ///
    /// The optimizer grows the structure outward from there; starting small
    /// keeps early gradients well conditioned. Identical seeds produce
    /// identical models.
    pub fn seeded_random(num_loci: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let coordinates = (0..num_loci)
            .map(|_| {
                Point3::new(
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                )
            })
            .collect();
        Self { coordinates }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    #[inline]
    pub fn point(&self, locus: usize) -> Point3<f64> {
        self.coordinates[locus]
    }

    #[inline]
    pub fn coordinates(&self) -> &[Point3<f64>] {
        &self.coordinates
    }

    /// Euclidean distance between two loci in the current model.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        (self.coordinates[a] - self.coordinates[b]).norm()
    }

    /// Returns a copy of the model moved by `-step * gradient`.
    pub fn displaced(&self, step: f64, gradient: &[Vector3<f64>]) -> Self {
        debug_assert_eq!(self.coordinates.len(), gradient.len());
        let coordinates = self
            .coordinates
            .iter()
            .zip(gradient)
            .map(|(point, grad)| point - grad * step)
            .collect();
        Self { coordinates }
    }

    /// True when every coordinate component is finite.
    pub fn is_finite(&self) -> bool {
        self.coordinates
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// Drops coordinates beyond `num_loci`, for initial models that carry more
    /// loci than the current run needs.
    pub fn truncated(mut self, num_loci: usize) -> Self {
        self.coordinates.truncate(num_loci);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seeding_is_deterministic_per_seed() {
        let a = Model::seeded_random(16, 7);
        let b = Model::seeded_random(16, 7);
        let c = Model::seeded_random(16, 8);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn seeded_coordinates_stay_in_unit_cube() {
        let model = Model::seeded_random(64, 123);
        for p in model.coordinates() {
            assert!((0.0..1.0).contains(&p.x));
            assert!((0.0..1.0).contains(&p.y));
            assert!((0.0..1.0).contains(&p.z));
        }
    }

    #[test]
    fn distance_matches_hand_computation() {
        let model = Model::from_coordinates(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
        ]);
        assert_relative_eq!(model.distance(0, 1), 5.0);
        assert_relative_eq!(model.distance(1, 0), 5.0);
    }

    #[test]
    fn displacement_moves_against_the_gradient() {
        let model = Model::from_coordinates(vec![Point3::new(1.0, 1.0, 1.0)]);
        let gradient = vec![Vector3::new(2.0, 0.0, -4.0)];

        let moved = model.displaced(0.5, &gradient);
        assert_relative_eq!(moved.point(0).x, 0.0);
        assert_relative_eq!(moved.point(0).y, 1.0);
        assert_relative_eq!(moved.point(0).z, 3.0);
    }

    #[test]
    fn truncation_keeps_the_leading_loci() {
        let model = Model::seeded_random(10, 1).truncated(4);
        assert_eq!(model.len(), 4);
        assert_eq!(
            model.point(2),
            Model::seeded_random(10, 1).point(2)
        );
    }

    #[test]
    fn finiteness_check_flags_nan() {
        let good = Model::from_coordinates(vec![Point3::new(0.0, 1.0, 2.0)]);
        let bad = Model::from_coordinates(vec![Point3::new(0.0, f64::NAN, 2.0)]);
        assert!(good.is_finite());
        assert!(!bad.is_finite());
    }
}
