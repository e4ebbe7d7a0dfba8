//! # Circles
//!
//! A [`Circle`] is a disk centred on a point whose radius is the obstacle clearance measured at
//! that point, i.e. the largest disk there which is free of obstacles. Chains of overlapping
//! circles make up a [`Corridor`].
//!
//! Whether two circles are "overlapping" depends on a factor `k`: the circles overlap if the
//! distance between their centres is less than `k * (r1 + r2)`. With `k = 1` this is plain
//! geometric overlap, smaller factors demand the circles sit closer together.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A locally obstacle free disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre of the circle in the global map frame
    pub centre_m: Point2<f64>,

    /// Radius of the circle, equal to the obstacle clearance at the centre when it was created.
    pub radius_m: f64,
}

/// A circle along with the search costs it was given by the circle tree search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleNode {
    pub circle: Circle,

    /// Accumulated cost from the search start to this circle
    pub g: f64,

    /// Estimated total cost through this circle, `g` plus the distance to the goal's centre
    pub f: f64,
}

/// An ordered chain of circles running from a start towards a goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub circles: Vec<Circle>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Circle {
    pub fn new(centre_m: Point2<f64>, radius_m: f64) -> Self {
        Self { centre_m, radius_m }
    }

    /// Distance between the centres of `self` and `other`.
    pub fn centre_dist_m(&self, other: &Circle) -> f64 {
        (self.centre_m - other.centre_m).norm()
    }

    /// Returns `true` if the distance between the centres is less than `factor` times the sum of
    /// the radii.
    ///
    /// This is symmetric in `self` and `other`, and two zero radius circles never overlap.
    pub fn overlaps(&self, other: &Circle, factor: f64) -> bool {
        self.centre_dist_m(other) < factor * (self.radius_m + other.radius_m)
    }

    /// Number of children sampled around the boundary of this circle when it is expanded, which is
    /// `floor(density_per_m * radius)`.
    ///
    /// Circles with a zero, negative or non-finite radius have no children.
    pub fn num_expansion_children(&self, density_per_m: f64) -> usize {
        let num = (density_per_m * self.radius_m).floor();

        if num.is_finite() && num > 0.0 {
            num as usize
        } else {
            0
        }
    }
}

impl CircleNode {
    pub fn new(circle: Circle, g: f64, f: f64) -> Self {
        Self { circle, g, f }
    }
}

impl Corridor {
    pub fn new(circles: Vec<Circle>) -> Self {
        Self { circles }
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Circle> {
        self.circles.iter()
    }

    pub fn push(&mut self, circle: Circle) {
        self.circles.push(circle)
    }

    pub fn first(&self) -> Option<&Circle> {
        self.circles.first()
    }

    pub fn last(&self) -> Option<&Circle> {
        self.circles.last()
    }

    /// Indices `i` for which circles `i` and `i + 1` don't overlap under `factor`.
    pub fn gaps(&self, factor: f64) -> Vec<usize> {
        self.circles
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| !pair[0].overlaps(&pair[1], factor))
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns `true` if every consecutive pair of circles overlaps under `factor`.
    pub fn is_continuous(&self, factor: f64) -> bool {
        self.circles
            .windows(2)
            .all(|pair| pair[0].overlaps(&pair[1], factor))
    }
}

impl<'a> IntoIterator for &'a Corridor {
    type Item = &'a Circle;
    type IntoIter = std::slice::Iter<'a, Circle>;

    fn into_iter(self) -> Self::IntoIter {
        self.circles.iter()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn circle(x: f64, y: f64, r: f64) -> Circle {
        Circle::new(Point2::new(x, y), r)
    }

    #[test]
    fn test_overlap() {
        let a = circle(0.0, 0.0, 1.0);
        let b = circle(1.5, 0.0, 1.0);

        assert!(a.overlaps(&b, 1.0));
        assert!(!a.overlaps(&b, 0.5));

        // Touching circles don't overlap
        let c = circle(2.0, 0.0, 1.0);
        assert!(!a.overlaps(&c, 1.0));

        // Zero radius circles never overlap, even when concentric
        let p = circle(3.0, 3.0, 0.0);
        assert!(!p.overlaps(&p, 1.0));
        assert!(!p.overlaps(&p, 100.0));

        // But a point inside a circle does
        assert!(a.overlaps(&circle(0.5, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_overlap_symmetry() {
        let circles = [
            circle(0.0, 0.0, 1.0),
            circle(1.3, -0.7, 0.2),
            circle(-4.1, 2.9, 3.3),
            circle(0.1, 0.1, 0.0),
            circle(1e3, -1e3, 1e-3),
        ];
        let factors = [0.0, 0.1, 0.25, 0.5, 1.0, 2.0];

        for a in circles.iter() {
            for b in circles.iter() {
                for &f in factors.iter() {
                    assert_eq!(a.overlaps(b, f), b.overlaps(a, f));
                }
            }
        }
    }

    #[test]
    fn test_num_expansion_children() {
        assert_eq!(circle(0.0, 0.0, 2.0).num_expansion_children(16.0), 32);
        assert_eq!(circle(0.0, 0.0, 1.99).num_expansion_children(16.0), 31);
        assert_eq!(circle(0.0, 0.0, 0.05).num_expansion_children(16.0), 0);
        assert_eq!(circle(0.0, 0.0, 0.0).num_expansion_children(16.0), 0);
        assert_eq!(circle(0.0, 0.0, -1.0).num_expansion_children(16.0), 0);
        assert_eq!(circle(0.0, 0.0, f64::NAN).num_expansion_children(16.0), 0);
        assert_eq!(circle(0.0, 0.0, f64::INFINITY).num_expansion_children(16.0), 0);

        for i in 0..100 {
            let r = i as f64 * 0.173;
            assert_eq!(
                circle(0.0, 0.0, r).num_expansion_children(16.0),
                (16.0 * r).floor() as usize
            );
        }
    }

    #[test]
    fn test_corridor_gaps() {
        let corridor = Corridor::new(vec![
            circle(0.0, 0.0, 1.0),
            circle(1.5, 0.0, 1.0),
            circle(5.0, 0.0, 1.0),
            circle(5.5, 0.0, 0.6),
        ]);

        assert_eq!(corridor.gaps(1.0), vec![1]);
        assert!(!corridor.is_continuous(1.0));
        assert!(Corridor::new(vec![circle(0.0, 0.0, 1.0)]).is_continuous(1.0));
        assert!(Corridor::default().gaps(1.0).is_empty());
    }
}
