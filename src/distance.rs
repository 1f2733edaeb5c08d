use crate::point::Point;

/// A "less distance to point" comparison.
///
/// This is what the cascading search uses to pick, among the vertices of a located face, the one
/// to follow down to the next level. Any closure with the signature
/// `Fn(&Point, &Point, &Point) -> bool` can be used as a comparator.
pub trait DistanceComparator {
    /// Returns `true` if `a` is strictly closer to `reference` than `b` is.
    fn closer(&self, a: &Point, b: &Point, reference: &Point) -> bool;
}

/// Comparison of Euclidean distances (computed squared, so without any square root).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Euclidean;

impl DistanceComparator for Euclidean {
    fn closer(&self, a: &Point, b: &Point, reference: &Point) -> bool {
        a.squared_distance(reference) < b.squared_distance(reference)
    }
}

impl<F> DistanceComparator for F
where
    F: Fn(&Point, &Point, &Point) -> bool,
{
    fn closer(&self, a: &Point, b: &Point, reference: &Point) -> bool {
        self(a, b, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_comparison() {
        let reference = Point::new(0., 0.);
        let near = Point::new(1., 1.);
        let far = Point::new(2., 0.);

        assert!(Euclidean.closer(&near, &far, &reference));
        assert!(!Euclidean.closer(&far, &near, &reference));
    }

    #[test]
    fn equidistant_points_are_not_closer() {
        let reference = Point::new(0., 0.);
        let a = Point::new(1., 0.);
        let b = Point::new(0., -1.);

        assert!(!Euclidean.closer(&a, &b, &reference));
        assert!(!Euclidean.closer(&b, &a, &reference));
    }

    #[test]
    fn closure_as_comparator() {
        // Manhattan distance
        let manhattan = |a: &Point, b: &Point, r: &Point| {
            (a.x() - r.x()).abs() + (a.y() - r.y()).abs()
                < (b.x() - r.x()).abs() + (b.y() - r.y()).abs()
        };
        let reference = Point::new(0., 0.);

        // Euclidean and Manhattan disagree on these two
        let a = Point::new(1.5, 0.);
        let b = Point::new(1., 1.);

        assert!(manhattan.closer(&a, &b, &reference));
        assert!(Euclidean.closer(&b, &a, &reference));
    }
}
