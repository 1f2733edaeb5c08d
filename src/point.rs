use itertools::Itertools;

/// A point of the 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    x: f64,
    y: f64,
}

impl From<&Point> for [f64; 2] {
    fn from(val: &Point) -> Self {
        [val.x, val.y]
    }
}

impl From<Point> for [f64; 2] {
    fn from(val: Point) -> Self {
        (&val).into()
    }
}

impl From<&[f64; 2]> for Point {
    fn from(value: &[f64; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Self::from(&value)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Positioning of a `Point` with respect to a line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Positioning {
    Left,
    On,
    Right,
}

impl Point {
    /// Creates a new point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Returns `true` if both coordinates are finite (neither infinite nor NaN).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean distance to `other`.
    pub fn squared_distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Tests if a point is Left|On|Right of an infinite 2D line defined by two points.
    pub fn position<T>(&self, p1: T, p2: T) -> Positioning
    where
        T: Into<[f64; 2]>,
    {
        let Self { x: x0, y: y0 } = self;
        let [x1, y1] = p1.into();
        let [x2, y2] = p2.into();
        let det = (x2 - x1) * (y0 - y1) - (x0 - x1) * (y2 - y1);
        if det > 0. {
            Positioning::Left
        } else if det < 0. {
            Positioning::Right
        } else {
            Positioning::On
        }
    }

    /// Tests if a point lies strictly inside the circle through `a`, `b` and `c`.
    ///
    /// The three points must be given in counter-clockwise order.
    pub fn is_in_circle<T>(&self, a: T, b: T, c: T) -> bool
    where
        T: Into<[f64; 2]>,
    {
        let Self { x, y } = self;
        let [xa, ya] = a.into();
        let [xb, yb] = b.into();
        let [xc, yc] = c.into();
        let (adx, ady) = (xa - x, ya - y);
        let (bdx, bdy) = (xb - x, yb - y);
        let (cdx, cdy) = (xc - x, yc - y);
        let det = (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
            + (bdx * bdx + bdy * bdy) * (cdx * ady - adx * cdy)
            + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady);
        det > 0.
    }

    /// Tests if a point lies strictly between `p1` and `p2`, assuming the three points are collinear.
    pub fn is_strictly_between<T>(&self, p1: T, p2: T) -> bool
    where
        T: Into<[f64; 2]>,
    {
        let Self { x: x0, y: y0 } = self;
        let [x1, y1] = p1.into();
        let [x2, y2] = p2.into();
        let from_p1 = (x0 - x1) * (x2 - x1) + (y0 - y1) * (y2 - y1);
        let from_p2 = (x0 - x2) * (x1 - x2) + (y0 - y2) * (y1 - y2);
        from_p1 > 0. && from_p2 > 0.
    }

    /// Computes the winding number for a [`Point`] in a polygon (defined by a slice of [`Point`]s).
    ///
    /// This number can be:
    /// - `0` if the [`Point`] is not inside the polygon
    /// - `> 0` if the [`Point`] is inside the polygon and the polygon "winds" at least once around the [`Point`] counter-clockwise
    /// - `< 0` if the [`Point`] is inside the polygon and the polygon "winds" at least once around the [`Point`] clockwise
    ///
    /// For more information, see <https://web.archive.org/web/20130126163405/http://geomalgorithms.com/a03-_inclusion.html>.
    pub fn wn<I>(&self, poly: I) -> isize
    where
        I: IntoIterator,
        <I as IntoIterator>::IntoIter: Clone,
        <I as IntoIterator>::IntoIter: ExactSizeIterator,
        <I as IntoIterator>::Item: Into<[f64; 2]>,
        <I as IntoIterator>::Item: Clone,
    {
        let mut wn = 0;
        for (a, b) in poly.into_iter().circular_tuple_windows() {
            let [_, ya] = a.clone().into();
            let [_, yb] = b.clone().into();
            if ya <= self.y {
                // `a` is below self
                if yb > self.y {
                    // an upward crossing
                    if matches!(self.position(a, b), Positioning::Left) {
                        wn += 1;
                    }
                }
            } else {
                // `a` is above self
                if yb <= self.y {
                    // a downward crossing
                    if matches!(self.position(a, b), Positioning::Right) {
                        wn -= 1;
                    }
                }
            }
        }
        wn
    }

    /// Returns `true` if the point is inside the input polygon.
    pub fn is_inside<I>(&self, poly: I) -> bool
    where
        I: IntoIterator,
        <I as IntoIterator>::IntoIter: Clone,
        <I as IntoIterator>::IntoIter: ExactSizeIterator,
        <I as IntoIterator>::Item: Into<[f64; 2]>,
        <I as IntoIterator>::Item: Clone,
    {
        self.wn(poly) != 0
    }
}
