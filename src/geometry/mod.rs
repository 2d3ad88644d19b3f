//! Affine transforms in PDF user space.
//!
//! PDF matrices are written `[a b c d e f]` and map row vectors:
//! `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.

/// A 3x2 affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f64,
    /// Horizontal skew component
    pub b: f64,
    /// Vertical skew component
    pub c: f64,
    /// Vertical scaling component
    pub d: f64,
    /// Horizontal translation
    pub e: f64,
    /// Vertical translation
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// The identity transform.
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Build a matrix from its six components.
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build from an operand slice of length six, if every entry is present.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    /// `self × other`: apply `self` first, then `other`.
    ///
    /// With PDF's row-vector convention `Tm.multiply(&ctm)` yields the text
    /// rendering matrix (ignoring font size and rise).
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_seal::geometry::Matrix;
    ///
    /// let scaled = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
    /// let m = Matrix::translation(10.0, 5.0).multiply(&scaled);
    /// assert_eq!(m.apply(0.0, 0.0), (20.0, 10.0));
    /// ```
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    /// Length of the transformed unit x vector.
    pub fn horizontal_scale(&self) -> f64 {
        self.a.hypot(self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_apply() {
        assert_eq!(Matrix::identity().apply(3.0, 4.0), (3.0, 4.0));
    }

    #[test]
    fn test_translation_then_scale() {
        let scale = Matrix::new(0.5, 0.0, 0.0, 0.5, 0.0, 0.0);
        let m = Matrix::translation(100.0, 200.0).multiply(&scale);
        assert_eq!(m.apply(0.0, 0.0), (50.0, 100.0));
    }

    #[test]
    fn test_scale_then_translation() {
        let scale = Matrix::new(0.5, 0.0, 0.0, 0.5, 0.0, 0.0);
        let m = scale.multiply(&Matrix::translation(100.0, 200.0));
        assert_eq!(m.apply(10.0, 10.0), (105.0, 205.0));
    }

    #[test]
    fn test_horizontal_scale_rotated() {
        let rotated = Matrix::new(0.0, 3.0, -3.0, 0.0, 0.0, 0.0);
        assert!((rotated.horizontal_scale() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_slice() {
        assert!(Matrix::from_slice(&[1.0, 0.0, 0.0, 1.0, 5.0]).is_none());
        let m = Matrix::from_slice(&[1.0, 0.0, 0.0, 1.0, 5.0, 6.0]).unwrap();
        assert_eq!(m, Matrix::translation(5.0, 6.0));
    }
}
