//! 2D affine transforms in PDF `[a b c d e f]` form

use crate::types::Rotation;
use std::fmt;
use std::ops::{Mul, MulAssign};

/// Affine matrix mapping `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
///
/// All mutating operations apply the new transform *before* the existing one,
/// the way PDF `cm` operators accumulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    ctm: [f64; 6],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn identity() -> Self {
        Self {
            ctm: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        }
    }

    pub fn from_array(ctm: [f64; 6]) -> Self {
        Self { ctm }
    }

    pub fn as_array(&self) -> [f64; 6] {
        self.ctm
    }

    /// Rotate counter-clockwise by a quarter-turn multiple
    pub fn rotate(&mut self, rot: Rotation) -> &mut Self {
        let [a, b, c, d, _, _] = self.ctm;
        match rot {
            Rotation::Rot0 => {}
            Rotation::Rot90 => {
                self.ctm[0] = c;
                self.ctm[1] = d;
                self.ctm[2] = -a;
                self.ctm[3] = -b;
            }
            Rotation::Rot180 => {
                self.ctm[0] = -a;
                self.ctm[1] = -b;
                self.ctm[2] = -c;
                self.ctm[3] = -d;
            }
            Rotation::Rot270 => {
                self.ctm[0] = -c;
                self.ctm[1] = -d;
                self.ctm[2] = a;
                self.ctm[3] = b;
            }
        }
        self
    }

    /// Rotate counter-clockwise by an arbitrary angle in radians
    pub fn rotate_rad(&mut self, rad: f64) -> &mut Self {
        let (sin, cos) = rad.sin_cos();
        let rotation = Matrix::from_array([cos, sin, -sin, cos, 0.0, 0.0]);
        *self *= rotation;
        self
    }

    /// Translate in the matrix's current basis
    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        self.ctm[4] += self.ctm[0] * tx + self.ctm[2] * ty;
        self.ctm[5] += self.ctm[1] * tx + self.ctm[3] * ty;
        self
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.ctm[0] *= sx;
        self.ctm[1] *= sx;
        self.ctm[2] *= sy;
        self.ctm[3] *= sy;
        self
    }

    pub fn scale_uniform(&mut self, s: f64) -> &mut Self {
        self.scale(s, s)
    }

    /// Map a point through the transform
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.ctm;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    /// `lhs * rhs` applies `rhs` first, then `lhs`.
    fn mul(self, rhs: Matrix) -> Matrix {
        let l = self.ctm;
        let r = rhs.ctm;
        Matrix {
            ctm: [
                l[0] * r[0] + l[2] * r[1],
                l[1] * r[0] + l[3] * r[1],
                l[0] * r[2] + l[2] * r[3],
                l[1] * r[2] + l[3] * r[3],
                l[0] * r[4] + l[2] * r[5] + l[4],
                l[1] * r[4] + l[3] * r[5] + l[5],
            ],
        }
    }
}

impl MulAssign for Matrix {
    fn mul_assign(&mut self, rhs: Matrix) {
        *self = *self * rhs;
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ctm.iter().map(|v| format_number(*v)).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Format a number for content streams: at most five decimals, no trailing zeros.
pub fn format_number(value: f64) -> String {
    let text = format!("{:.5}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        _ => text.to_string(),
    }
}
