//! Axis-aligned page rectangles

use crate::types::Rotation;

/// Rectangle in page space.
///
/// `width` and `height` always track `right - left` and `top - bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PageRect {
    fn default() -> Self {
        Self::unset()
    }
}

impl PageRect {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
            width: right - left,
            height: top - bottom,
        }
    }

    /// Rectangle with every field NaN, for partial updates through [`PageRect::set`]
    pub fn unset() -> Self {
        Self {
            left: f32::NAN,
            bottom: f32::NAN,
            right: f32::NAN,
            top: f32::NAN,
            width: f32::NAN,
            height: f32::NAN,
        }
    }

    /// Rotate the rectangle counter-clockwise by `r` inside a `pwidth` × `pheight`
    /// page and move it back into the positive quadrant.
    pub fn rotate_move(&mut self, r: Rotation, pwidth: f32, pheight: f32) {
        let (mut pwidth, mut pheight) = (pwidth, pheight);

        if matches!(r, Rotation::Rot180 | Rotation::Rot270) {
            std::mem::swap(&mut self.top, &mut self.bottom);
            std::mem::swap(&mut self.left, &mut self.right);
        }
        if r.is_quarter() {
            let tmp = self.bottom;
            self.bottom = self.left;
            self.left = self.top;
            self.top = self.right;
            self.right = tmp;

            std::mem::swap(&mut self.width, &mut self.height);
            std::mem::swap(&mut pwidth, &mut pheight);
        }
        if matches!(r, Rotation::Rot90 | Rotation::Rot180) {
            self.left = pwidth - self.left;
            self.right = pwidth - self.right;
        }
        if matches!(r, Rotation::Rot270 | Rotation::Rot180) {
            self.top = pheight - self.top;
            self.bottom = pheight - self.bottom;
        }
    }

    pub fn scale(&mut self, mult: f32) {
        if mult == 1.0 {
            return;
        }
        self.left *= mult;
        self.bottom *= mult;
        self.right *= mult;
        self.top *= mult;
        self.width *= mult;
        self.height *= mult;
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.left += tx;
        self.bottom += ty;
        self.right += tx;
        self.top += ty;
    }

    /// Copy every field of `rhs` that is not NaN
    pub fn set(&mut self, rhs: &PageRect) {
        fn take(dst: &mut f32, src: f32) {
            if !src.is_nan() {
                *dst = src;
            }
        }
        take(&mut self.left, rhs.left);
        take(&mut self.bottom, rhs.bottom);
        take(&mut self.right, rhs.right);
        take(&mut self.top, rhs.top);
        take(&mut self.width, rhs.width);
        take(&mut self.height, rhs.height);
    }

    pub fn dump(&self, name: &str) {
        log::debug!(
            "{}: left={} bottom={} right={} top={} width={} height={}",
            name,
            self.left,
            self.bottom,
            self.right,
            self.top,
            self.width,
            self.height
        );
    }
}
