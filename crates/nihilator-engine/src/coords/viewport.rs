use super::Rect;

/// Render-target size in pixels.
///
/// Renderers use this as the basis for converting pixel positions to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn bounds(self) -> Rect {
        Rect::from_size(self.width, self.height)
    }
}

/// The three fixed sub-regions the screen is split into.
///
/// Top row holds two half-width regions side by side; the bottom region spans
/// the full width. Computed once from the screen size and never mutated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewports {
    pub top_left: Rect,
    pub top_right: Rect,
    pub bottom: Rect,
}

impl Viewports {
    /// Splits a `width` x `height` screen.
    ///
    /// Integer halves: for odd sizes the last column of the top row and the
    /// last row of the screen stay uncovered.
    pub const fn split(width: u32, height: u32) -> Self {
        let half_w = width / 2;
        let half_h = height / 2;
        Self {
            top_left: Rect::new(0, 0, half_w, half_h),
            top_right: Rect::new(half_w as i32, 0, half_w, half_h),
            bottom: Rect::new(0, half_h as i32, width, half_h),
        }
    }

    /// Draw order: top-left, top-right, bottom.
    pub fn iter(&self) -> impl Iterator<Item = Rect> {
        [self.top_left, self.top_right, self.bottom].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_640x480_matches_fixed_layout() {
        let v = Viewports::split(640, 480);
        assert_eq!(v.top_left, Rect::new(0, 0, 320, 240));
        assert_eq!(v.top_right, Rect::new(320, 0, 320, 240));
        assert_eq!(v.bottom, Rect::new(0, 240, 640, 240));
    }

    #[test]
    fn viewports_partition_even_screen() {
        for (w, h) in [(640, 480), (2, 2), (1920, 1080), (100, 40)] {
            let v = Viewports::split(w, h);
            let screen = Viewport::new(w, h).bounds();

            let total: u64 = v.iter().map(Rect::area).sum();
            assert_eq!(total, screen.area(), "{w}x{h} area");

            let rects: Vec<Rect> = v.iter().collect();
            for (i, a) in rects.iter().enumerate() {
                assert_eq!(a.intersect(screen), Some(*a), "{w}x{h} rect {i} inside screen");
                for b in &rects[i + 1..] {
                    assert!(a.intersect(*b).is_none(), "{w}x{h} overlap {a:?} {b:?}");
                }
            }
        }
    }

    #[test]
    fn odd_screen_leaves_last_row_uncovered() {
        let v = Viewports::split(641, 481);
        assert_eq!(v.bottom, Rect::new(0, 240, 641, 240));
        assert!(v.iter().all(|r| r.bottom() <= 480));
    }

    #[test]
    fn viewport_validity() {
        assert!(Viewport::new(1, 1).is_valid());
        assert!(!Viewport::new(0, 480).is_valid());
    }
}
