use crate::coords::Rect;
use crate::texture::TextureSize;

/// One textured quad: `src` of `texture` (whole texture when `None`) drawn
/// into `dst`, both in pixels.
#[derive(Debug)]
pub struct SpriteDraw<'t, T> {
    pub texture: &'t T,
    pub dst: Rect,
    pub src: Option<Rect>,
}

impl<T> Clone for SpriteDraw<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SpriteDraw<'_, T> {}

impl<T: TextureSize> SpriteDraw<'_, T> {
    /// Normalized texture coordinates `[u0, v0, u1, v1]` of the source rect.
    pub fn uv(&self) -> [f32; 4] {
        let (tw, th) = self.texture.size();
        let Some(src) = self.src else { return [0.0, 0.0, 1.0, 1.0] };
        if tw == 0 || th == 0 {
            return [0.0; 4];
        }

        let (tw, th) = (tw as f32, th as f32);
        [
            src.x as f32 / tw,
            src.y as f32 / th,
            src.right() as f32 / tw,
            src.bottom() as f32 / th,
        ]
    }
}

/// Textured quads recorded for one frame, drawn in push order.
#[derive(Debug)]
pub struct SpriteBatch<'t, T> {
    draws: Vec<SpriteDraw<'t, T>>,
}

impl<T> Default for SpriteBatch<'_, T> {
    fn default() -> Self {
        Self { draws: Vec::new() }
    }
}

impl<'t, T> SpriteBatch<'t, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a draw. Empty destinations are dropped.
    pub fn push(&mut self, texture: &'t T, dst: Rect, src: Option<Rect>) {
        if dst.is_empty() || src.is_some_and(Rect::is_empty) {
            return;
        }
        self.draws.push(SpriteDraw { texture, dst, src });
    }

    #[inline]
    pub fn draws(&self) -> &[SpriteDraw<'t, T>] {
        &self.draws
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tex(u32, u32);

    impl TextureSize for Tex {
        fn size(&self) -> (u32, u32) {
            (self.0, self.1)
        }
    }

    #[test]
    fn push_keeps_order_and_drops_empty() {
        let a = Tex(4, 4);
        let b = Tex(8, 8);
        let mut batch = SpriteBatch::new();

        batch.push(&a, Rect::new(0, 0, 10, 10), None);
        batch.push(&b, Rect::new(5, 5, 0, 10), None);
        batch.push(&b, Rect::new(5, 5, 3, 3), Some(Rect::new(0, 0, 0, 1)));
        batch.push(&b, Rect::new(1, 2, 3, 4), None);

        assert_eq!(batch.len(), 2);
        assert!(std::ptr::eq(batch.draws()[0].texture, &a));
        assert!(std::ptr::eq(batch.draws()[1].texture, &b));
    }

    #[test]
    fn whole_texture_uv() {
        let t = Tex(200, 100);
        let d = SpriteDraw { texture: &t, dst: Rect::new(0, 0, 1, 1), src: None };
        assert_eq!(d.uv(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn clip_uv_is_normalized() {
        let t = Tex(200, 200);
        let d = SpriteDraw {
            texture: &t,
            dst: Rect::new(0, 0, 100, 100),
            src: Some(Rect::new(100, 0, 100, 100)),
        };
        assert_eq!(d.uv(), [0.5, 0.0, 1.0, 0.5]);
    }
}
