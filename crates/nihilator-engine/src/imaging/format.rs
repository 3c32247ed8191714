use super::surface::PixelFormat;

/// Lookup-only view of a render target's pixel layout.
///
/// The render target that produced it keeps owning its format; the handle is
/// only read when converting freshly decoded surfaces and is never released by
/// its holder. It stays meaningful for as long as that render target exists.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FormatHandle(PixelFormat);

impl FormatHandle {
    #[inline]
    pub fn format(self) -> PixelFormat {
        self.0
    }
}

/// Layout that decoded surfaces are optimized into.
///
/// First writer wins: the first capture attempt moves the state out of
/// `Unset` and nothing reassigns it afterwards.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TargetFormat {
    #[default]
    Unset,
    Set(FormatHandle),
    /// A render target was seen but its layout has no CPU equivalent.
    Failed,
}

impl TargetFormat {
    /// Records `candidate` if nothing was captured yet.
    ///
    /// `None` marks the attempt as failed. Returns true if this call changed
    /// the state.
    pub fn capture(&mut self, candidate: Option<PixelFormat>) -> bool {
        if *self != TargetFormat::Unset {
            return false;
        }
        *self = match candidate {
            Some(format) => TargetFormat::Set(FormatHandle(format)),
            None => TargetFormat::Failed,
        };
        true
    }

    /// Captures from a GPU render target's format.
    pub fn capture_wgpu(&mut self, format: wgpu::TextureFormat) -> bool {
        let changed = self.capture(PixelFormat::from_wgpu(format));
        if changed && *self == TargetFormat::Failed {
            log::warn!("render target format {format:?} has no CPU layout; loads stay unconverted");
        }
        changed
    }

    #[inline]
    pub fn get(&self) -> Option<PixelFormat> {
        match self {
            TargetFormat::Set(handle) => Some(handle.format()),
            TargetFormat::Unset | TargetFormat::Failed => None,
        }
    }

    #[inline]
    pub fn is_unset(&self) -> bool {
        *self == TargetFormat::Unset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let t = TargetFormat::default();
        assert!(t.is_unset());
        assert_eq!(t.get(), None);
    }

    #[test]
    fn first_writer_wins() {
        let mut t = TargetFormat::default();
        assert!(t.capture(Some(PixelFormat::Bgra8)));
        assert!(!t.capture(Some(PixelFormat::Rgba8)));
        assert_eq!(t.get(), Some(PixelFormat::Bgra8));
    }

    #[test]
    fn failed_attempt_is_final() {
        let mut t = TargetFormat::default();
        assert!(t.capture_wgpu(wgpu::TextureFormat::Rgba16Float));
        assert_eq!(t, TargetFormat::Failed);

        assert!(!t.capture(Some(PixelFormat::Rgba8)));
        assert_eq!(t.get(), None);
    }

    #[test]
    fn wgpu_capture_maps_layout() {
        let mut t = TargetFormat::default();
        t.capture_wgpu(wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(t.get(), Some(PixelFormat::Rgba8));
    }
}
