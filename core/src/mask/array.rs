//! Mask arrays with one-shot colorization

use super::decoder::DecodedArray;
use super::dtype::NumericBuffer;

/// Contents of a mask: label ids until colorized, straight RGBA after
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskData {
    Labels(NumericBuffer),
    Rgba(Vec<u8>),
}

/// A decoded mask owned by exactly one overlay.
///
/// Colorization is destructive: the label ids are replaced by the RGBA
/// buffer the first time [`MaskArray::colorize`] runs and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskArray {
    shape: Vec<usize>,
    data: MaskData,
}

impl MaskArray {
    pub fn new(shape: Vec<usize>, data: NumericBuffer) -> Self {
        Self {
            shape,
            data: MaskData::Labels(data),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &MaskData {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.shape.get(1).copied().unwrap_or(1)
    }

    /// True once the label ids have been replaced by pixel colors
    pub fn is_rendered(&self) -> bool {
        matches!(self.data, MaskData::Rgba(_))
    }

    /// Label id at pixel (x, y), if still available
    pub fn label_at(&self, x: usize, y: usize) -> Option<i64> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        match &self.data {
            MaskData::Labels(labels) => labels.get(y * self.width() + x),
            MaskData::Rgba(_) => None,
        }
    }

    /// True if pixel (x, y) is foreground (non-zero label or visible color)
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }
        let i = y * self.width() + x;
        match &self.data {
            MaskData::Labels(labels) => labels.get(i).is_some_and(|l| l != 0),
            MaskData::Rgba(rgba) => rgba.get(i * 4 + 3).is_some_and(|&a| a > 0),
        }
    }

    /// Translate label ids to RGBA using `color_of`, once.
    ///
    /// Returns `true` if the translation ran, `false` if the mask was
    /// already colorized or its shape cannot be addressed.
    pub fn colorize<F>(&mut self, mut color_of: F) -> bool
    where
        F: FnMut(i64) -> [u8; 4],
    {
        let MaskData::Labels(labels) = &self.data else {
            return false;
        };

        let Some(len) = self
            .width()
            .checked_mul(self.height())
            .and_then(|count| count.checked_mul(4))
        else {
            return false;
        };
        let mut rgba = vec![0u8; len];
        for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
            let label = labels.get(i).unwrap_or(0);
            px.copy_from_slice(&color_of(label));
        }

        self.data = MaskData::Rgba(rgba);
        true
    }

    /// Colorized pixels, if available
    pub fn rgba(&self) -> Option<&[u8]> {
        match &self.data {
            MaskData::Rgba(rgba) => Some(rgba),
            MaskData::Labels(_) => None,
        }
    }
}

impl From<DecodedArray> for MaskArray {
    fn from(decoded: DecodedArray) -> Self {
        MaskArray::new(decoded.shape, decoded.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MaskArray {
        MaskArray::new(vec![2, 2], NumericBuffer::U8(vec![0, 1, 2, 0]))
    }

    #[test]
    fn test_colorize_runs_once() {
        let mut mask = sample();
        let mut calls = 0;
        assert!(mask.colorize(|l| {
            calls += 1;
            [l as u8, 0, 0, 255]
        }));
        assert!(mask.is_rendered());
        assert!(!mask.colorize(|_| [9, 9, 9, 9]));
        assert_eq!(calls, 4);
        assert_eq!(&mask.rgba().unwrap()[4..8], &[1, 0, 0, 255]);
    }

    #[test]
    fn test_is_set_before_and_after_colorize() {
        let mut mask = sample();
        assert!(!mask.is_set(0, 0));
        assert!(mask.is_set(1, 0));
        assert_eq!(mask.label_at(0, 1), Some(2));

        mask.colorize(|l| if l == 0 { [0, 0, 0, 0] } else { [255, 0, 0, 255] });
        assert!(!mask.is_set(0, 0));
        assert!(mask.is_set(0, 1));
        assert_eq!(mask.label_at(0, 1), None);
    }

    #[test]
    fn test_colorize_unaddressable_shape() {
        let mut mask = MaskArray::new(vec![usize::MAX, 2], NumericBuffer::U8(vec![1]));
        assert!(!mask.colorize(|_| [1, 1, 1, 1]));
        assert!(!mask.is_rendered());
    }
}
