//! HSV color bands

use serde::{Deserialize, Serialize};

use crate::error::VisionError;
use crate::indexer::index_of_max;

/// HSV channel, with its valid value domain (OpenCV 8-bit convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Hue,
    Saturation,
    Value,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Hue, Channel::Saturation, Channel::Value];

    /// Largest valid value of the channel
    pub fn max_value(&self) -> i32 {
        match self {
            Channel::Hue => 179,
            Channel::Saturation | Channel::Value => 255,
        }
    }

    /// Number of histogram bins used when profiling the channel
    pub fn bins(&self) -> usize {
        self.max_value() as usize + 1
    }

    pub fn index(&self) -> usize {
        match self {
            Channel::Hue => 0,
            Channel::Saturation => 1,
            Channel::Value => 2,
        }
    }
}

/// Inclusive lower/upper bounds over the three HSV channels.
///
/// Bounds are plain integers so band arithmetic can step outside the channel
/// domain; [`ColorRange::clamped`] brings them back before thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [i32; 3],
    pub upper: [i32; 3],
}

impl ColorRange {
    pub fn new(lower: [i32; 3], upper: [i32; 3]) -> Self {
        Self { lower, upper }
    }

    /// Band of `peak ± width` per channel, without clamping
    pub fn around(peak: [i32; 3], width: i32) -> Self {
        Self {
            lower: peak.map(|p| p - width),
            upper: peak.map(|p| p + width),
        }
    }

    /// Band centered on the histogram peak of every channel.
    ///
    /// `histograms` holds one bin-count slice per channel in H, S, V order.
    /// Returns `None` if any histogram is empty.
    pub fn from_histogram_peaks(histograms: [&[f32]; 3], width: i32) -> Option<Self> {
        let mut peak = [0i32; 3];
        for (slot, hist) in peak.iter_mut().zip(histograms) {
            *slot = index_of_max(hist)? as i32;
        }
        Some(Self::around(peak, width))
    }

    /// Widen the band symmetrically by `margin` on every channel
    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            lower: self.lower.map(|l| l - margin),
            upper: self.upper.map(|u| u + margin),
        }
    }

    /// First channel whose bounds leave the valid domain
    pub fn validate(&self) -> Result<(), VisionError> {
        for channel in Channel::ALL {
            let i = channel.index();
            let max = channel.max_value();
            let (lower, upper) = (self.lower[i], self.upper[i]);
            if lower < 0 || upper > max || lower > upper {
                return Err(VisionError::InvalidColorRange {
                    channel,
                    lower,
                    upper,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Bounds clamped to each channel's domain, with lower never above upper
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for channel in Channel::ALL {
            let i = channel.index();
            let max = channel.max_value();
            out.upper[i] = self.upper[i].clamp(0, max);
            out.lower[i] = self.lower[i].clamp(0, max).min(out.upper[i]);
        }
        out
    }

    /// Whether an HSV triple falls inside the band (bounds inclusive)
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| {
            let v = hsv[i] as i32;
            v >= self.lower[i] && v <= self.upper[i]
        })
    }
}
