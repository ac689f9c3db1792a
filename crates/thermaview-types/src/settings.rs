//! Display settings read at render time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ephemeral display parameters for one render call.
///
/// These mirror the viewer's UI controls and are re-read for every frame;
/// nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplaySettings {
    /// Inclusive lower bound of the color-mapped region (device units).
    /// Cells below it render black.
    pub min_range: u8,
    /// Inclusive upper bound of the color-mapped region (device units).
    /// Cells above it render white.
    pub max_range: u8,
    /// Mark the coldest in-range cell with an outlined square and its value.
    pub mark_min: bool,
    /// Mark the hottest in-range cell with an outlined square and its value.
    pub mark_max: bool,
    /// Render flat 34x34 cell blocks instead of the bicubic-smoothed image.
    pub raw_mode: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            min_range: 0,
            max_range: 100,
            mark_min: false,
            mark_max: false,
            raw_mode: false,
        }
    }
}

impl DisplaySettings {
    /// Create a builder for constructing `DisplaySettings`.
    pub fn builder() -> DisplaySettingsBuilder {
        DisplaySettingsBuilder::default()
    }

    /// Whether the range bounds are inverted (`min_range > max_range`).
    ///
    /// An inverted range is not an error: classification degrades to every
    /// cell being out of range, colored consistently black or white.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.min_range > self.max_range
    }
}

/// Builder for constructing `DisplaySettings`.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct DisplaySettingsBuilder {
    settings: DisplaySettings,
}

impl DisplaySettingsBuilder {
    /// Set the lower color-range bound.
    pub fn min_range(mut self, min_range: u8) -> Self {
        self.settings.min_range = min_range;
        self
    }

    /// Set the upper color-range bound.
    pub fn max_range(mut self, max_range: u8) -> Self {
        self.settings.max_range = max_range;
        self
    }

    /// Enable or disable the coldest-point marker.
    pub fn mark_min(mut self, mark_min: bool) -> Self {
        self.settings.mark_min = mark_min;
        self
    }

    /// Enable or disable the hottest-point marker.
    pub fn mark_max(mut self, mark_max: bool) -> Self {
        self.settings.mark_max = mark_max;
        self
    }

    /// Select blocky raw rendering instead of bicubic smoothing.
    pub fn raw_mode(mut self, raw_mode: bool) -> Self {
        self.settings.raw_mode = raw_mode;
        self
    }

    /// Build the `DisplaySettings`.
    #[must_use]
    pub fn build(self) -> DisplaySettings {
        self.settings
    }
}
