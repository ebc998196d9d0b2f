//! Climate figures for the home page

use serde::Serialize;

/// Headline global warming statistics.
///
/// The values are fixed editorial content, not computed or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalWarmingData {
    pub temperature_rise: &'static str,
    pub sea_level_rise: &'static str,
    pub co2_levels: &'static str,
}

impl GlobalWarmingData {
    pub const fn current() -> Self {
        Self {
            temperature_rise: "1.1°C",
            sea_level_rise: "20cm",
            co2_levels: "419 ppm",
        }
    }
}

impl Default for GlobalWarmingData {
    fn default() -> Self {
        Self::current()
    }
}
