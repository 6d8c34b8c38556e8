//! Heuristic pollution source classification.
//!
//! Maps a pollutant profile to a best-guess primary/secondary source
//! pair. Rules are evaluated top-down and the first match wins, so later
//! rules never see inputs an earlier rule already claimed.

/// Source pairing chosen by [`classify_sources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceProfile {
    /// `so2 > 40`.
    Industrial,
    /// `no2 > 80`.
    HeavyTraffic,
    /// `pm10 > 250` with `pm25 < 100`.
    ConstructionDust,
    /// `pm25 > 150`.
    CropBurning,
    /// `pm25 > 80`.
    VehicularTraffic,
    /// Nothing stood out.
    Mixed,
}

impl SourceProfile {
    /// Label for the most probable source.
    #[must_use]
    pub const fn primary(self) -> &'static str {
        match self {
            Self::Industrial => "Industrial Emissions",
            Self::HeavyTraffic => "Heavy Traffic",
            Self::ConstructionDust => "Construction Dust",
            Self::CropBurning => "Crop Burning",
            Self::VehicularTraffic => "Vehicular Traffic",
            Self::Mixed => "Mixed Sources",
        }
    }

    /// Label for the runner-up source.
    #[must_use]
    pub const fn secondary(self) -> &'static str {
        match self {
            Self::Industrial => "Power Plants",
            Self::HeavyTraffic => "Diesel Generators",
            Self::ConstructionDust | Self::VehicularTraffic => "Road Dust",
            Self::CropBurning => "Vehicular Emissions",
            Self::Mixed => "Local Emissions",
        }
    }
}

/// Classifies a pollutant profile. First matching rule wins:
///
/// 1. `so2 > 40` → Industrial Emissions / Power Plants
/// 2. `no2 > 80` → Heavy Traffic / Diesel Generators
/// 3. `pm10 > 250 && pm25 < 100` → Construction Dust / Road Dust
/// 4. `pm25 > 150` → Crop Burning / Vehicular Emissions
/// 5. `pm25 > 80` → Vehicular Traffic / Road Dust
/// 6. otherwise → Mixed Sources / Local Emissions
#[must_use]
pub fn classify_sources(pm25: f64, pm10: f64, no2: f64, so2: f64) -> SourceProfile {
    if so2 > 40.0 {
        SourceProfile::Industrial
    } else if no2 > 80.0 {
        SourceProfile::HeavyTraffic
    } else if pm10 > 250.0 && pm25 < 100.0 {
        SourceProfile::ConstructionDust
    } else if pm25 > 150.0 {
        SourceProfile::CropBurning
    } else if pm25 > 80.0 {
        SourceProfile::VehicularTraffic
    } else {
        SourceProfile::Mixed
    }
}
