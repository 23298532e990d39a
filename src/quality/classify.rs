use crate::quality::error::AirQualityError;
use crate::quality::tier::Tier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive lower bound at which a tier starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub lower: f64,
    pub tier: Tier,
}

/// Ordered lookup table mapping concentrations to tiers.
///
/// Bounds are stored lowest first. The first bound is always `0.0`, so every
/// valid concentration falls into exactly one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryTable {
    bounds: Vec<Boundary>,
}

impl BoundaryTable {
    /// Builds a table from `(lower_bound, tier)` pairs given lowest first.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::InvalidTable`] if the table is empty, does not
    /// start at `0.0`, contains a non-finite bound, or if bounds or tiers are
    /// not strictly ascending.
    pub fn new(pairs: &[(f64, Tier)]) -> Result<Self, AirQualityError> {
        let Some(&(first, _)) = pairs.first() else {
            return Err(AirQualityError::InvalidTable("no boundaries".into()));
        };
        if first != 0.0 {
            return Err(AirQualityError::InvalidTable(format!(
                "lowest boundary must be 0, got {first}"
            )));
        }

        for pair in pairs.windows(2) {
            let (lo, lo_tier) = pair[0];
            let (hi, hi_tier) = pair[1];
            if !hi.is_finite() || hi <= lo {
                return Err(AirQualityError::InvalidTable(format!(
                    "boundary {hi} does not follow {lo}"
                )));
            }
            if hi_tier <= lo_tier {
                return Err(AirQualityError::InvalidTable(format!(
                    "tier {hi_tier} does not follow {lo_tier}"
                )));
            }
        }

        Ok(Self {
            bounds: pairs
                .iter()
                .map(|&(lower, tier)| Boundary { lower, tier })
                .collect(),
        })
    }

    /// Canonical PM2.5 table (µg/m³).
    ///
    /// | Range          | Tier      |
    /// |----------------|-----------|
    /// | >= 250.5       | Peligroso |
    /// | >= 150.5       | Muy Alto  |
    /// | >= 55.5        | Alto      |
    /// | >= 35.5        | Regular   |
    /// | >= 12.1        | Moderado  |
    /// | < 12.1         | Bueno     |
    pub fn pm25() -> Self {
        Self::from_static(&[
            (0.0, Tier::Bueno),
            (12.1, Tier::Moderado),
            (35.5, Tier::Regular),
            (55.5, Tier::Alto),
            (150.5, Tier::MuyAlto),
            (250.5, Tier::Peligroso),
        ])
    }

    /// PM10 table (µg/m³) used by the station reports.
    pub fn pm10() -> Self {
        Self::from_static(&[
            (0.0, Tier::Bueno),
            (12.1, Tier::Moderado),
            (54.0, Tier::Alto),
            (154.0, Tier::MuyAlto),
        ])
    }

    /// Ozone table (ppm).
    pub fn o3() -> Self {
        Self::from_static(&[
            (0.0, Tier::Bueno),
            (0.055, Tier::Moderado),
            (0.085, Tier::Alto),
            (0.125, Tier::MuyAlto),
        ])
    }

    /// Nitrogen dioxide table (ppm).
    pub fn no2() -> Self {
        Self::from_static(&[
            (0.0, Tier::Bueno),
            (0.1, Tier::Moderado),
            (0.18, Tier::Alto),
            (0.36, Tier::MuyAlto),
        ])
    }

    // Built-in tables are known to be ordered.
    fn from_static(pairs: &[(f64, Tier)]) -> Self {
        Self {
            bounds: pairs
                .iter()
                .map(|&(lower, tier)| Boundary { lower, tier })
                .collect(),
        }
    }

    /// Classifies a concentration against this table.
    ///
    /// Bounds are tested from highest to lowest; a value sitting exactly on a
    /// bound belongs to the higher tier.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::InvalidInput`] for negative or non-finite values.
    pub fn classify(&self, value: f64) -> Result<Tier, AirQualityError> {
        if !value.is_finite() || value < 0.0 {
            return Err(AirQualityError::InvalidInput(value));
        }

        let tier = self
            .bounds
            .iter()
            .rev()
            .find(|b| b.lower <= value)
            .unwrap_or(&self.bounds[0])
            .tier;

        Ok(tier)
    }
}

impl Default for BoundaryTable {
    fn default() -> Self {
        Self::pm25()
    }
}

/// Classifies a PM2.5 concentration using the canonical table.
pub fn classify(value: f64) -> Result<Tier, AirQualityError> {
    BoundaryTable::pm25().classify(value)
}

/// Pollutants with a known boundary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm25,
    Pm10,
    O3,
    No2,
}

impl Pollutant {
    pub fn table(self) -> BoundaryTable {
        match self {
            Pollutant::Pm25 => BoundaryTable::pm25(),
            Pollutant::Pm10 => BoundaryTable::pm10(),
            Pollutant::O3 => BoundaryTable::o3(),
            Pollutant::No2 => BoundaryTable::no2(),
        }
    }

    /// Monitor type as reported by the backend.
    pub fn monitor_type(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::No2 => "NO2",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.monitor_type())
    }
}

impl FromStr for Pollutant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PM2.5" | "PM25" => Ok(Pollutant::Pm25),
            "PM10" => Ok(Pollutant::Pm10),
            "O3" => Ok(Pollutant::O3),
            "NO2" => Ok(Pollutant::No2),
            other => Err(anyhow::anyhow!("unknown pollutant '{other}'")),
        }
    }
}

/// Classifies a value for a backend monitor type.
///
/// Returns `Ok(None)` when the monitor type has no boundary table.
pub fn classify_monitor(monitor_type: &str, value: f64) -> Result<Option<Tier>, AirQualityError> {
    match monitor_type.parse::<Pollutant>() {
        Ok(pollutant) => pollutant.table().classify(value).map(Some),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pm25_boundaries() {
        assert_eq!(classify(0.0).unwrap(), Tier::Bueno);
        assert_eq!(classify(12.099999).unwrap(), Tier::Bueno);
        assert_eq!(classify(12.1).unwrap(), Tier::Moderado);
        assert_eq!(classify(35.4).unwrap(), Tier::Moderado);
        assert_eq!(classify(35.5).unwrap(), Tier::Regular);
        assert_eq!(classify(55.4).unwrap(), Tier::Regular);
        assert_eq!(classify(55.5).unwrap(), Tier::Alto);
        assert_eq!(classify(150.4).unwrap(), Tier::Alto);
        assert_eq!(classify(150.5).unwrap(), Tier::MuyAlto);
        assert_eq!(classify(250.4).unwrap(), Tier::MuyAlto);
        assert_eq!(classify(250.5).unwrap(), Tier::Peligroso);
        assert_eq!(classify(1000.0).unwrap(), Tier::Peligroso);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(classify(-1.0), Err(AirQualityError::InvalidInput(-1.0)));
        assert!(matches!(
            classify(f64::NAN),
            Err(AirQualityError::InvalidInput(_))
        ));
        assert!(classify(f64::INFINITY).is_err());
        assert!(classify(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_negative_zero_is_lowest_tier() {
        assert_eq!(classify(-0.0).unwrap(), Tier::Bueno);
    }

    #[test]
    fn test_rank_is_monotonic() {
        let table = BoundaryTable::pm25();
        let mut previous = table.classify(0.0).unwrap();
        let mut v = 0.0;
        while v < 400.0 {
            let current = table.classify(v).unwrap();
            assert!(previous.rank() <= current.rank(), "rank dropped at {v}");
            previous = current;
            v += 0.05;
        }
    }

    #[test]
    fn test_custom_table_validation() {
        assert!(BoundaryTable::new(&[]).is_err());
        assert!(BoundaryTable::new(&[(1.0, Tier::Bueno)]).is_err());
        assert!(BoundaryTable::new(&[(0.0, Tier::Bueno), (0.0, Tier::Alto)]).is_err());
        assert!(BoundaryTable::new(&[(0.0, Tier::Alto), (5.0, Tier::Bueno)]).is_err());
        assert!(BoundaryTable::new(&[(0.0, Tier::Bueno), (f64::NAN, Tier::Alto)]).is_err());

        let table = BoundaryTable::new(&[(0.0, Tier::Bueno), (10.0, Tier::Peligroso)]).unwrap();
        assert_eq!(table.classify(9.9).unwrap(), Tier::Bueno);
        assert_eq!(table.classify(10.0).unwrap(), Tier::Peligroso);
    }

    #[test]
    fn test_other_pollutant_tables() {
        assert_eq!(BoundaryTable::pm10().classify(53.9).unwrap(), Tier::Moderado);
        assert_eq!(BoundaryTable::pm10().classify(154.0).unwrap(), Tier::MuyAlto);
        assert_eq!(BoundaryTable::o3().classify(0.085).unwrap(), Tier::Alto);
        assert_eq!(BoundaryTable::no2().classify(0.05).unwrap(), Tier::Bueno);
    }

    #[test]
    fn test_classify_monitor() {
        assert_eq!(classify_monitor("PM2.5", 40.0).unwrap(), Some(Tier::Regular));
        assert_eq!(classify_monitor("NO2", 0.4).unwrap(), Some(Tier::MuyAlto));
        assert_eq!(classify_monitor("CO", 3.0).unwrap(), None);
        assert!(classify_monitor("PM10", -3.0).is_err());
    }

    #[test]
    fn test_pollutant_parsing() {
        assert_eq!("pm2.5".parse::<Pollutant>().unwrap(), Pollutant::Pm25);
        assert_eq!("PM25".parse::<Pollutant>().unwrap(), Pollutant::Pm25);
        assert_eq!("no2".parse::<Pollutant>().unwrap(), Pollutant::No2);
        assert!("SO2".parse::<Pollutant>().is_err());
    }
}
