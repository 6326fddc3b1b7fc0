use serde::Deserialize;

use crate::error::{Error, Result};
use crate::utils::kph_to_meters_per_minute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walk,
    Bike,
    Drive,
}

impl std::str::FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "walk" => Ok(TransportMode::Walk),
            "bike" => Ok(TransportMode::Bike),
            "drive" => Ok(TransportMode::Drive),
            _ => Err(Error::InvalidConfig(format!("unknown transport mode {s:?}"))),
        }
    }
}

/// Travel speeds per transport mode, in km/h.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModeSpeeds {
    #[serde(default = "default_walk_kph")]
    pub walk: f64,
    #[serde(default = "default_bike_kph")]
    pub bike: f64,
    #[serde(default = "default_drive_kph")]
    pub drive: f64,
}

impl Default for ModeSpeeds {
    fn default() -> Self {
        Self {
            walk: default_walk_kph(),
            bike: default_bike_kph(),
            drive: default_drive_kph(),
        }
    }
}

impl ModeSpeeds {
    pub fn kph(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walk => self.walk,
            TransportMode::Bike => self.bike,
            TransportMode::Drive => self.drive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IsochroneConfig {
    /// Default time budget in minutes
    #[serde(default = "default_time_budget")]
    pub time_budget: f64,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default)]
    pub speeds: ModeSpeeds,
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            time_budget: default_time_budget(),
            fill_color: default_fill_color(),
            speeds: ModeSpeeds::default(),
        }
    }
}

fn default_time_budget() -> f64 {
    15.0
}

fn default_fill_color() -> String {
    "orange".to_string()
}

fn default_walk_kph() -> f64 {
    4.5
}

fn default_bike_kph() -> f64 {
    15.0
}

fn default_drive_kph() -> f64 {
    50.0
}

impl IsochroneConfig {
    /// Parses a JSON config; missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: IsochroneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_budget.is_nan() || self.time_budget < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "time_budget must be non-negative, got {}",
                self.time_budget
            )));
        }
        for (name, kph) in [
            ("walk", self.speeds.walk),
            ("bike", self.speeds.bike),
            ("drive", self.speeds.drive),
        ] {
            if !kph.is_finite() || kph <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} speed must be positive, got {kph}"
                )));
            }
        }
        Ok(())
    }

    pub fn meters_per_minute(&self, mode: TransportMode) -> f64 {
        kph_to_meters_per_minute(self.speeds.kph(mode))
    }
}
