//! Weather lookup seam with a simulated, offline implementation.
//!
//! `SimulatedWeather` never touches the network; every city gets the same
//! fixed report, labelled as simulated data.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// City pre-filled in the weather view.
pub const DEFAULT_WEATHER_CITY: &str = "Beijing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    EmptyCity,
}

impl Display for WeatherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCity => write!(f, "city must not be empty"),
        }
    }
}

impl Error for WeatherError {}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_c: i32,
    pub condition: String,
    pub humidity_percent: u8,
    pub wind_kmh: u32,
    /// `true` when the values are not from a live source.
    pub simulated: bool,
}

impl WeatherReport {
    /// Multi-line block shown in the weather output area.
    pub fn to_display_text(&self) -> String {
        let mut text = format!(
            "City: {}\nTemperature: {}°C\nCondition: {}\nHumidity: {}%\nWind: {} km/h",
            self.city, self.temperature_c, self.condition, self.humidity_percent, self.wind_kmh
        );
        if self.simulated {
            text.push_str("\n\n(Simulated data; connect a live weather API for real readings.)");
        }
        text
    }
}

/// Source of weather reports for a city.
pub trait WeatherSource {
    fn lookup(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

/// Offline stand-in returning constant conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWeather;

impl WeatherSource for SimulatedWeather {
    fn lookup(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        Ok(WeatherReport {
            city: city.to_string(),
            temperature_c: 22,
            condition: "Sunny".to_string(),
            humidity_percent: 65,
            wind_kmh: 5,
            simulated: true,
        })
    }
}
