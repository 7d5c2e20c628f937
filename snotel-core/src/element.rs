use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A measured variable, identified on the wire by its AWDB element code.
///
/// See: <https://wcc.sc.egov.usda.gov/awdbRestApi/swagger-ui/index.html>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Snow water equivalent, inches.
    #[serde(rename = "WTEQ")]
    SnowWaterEquivalent,
    /// Snow depth, inches.
    #[serde(rename = "SNWD")]
    SnowDepth,
    /// Accumulated precipitation since October 1, inches.
    #[serde(rename = "PREC")]
    PrecipitationAccumulation,
    /// Daily average air temperature, degrees Fahrenheit.
    #[serde(rename = "TAVG")]
    AirTemperatureAverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element code {0:?} (expected one of WTEQ, SNWD, PREC, TAVG)")]
pub struct UnknownElement(pub String);

impl Element {
    pub const ALL: [Element; 4] = [
        Element::SnowWaterEquivalent,
        Element::SnowDepth,
        Element::PrecipitationAccumulation,
        Element::AirTemperatureAverage,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Element::SnowWaterEquivalent => "WTEQ",
            Element::SnowDepth => "SNWD",
            Element::PrecipitationAccumulation => "PREC",
            Element::AirTemperatureAverage => "TAVG",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Element::AirTemperatureAverage => "degF",
            _ => "in",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Element::SnowWaterEquivalent => "snow water equivalent",
            Element::SnowDepth => "snow depth",
            Element::PrecipitationAccumulation => "precipitation accumulation",
            Element::AirTemperatureAverage => "average air temperature",
        }
    }
}

impl FromStr for Element {
    type Err = UnknownElement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Element::ALL
            .into_iter()
            .find(|element| element.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownElement(code.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
