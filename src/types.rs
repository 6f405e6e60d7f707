use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InputError;

/// Property type selection. The trained model only knows these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyType {
    /// House
    #[default]
    #[serde(rename = "Type_t")]
    House,
    /// Unit
    #[serde(rename = "Type_u")]
    Unit,
}

impl PropertyType {
    pub const ALL: [PropertyType; 2] = [PropertyType::House, PropertyType::Unit];

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::House => "Type_t",
            PropertyType::Unit => "Type_u",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    #[serde(rename = "Southern Metropolitan")]
    SouthernMetropolitan,
    #[serde(rename = "Northern Metropolitan")]
    NorthernMetropolitan,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::SouthernMetropolitan, Region::NorthernMetropolitan];

    pub fn label(self) -> &'static str {
        match self {
            Region::SouthernMetropolitan => "Southern Metropolitan",
            Region::NorthernMetropolitan => "Northern Metropolitan",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive bounds of the form controls.
pub mod limits {
    pub const ROOMS: (u32, u32) = (1, 10);
    pub const DISTANCE: (u32, u32) = (1, 100);
    pub const POSTCODE: (u32, u32) = (1000, 9999);
    pub const BEDROOM2: (u32, u32) = (0, 10);
    pub const BATHROOM: (u32, u32) = (0, 10);
    pub const LATITUDE: (f64, f64) = (-90.0, 90.0);
    pub const LONGITUDE: (f64, f64) = (-180.0, 180.0);
}

/// The ten values a user submits, as read from the form or the JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub rooms: u32,
    /// Distance to the CBD in km
    pub distance: u32,
    pub postcode: u32,
    pub bedroom2: u32,
    pub bathroom: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Square meters
    pub landsize: u64,
    pub property_type: PropertyType,
    pub region: Region,
}

impl Default for RawInputs {
    // Every control starts at its minimum, selections at their first option.
    fn default() -> Self {
        Self {
            rooms: limits::ROOMS.0,
            distance: limits::DISTANCE.0,
            postcode: limits::POSTCODE.0,
            bedroom2: limits::BEDROOM2.0,
            bathroom: limits::BATHROOM.0,
            latitude: limits::LATITUDE.0,
            longitude: limits::LONGITUDE.0,
            landsize: 0,
            property_type: PropertyType::default(),
            region: Region::default(),
        }
    }
}

impl RawInputs {
    /// Rejects any field outside the range its control allows.
    pub fn validate(&self) -> Result<(), InputError> {
        check_int("rooms", self.rooms, limits::ROOMS)?;
        check_int("distance", self.distance, limits::DISTANCE)?;
        check_int("postcode", self.postcode, limits::POSTCODE)?;
        check_int("bedroom2", self.bedroom2, limits::BEDROOM2)?;
        check_int("bathroom", self.bathroom, limits::BATHROOM)?;
        check_float("latitude", self.latitude, limits::LATITUDE)?;
        check_float("longitude", self.longitude, limits::LONGITUDE)?;
        Ok(())
    }

    /// Sets `rooms`, refusing values the control could not produce.
    pub fn set_rooms(&mut self, rooms: u32) -> Result<(), InputError> {
        check_int("rooms", rooms, limits::ROOMS)?;
        self.rooms = rooms;
        Ok(())
    }
}

fn check_int(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), InputError> {
    if value < min || value > max {
        return Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

fn check_float(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), InputError> {
    // NaN fails both comparisons, so test containment instead of exclusion
    if !(min..=max).contains(&value) {
        return Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Response body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOut {
    pub predicted_price: f32,
}
