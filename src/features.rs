//! Feature contract between the form and the trained model.
//!
//! The model was fit on exactly these columns, in exactly this order, with the
//! raw numeric values and one-hot categoricals. Retraining with different
//! columns means updating [`FEATURE_NAMES`], [`FeatureVector::to_array`] and
//! [`FEATURE_SCHEMA_VERSION`] together.

use serde::Serialize;

use crate::types::{PropertyType, RawInputs, Region};

pub const FEATURE_SCHEMA_VERSION: u32 = 1;

pub const N_FEATURES: usize = 12;

/// Column names as they appear in the training data.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "Rooms",
    "Distance",
    "Postcode",
    "Bedroom2",
    "Bathroom",
    "Lattitude",
    "Longtitude",
    "Landsize",
    "Type_t",
    "Type_u",
    "Regionname_Northern Metropolitan",
    "Regionname_Southern Metropolitan",
];

/// One-hot pair for a single categorical choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OneHot(pub u8, pub u8);

impl OneHot {
    pub fn sum(self) -> u8 {
        self.0 + self.1
    }
}

impl From<PropertyType> for OneHot {
    // columns: Type_t, Type_u
    fn from(t: PropertyType) -> Self {
        match t {
            PropertyType::House => OneHot(1, 0),
            PropertyType::Unit => OneHot(0, 1),
        }
    }
}

impl From<Region> for OneHot {
    // columns: Northern, Southern
    fn from(r: Region) -> Self {
        match r {
            Region::NorthernMetropolitan => OneHot(1, 0),
            Region::SouthernMetropolitan => OneHot(0, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub rooms: f32,
    pub distance: f32,
    pub postcode: f32,
    pub bedroom2: f32,
    pub bathroom: f32,
    pub latitude: f32,
    pub longitude: f32,
    pub landsize: f32,
    pub property_type: OneHot,
    pub region: OneHot,
}

impl FeatureVector {
    /// Builds the vector from submitted inputs. Numbers pass through untouched.
    pub fn encode(inputs: &RawInputs) -> Self {
        Self {
            rooms: inputs.rooms as f32,
            distance: inputs.distance as f32,
            postcode: inputs.postcode as f32,
            bedroom2: inputs.bedroom2 as f32,
            bathroom: inputs.bathroom as f32,
            latitude: inputs.latitude as f32,
            longitude: inputs.longitude as f32,
            landsize: inputs.landsize as f32,
            property_type: inputs.property_type.into(),
            region: inputs.region.into(),
        }
    }

    /// The ordered array the model consumes, matching [`FEATURE_NAMES`].
    pub fn to_array(&self) -> [f32; N_FEATURES] {
        [
            self.rooms,
            self.distance,
            self.postcode,
            self.bedroom2,
            self.bathroom,
            self.latitude,
            self.longitude,
            self.landsize,
            self.property_type.0 as f32,
            self.property_type.1 as f32,
            self.region.0 as f32,
            self.region.1 as f32,
        ]
    }
}

pub fn encode(inputs: &RawInputs) -> FeatureVector {
    FeatureVector::encode(inputs)
}
