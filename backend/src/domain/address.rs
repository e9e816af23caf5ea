//! Saved addresses and great-circle distances between coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AddressId, City, UserId, UserValidationError};

/// Mean Earth radius used for Haversine distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Maximum number of characters in an address label or street.
pub const ADDRESS_FIELD_MAX: usize = 200;

/// Validation errors for address input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("latitude must be between -90 and 90")]
    LatitudeOutOfRange { value: f64 },
    #[error("longitude must be between -180 and 180")]
    LongitudeOutOfRange { value: f64 },
    #[error(transparent)]
    City(#[from] UserValidationError),
}

impl AddressValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
            Self::LatitudeOutOfRange { .. } => "latitude",
            Self::LongitudeOutOfRange { .. } => "longitude",
            Self::City(inner) => inner.field(),
        }
    }
}

/// WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AddressValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AddressValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AddressValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Haversine distance to `other` in kilometres, rounded to one decimal.
    ///
    /// # Examples
    /// ```
    /// use khedma::domain::Coordinates;
    ///
    /// let casablanca = Coordinates::new(33.5731, -7.5898).expect("valid");
    /// let rabat = Coordinates::new(34.0209, -6.8416).expect("valid");
    /// assert_eq!(casablanca.distance_km(&rabat), 85.2);
    /// ```
    pub fn distance_km(&self, other: &Self) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
    }
}

/// Address saved by a user and referenced by their jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub street: String,
    pub city: City,
    pub neighbourhood: Option<String>,
    #[serde(flatten)]
    pub location: Coordinates,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new address.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressDraft {
    pub label: String,
    pub street: String,
    pub city: City,
    pub neighbourhood: Option<String>,
    pub location: Coordinates,
}

fn required(value: &str, field: &'static str) -> Result<String, AddressValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AddressValidationError::Empty { field });
    }
    if trimmed.chars().count() > ADDRESS_FIELD_MAX {
        return Err(AddressValidationError::TooLong {
            field,
            max: ADDRESS_FIELD_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

impl AddressDraft {
    /// Validate raw address fields.
    pub fn new(
        label: &str,
        street: &str,
        city: &str,
        neighbourhood: Option<&str>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, AddressValidationError> {
        let neighbourhood = neighbourhood
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| required(value, "neighbourhood"))
            .transpose()?;
        Ok(Self {
            label: required(label, "label")?,
            street: required(street, "street")?,
            city: City::new(city)?,
            neighbourhood,
            location: Coordinates::new(latitude, longitude)?,
        })
    }

    /// Materialise the address for `owner`.
    pub fn into_address(
        self,
        owner: UserId,
        is_default: bool,
        now: DateTime<Utc>,
    ) -> Address {
        Address {
            id: AddressId::random(),
            user_id: owner,
            label: self.label,
            street: self.street,
            city: self.city,
            neighbourhood: self.neighbourhood,
            location: self.location,
            is_default,
            created_at: now,
        }
    }
}
