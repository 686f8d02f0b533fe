use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;
use crate::jwk::{Algorithm, JWK};
use crate::jws::Header;
use crate::key::SigningKeyMaterial;

// RFC 7519 - JSON Web Token (JWT)

pub fn encode_sign<Claims: Serialize>(
    algorithm: Algorithm,
    claims: &Claims,
    key: &SigningKeyMaterial,
    key_id: Option<String>,
) -> Result<String, Error> {
    let payload = serde_json::to_string(claims)?;
    let header = Header {
        algorithm,
        key_id,
        type_: Some("JWT".to_string()),
        ..Default::default()
    };
    crate::jws::encode_sign_custom_header(&payload, key, &header)
}

pub fn decode_verify<Claims: DeserializeOwned>(jwt: &str, key: &JWK) -> Result<Claims, Error> {
    let (_header, payload) = crate::jws::decode_verify(jwt, key)?;
    let claims = serde_json::from_slice(&payload)?;
    Ok(claims)
}

pub fn decode_unverified<Claims: DeserializeOwned>(jwt: &str) -> Result<Claims, Error> {
    let (_header, payload) = crate::jws::decode_unverified(jwt)?;
    let claims = serde_json::from_slice(&payload)?;
    Ok(claims)
}

/// Represents NumericDate (see <https://datatracker.ietf.org/doc/html/rfc7519#section-2>)
/// where the range is restricted to those in which microseconds can be exactly represented,
/// which is approximately between the years 1685 and 2255.  Note that leap seconds are
/// ignored by this type, just as they're ignored by NumericDate in the JWT standard.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, PartialOrd)]
pub struct NumericDate(#[serde(serialize_with = "interop_serialize")] f64);

/// As many JWT libraries only accept integers, this serializer aims for a
/// middle ground by serializing a date as an integer if it does not have
/// fractional seconds. Otherwise a trailing `.0` is always present.
fn interop_serialize<S>(x: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if x.fract() != 0.0 {
        s.serialize_f64(*x)
    } else {
        s.serialize_i64(*x as i64)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum NumericDateConversionError {
    #[error("Out of valid microsecond-precision range of NumericDate")]
    OutOfMicrosecondPrecisionRange,
}

impl From<NumericDateConversionError> for Error {
    fn from(_: NumericDateConversionError) -> Self {
        Error::TimeError
    }
}

impl NumericDate {
    /// This is -2^53 / 1_000_000, which is the smallest NumericDate that faithfully
    /// represents full microsecond precision.
    pub const MIN: NumericDate = NumericDate(-9_007_199_254.740_992);
    /// This is 2^53 / 1_000_000, which is the largest NumericDate that faithfully
    /// represents full microsecond precision.
    pub const MAX: NumericDate = NumericDate(9_007_199_254.740_992);

    /// Return the f64-valued number of seconds represented by this NumericDate.
    pub fn as_seconds(self) -> f64 {
        self.0
    }

    /// Try to create NumericDate from a f64 value, returning error upon out-of-range.
    pub fn try_from_seconds(seconds: f64) -> Result<Self, NumericDateConversionError> {
        if seconds.is_nan() || seconds.abs() > Self::MAX.0 {
            Err(NumericDateConversionError::OutOfMicrosecondPrecisionRange)
        } else {
            Ok(NumericDate(seconds))
        }
    }

    /// Whole-second NumericDate for `date_time`, dropping any sub-second part.
    pub fn truncated(date_time: DateTime<Utc>) -> Result<Self, NumericDateConversionError> {
        Self::try_from_seconds(date_time.timestamp() as f64)
    }

    /// Adds `duration`, returning `None` if the result leaves the valid range.
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let date_time = DateTime::<Utc>::try_from(self).ok()?;
        let sum = date_time.checked_add_signed(duration)?;
        Self::try_from(sum).ok()
    }

    /// Decompose NumericDate for use in Utc.timestamp_opt
    fn into_whole_seconds_and_fractional_nanoseconds(self) -> (i64, u32) {
        let whole_seconds = self.0.floor() as i64;
        let fractional_nanoseconds = ((self.0 - self.0.floor()) * 1_000_000_000.0).floor() as u32;
        (whole_seconds, fractional_nanoseconds.min(999_999_999))
    }
}

impl TryFrom<DateTime<Utc>> for NumericDate {
    type Error = NumericDateConversionError;
    fn try_from(dtu: DateTime<Utc>) -> Result<Self, Self::Error> {
        // Have to take seconds and nanoseconds separately in order to get the full allowable
        // range of microsecond-precision values as described above.
        let whole_seconds = dtu.timestamp() as f64;
        let fractional_seconds = dtu.timestamp_subsec_nanos() as f64 * 1.0e-9;
        Self::try_from_seconds(whole_seconds + fractional_seconds)
    }
}

impl TryFrom<NumericDate> for DateTime<Utc> {
    type Error = NumericDateConversionError;
    fn try_from(nd: NumericDate) -> Result<Self, Self::Error> {
        let (whole_seconds, fractional_nanoseconds) =
            nd.into_whole_seconds_and_fractional_nanoseconds();
        Utc.timestamp_opt(whole_seconds, fractional_nanoseconds)
            .single()
            .ok_or(NumericDateConversionError::OutOfMicrosecondPrecisionRange)
    }
}
