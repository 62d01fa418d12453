//! Country lookup backed by libphonenumber metadata

use phonenumber::PhoneNumber;

use sr_core::{BoxError, CountryResolver};

/// Errors raised while resolving a destination's region
#[derive(Debug, thiserror::Error)]
pub enum CountryLookupError {
    #[error("Unparseable phone number: {0}")]
    Parse(#[from] phonenumber::ParseError),

    #[error("Calling code +{0} does not map to a single region")]
    UnknownRegion(u16),
}

/// Resolves E.164 destinations to their ISO alpha-2 region
///
/// Numbers without a leading `+` cannot be attributed to a region and fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneNumberCountryResolver;

impl PhoneNumberCountryResolver {
    pub fn new() -> Self {
        Self
    }

    /// Region code for `destination`
    pub fn lookup(&self, destination: &str) -> Result<String, CountryLookupError> {
        let number: PhoneNumber = destination.trim().parse()?;
        match number.country().id() {
            Some(id) => Ok(format!("{:?}", id)),
            None => Err(CountryLookupError::UnknownRegion(number.code().value())),
        }
    }
}

impl CountryResolver for PhoneNumberCountryResolver {
    fn region_code(&self, destination: &str) -> Result<String, BoxError> {
        Ok(self.lookup(destination)?)
    }
}
