//! Marketplace catalogue endpoints.

use reqwest::Method;
use tracing::warn;

use super::types::{Constraints, HardwareOptions, Offer};
use super::{ApiError, FluenceClient};

const COUNTRIES: &str = "marketplace/v3/countries";
const HARDWARE: &str = "marketplace/v3/hardware";
const OFFERS: &str = "marketplace/offers";

impl FluenceClient {
    /// Lists country codes with available capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn countries(&self) -> Result<Vec<String>, ApiError> {
        self.get(COUNTRIES).await
    }

    /// Like [`Self::countries`] but yields an empty list on failure.
    pub async fn countries_or_empty(&self) -> Vec<String> {
        self.countries().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not fetch available countries");
            Vec::new()
        })
    }

    /// Lists the hardware catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn hardware(&self) -> Result<HardwareOptions, ApiError> {
        self.get(HARDWARE).await
    }

    /// Like [`Self::hardware`] but yields an empty catalogue on failure.
    pub async fn hardware_or_empty(&self) -> HardwareOptions {
        self.hardware().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not fetch hardware options");
            HardwareOptions::default()
        })
    }

    /// Searches offers matching the given constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn offers(&self, constraints: &Constraints) -> Result<Vec<Offer>, ApiError> {
        self.request(Method::POST, OFFERS, Some(constraints)).await
    }
}
