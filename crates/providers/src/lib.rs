//! HTTP implementations of the core provider traits.
//!
//! Each client carries its own bounded request timeout from config; a
//! timeout is mapped to [`ProviderFailure::Timeout`] and handled by the
//! caller's fallback path like any other provider fault.

pub mod advice;
pub mod market;
pub mod weather;

use cropwise_core::providers::ProviderFailure;

pub use advice::HttpAdviceProvider;
pub use market::HttpMarketProvider;
pub use weather::HttpWeatherProvider;

pub(crate) fn map_request_error(error: reqwest::Error) -> ProviderFailure {
    if error.is_timeout() {
        ProviderFailure::Timeout
    } else if error.is_decode() {
        ProviderFailure::Decode(error.to_string())
    } else {
        ProviderFailure::Http(error.to_string())
    }
}
