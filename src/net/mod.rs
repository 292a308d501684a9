//! Network helpers
//!
//! Local subnet detection and the runtime primitives the probes build on.

mod subnet;
mod tokio_impl;

#[cfg(test)]
mod tests;

pub use subnet::{SubnetContext, is_site_local};
pub use tokio_impl::*;

use std::future::Future;

/// Runtime abstraction for common operations
pub struct Runtime;

impl Runtime {
    /// Run a future with a timeout
    ///
    /// # Errors
    ///
    /// Returns `NasError::Timeout` if the future does not complete within the specified duration.
    pub async fn timeout<F, T>(duration: std::time::Duration, future: F) -> crate::Result<T>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(duration, future)
            .await
            .map_err(|_| crate::NasError::Timeout)
    }
}
