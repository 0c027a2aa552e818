//! Crate-level error type for provider setup.
//!
//! [`KernelError`] is carried inside an [`error_stack::Report`] so each
//! setup step can attach context on the way up. Data-source reads do not
//! use it; they report through [`crate::diag::Diagnostics`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use meshform_kernel::config::load_provider_config;
//! use meshform_kernel::error::KernelResult;
//! use error_stack::ResultExt;
//!
//! fn provider_region(path: &str) -> KernelResult<String> {
//!     let config = load_provider_config(path).attach("starting the provider")?;
//!     Ok(config.region)
//! }
//! ```

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// Provider configuration could not be loaded or is unusable.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Equivalent to `Result<T, error_stack::Report<KernelError>>`.
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;
