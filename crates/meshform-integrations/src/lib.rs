//! Meshform Integrations - SDK-backed clients for the kernel contracts
//!
//! # Features
//!
//! | Feature | What it enables |
//! |---------|-----------------|
//! | `aws`   | `aws-sdk-appmesh` client implementing `AppMeshApi` (default) |
//!
//! # App Mesh quick-start
//!
//! ```rust,no_run
//! # #[cfg(feature = "aws")]
//! # async fn _doc() {
//! use meshform_integrations::appmesh::connect;
//! use meshform_kernel::ProviderConfig;
//!
//! let config = ProviderConfig::new("us-west-2", "111122223333");
//! let client = connect(&config).await.unwrap();
//! assert_eq!(client.account_id(), "111122223333");
//! # }
//! ```

#[cfg(feature = "aws")]
pub mod appmesh;
