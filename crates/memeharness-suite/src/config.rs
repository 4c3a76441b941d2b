//! Fixed suite configuration.
//!
//! The harness targets a single known endpoint; there is no
//! environment-driven configuration in the core. Hermetic runs swap the
//! base URL for a [`crate::service::MockMemeService`] instance instead.

/// The live meme service endpoint.
pub const BASE_URL: &str = "http://memesapi.course.qa-practice.com";

/// Username the suite authorizes as.
pub const USERNAME: &str = "test_user";
