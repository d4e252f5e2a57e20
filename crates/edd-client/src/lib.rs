//! # edd-client
//!
//! Minimal client for the Easy Digital Downloads Software Licensing API.
//!
//! The whole protocol is a GET against the store root with an
//! `edd_action` query parameter:
//!
//! - `check_license`: is this key currently valid for this site?
//! - `activate_license` / `deactivate_license`: bind or release a site
//! - `get_version`: latest release metadata for the update checker
//!
//! Responses are small JSON objects; see [`LicenseResponse`] and
//! [`VersionInfo`]. The [`StoreApi`] trait is the seam consumers program
//! against; [`EddClient`] is the real transport and [`MockStoreApi`] a
//! scripted stand-in for tests.

mod client;
mod error;
mod mock;
mod types;

pub use client::{EddClient, EddClientBuilder, StoreApi};
pub use error::{EddError, Result};
pub use mock::MockStoreApi;
pub use types::{
    EddAction, ItemRef, LicenseRequest, LicenseResponse, UpdateParams, VersionInfo,
};
