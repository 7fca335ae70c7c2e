//! HTTP surface of the portal
//!
//! This module provides a `PortalBuilder` that assembles:
//! - Server-rendered pages for each portal area
//! - JSON endpoints used by the page scripts
//! - Health routes and static resume downloads

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;
pub mod uploads;
pub mod views;

pub use builder::PortalBuilder;
pub use host::PortalHost;
