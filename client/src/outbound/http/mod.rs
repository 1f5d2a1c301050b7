//! HTTP adapter for the lunch backend's REST surface.

mod client;
mod dto;

pub use client::{API_KEY_HEADER, EndpointPaths, HttpBackend, HttpBackendConfig};
