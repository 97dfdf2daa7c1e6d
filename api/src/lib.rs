//! Backend client for the img2map georeferencing service.
//!
//! DESIGN
//! ======
//! Thin async wrapper over the backend REST API. `GeorefBackend` is the seam
//! the editor session talks to; `ApiClient` is the reqwest implementation and
//! tests substitute their own. Response bodies are decoded by pure functions
//! in `client` so they can be tested on fixtures without a server.
//!
//! | Module   | Contents                                        |
//! |----------|-------------------------------------------------|
//! | `config` | `ApiConfig::from_env`, timeouts                 |
//! | `types`  | `ApiError`, wire models, `GeorefBackend` trait  |
//! | `client` | `ApiClient` and response parsing                |

pub mod client;
pub mod config;
pub mod types;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use types::{ApiError, GeorefBackend, NewMarkerPair, PointInfo, ProjectId, ProjectInfo};
