//! GenzFact Core Library
//!
//! Collects a text query and/or an uploaded file, forwards it to a hosted
//! generative model with a fixed instruction, and renders the structured
//! misinformation report with coloured verification badges.

pub mod analysis;
pub mod badge;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod render;
pub mod request;

pub use analysis::{AnalysisOutcome, AnalysisReport, Analyzer};
pub use badge::{Badge, BadgeFormatter, BadgePalette};
pub use config::{ConfigOverrides, GenzConfig};
pub use error::{GenzError, GenzResult};
pub use model::{Credentials, ModelClient, VertexClient};
pub use query::{Query, Upload};
pub use request::Part;
