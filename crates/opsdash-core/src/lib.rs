//! # opsdash-core
//!
//! Shared data model, configuration, and error types for opsdash.
//!
//! The flow through the system:
//!
//! ```text
//! timer / resize ─▶ RefreshScheduler ─▶ SourceAdapters (concurrent)
//!                        │                    │
//!                        │              StatusRow + Severity
//!                        │                    │
//!                        └──── PanelBuilder ──┘
//!                                  │
//!                          DashboardSnapshot ─▶ RenderLoop
//! ```
//!
//! This crate owns the middle of that picture: the `StatusRow` model with its
//! status-to-color classification, the panel assembly with the show-all
//! filter, and the immutable `DashboardSnapshot` handed to the render loop.

mod error;

pub use error::{DashError, Result};

mod types;

pub use types::{DashboardSnapshot, Panel, Severity, SourceId, SourceKind, StatusRow};

mod panel;

pub use panel::{row_visible, PanelBuilder};

mod config;

pub use config::{
    AnalyticsConfig, CircleCiConfig, DashConfig, JenkinsConfig, TravisConfig, MIN_INTERVAL_SECS,
};
