//! # opsdash-dashboard
//!
//! Refresh scheduling and terminal rendering for opsdash.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  OPSDASH   updated 09:15:23              [q]uit [r]efresh    │
//! ├───────────────────────────────────────────────┬──────────────┤
//! │  Google Analytics data for blog               │ Active users │
//! │  PAGE           METRIC     VALUE              │ 42           │
//! ├──────────────────────┬───────────────────────┬┴──────────────┤
//! │ Travis builds for a  │ Travis builds for b   │ Jenkins …     │
//! │ REPO BRANCH STATE …  │ REPO BRANCH STATE …   │ JOB STATE …   │
//! └──────────────────────┴───────────────────────┴───────────────┘
//! ```
//!
//! The scheduler fans one concurrent fetch task out per enabled source each
//! tick, waits for all of them at a barrier, and publishes an immutable
//! snapshot through a single-slot channel. The render loop consumes only the
//! latest snapshot and is the sole owner of the terminal.

mod scheduler;

pub use scheduler::{run_cycle, spawn, SchedulerHandle};

mod layout;

pub use layout::{build_layout, PanelSlot};

mod widgets;

pub use widgets::{row_color, ActiveUsersWidget, PanelTableWidget};

mod event;
mod terminal;
mod ui;
mod run;

pub use event::{is_quit_event, is_refresh_event, poll_event, AppEvent};
pub use run::{run, run_with_sources};
