//! Main run loop for the dashboard
//!
//! Wires the scheduler to the render loop. The render loop is the only code
//! that touches the terminal; it never performs I/O beyond reading the latest
//! already-fetched snapshot, so a slow or failing backend can never stall a
//! redraw or a keypress.

use crate::{
    event::{self, is_quit_event, is_refresh_event, AppEvent},
    scheduler, terminal, ui,
};
use opsdash_core::{DashConfig, DashError, Result};
use opsdash_sources::SourceAdapter;
use std::sync::Arc;
use std::time::Duration;

/// Main entry point for running the dashboard
pub async fn run(config: DashConfig) -> Result<()> {
    let sources = opsdash_sources::build_sources(&config);
    run_with_sources(sources, Arc::new(config)).await
}

/// Run the dashboard against an explicit source list
pub async fn run_with_sources(
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: Arc<DashConfig>,
) -> Result<()> {
    // Initialize terminal; failure here is fatal, the display is unusable.
    let mut terminal = terminal::init()?;

    // Guard restores the terminal even if the loop below panics.
    let _guard = terminal::TerminalGuard::new();

    // Background refreshes start immediately; the first snapshot lands in the
    // watch slot as soon as the first cycle's barrier is crossed.
    let handle = scheduler::spawn(sources, config);
    let mut snapshot_rx = handle.snapshot_rx.clone();

    loop {
        // Latest snapshot only; intermediate ones may be skipped if a draw
        // was slow. Staleness, not queuing, is the backpressure strategy.
        let snapshot = snapshot_rx.borrow_and_update().clone();
        terminal
            .draw(|frame| ui::draw(frame, &snapshot))
            .map_err(|e| DashError::Terminal(format!("draw failed: {}", e)))?;

        match event::poll_event(Duration::from_millis(100))? {
            Some(AppEvent::Key(key)) => {
                if is_quit_event(key) {
                    break;
                } else if is_refresh_event(key) {
                    handle.request_refresh();
                }
            }
            Some(AppEvent::Resize(_, _)) => {
                // Relayout happens on the next draw at the new width; the
                // refresh request is coalesced if a cycle is already running.
                handle.request_refresh();
            }
            Some(AppEvent::Tick) | None => {}
        }
    }

    // Stop the timer and abandon in-flight fetches.
    handle.shutdown();

    terminal::restore()?;

    Ok(())
}
