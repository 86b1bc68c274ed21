//! tracker-notify - agent session observer
//!
//! Reads the hosting runtime's event stream from stdin (one JSON event per
//! line), tracks task lifecycles per session, and reports start/finish to
//! the agent-tracker client plus a turn-complete notification to the
//! configured notifier. Only active inside tmux: without `TMUX_PANE` the
//! process exits immediately and produces no behavior.

use tokio::io::{AsyncBufReadExt, BufReader};

use tracker_notify::config::PluginConfig;
use tracker_notify::context::TmuxContext;
use tracker_notify::dispatch::ProcessDispatcher;
use tracker_notify::events::HostEvent;
use tracker_notify::fetch::HttpMessageSource;
use tracker_notify::lifecycle::TaskTracker;
use tracker_notify::logging::init_logging;

#[tokio::main]
async fn main() {
    let config = PluginConfig::load();
    init_logging(&config.logging);

    // Explicit precondition, not an error: outside tmux the plugin is inert.
    let Some(pane) = std::env::var("TMUX_PANE")
        .ok()
        .filter(|p| !p.trim().is_empty())
    else {
        tracing::info!("TMUX_PANE not set, tracker-notify is inert");
        return;
    };

    let ctx = TmuxContext::resolve(&pane).await;
    tracing::debug!(?ctx, "resolved tmux context");

    let dispatcher = ProcessDispatcher::new(&config.tracker, &config.notifier);
    let source = HttpMessageSource::new(&config.api);
    let mut tracker = TaskTracker::new(ctx, dispatcher, source, &config.retry);

    // Clear any task left open by an abrupt previous termination before
    // touching new events.
    tracker.reconcile_startup().await;

    // Single logical worker: each event is handled to completion, retries
    // and dispatches included, before the next line is read.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let event = HostEvent::classify_line(&line);
                tracker.handle_event(event).await;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read event stream");
                break;
            }
        }
    }

    tracing::debug!("event stream closed, exiting");
}
