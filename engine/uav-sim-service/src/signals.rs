//! Signal handling for graceful shutdown

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::info;

use simulation_controller::StopSignal;

/// Raise `stop` on SIGINT or SIGTERM.
///
/// The controller polls the signal and shuts the loops down in order. A second
/// signal while the first is still pending terminates the process.
pub fn register_stop_signals(stop: &StopSignal) -> Result<()> {
    let flag = stop.flag();

    for signal in [SIGINT, SIGTERM] {
        // registered first so it sees the flag before this signal sets it
        signal_hook::flag::register_conditional_shutdown(signal, 1, flag.clone())
            .with_context(|| format!("Failed to register forced shutdown for signal {}", signal))?;
        signal_hook::flag::register(signal, flag.clone())
            .with_context(|| format!("Failed to register handler for signal {}", signal))?;
    }

    info!("Signal handlers configured");
    Ok(())
}
