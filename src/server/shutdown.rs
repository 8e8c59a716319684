//! SIGTERM/SIGINT handling
//!
//! `main` waits on [`wait_for_signal`] next to the controller stream and then
//! fans the shutdown out to the other tasks through a watch channel.

use tokio::sync::watch;
use tracing::info;

/// Receiving half of the shutdown channel, cloned into each task
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered or the controller was dropped
    pub async fn wait(&mut self) {
        // wait_for only errors when the sender is gone, which also means shutdown
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }

    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Sending half of the shutdown channel, owned by `main`
pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn shutdown(&self) {
        self.sender.send_replace(true);
        info!("Shutdown signal sent");
    }
}

pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownController { sender }, ShutdownSignal { receiver })
}

/// Block until SIGTERM or SIGINT arrives and return its name
#[cfg(unix)]
pub async fn wait_for_signal() -> Result<&'static str, std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!(signal = received, "Received termination signal");
    Ok(received)
}

/// Block until Ctrl+C arrives
#[cfg(not(unix))]
pub async fn wait_for_signal() -> Result<&'static str, std::io::Error> {
    tokio::signal::ctrl_c().await?;
    info!(signal = "CTRL_C", "Received termination signal");
    Ok("CTRL_C")
}
