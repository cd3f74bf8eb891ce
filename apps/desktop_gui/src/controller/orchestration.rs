//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` without blocking the UI thread. Returns `false` and explains
/// the problem in `status` when the worker cannot take it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "backend command queue full");
            *status = "Command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            *status =
                "Backend worker is not running (possible startup failure); restart the app"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn queued_command_reaches_worker() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, BackendCommand::CheckHealth, &mut status));
        assert!(matches!(rx.try_recv(), Ok(BackendCommand::CheckHealth)));
        assert!(status.is_empty());
    }

    #[test]
    fn full_queue_is_reported() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, BackendCommand::CheckHealth, &mut status));
        assert!(!dispatch_backend_command(&tx, BackendCommand::CheckHealth, &mut status));
        assert!(status.contains("full"));
    }

    #[test]
    fn disconnected_worker_is_reported() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(&tx, BackendCommand::CheckHealth, &mut status));
        assert!(status.contains("not running"));
    }
}
