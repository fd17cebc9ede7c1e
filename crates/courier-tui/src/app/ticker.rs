//! Once-a-second status ticker.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::scheduler::UiMessage;
use super::state::RunFlag;

/// Spawn a task that enqueues [`UiMessage::StatusTick`] every `period` while
/// `running` holds. It stops for good the first time it reads false or the
/// channel closes.
pub fn spawn_status_ticker(
    running: RunFlag,
    tx: mpsc::Sender<UiMessage>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            if !running.is_running() {
                break;
            }
            match tx.try_send(UiMessage::StatusTick) {
                // A backed-up loop will repaint the status on the next tick anyway
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => break,
            }
        }
        tracing::debug!("Status ticker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_until_stopped() {
        let (tx, mut rx) = mpsc::channel(8);
        let running = RunFlag::new();
        let handle = spawn_status_ticker(running.clone(), tx, Duration::from_millis(10));

        assert!(matches!(rx.recv().await, Some(UiMessage::StatusTick)));

        running.stop();
        handle.await.unwrap();
        while rx.try_recv().is_ok() {}
        assert!(rx.try_recv().is_err());
    }
}
