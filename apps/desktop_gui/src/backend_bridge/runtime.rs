//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::RecommendationService;
use crossbeam_channel::{Receiver, Sender};
use shared::domain::RequestId;
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::media::decode_preview_image;

const ARTWORK_THUMBNAIL_MAX_DIMENSION: u32 = 300;

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: Arc<dyn RecommendationService>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || run_worker(cmd_rx, ui_tx, service))
}

fn run_worker(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: Arc<dyn RecommendationService>,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(format!(
                "backend worker startup failure: failed to build runtime: {err}"
            )));
            tracing::error!("failed to build backend runtime: {err}");
            return;
        }
    };

    runtime.block_on(async move {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        let mut in_flight: Option<(RequestId, JoinHandle<()>)> = None;
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::Submit { request_id, image } => {
                    if let Some((superseded, task)) = in_flight.take() {
                        if !task.is_finished() {
                            task.abort();
                            tracing::info!(%superseded, %request_id, "cancelled superseded submission");
                        }
                    }

                    let service = Arc::clone(&service);
                    let ui_tx = ui_tx.clone();
                    let task = tokio::spawn(async move {
                        let outcome = service.find_similar(image).await;
                        // A lost resolution would leave the UI in Submitting.
                        let event = UiEvent::SubmissionResolved {
                            request_id,
                            outcome,
                        };
                        if !deliver(ui_tx, event).await {
                            tracing::debug!(%request_id, "ui gone before submission resolved");
                        }
                    });
                    in_flight = Some((request_id, task));
                }
                BackendCommand::FetchArtworkImage { request_id, url } => {
                    let service = Arc::clone(&service);
                    let ui_tx = ui_tx.clone();
                    tokio::spawn(async move {
                        let event = match service.fetch_artwork_image(&url).await {
                            Ok(bytes) => {
                                match decode_preview_image(&bytes, ARTWORK_THUMBNAIL_MAX_DIMENSION) {
                                    Ok(image) => UiEvent::ArtworkImageLoaded {
                                        request_id,
                                        url,
                                        image,
                                    },
                                    Err(reason) => UiEvent::ArtworkImageFailed {
                                        request_id,
                                        url,
                                        reason,
                                    },
                                }
                            }
                            Err(err) => {
                                tracing::warn!(%url, "artwork image download failed: {err:#}");
                                UiEvent::ArtworkImageFailed {
                                    request_id,
                                    url,
                                    reason: format!("Failed to download image: {err}"),
                                }
                            }
                        };
                        // A dropped thumbnail event would leave its card loading.
                        if !deliver(ui_tx, event).await {
                            tracing::debug!(%request_id, "ui gone before artwork image arrived");
                        }
                    });
                }
                BackendCommand::CheckHealth => {
                    let service = Arc::clone(&service);
                    let ui_tx = ui_tx.clone();
                    tokio::spawn(async move {
                        let message = match service.check_health().await {
                            Ok(health) if health.is_healthy() => {
                                "Recommendation service is reachable".to_string()
                            }
                            Ok(health) => format!(
                                "Recommendation service reports '{}': {}",
                                health.status, health.message
                            ),
                            Err(err) => {
                                tracing::warn!("health probe failed: {err:#}");
                                format!("Recommendation service unreachable: {err}")
                            }
                        };
                        let _ = ui_tx.try_send(UiEvent::Info(message));
                    });
                }
            }
        }

        if let Some((request_id, task)) = in_flight.take() {
            task.abort();
            tracing::debug!(%request_id, "aborted in-flight submission on shutdown");
        }
        tracing::debug!("backend worker stopped");
    });
}

/// Waits for room in the UI queue on the blocking pool, keeping runtime
/// workers free while the UI thread is busy. `false` once the UI is gone.
async fn deliver(ui_tx: Sender<UiEvent>, event: UiEvent) -> bool {
    match tokio::task::spawn_blocking(move || ui_tx.send(event).is_ok()).await {
        Ok(delivered) => delivered,
        Err(err) => {
            tracing::error!("ui event delivery task failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use client_core::{ImagePayload, SubmissionFailed, SUBMISSION_FAILED_MESSAGE};
    use crossbeam_channel::bounded;
    use shared::{domain::MatchRecord, protocol::HealthResponse};

    use super::*;
    use crate::media::png_fixture;

    /// Behaviour keyed on the uploaded file name.
    struct FakeService {
        slow_dropped_early: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RecommendationService for FakeService {
        async fn find_similar(
            &self,
            image: ImagePayload,
        ) -> Result<Vec<MatchRecord>, SubmissionFailed> {
            match image.file_name.as_str() {
                "slow.png" => {
                    let flag = DropFlag(Arc::clone(&self.slow_dropped_early));
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    std::mem::forget(flag);
                    Ok(vec![MatchRecord::new("slow", "", "", "u")])
                }
                "broken.png" => Err(SubmissionFailed::new("HTTP 500")),
                _ => Ok(vec![
                    MatchRecord::new("first", "a", "1", "u1"),
                    MatchRecord::new("second", "b", "2", "u2"),
                ]),
            }
        }

        async fn fetch_artwork_image(&self, url: &str) -> Result<Vec<u8>> {
            match url {
                "good" => Ok(png_fixture(600, 300)),
                "garbled" => Ok(b"<html>not an image</html>".to_vec()),
                _ => Err(anyhow!("404 Not Found")),
            }
        }

        async fn check_health(&self) -> Result<HealthResponse> {
            Ok(HealthResponse {
                status: "healthy".to_string(),
                message: "ok".to_string(),
            })
        }
    }

    struct Worker {
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        slow_dropped_early: Arc<AtomicBool>,
    }

    fn start_worker() -> Worker {
        start_worker_with_ui_capacity(64)
    }

    fn start_worker_with_ui_capacity(capacity: usize) -> Worker {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(capacity);
        let slow_dropped_early = Arc::new(AtomicBool::new(false));
        launch(
            cmd_rx,
            ui_tx,
            Arc::new(FakeService {
                slow_dropped_early: Arc::clone(&slow_dropped_early),
            }),
        );
        Worker {
            cmd_tx,
            ui_rx,
            slow_dropped_early,
        }
    }

    fn submit(worker: &Worker, request_id: u64, file_name: &str) {
        worker
            .cmd_tx
            .send(BackendCommand::Submit {
                request_id: RequestId(request_id),
                image: ImagePayload {
                    file_name: file_name.to_string(),
                    mime_type: Some("image/png".to_string()),
                    bytes: vec![1, 2, 3],
                },
            })
            .expect("queue submit");
    }

    /// Skips informational events until something else arrives.
    fn next_event(worker: &Worker, within: Duration) -> Option<UiEvent> {
        let deadline = std::time::Instant::now() + within;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match worker.ui_rx.recv_timeout(remaining) {
                Ok(UiEvent::Info(_)) => continue,
                Ok(event) => return Some(event),
                Err(_) => return None,
            }
        }
    }

    #[test]
    fn submission_result_is_delivered_with_its_request_id() {
        let worker = start_worker();
        submit(&worker, 1, "fast.png");

        match next_event(&worker, Duration::from_secs(5)) {
            Some(UiEvent::SubmissionResolved {
                request_id,
                outcome: Ok(records),
            }) => {
                assert_eq!(request_id, RequestId(1));
                let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
                assert_eq!(titles, vec!["first", "second"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn failed_submission_is_delivered_as_submission_failed() {
        let worker = start_worker();
        submit(&worker, 7, "broken.png");

        match next_event(&worker, Duration::from_secs(5)) {
            Some(UiEvent::SubmissionResolved {
                request_id,
                outcome: Err(err),
            }) => {
                assert_eq!(request_id, RequestId(7));
                assert_eq!(err.to_string(), SUBMISSION_FAILED_MESSAGE);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn newer_submission_cancels_the_outstanding_one() {
        let worker = start_worker();
        submit(&worker, 1, "slow.png");
        std::thread::sleep(Duration::from_millis(100));
        submit(&worker, 2, "fast.png");

        match next_event(&worker, Duration::from_secs(5)) {
            Some(UiEvent::SubmissionResolved { request_id, .. }) => {
                assert_eq!(request_id, RequestId(2));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(
            next_event(&worker, Duration::from_millis(300)).is_none(),
            "cancelled submission must never resolve"
        );

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !worker.slow_dropped_early.load(Ordering::SeqCst) {
            assert!(std::time::Instant::now() < deadline, "slow request was not aborted");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn artwork_images_are_decoded_into_thumbnails() {
        let worker = start_worker();
        worker
            .cmd_tx
            .send(BackendCommand::FetchArtworkImage {
                request_id: RequestId(3),
                url: "good".to_string(),
            })
            .expect("queue fetch");

        match next_event(&worker, Duration::from_secs(5)) {
            Some(UiEvent::ArtworkImageLoaded {
                request_id,
                url,
                image,
            }) => {
                assert_eq!(request_id, RequestId(3));
                assert_eq!(url, "good");
                assert_eq!((image.width, image.height), (300, 150));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn artwork_image_failures_are_reported() {
        let worker = start_worker();
        for url in ["garbled", "missing"] {
            worker
                .cmd_tx
                .send(BackendCommand::FetchArtworkImage {
                    request_id: RequestId(1),
                    url: url.to_string(),
                })
                .expect("queue fetch");
            match next_event(&worker, Duration::from_secs(5)) {
                Some(UiEvent::ArtworkImageFailed { url: failed, .. }) => assert_eq!(failed, url),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn artwork_events_wait_for_a_busy_ui_queue() {
        let worker = start_worker_with_ui_capacity(1);
        let urls = ["good", "garbled", "missing", "good-again"];
        for url in urls {
            worker
                .cmd_tx
                .send(BackendCommand::FetchArtworkImage {
                    request_id: RequestId(5),
                    url: url.to_string(),
                })
                .expect("queue fetch");
        }
        // Every fetch finishes while the UI is not draining.
        std::thread::sleep(Duration::from_millis(300));

        let mut delivered = Vec::new();
        while delivered.len() < urls.len() {
            match next_event(&worker, Duration::from_secs(5)) {
                Some(UiEvent::ArtworkImageLoaded { url, .. })
                | Some(UiEvent::ArtworkImageFailed { url, .. }) => delivered.push(url),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        delivered.sort();
        let mut expected: Vec<_> = urls.iter().map(|url| url.to_string()).collect();
        expected.sort();
        assert_eq!(delivered, expected);
    }

    #[test]
    fn submission_resolution_waits_for_a_busy_ui_queue() {
        let worker = start_worker_with_ui_capacity(1);
        worker
            .cmd_tx
            .send(BackendCommand::FetchArtworkImage {
                request_id: RequestId(1),
                url: "good".to_string(),
            })
            .expect("queue fetch");
        submit(&worker, 1, "fast.png");
        std::thread::sleep(Duration::from_millis(300));

        let mut resolved = false;
        for _ in 0..2 {
            if let Some(UiEvent::SubmissionResolved { request_id, .. }) =
                next_event(&worker, Duration::from_secs(5))
            {
                assert_eq!(request_id, RequestId(1));
                resolved = true;
            }
        }
        assert!(resolved, "resolution must not be dropped");
    }

    #[test]
    fn health_probe_reports_reachability() {
        let worker = start_worker();
        worker
            .cmd_tx
            .send(BackendCommand::CheckHealth)
            .expect("queue health");

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match worker.ui_rx.recv_timeout(remaining) {
                Ok(UiEvent::Info(message)) if message.contains("reachable") => break,
                Ok(_) => continue,
                Err(err) => panic!("no health report: {err}"),
            }
        }
    }
}
