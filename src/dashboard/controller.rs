//! Dashboard Controller
//!
//! On mount, starts one fetch-and-render task per chart. Tasks are started
//! in [`ChartKind::ALL`] order but finish in whatever order their responses
//! arrive; each chart is rendered as soon as its own payload is in, and a
//! failure in one never holds back the others.
//!
//! Every task reports a [`ChartOutcome`]. Teardown is explicit:
//! [`DashboardHandle::cancel`] stops pending tasks before they render, and
//! dropping the handle aborts them.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::error::{DashboardError, DashboardResult};
use super::render::ChartRenderer;
use super::source::ChartSource;
use crate::charts::ChartKind;

/// Result of loading one chart
#[derive(Debug)]
pub struct ChartOutcome {
    pub kind: ChartKind,
    pub result: DashboardResult<()>,
}

impl ChartOutcome {
    pub fn is_rendered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a whole mount, in completion order
#[derive(Debug, Default)]
pub struct MountReport {
    pub outcomes: Vec<ChartOutcome>,
}

impl MountReport {
    pub fn rendered(&self) -> Vec<ChartKind> {
        self.outcomes
            .iter()
            .filter(|o| o.is_rendered())
            .map(|o| o.kind)
            .collect()
    }

    pub fn failed(&self) -> Vec<(ChartKind, &DashboardError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.kind, e)))
            .collect()
    }

    pub fn all_rendered(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(ChartOutcome::is_rendered)
    }

    pub fn outcome(&self, kind: ChartKind) -> Option<&ChartOutcome> {
        self.outcomes.iter().find(|o| o.kind == kind)
    }
}

/// Wires a chart source to a renderer
pub struct DashboardController<S, R> {
    source: Arc<S>,
    renderer: Arc<R>,
}

impl<S, R> Clone for DashboardController<S, R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

impl<S, R> DashboardController<S, R>
where
    S: ChartSource + 'static,
    R: ChartRenderer + 'static,
{
    pub fn new(source: S, renderer: R) -> Self {
        Self::from_shared(Arc::new(source), Arc::new(renderer))
    }

    pub fn from_shared(source: Arc<S>, renderer: Arc<R>) -> Self {
        Self { source, renderer }
    }

    pub fn renderer(&self) -> &Arc<R> {
        &self.renderer
    }

    /// Fetch one chart and render it into its mount point
    pub async fn load(&self, kind: ChartKind) -> DashboardResult<()> {
        let payload = self.source.fetch(kind).await?;
        self.renderer
            .render(kind.mount_id(), &payload.data, &payload.layout)
            .await
    }

    /// Start loading every chart and return immediately
    pub fn mount(&self) -> DashboardHandle {
        self.mount_charts(&ChartKind::ALL)
    }

    /// Start loading the given charts, in the given order
    pub fn mount_charts(&self, kinds: &[ChartKind]) -> DashboardHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        for &kind in kinds {
            let controller = self.clone();
            let mut cancel_rx = cancel_rx.clone();

            tasks.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel_rx.wait_for(|cancelled| *cancelled) => Err(DashboardError::Cancelled(kind)),
                    result = controller.load(kind) => result,
                };

                match &result {
                    Ok(()) => tracing::debug!(chart = %kind, "Chart rendered"),
                    Err(e) if e.is_cancelled() => tracing::debug!(chart = %kind, "Chart load cancelled"),
                    Err(e) => tracing::warn!(chart = %kind, error = %e, "Chart failed to load"),
                }

                ChartOutcome { kind, result }
            });
        }

        tracing::debug!(charts = kinds.len(), "Dashboard mounted");

        DashboardHandle {
            tasks,
            cancel: cancel_tx,
            expected: kinds.to_vec(),
            seen: Vec::with_capacity(kinds.len()),
        }
    }
}

/// Handle to the charts a mount is still loading
///
/// Dropping the handle aborts every task that has not finished.
pub struct DashboardHandle {
    tasks: JoinSet<ChartOutcome>,
    cancel: watch::Sender<bool>,
    expected: Vec<ChartKind>,
    seen: Vec<ChartKind>,
}

impl DashboardHandle {
    /// Number of charts still loading
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Stop every chart that has not rendered yet
    ///
    /// Pending tasks finish with [`DashboardError::Cancelled`].
    pub fn cancel(&self) {
        // send_replace never fails, even with no receiver left
        self.cancel.send_replace(true);
    }

    /// Next chart to finish, or `None` once all have finished
    pub async fn next(&mut self) -> Option<ChartOutcome> {
        loop {
            match self.tasks.join_next().await? {
                Ok(outcome) => {
                    self.seen.push(outcome.kind);
                    return Some(outcome);
                }
                Err(e) => {
                    // The task's kind is recovered in `wait`
                    tracing::error!(error = %e, "Chart loading task failed");
                    continue;
                }
            }
        }
    }

    /// Wait for every chart to finish
    pub async fn wait(mut self) -> MountReport {
        let mut report = MountReport::default();
        while let Some(outcome) = self.next().await {
            report.outcomes.push(outcome);
        }

        for kind in &self.expected {
            if !self.seen.contains(kind) {
                report.outcomes.push(ChartOutcome {
                    kind: *kind,
                    result: Err(DashboardError::TaskFailed(*kind)),
                });
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartPayload;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::{Barrier, Notify};

    /// Per-chart behaviour of the mock source
    #[derive(Clone)]
    enum Reply {
        Payload(ChartPayload),
        Fail(u16),
        Delayed(ChartPayload, Duration),
    }

    struct MockSource {
        replies: HashMap<ChartKind, Reply>,
        requested: Mutex<Vec<ChartKind>>,
        /// When set, every fetch waits here before answering
        gate: Option<Arc<Notify>>,
        /// When set, every fetch waits for all others to be in flight
        barrier: Option<Arc<Barrier>>,
    }

    impl MockSource {
        fn new(replies: HashMap<ChartKind, Reply>) -> Self {
            Self {
                replies,
                requested: Mutex::new(Vec::new()),
                gate: None,
                barrier: None,
            }
        }

        fn all_ok() -> Self {
            Self::new(ChartKind::ALL.into_iter().map(|k| (k, Reply::Payload(payload_for(k)))).collect())
        }

        fn requested(&self) -> Vec<ChartKind> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChartSource for MockSource {
        async fn fetch(&self, kind: ChartKind) -> DashboardResult<ChartPayload> {
            self.requested.lock().unwrap().push(kind);

            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            match self.replies.get(&kind).cloned() {
                Some(Reply::Payload(p)) => Ok(p),
                Some(Reply::Delayed(p, delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(p)
                }
                Some(Reply::Fail(status)) => Err(DashboardError::Status {
                    endpoint: kind.endpoint().to_string(),
                    status,
                }),
                None => Err(DashboardError::Status {
                    endpoint: kind.endpoint().to_string(),
                    status: 404,
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(String, Vec<Value>, Value)>>,
    }

    impl RecordingRenderer {
        fn calls(&self) -> Vec<(String, Vec<Value>, Value)> {
            self.calls.lock().unwrap().clone()
        }

        fn mounts(&self) -> Vec<String> {
            self.calls().into_iter().map(|(m, _, _)| m).collect()
        }
    }

    #[async_trait]
    impl ChartRenderer for RecordingRenderer {
        async fn render(&self, mount: &str, data: &[Value], layout: &Value) -> DashboardResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((mount.to_string(), data.to_vec(), layout.clone()));
            Ok(())
        }
    }

    fn payload_for(kind: ChartKind) -> ChartPayload {
        ChartPayload::new(
            vec![json!({ "type": kind.name(), "values": [1, 2, 3] })],
            json!({ "title": kind.name() }),
        )
    }

    fn controller(source: MockSource) -> DashboardController<MockSource, RecordingRenderer> {
        DashboardController::new(source, RecordingRenderer::default())
    }

    #[tokio::test]
    async fn test_each_load_renders_once_into_its_mount_point() {
        for kind in ChartKind::ALL {
            let ctl = controller(MockSource::all_ok());
            ctl.load(kind).await.unwrap();

            let calls = ctl.renderer().calls();
            assert_eq!(calls.len(), 1);
            let (mount, data, layout) = &calls[0];
            assert_eq!(mount, kind.mount_id());
            assert_eq!(data, &payload_for(kind).data);
            assert_eq!(layout, &payload_for(kind).layout);
        }
    }

    #[tokio::test]
    async fn test_pie_payload_passed_through_unmodified() {
        let pie = ChartPayload::new(
            vec![json!({ "values": [1, 2, 3] })],
            json!({ "title": "Pie" }),
        );
        let mut replies: HashMap<ChartKind, Reply> = ChartKind::ALL
            .into_iter()
            .map(|k| (k, Reply::Payload(payload_for(k))))
            .collect();
        replies.insert(ChartKind::Pie, Reply::Payload(pie));

        let ctl = controller(MockSource::new(replies));
        let report = ctl.mount().wait().await;
        assert!(report.all_rendered());

        let calls = ctl.renderer().calls();
        let (_, data, layout) = calls.iter().find(|(m, _, _)| m == "pie").unwrap();
        assert_eq!(data, &vec![json!({ "values": [1, 2, 3] })]);
        assert_eq!(layout, &json!({ "title": "Pie" }));
    }

    #[tokio::test]
    async fn test_mount_issues_four_independent_requests() {
        let mut source = MockSource::all_ok();
        // Each fetch only completes once all four are in flight at the same time
        source.barrier = Some(Arc::new(Barrier::new(4)));

        let ctl = controller(source);
        let report = tokio::time::timeout(Duration::from_secs(5), ctl.mount().wait())
            .await
            .expect("requests were not issued concurrently");

        assert!(report.all_rendered());
        let mut requested = ctl.source.requested();
        requested.sort_by_key(|k| k.name());
        let mut expected = ChartKind::ALL.to_vec();
        expected.sort_by_key(|k| k.name());
        assert_eq!(requested, expected);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_other_charts() {
        let mut replies: HashMap<ChartKind, Reply> = ChartKind::ALL
            .into_iter()
            .map(|k| (k, Reply::Payload(payload_for(k))))
            .collect();
        replies.insert(ChartKind::Bar, Reply::Fail(500));

        let ctl = controller(MockSource::new(replies));
        let report = ctl.mount().wait().await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.rendered().len(), 3);
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, ChartKind::Bar);
        assert!(matches!(failed[0].1, DashboardError::Status { status: 500, .. }));

        let mut mounts = ctl.renderer().mounts();
        mounts.sort();
        assert_eq!(mounts, vec!["line", "pie", "sankey"]);
    }

    #[tokio::test]
    async fn test_no_render_before_response() {
        let gate = Arc::new(Notify::new());
        let mut source = MockSource::all_ok();
        source.gate = Some(Arc::clone(&gate));

        let ctl = controller(source);
        let mut handle = ctl.mount();

        // Let every task reach the gate
        while ctl.source.requested().len() < 4 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(ctl.renderer().calls().is_empty());
        assert_eq!(handle.pending(), 4);

        gate.notify_one();
        let first = handle.next().await.unwrap();
        assert!(first.is_rendered());
        assert_eq!(ctl.renderer().calls().len(), 1);

        gate.notify_waiters();
        gate.notify_one();
        let report = handle.wait().await;
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(ctl.renderer().calls().len(), 4);
    }

    #[tokio::test]
    async fn test_completion_order_follows_responses() {
        let mut replies: HashMap<ChartKind, Reply> = ChartKind::ALL
            .into_iter()
            .map(|k| (k, Reply::Payload(payload_for(k))))
            .collect();
        replies.insert(
            ChartKind::Sankey,
            Reply::Delayed(payload_for(ChartKind::Sankey), Duration::from_millis(200)),
        );

        let ctl = controller(MockSource::new(replies));
        let report = ctl.mount().wait().await;

        assert!(report.all_rendered());
        assert_eq!(report.outcomes.last().unwrap().kind, ChartKind::Sankey);
        assert_eq!(ctl.renderer().mounts().last().unwrap(), "sankey");
    }

    #[tokio::test]
    async fn test_cancel_stops_pending_charts() {
        let gate = Arc::new(Notify::new());
        let mut source = MockSource::all_ok();
        source.gate = Some(Arc::clone(&gate));

        let ctl = controller(source);
        let handle = ctl.mount();
        while ctl.source.requested().len() < 4 {
            tokio::task::yield_now().await;
        }

        handle.cancel();
        let report = handle.wait().await;

        assert_eq!(report.outcomes.len(), 4);
        assert!(report
            .outcomes
            .iter()
            .all(|o| matches!(o.result, Err(DashboardError::Cancelled(_)))));
        assert!(ctl.renderer().calls().is_empty());
    }

    #[tokio::test]
    async fn test_drop_aborts_pending_charts() {
        let gate = Arc::new(Notify::new());
        let mut source = MockSource::all_ok();
        source.gate = Some(Arc::clone(&gate));

        let ctl = controller(source);
        let handle = ctl.mount();
        while ctl.source.requested().len() < 4 {
            tokio::task::yield_now().await;
        }
        drop(handle);

        gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(ctl.renderer().calls().is_empty());
    }

    #[tokio::test]
    async fn test_mount_subset() {
        let ctl = controller(MockSource::all_ok());
        let report = ctl.mount_charts(&[ChartKind::Line]).wait().await;

        assert_eq!(report.rendered(), vec![ChartKind::Line]);
        assert!(report.outcome(ChartKind::Pie).is_none());
        assert_eq!(ctl.source.requested(), vec![ChartKind::Line]);
    }
}
