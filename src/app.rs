use crate::analysis::{AnalysisFetcher, AnalysisOutcome};
use crate::config::ResponseOrder;
use crate::ui;
use crate::ui::widgets::{dashboard_widgets, ChartData, DashboardWidget};
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub enum ApiMessage {
    Analysis {
        generation: u64,
        handle: String,
        result: Result<AnalysisOutcome, String>,
    },
    Health(Result<String, String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Unknown,
    Healthy,
    Unreachable(String),
}

/// The handle whose analysis the charts currently show.
#[derive(Debug, Clone)]
pub struct ShownAnalysis {
    pub handle: String,
    pub generation: u64,
    pub received_at: DateTime<Local>,
}

pub struct App {
    fetcher: Arc<dyn AnalysisFetcher>,
    response_order: ResponseOrder,
    pub(crate) input: String,
    pub(crate) widgets: Vec<Box<dyn DashboardWidget>>,
    pub(crate) selected_widget: usize,
    pub(crate) loading: bool,
    pub(crate) alert: Option<String>,
    pub(crate) health: HealthStatus,
    pub(crate) shown: Option<ShownAnalysis>,
    generation: u64,
    in_flight: usize,
    should_quit: bool,
    tx: UnboundedSender<ApiMessage>,
    rx: UnboundedReceiver<ApiMessage>,
}

impl App {
    pub fn new(fetcher: Arc<dyn AnalysisFetcher>, response_order: ResponseOrder) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut widgets = dashboard_widgets();
        if let Some(first) = widgets.first_mut() {
            first.set_selected(true);
        }

        Self {
            fetcher,
            response_order,
            input: String::new(),
            widgets,
            selected_widget: 0,
            loading: false,
            alert: None,
            health: HealthStatus::Unknown,
            shown: None,
            generation: 0,
            in_flight: 0,
            should_quit: false,
            tx,
            rx,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn shown(&self) -> Option<&ShownAnalysis> {
        self.shown.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_input(&mut self, handle: &str) {
        self.input = handle.to_string();
    }

    /// Probes the health endpoint in the background.
    pub fn spawn_health_check(&self) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fetcher.health().await.map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::Health(result));
        });
    }

    /// Clears the charts, shows the loading indicator and requests the
    /// analysis for the current input.
    pub fn submit_search(&mut self) {
        self.generation += 1;
        self.in_flight += 1;
        self.loading = true;
        self.alert = None;
        self.shown = None;
        self.broadcast(&ChartData::Loading);

        let generation = self.generation;
        let handle = self.input.clone();
        tracing::info!(%handle, generation, "search submitted");

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fetcher.analyse(&handle).await.map_err(|e| e.to_string());
            let _ = tx.send(ApiMessage::Analysis {
                generation,
                handle,
                result,
            });
        });
    }

    pub fn handle_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::Health(Ok(body)) => {
                tracing::info!(body = body.trim(), "api healthy");
                self.health = HealthStatus::Healthy;
            }
            ApiMessage::Health(Err(e)) => {
                tracing::warn!(error = %e, "api health check failed");
                self.health = HealthStatus::Unreachable(e);
            }
            ApiMessage::Analysis {
                generation,
                handle,
                result,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);

                if self.response_order == ResponseOrder::LatestIssued
                    && generation != self.generation
                {
                    tracing::debug!(
                        %handle,
                        generation,
                        latest = self.generation,
                        "dropping response to superseded search"
                    );
                    return;
                }

                self.loading = match self.response_order {
                    ResponseOrder::LatestIssued => false,
                    ResponseOrder::LatestResolved => self.in_flight > 0,
                };
                self.apply_result(generation, handle, result);
            }
        }
    }

    fn apply_result(
        &mut self,
        generation: u64,
        handle: String,
        result: Result<AnalysisOutcome, String>,
    ) {
        match result {
            Ok(AnalysisOutcome::Success(analysis)) => {
                self.broadcast(&ChartData::Analysis(analysis));
                self.shown = Some(ShownAnalysis {
                    handle,
                    generation,
                    received_at: Local::now(),
                });
            }
            Ok(outcome) => {
                tracing::warn!(%handle, outcome = outcome.kind(), "analysis not available");
                self.show_failure(outcome.alert_text().unwrap_or_default());
            }
            Err(e) => {
                tracing::error!(%handle, error = %e, "analysis request failed");
                self.show_failure(format!("Request failed: {}", e));
            }
        }
    }

    /// Failures leave whatever is already drawn and only drop the loading
    /// placeholders.
    fn show_failure(&mut self, text: String) {
        if self.shown.is_none() {
            self.broadcast(&ChartData::Cleared);
        }
        self.alert = Some(text);
    }

    fn broadcast(&mut self, data: &ChartData) {
        for widget in &mut self.widgets {
            widget.update_data(data);
        }
    }

    /// Applies every message that has already arrived.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
    }

    /// Waits for the next message and applies it.
    pub async fn process_next_message(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => {
                self.handle_message(message);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit_search(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Tab => self.select_widget(self.selected_widget + 1),
            KeyCode::BackTab => {
                let count = self.widgets.len();
                self.select_widget(self.selected_widget + count - 1);
            }
            KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                self.input.push(c)
            }
            _ => {}
        }
    }

    fn select_widget(&mut self, index: usize) {
        if self.widgets.is_empty() {
            return;
        }
        let index = index % self.widgets.len();
        if let Some(current) = self.widgets.get_mut(self.selected_widget) {
            current.set_selected(false);
        }
        self.selected_widget = index;
        self.widgets[index].set_selected(true);
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            self.drain_messages();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, ApiError, UserId};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeFetcher {
        responses: HashMap<String, (Duration, AnalysisOutcome)>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn with(mut self, handle: &str, delay_ms: u64, outcome: AnalysisOutcome) -> Self {
            self.responses.insert(
                handle.to_string(),
                (Duration::from_millis(delay_ms), outcome),
            );
            self
        }
    }

    #[async_trait]
    impl AnalysisFetcher for FakeFetcher {
        async fn analyse(&self, handle: &str) -> Result<AnalysisOutcome, ApiError> {
            let (delay, outcome) = self
                .responses
                .get(handle)
                .cloned()
                .ok_or(ApiError::MissingField("UserID"))?;
            tokio::time::sleep(delay).await;
            Ok(outcome)
        }

        async fn health(&self) -> Result<String, ApiError> {
            Ok("Healthy".to_string())
        }
    }

    fn success(positive: u64, negative: u64, average_score: f64) -> AnalysisOutcome {
        AnalysisOutcome::Success(AnalysisResult {
            user_id: UserId::Text("1".to_string()),
            positive_tweets: positive,
            negative_tweets: negative,
            average_score,
        })
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(fetcher: FakeFetcher, order: ResponseOrder) -> App {
        App::new(Arc::new(fetcher), order)
    }

    fn search(app: &mut App, handle: &str) {
        app.set_input(handle);
        app.submit_search();
    }

    #[tokio::test]
    async fn test_successful_search_renders_charts() {
        let fetcher = FakeFetcher::new().with("elonmusk", 0, success(30, 18, 0.22));
        let mut app = app(fetcher, ResponseOrder::LatestIssued);

        search(&mut app, "elonmusk");
        assert!(app.is_loading());
        assert!(app.process_next_message().await);

        assert!(!app.is_loading());
        assert!(app.alert().is_none());
        let shown = app.shown().unwrap();
        assert_eq!(shown.handle, "elonmusk");
        assert_eq!(shown.generation, 1);
    }

    #[tokio::test]
    async fn test_logical_failure_shows_message_and_no_charts() {
        let message = "This user has not been analysed yet";
        let fetcher = FakeFetcher::new().with(
            "nobody",
            0,
            AnalysisOutcome::LogicalFailure {
                message: message.to_string(),
            },
        );
        let mut app = app(fetcher, ResponseOrder::LatestIssued);

        search(&mut app, "nobody");
        app.process_next_message().await;

        assert_eq!(app.alert(), Some(message));
        assert!(app.shown().is_none());
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_transport_failure_alert_has_status_and_body() {
        let fetcher = FakeFetcher::new().with(
            "broken",
            0,
            AnalysisOutcome::TransportFailure {
                status: 400,
                body: "Location: User, Error: no users were found".to_string(),
            },
        );
        let mut app = app(fetcher, ResponseOrder::LatestIssued);

        search(&mut app, "broken");
        app.process_next_message().await;

        let alert = app.alert().unwrap();
        assert!(alert.contains("400"));
        assert!(alert.contains("no users were found"));
        assert!(app.shown().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_is_surfaced() {
        let mut app = app(FakeFetcher::new(), ResponseOrder::LatestIssued);

        search(&mut app, "unknown");
        app.process_next_message().await;

        assert!(app.alert().unwrap().starts_with("Request failed:"));
    }

    #[tokio::test]
    async fn test_new_search_clears_previous_result() {
        let fetcher = FakeFetcher::new()
            .with("first", 0, success(1, 2, 0.1))
            .with("second", 0, success(3, 4, 0.2));
        let mut app = app(fetcher, ResponseOrder::LatestIssued);

        search(&mut app, "first");
        app.process_next_message().await;
        assert!(app.shown().is_some());

        search(&mut app, "second");
        assert!(app.shown().is_none());
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn test_latest_issued_drops_stale_response() {
        let fetcher = FakeFetcher::new()
            .with("slow", 80, success(1, 1, 0.0))
            .with("fast", 0, success(5, 5, 0.5));
        let mut app = app(fetcher, ResponseOrder::LatestIssued);

        search(&mut app, "slow");
        search(&mut app, "fast");
        assert_eq!(app.generation(), 2);

        app.process_next_message().await;
        app.process_next_message().await;

        let shown = app.shown().unwrap();
        assert_eq!(shown.handle, "fast");
        assert_eq!(shown.generation, 2);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_latest_resolved_lets_last_arrival_win() {
        let fetcher = FakeFetcher::new()
            .with("slow", 80, success(1, 1, 0.0))
            .with("fast", 0, success(5, 5, 0.5));
        let mut app = app(fetcher, ResponseOrder::LatestResolved);

        search(&mut app, "slow");
        search(&mut app, "fast");

        app.process_next_message().await;
        assert_eq!(app.shown().unwrap().handle, "fast");
        assert!(app.is_loading());

        app.process_next_message().await;
        assert_eq!(app.shown().unwrap().handle, "slow");
        assert_eq!(app.shown().unwrap().generation, 1);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_stale_failure_keeps_rendered_charts_in_latest_resolved() {
        let fetcher = FakeFetcher::new()
            .with(
                "slow",
                80,
                AnalysisOutcome::LogicalFailure {
                    message: "later".to_string(),
                },
            )
            .with("fast", 0, success(5, 5, 0.5));
        let mut app = app(fetcher, ResponseOrder::LatestResolved);

        search(&mut app, "slow");
        search(&mut app, "fast");
        app.process_next_message().await;
        app.process_next_message().await;

        assert_eq!(app.alert(), Some("later"));
        assert_eq!(app.shown().unwrap().handle, "fast");
    }

    #[tokio::test]
    async fn test_health_check_updates_status() {
        let mut app = app(FakeFetcher::new(), ResponseOrder::LatestIssued);
        assert_eq!(app.health, HealthStatus::Unknown);

        app.spawn_health_check();
        app.process_next_message().await;
        assert_eq!(app.health, HealthStatus::Healthy);

        app.handle_message(ApiMessage::Health(Err("connection refused".to_string())));
        assert_eq!(
            app.health,
            HealthStatus::Unreachable("connection refused".to_string())
        );
    }

    #[tokio::test]
    async fn test_typing_and_enter_submit_the_handle() {
        let fetcher = FakeFetcher::new().with("ab", 0, success(1, 0, 1.0));
        let mut app = app(fetcher, ResponseOrder::LatestIssued);

        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.input, "ab");

        app.handle_key(key(KeyCode::Enter));
        app.process_next_message().await;
        assert_eq!(app.shown().unwrap().handle, "ab");
    }

    #[tokio::test]
    async fn test_alert_swallows_keys_until_dismissed() {
        let mut app = app(FakeFetcher::new(), ResponseOrder::LatestIssued);
        app.alert = Some("boom".to_string());

        app.handle_key(key(KeyCode::Char('z')));
        assert!(app.input.is_empty());
        app.handle_key(key(KeyCode::Esc));
        assert!(app.alert().is_none());
        assert!(!app.should_quit());

        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[test]
    fn test_modified_chars_do_not_edit_the_handle() {
        let mut app = app(FakeFetcher::new(), ResponseOrder::LatestIssued);

        app.handle_key(KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT));
        app.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        app.handle_key(KeyEvent::new(
            KeyCode::Char('x'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ));
        app.handle_key(key(KeyCode::Char('l')));

        assert_eq!(app.input, "El");
        assert!(!app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app(FakeFetcher::new(), ResponseOrder::LatestIssued);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_tab_cycles_selected_widget() {
        let mut app = app(FakeFetcher::new(), ResponseOrder::LatestIssued);
        assert_eq!(app.selected_widget, 0);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.selected_widget, 1);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.selected_widget, 0);
        app.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(app.selected_widget, 2);
    }
}
