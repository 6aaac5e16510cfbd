//! Search / fetch / persist orchestration behind the single weather screen.
//!
//! A [`Controller`] runs as one task that owns the [`ViewState`]. User
//! commands, finished provider requests and the debounce timer are handled
//! one at a time, so no state is ever shared behind a lock. Every change is
//! published on a `watch` channel for the UI to render.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    config::DEFAULT_CITY,
    debounce::Debouncer,
    error::WeatherError,
    model::{Location, SearchState, ViewState, WeatherSnapshot},
    provider::WeatherProvider,
    storage::Persistence,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Loaded on start when no city has been remembered.
    pub default_city: String,
    pub forecast_days: u8,
    pub debounce: Duration,
    /// Shorter queries are never sent.
    pub min_query_chars: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            forecast_days: 7,
            debounce: Duration::from_millis(1000),
            min_query_chars: 3,
        }
    }
}

/// User intents accepted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenSearch,
    CloseSearch,
    ToggleSearch,
    /// Current contents of the search field.
    Input(String),
    Select(Location),
    Shutdown,
}

#[derive(Debug, Error)]
#[error("weather controller has stopped")]
pub struct ControllerStopped;

#[derive(Debug)]
enum Outcome {
    Search {
        seq: u64,
        query: String,
        result: Result<Vec<Location>, WeatherError>,
    },
    Forecast {
        seq: u64,
        city: String,
        remember: bool,
        result: Result<WeatherSnapshot, WeatherError>,
    },
}

pub struct Controller {
    provider: Arc<dyn WeatherProvider>,
    memory: Persistence,
    settings: ControllerSettings,
    state: ViewState,
    debounce: Debouncer<String>,
    // Sequence numbers of the latest issued requests; older responses are dropped.
    search_seq: u64,
    forecast_seq: u64,
    search_task: Option<JoinHandle<()>>,
    forecast_task: Option<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: mpsc::UnboundedReceiver<Outcome>,
    published: watch::Sender<ViewState>,
}

impl Controller {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        memory: Persistence,
        settings: ControllerSettings,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let (published, _) = watch::channel(ViewState::default());

        Self {
            provider,
            memory,
            debounce: Debouncer::new(settings.debounce),
            settings,
            state: ViewState::default(),
            search_seq: 0,
            forecast_seq: 0,
            search_task: None,
            forecast_task: None,
            outcomes_tx,
            outcomes_rx,
            published,
        }
    }

    /// Start the controller on the current runtime.
    pub fn spawn(self) -> ControllerHandle {
        let (commands, rx) = mpsc::channel(32);
        let state = self.published.subscribe();
        let task = tokio::spawn(self.run(rx));

        ControllerHandle { commands, state, task }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.mount().await;
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(outcome) = self.outcomes_rx.recv() => self.apply(outcome).await,
                query = self.debounce.fired() => self.search(query),
            }

            self.publish();
        }

        for task in [self.search_task.take(), self.forecast_task.take()].into_iter().flatten() {
            task.abort();
        }
        tracing::debug!("controller stopped");
    }

    async fn mount(&mut self) {
        let city = match self.memory.last_city().await {
            Some(city) => city,
            None => self.settings.default_city.clone(),
        };

        tracing::debug!(%city, "initial load");
        self.fetch(city, false);
    }

    fn handle(&mut self, command: Command) {
        tracing::debug!(?command, "command");

        match command {
            Command::OpenSearch => self.reset_search(true),
            Command::CloseSearch => self.reset_search(false),
            Command::ToggleSearch => self.reset_search(!self.state.search.is_visible),
            Command::Input(text) => {
                if !self.state.search.is_visible {
                    tracing::debug!("input ignored while search is closed");
                    return;
                }
                self.state.search.query = text.clone();
                self.state.search.is_pending = true;
                self.state.input_seq += 1;
                self.debounce.schedule(text);
            }
            Command::Select(location) => {
                self.reset_search(false);
                self.fetch(location.name, true);
            }
            Command::Shutdown => {}
        }
    }

    /// Fresh search session; also invalidates any search still in flight.
    fn reset_search(&mut self, visible: bool) {
        self.debounce.cancel();
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        self.search_seq += 1;
        self.state.search = SearchState { is_visible: visible, ..SearchState::default() };
    }

    fn search(&mut self, query: String) {
        if query.chars().count() < self.settings.min_query_chars {
            tracing::debug!(%query, "query too short, not sent");
            // Results of an earlier, longer query no longer match the field.
            self.search_seq += 1;
            if let Some(task) = self.search_task.take() {
                task.abort();
            }
            self.state.search.candidates.clear();
            self.state.search.is_pending = false;
            return;
        }

        self.search_seq += 1;
        let seq = self.search_seq;
        if let Some(task) = self.search_task.take() {
            task.abort();
        }

        tracing::debug!(%query, seq, "searching locations");
        let provider = Arc::clone(&self.provider);
        let tx = self.outcomes_tx.clone();
        self.search_task = Some(tokio::spawn(async move {
            let result = provider.search_locations(&query).await;
            let _ = tx.send(Outcome::Search { seq, query, result });
        }));
    }

    fn fetch(&mut self, city: String, remember: bool) {
        self.forecast_seq += 1;
        let seq = self.forecast_seq;
        if let Some(task) = self.forecast_task.take() {
            tracing::debug!("superseding in-flight forecast fetch");
            task.abort();
        }

        self.state.loading = true;
        self.state.requested_city = Some(city.clone());
        self.state.fetch_seq = seq;

        tracing::debug!(%city, seq, "fetching forecast");
        let provider = Arc::clone(&self.provider);
        let tx = self.outcomes_tx.clone();
        let days = self.settings.forecast_days;
        self.forecast_task = Some(tokio::spawn(async move {
            let result = provider.fetch_forecast(&city, days).await;
            let _ = tx.send(Outcome::Forecast { seq, city, remember, result });
        }));
    }

    async fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Search { seq, query, result } => {
                if seq != self.search_seq {
                    tracing::debug!(%query, seq, "discarding stale search response");
                    return;
                }
                self.search_task = None;
                self.state.search.is_pending = self.debounce.is_pending();

                match result {
                    Ok(candidates) => {
                        tracing::debug!(%query, count = candidates.len(), "search results");
                        self.state.search.candidates = candidates;
                    }
                    Err(e) => tracing::warn!(%query, error = %e, "location search failed"),
                }
            }
            Outcome::Forecast { seq, city, remember, result } => {
                if seq != self.forecast_seq {
                    tracing::debug!(%city, seq, "discarding stale forecast response");
                    return;
                }
                self.forecast_task = None;
                self.state.loading = false;

                match result {
                    Ok(snapshot) => {
                        tracing::debug!(%city, days = snapshot.forecast.len(), "forecast loaded");
                        self.state.weather = Some(snapshot);
                        self.state.error = None;
                        if remember {
                            self.memory.remember_city(&city).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!(%city, error = %e, "error fetching weather");
                        self.state.error = Some(e.user_message());
                    }
                }
            }
        }
    }

    fn publish(&self) {
        self.published.send_if_modified(|current| {
            if *current == self.state {
                false
            } else {
                *current = self.state.clone();
                true
            }
        });
    }
}

/// Front-end side of a running [`Controller`].
#[derive(Debug)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub async fn send(&self, command: Command) -> Result<(), ControllerStopped> {
        self.commands.send(command).await.map_err(|_| ControllerStopped)
    }

    pub async fn open_search(&self) -> Result<(), ControllerStopped> {
        self.send(Command::OpenSearch).await
    }

    pub async fn close_search(&self) -> Result<(), ControllerStopped> {
        self.send(Command::CloseSearch).await
    }

    pub async fn toggle_search(&self) -> Result<(), ControllerStopped> {
        self.send(Command::ToggleSearch).await
    }

    pub async fn input(&self, text: impl Into<String>) -> Result<(), ControllerStopped> {
        self.send(Command::Input(text.into())).await
    }

    pub async fn select(&self, location: Location) -> Result<(), ControllerStopped> {
        self.send(Command::Select(location)).await
    }

    /// Latest published state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&ViewState) -> bool,
    ) -> Result<ViewState, ControllerStopped> {
        let state = self.state.wait_for(predicate).await.map_err(|_| ControllerStopped)?;
        Ok(ViewState::clone(&state))
    }

    /// Open the search box, type `query` and wait until that query has been
    /// either suppressed or answered.
    pub async fn search_and_settle(
        &mut self,
        query: impl Into<String>,
    ) -> Result<ViewState, ControllerStopped> {
        let issued = self.state.borrow().input_seq;
        self.open_search().await?;
        self.input(query).await?;
        self.wait_for(|s| s.input_seq > issued && !s.search.is_pending).await
    }

    /// Select `location` and wait for the fetch it starts to finish.
    pub async fn select_and_settle(
        &mut self,
        location: Location,
    ) -> Result<ViewState, ControllerStopped> {
        let issued = self.state.borrow().fetch_seq;
        self.select(location).await?;
        self.wait_for(|s| s.fetch_seq > issued && !s.loading).await
    }

    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "controller task ended abnormally");
        }
    }
}
