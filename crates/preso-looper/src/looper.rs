//! Slide loop driver
//!
//! Runs the pure state machine against a tab on one tokio task. The task owns
//! the single armed deadline; commands arrive over a channel and the current
//! state is published on a watch channel.

use crate::error::{PresoError, Result};
use crate::state_machine::{transition, LoopAction, LoopEvent, LoopState};
use crate::url::PresentingMatcher;
use async_trait::async_trait;
use preso_core::fail_open::fail_open;
use preso_core::LooperConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// The tab (and its window) being looped
#[async_trait]
pub trait PresentationTab: Send + Sync {
    /// Address currently loaded in the tab
    async fn current_url(&self) -> Result<String>;

    /// Load `url` and wait for the navigation to complete
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Put the tab's window into fullscreen
    async fn enter_fullscreen(&self) -> Result<()>;

    /// Let the user know this tab can be looped
    async fn offer_loop(&self, url: &str) -> Result<()> {
        info!("Presenting {} - start looping to cycle slides", url);
        Ok(())
    }
}

/// Requests sent to a running loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopCommand {
    /// The host reports the tab finished loading `url`
    NavigationComplete { url: String },
    /// The user clicked "loop"; the tab's URL is re-read first
    Click,
    /// Stop looping but keep listening
    Stop,
    /// End the driver task
    Shutdown,
}

/// Handle to a spawned loop
pub struct LoopHandle {
    commands: mpsc::Sender<LoopCommand>,
    state: watch::Receiver<LoopState>,
    task: JoinHandle<()>,
}

impl LoopHandle {
    pub async fn navigation_complete(&self, url: &str) -> Result<()> {
        self.send(LoopCommand::NavigationComplete {
            url: url.to_string(),
        })
        .await
    }

    pub async fn click(&self) -> Result<()> {
        self.send(LoopCommand::Click).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(LoopCommand::Stop).await
    }

    /// Latest published state
    pub fn state(&self) -> LoopState {
        self.state.borrow().clone()
    }

    /// Wait until the published state satisfies `f`
    pub async fn wait_for<F>(&mut self, f: F) -> Result<LoopState>
    where
        F: FnMut(&LoopState) -> bool,
    {
        self.state
            .wait_for(f)
            .await
            .map(|state| state.clone())
            .map_err(|_| PresoError::Other("Slide loop has shut down".to_string()))
    }

    /// Stop the driver and wait for it to exit
    pub async fn shutdown(self) -> Result<()> {
        // The task may already be gone; joining below is what matters.
        let _ = self.commands.send(LoopCommand::Shutdown).await;
        self.task
            .await
            .map_err(|e| PresoError::Other(format!("Slide loop task failed: {}", e)))
    }

    async fn send(&self, command: LoopCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PresoError::Other("Slide loop has shut down".to_string()))
    }
}

/// Loops a presenting tab through its slides
pub struct SlideLooper<T: PresentationTab> {
    tab: Arc<T>,
    matcher: PresentingMatcher,
    interval: Duration,
}

impl<T: PresentationTab + 'static> SlideLooper<T> {
    pub fn new(tab: Arc<T>, matcher: PresentingMatcher, interval: Duration) -> Self {
        Self {
            tab,
            matcher,
            interval,
        }
    }

    pub fn from_config(tab: Arc<T>, config: &LooperConfig) -> Result<Self> {
        Ok(Self::new(
            tab,
            PresentingMatcher::new(&config.docs_host)?,
            Duration::from_millis(config.interval_ms),
        ))
    }

    /// Start the driver task
    pub fn spawn(self) -> LoopHandle {
        let (commands, rx) = mpsc::channel(16);
        let (state_tx, state) = watch::channel(LoopState::Idle);
        let task = tokio::spawn(self.run(rx, state_tx));
        LoopHandle {
            commands,
            state,
            task,
        }
    }

    async fn run(self, mut commands: mpsc::Receiver<LoopCommand>, state_tx: watch::Sender<LoopState>) {
        info!("Slide loop started (interval {:?})", self.interval);
        let mut state = LoopState::Idle;
        let mut deadline: Option<Instant> = None;

        loop {
            let event = match deadline {
                Some(at) => tokio::select! {
                    _ = tokio::time::sleep_until(at) => {
                        deadline = None;
                        self.timer_fired().await
                    }
                    command = commands.recv() => match self.command_event(command).await {
                        Some(event) => event,
                        None => break,
                    },
                },
                None => match self.command_event(commands.recv().await).await {
                    Some(event) => event,
                    None => break,
                },
            };

            self.dispatch(&mut state, &mut deadline, event).await;
            state_tx.send_replace(state.clone());
        }

        info!("Slide loop shut down");
    }

    /// `None` ends the driver
    async fn command_event(&self, command: Option<LoopCommand>) -> Option<LoopEvent> {
        match command? {
            LoopCommand::NavigationComplete { url } => Some(LoopEvent::NavigationComplete { url }),
            LoopCommand::Click => match self.tab.current_url().await {
                Ok(url) => Some(LoopEvent::ActionClicked { url }),
                Err(e) => {
                    warn!("Could not read tab URL on click: {}", e);
                    Some(LoopEvent::ActionClicked { url: String::new() })
                }
            },
            LoopCommand::Stop => Some(LoopEvent::Stop),
            LoopCommand::Shutdown => None,
        }
    }

    async fn timer_fired(&self) -> LoopEvent {
        let current_url = match self.tab.current_url().await {
            Ok(url) => url,
            Err(e) => {
                // An unreadable tab fails the presenting guard
                warn!("Could not read tab URL at fire time: {}", e);
                String::new()
            }
        };
        LoopEvent::TimerFired { current_url }
    }

    async fn dispatch(&self, state: &mut LoopState, deadline: &mut Option<Instant>, event: LoopEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            debug!(?event, "Loop event");
            let (next, actions) = transition(state, event, &self.matcher);
            if next != *state {
                debug!(from = ?state, to = ?next, "Loop state change");
            }
            *state = next;

            for action in actions {
                match action {
                    LoopAction::EnterFullscreen => {
                        fail_open("enter_fullscreen", || self.tab.enter_fullscreen()).await;
                    }
                    LoopAction::OfferLoop { url } => {
                        fail_open("offer_loop", || self.tab.offer_loop(&url)).await;
                    }
                    LoopAction::Arm { next_url } => {
                        info!("Next slide in {:?}: {}", self.interval, next_url);
                        *deadline = Some(Instant::now() + self.interval);
                    }
                    LoopAction::Disarm => {
                        *deadline = None;
                    }
                    LoopAction::Navigate { url } => match self.tab.navigate(&url).await {
                        Ok(()) => {
                            let landed = self.tab.current_url().await.unwrap_or(url);
                            queue.push_back(LoopEvent::NavigationComplete { url: landed });
                        }
                        Err(e) => {
                            warn!("Navigation to {} failed, stopping loop: {}", url, e);
                            queue.push_back(LoopEvent::Stop);
                        }
                    },
                }
            }
        }
    }
}

/// In-memory tab for testing
#[derive(Debug, Default)]
pub struct MockTab {
    url: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    fullscreen_requests: Mutex<usize>,
    offers: Mutex<Vec<String>>,
    fail_fullscreen: bool,
}

impl MockTab {
    pub fn new(url: &str) -> Self {
        Self {
            url: Mutex::new(url.to_string()),
            ..Default::default()
        }
    }

    /// Make every fullscreen request fail
    pub fn with_failing_fullscreen(mut self) -> Self {
        self.fail_fullscreen = true;
        self
    }

    /// Simulate the user moving the tab somewhere else
    pub fn set_url(&self, url: &str) {
        *lock(&self.url) = url.to_string();
    }

    pub fn navigations(&self) -> Vec<String> {
        lock(&self.navigations).clone()
    }

    pub fn fullscreen_requests(&self) -> usize {
        *lock(&self.fullscreen_requests)
    }

    pub fn offers(&self) -> Vec<String> {
        lock(&self.offers).clone()
    }
}

#[async_trait]
impl PresentationTab for MockTab {
    async fn current_url(&self) -> Result<String> {
        Ok(lock(&self.url).clone())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        *lock(&self.url) = url.to_string();
        lock(&self.navigations).push(url.to_string());
        Ok(())
    }

    async fn enter_fullscreen(&self) -> Result<()> {
        *lock(&self.fullscreen_requests) += 1;
        if self.fail_fullscreen {
            return Err(PresoError::Browser("Window cannot go fullscreen".to_string()));
        }
        Ok(())
    }

    async fn offer_loop(&self, url: &str) -> Result<()> {
        lock(&self.offers).push(url.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
