//! WizardSession: async driver around a [`WizardController`].
//!
//! Runs synthesis on background tasks, keeps at most one in flight, performs
//! the handoff and broadcasts [`WizardEvent`]s to any number of renderers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, HandoffError, WizardError};
use crate::handoff::{Handoff, HandoffReceipt};
use crate::synth::Synthesizer;

use super::controller::{SynthesisOutcome, SynthesisTicket, WizardController, WizardSnapshot};
use super::events::WizardEvent;
use super::model::Rating;
use super::state::{GenerationToken, WizardState};

const EVENT_CAPACITY: usize = 64;

pub struct WizardSession {
    id: Uuid,
    controller: Arc<Mutex<WizardController>>,
    synthesizer: Arc<dyn Synthesizer>,
    handoff: Arc<Handoff>,
    tx: broadcast::Sender<WizardEvent>,
    inflight: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
}

impl WizardSession {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, handoff: Arc<Handoff>) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        let id = Uuid::new_v4();
        info!(session = %id, synthesizer = synthesizer.name(), "Wizard session started");
        Self {
            id,
            controller: Arc::new(Mutex::new(WizardController::new())),
            synthesizer,
            handoff,
            tx,
            inflight: Mutex::new(None),
            debounce: Duration::ZERO,
        }
    }

    /// Wait `debounce` before each synthesis; a newer input cancels the wait.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        self.controller.lock().await.snapshot()
    }

    pub async fn select_rating(&self, rating: Rating) -> Result<WizardState, WizardError> {
        let state = self.controller.lock().await.select_rating(rating)?;
        if rating.is_positive() {
            self.emit(WizardEvent::Celebrate);
        }
        self.emit(WizardEvent::StateChanged { state });
        Ok(state)
    }

    /// Flip a tag. Returns the token of the synthesis it started, if any.
    pub async fn toggle_preference(&self, tag: &str) -> Result<Option<GenerationToken>, WizardError> {
        let ticket = self.controller.lock().await.toggle_preference(tag)?;
        Ok(self.after_input_change(ticket).await)
    }

    pub async fn set_free_text(&self, text: &str) -> Result<Option<GenerationToken>, WizardError> {
        let ticket = self.controller.lock().await.set_free_text(text)?;
        Ok(self.after_input_change(ticket).await)
    }

    pub async fn retry(&self) -> Result<GenerationToken, WizardError> {
        let ticket = self.controller.lock().await.retry()?;
        let token = ticket.token;
        self.emit(WizardEvent::ReviewCleared);
        self.schedule(ticket).await;
        Ok(token)
    }

    /// Back to the rating screen; any in-flight synthesis is dropped.
    pub async fn reset(&self) {
        self.cancel_inflight().await;
        let state = {
            let mut controller = self.controller.lock().await;
            controller.reset();
            controller.state()
        };
        self.emit(WizardEvent::ReviewCleared);
        self.emit(WizardEvent::StateChanged { state });
    }

    /// Copy the review, then run progress and open the destination.
    ///
    /// When neither clipboard works a [`WizardEvent::ManualCopyRequired`] is
    /// emitted, the wizard stays on the preference step and nothing is opened.
    /// The controller is not locked while the clipboard is written.
    pub async fn commit(&self) -> Result<HandoffReceipt, Error> {
        let text = self.controller.lock().await.review_for_handoff()?;

        let copy_method = match self.handoff.copy(&text).await {
            Ok(method) => method,
            Err(HandoffError::ManualCopyRequired { text }) => {
                warn!(session = %self.id, "No clipboard available, manual copy required");
                self.emit(WizardEvent::ManualCopyRequired { text: text.clone() });
                return Err(HandoffError::ManualCopyRequired { text }.into());
            }
            Err(e) => return Err(e.into()),
        };

        {
            let mut controller = self.controller.lock().await;
            // Inputs may have changed while the clipboard was busy
            if controller.review_for_handoff()? != text {
                warn!(session = %self.id, "Review changed during copy, not handing off");
                return Err(WizardError::ReviewNotReady.into());
            }
            controller.acknowledge_and_handoff()?;
        }
        self.cancel_inflight().await;

        self.emit(WizardEvent::Copied {
            method: copy_method,
        });
        self.emit(WizardEvent::StateChanged {
            state: WizardState::Redirecting,
        });

        let tx = self.tx.clone();
        let redirected = self
            .handoff
            .redirect(move |percent| {
                let _ = tx.send(WizardEvent::Progress { percent });
            })
            .await;
        let (url, mode) = match redirected {
            Ok(target) => target,
            Err(e) => {
                let (url, reason) = match &e {
                    HandoffError::NavigationFailed { url, reason } => {
                        (url.clone(), reason.clone())
                    }
                    other => (
                        self.handoff.config().destination_url.clone(),
                        other.to_string(),
                    ),
                };
                warn!(
                    session = %self.id,
                    url = %url,
                    reason = %reason,
                    "Could not open review destination"
                );
                self.emit(WizardEvent::NavigationFailed { url, reason });
                return Err(e.into());
            }
        };

        self.emit(WizardEvent::Navigated {
            url: url.clone(),
            mode,
        });
        info!(session = %self.id, url = %url, "Handoff complete");
        Ok(HandoffReceipt {
            copy_method,
            url,
            mode,
        })
    }

    /// Wait for the in-flight synthesis, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.inflight.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(session = %self.id, error = %e, "Synthesis task failed");
                }
            }
        }
    }

    async fn after_input_change(&self, ticket: Option<SynthesisTicket>) -> Option<GenerationToken> {
        self.emit(WizardEvent::ReviewCleared);
        match ticket {
            Some(ticket) => {
                let token = ticket.token;
                self.schedule(ticket).await;
                Some(token)
            }
            None => {
                self.cancel_inflight().await;
                None
            }
        }
    }

    async fn schedule(&self, ticket: SynthesisTicket) {
        let SynthesisTicket { token, request } = ticket;
        let controller = Arc::clone(&self.controller);
        let synthesizer = Arc::clone(&self.synthesizer);
        let tx = self.tx.clone();
        let debounce = self.debounce;

        self.emit(WizardEvent::SynthesisStarted { token });

        let handle = tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            let result = synthesizer
                .synthesize(&request)
                .await
                .map_err(|e| e.to_string());

            let outcome = controller.lock().await.complete_synthesis(token, result);
            let event = match outcome {
                SynthesisOutcome::Ready(review) => WizardEvent::ReviewReady {
                    token,
                    text: review.text,
                },
                SynthesisOutcome::Failed(reason) => WizardEvent::SynthesisFailed { token, reason },
                SynthesisOutcome::Stale => return,
            };
            let _ = tx.send(event);
        });

        if let Some(previous) = self.inflight.lock().await.replace(handle) {
            debug!(session = %self.id, token = %token, "Superseding in-flight synthesis");
            previous.abort();
        }
    }

    async fn cancel_inflight(&self) {
        if let Some(handle) = self.inflight.lock().await.take() {
            handle.abort();
        }
    }

    fn emit(&self, event: WizardEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}
