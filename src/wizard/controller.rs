//! WizardController: single owner of the wizard's state, inputs and review.
//!
//! The controller is synchronous and never performs I/O. Operations that
//! require new review text hand back a [`SynthesisTicket`]; the caller runs
//! the synthesis and reports the outcome through [`WizardController::complete_synthesis`],
//! which only applies it if the ticket's token is still current.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::WizardError;
use crate::synth::SynthesisRequest;

use super::model::{GeneratedReview, PreferenceSet, Rating, RatingSelection, is_known_preference};
use super::state::{GenerationToken, SynthesisStatus, WizardState};

/// A synthesis job issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisTicket {
    pub token: GenerationToken,
    pub request: SynthesisRequest,
}

/// What happened when a synthesis result was reported back.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    /// The result was current and now populates the review.
    Ready(GeneratedReview),
    /// The result was current but the synthesis failed.
    Failed(String),
    /// A newer request (or a reset) superseded this one; the result was dropped.
    Stale,
}

/// Read-only view of the controller for renderers.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub state: WizardState,
    pub rating: Option<RatingSelection>,
    pub preferences: PreferenceSet,
    pub review: Option<GeneratedReview>,
    pub synthesis: SynthesisStatus,
    pub can_proceed: bool,
}

#[derive(Debug, Default)]
pub struct WizardController {
    state: WizardState,
    rating: Option<RatingSelection>,
    preferences: PreferenceSet,
    review: Option<GeneratedReview>,
    status: SynthesisStatus,
    /// Last token handed out. Only a result carrying this token is applied.
    latest_token: GenerationToken,
    /// Token of the request still awaiting a result, if any.
    pending: Option<GenerationToken>,
}

impl WizardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn rating(&self) -> Option<&RatingSelection> {
        self.rating.as_ref()
    }

    pub fn preferences(&self) -> &PreferenceSet {
        &self.preferences
    }

    pub fn review(&self) -> Option<&GeneratedReview> {
        self.review.as_ref()
    }

    pub fn synthesis_status(&self) -> &SynthesisStatus {
        &self.status
    }

    /// Token of the outstanding synthesis request, if one is in flight.
    pub fn pending_token(&self) -> Option<GenerationToken> {
        self.pending
    }

    pub fn can_proceed(&self) -> bool {
        self.preferences.can_proceed()
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            state: self.state,
            rating: self.rating.clone(),
            preferences: self.preferences.clone(),
            review: self.review.clone(),
            synthesis: self.status.clone(),
            can_proceed: self.can_proceed(),
        }
    }

    /// Record the rating and move to the preference step (positive) or the
    /// terminal negative acknowledgement.
    pub fn select_rating(&mut self, rating: Rating) -> Result<WizardState, WizardError> {
        let target = if rating.is_positive() {
            WizardState::CollectingPreferences
        } else {
            WizardState::Negative
        };
        self.transition(target, "select a rating")?;
        self.rating = Some(rating.selection());
        info!(rating = %rating, state = %target, "Rating selected");
        Ok(target)
    }

    /// Flip a preference tag. Returns a ticket when the new inputs warrant synthesis.
    pub fn toggle_preference(&mut self, tag: &str) -> Result<Option<SynthesisTicket>, WizardError> {
        self.require(WizardState::CollectingPreferences, "toggle a preference")?;
        if !is_known_preference(tag) {
            return Err(WizardError::UnknownPreference(tag.to_string()));
        }

        let selected = self.preferences.toggle(tag);
        debug!(tag, selected, "Preference toggled");
        Ok(self.invalidate())
    }

    /// Replace the free text. Returns a ticket when the new inputs warrant synthesis.
    pub fn set_free_text(&mut self, text: &str) -> Result<Option<SynthesisTicket>, WizardError> {
        self.require(WizardState::CollectingPreferences, "edit the review text")?;
        self.preferences.text = text.to_string();
        Ok(self.invalidate())
    }

    /// Re-run synthesis with unchanged inputs, e.g. after a failure.
    pub fn retry(&mut self) -> Result<SynthesisTicket, WizardError> {
        self.require(WizardState::CollectingPreferences, "retry generation")?;
        self.invalidate().ok_or(WizardError::CannotProceed)
    }

    /// Apply a synthesis result if `token` is still the current one.
    pub fn complete_synthesis(
        &mut self,
        token: GenerationToken,
        result: Result<String, String>,
    ) -> SynthesisOutcome {
        if self.state != WizardState::CollectingPreferences || self.pending != Some(token) {
            debug!(token = %token, latest = %self.latest_token, "Discarding stale synthesis result");
            return SynthesisOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(text) if !text.trim().is_empty() => {
                let review = GeneratedReview::new(text.trim(), token);
                self.review = Some(review.clone());
                self.status = SynthesisStatus::Ready;
                info!(token = %token, chars = review.text.len(), "Review ready");
                SynthesisOutcome::Ready(review)
            }
            Ok(_) => self.fail(token, "generated review was empty".to_string()),
            Err(reason) => self.fail(token, reason),
        }
    }

    /// Text to hand off, without changing state.
    pub fn review_for_handoff(&self) -> Result<String, WizardError> {
        self.require(WizardState::CollectingPreferences, "hand off the review")?;
        self.review
            .as_ref()
            .map(|r| r.text.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or(WizardError::ReviewNotReady)
    }

    /// Confirm the review and move to the terminal redirecting state.
    pub fn acknowledge_and_handoff(&mut self) -> Result<String, WizardError> {
        let text = self.review_for_handoff()?;
        self.transition(WizardState::Redirecting, "hand off the review")?;
        self.pending = None;
        info!("Review acknowledged, redirecting");
        Ok(text)
    }

    /// Drop everything and return to the rating screen. Any pending
    /// synthesis result will be reported as stale.
    pub fn reset(&mut self) {
        let latest = self.latest_token;
        *self = Self {
            latest_token: latest.next(),
            ..Self::default()
        };
        info!("Wizard reset");
    }

    /// Clear the review and issue a fresh token if the inputs allow synthesis.
    fn invalidate(&mut self) -> Option<SynthesisTicket> {
        self.review = None;
        self.latest_token = self.latest_token.next();

        if !self.preferences.can_proceed() {
            self.pending = None;
            self.status = SynthesisStatus::Idle;
            return None;
        }

        let rating = self.rating.clone()?;
        let token = self.latest_token;
        self.pending = Some(token);
        self.status = SynthesisStatus::Pending { token };
        Some(SynthesisTicket {
            token,
            request: SynthesisRequest {
                rating,
                preferences: self.preferences.clone(),
            },
        })
    }

    fn fail(&mut self, token: GenerationToken, reason: String) -> SynthesisOutcome {
        self.status = SynthesisStatus::Failed {
            reason: reason.clone(),
        };
        info!(token = %token, reason = %reason, "Review generation failed");
        SynthesisOutcome::Failed(reason)
    }

    /// Move to `target` if the state table allows it from the current state.
    fn transition(&mut self, target: WizardState, action: &str) -> Result<(), WizardError> {
        if !self.state.can_transition_to(target) {
            return Err(WizardError::InvalidTransition {
                state: self.state.to_string(),
                action: action.to_string(),
            });
        }
        self.state = target;
        Ok(())
    }

    fn require(&self, expected: WizardState, action: &str) -> Result<(), WizardError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                state: self.state.to_string(),
                action: action.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting() -> WizardController {
        let mut ctl = WizardController::new();
        ctl.select_rating(Rating::Excellent).unwrap();
        ctl
    }

    #[test]
    fn positive_rating_moves_to_preferences() {
        for rating in [Rating::Excellent, Rating::Good] {
            let mut ctl = WizardController::new();
            assert_eq!(ctl.select_rating(rating).unwrap(), WizardState::CollectingPreferences);
            assert!(!ctl.can_proceed());
            assert_eq!(ctl.rating().unwrap().label, rating.label());
        }
    }

    #[test]
    fn negative_rating_is_terminal() {
        for rating in [Rating::Ok, Rating::Bad] {
            let mut ctl = WizardController::new();
            assert_eq!(ctl.select_rating(rating).unwrap(), WizardState::Negative);

            let err = ctl.toggle_preference("Lead Quality").unwrap_err();
            assert!(matches!(err, WizardError::InvalidTransition { .. }));
            assert!(ctl.set_free_text("nice").is_err());
            assert!(ctl.retry().is_err());
            assert!(ctl.acknowledge_and_handoff().is_err());
            assert!(ctl.preferences().tags.is_empty());
            assert_eq!(ctl.state(), WizardState::Negative);
            assert_eq!(ctl.pending_token(), None);
        }
    }

    #[test]
    fn rating_cannot_be_changed() {
        let mut ctl = collecting();
        assert!(ctl.select_rating(Rating::Bad).is_err());
        assert_eq!(ctl.rating().unwrap().rating, Rating::Excellent);
    }

    #[test]
    fn moves_follow_the_state_table() {
        let mut ctl = WizardController::new();
        assert_eq!(ctl.select_rating(Rating::Ok).unwrap(), WizardState::Negative);
        assert!(ctl.state().is_terminal());
        assert_eq!(
            ctl.select_rating(Rating::Good).unwrap_err(),
            WizardError::InvalidTransition {
                state: "negative".into(),
                action: "select a rating".into(),
            }
        );
        assert_eq!(ctl.rating().unwrap().rating, Rating::Ok);

        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        ctl.complete_synthesis(ticket.token, Ok("Great leads.".into()));
        ctl.acknowledge_and_handoff().unwrap();
        assert!(ctl.state().is_terminal());
        assert!(matches!(
            ctl.select_rating(Rating::Good),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn preference_ops_rejected_before_rating() {
        let mut ctl = WizardController::new();
        assert!(ctl.toggle_preference("Lead Quality").is_err());
        assert!(ctl.set_free_text("hi").is_err());
        assert_eq!(ctl.state(), WizardState::SelectingRating);
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut ctl = collecting();
        assert_eq!(
            ctl.toggle_preference("Reach").unwrap_err(),
            WizardError::UnknownPreference("Reach".into())
        );
        assert!(ctl.preferences().tags.is_empty());
    }

    #[test]
    fn toggle_issues_ticket_with_current_inputs() {
        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Customer Support").unwrap().unwrap();
        assert_eq!(ticket.request.preferences.tags, vec!["Customer Support"]);
        assert_eq!(ticket.request.rating.rating, Rating::Excellent);
        assert_eq!(ctl.pending_token(), Some(ticket.token));
        assert_eq!(
            ctl.synthesis_status(),
            &SynthesisStatus::Pending { token: ticket.token }
        );
    }

    #[test]
    fn toggling_last_tag_off_cancels_without_ticket() {
        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        assert!(ctl.toggle_preference("Lead Quality").unwrap().is_none());
        assert!(!ctl.can_proceed());
        assert_eq!(ctl.pending_token(), None);
        assert_eq!(
            ctl.complete_synthesis(ticket.token, Ok("late".into())),
            SynthesisOutcome::Stale
        );
        assert!(ctl.review().is_none());
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut ctl = collecting();
        let first = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        let second = ctl.toggle_preference("Customer Support").unwrap().unwrap();
        assert!(second.token > first.token);

        let outcome = ctl.complete_synthesis(second.token, Ok("second".into()));
        assert!(matches!(outcome, SynthesisOutcome::Ready(ref r) if r.text == "second"));

        // The first request resolves late.
        assert_eq!(
            ctl.complete_synthesis(first.token, Ok("first".into())),
            SynthesisOutcome::Stale
        );
        assert_eq!(ctl.review().unwrap().text, "second");
    }

    #[test]
    fn stale_result_discarded_even_when_it_arrives_first() {
        let mut ctl = collecting();
        let first = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        let second = ctl.set_free_text("quick answers").unwrap().unwrap();

        assert_eq!(
            ctl.complete_synthesis(first.token, Ok("first".into())),
            SynthesisOutcome::Stale
        );
        assert!(ctl.review().is_none());
        ctl.complete_synthesis(second.token, Ok("second".into()));
        assert_eq!(ctl.review().unwrap().text, "second");
    }

    #[test]
    fn preference_change_clears_review() {
        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        ctl.complete_synthesis(ticket.token, Ok("Great leads.".into()));
        assert!(ctl.review().is_some());

        ctl.toggle_preference("Professionalism").unwrap();
        assert!(ctl.review().is_none());
        assert!(matches!(ctl.review_for_handoff(), Err(WizardError::ReviewNotReady)));
    }

    #[test]
    fn failure_blocks_handoff_and_allows_retry() {
        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        let outcome = ctl.complete_synthesis(ticket.token, Err("HTTP 500".into()));
        assert_eq!(outcome, SynthesisOutcome::Failed("HTTP 500".into()));
        assert_eq!(ctl.acknowledge_and_handoff().unwrap_err(), WizardError::ReviewNotReady);
        assert_eq!(ctl.state(), WizardState::CollectingPreferences);

        let retry = ctl.retry().unwrap();
        assert!(retry.token > ticket.token);
        assert_eq!(retry.request, ticket.request);
    }

    #[test]
    fn empty_result_counts_as_failure() {
        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        assert!(matches!(
            ctl.complete_synthesis(ticket.token, Ok("   ".into())),
            SynthesisOutcome::Failed(_)
        ));
        assert!(ctl.review().is_none());
    }

    #[test]
    fn retry_requires_inputs() {
        let mut ctl = collecting();
        assert_eq!(ctl.retry().unwrap_err(), WizardError::CannotProceed);
    }

    #[test]
    fn handoff_moves_to_redirecting() {
        let mut ctl = collecting();
        let ticket = ctl.set_free_text("  the weekly reports ").unwrap().unwrap();
        ctl.complete_synthesis(ticket.token, Ok("  Loved the weekly reports.  ".into()));

        assert_eq!(ctl.acknowledge_and_handoff().unwrap(), "Loved the weekly reports.");
        assert_eq!(ctl.state(), WizardState::Redirecting);
        assert!(ctl.toggle_preference("Lead Quality").is_err());
        assert!(ctl.acknowledge_and_handoff().is_err());
    }

    #[test]
    fn reset_invalidates_pending_request() {
        let mut ctl = collecting();
        let ticket = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        ctl.reset();

        assert_eq!(ctl.state(), WizardState::SelectingRating);
        assert!(ctl.rating().is_none());
        assert!(ctl.preferences().tags.is_empty());

        ctl.select_rating(Rating::Good).unwrap();
        assert_eq!(
            ctl.complete_synthesis(ticket.token, Ok("old".into())),
            SynthesisOutcome::Stale
        );
        let next = ctl.toggle_preference("Lead Quality").unwrap().unwrap();
        assert!(next.token > ticket.token);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut ctl = collecting();
        ctl.toggle_preference("Ease of Set Up").unwrap();
        let snap = ctl.snapshot();
        assert_eq!(snap.state, WizardState::CollectingPreferences);
        assert!(snap.can_proceed);
        assert_eq!(snap.preferences.tags, vec!["Ease of Set Up"]);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"], "collecting_preferences");
        assert_eq!(json["synthesis"]["status"], "pending");
    }
}
