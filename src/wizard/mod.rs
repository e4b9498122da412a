//! The review wizard: rating, preferences, generated review, handoff.
//!
//! [`WizardController`] owns the state machine and knows nothing about I/O.
//! [`WizardSession`] drives it asynchronously, running synthesis in the
//! background and broadcasting [`WizardEvent`]s to the renderer.

pub mod controller;
pub mod events;
pub mod model;
pub mod session;
pub mod state;

pub use controller::{SynthesisOutcome, SynthesisTicket, WizardController, WizardSnapshot};
pub use events::WizardEvent;
pub use model::{
    GeneratedReview, PREFERENCE_OPTIONS, PreferenceSet, Rating, RatingSelection,
    is_known_preference,
};
pub use session::WizardSession;
pub use state::{GenerationToken, SynthesisStatus, WizardState};
