//! Pure state machine for the slide loop
//!
//! No I/O here: `transition(state, event)` returns the next state and the side
//! effects the driver must perform. Key rules:
//! - At most one timer is ever armed; arming replaces, disarming clears.
//! - Navigating away from a presenting URL disarms and returns to `Idle`.
//! - A timer that fires while the tab no longer presents moves the loop to
//!   `Stopped` and arms nothing further.

use crate::url::{has_loop_flag, next_slide_url, PresentingMatcher};

/// Loop state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Not on a presenting URL
    Idle,
    /// Presenting without the loop flag; the user has been invited to start
    Offered { url: String },
    /// A timer is armed and will navigate to `next_url`
    Looping { next_url: String },
    /// The loop was stopped explicitly or by a failed fire-time guard
    Stopped,
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// The tab finished loading `url`
    NavigationComplete { url: String },
    /// The user asked to loop; `url` is the tab's address at that moment
    ActionClicked { url: String },
    /// The armed timer elapsed; `current_url` is the tab's address at fire time
    TimerFired { current_url: String },
    /// Stop looping
    Stop,
}

/// Side effects for the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopAction {
    /// Switch the window to fullscreen (best-effort)
    EnterFullscreen,
    /// Surface the "start looping" affordance (best-effort)
    OfferLoop { url: String },
    /// Arm the single timer, replacing any armed one
    Arm { next_url: String },
    /// Cancel the armed timer, if any
    Disarm,
    /// Load `url` in the tab
    Navigate { url: String },
}

/// Pure state transition function
///
/// Takes current state and event, returns new state and actions to execute.
pub fn transition(
    state: &LoopState,
    event: LoopEvent,
    matcher: &PresentingMatcher,
) -> (LoopState, Vec<LoopAction>) {
    match event {
        LoopEvent::NavigationComplete { url } => {
            if !matcher.is_presenting(&url) {
                let actions = match state {
                    LoopState::Looping { .. } => vec![LoopAction::Disarm],
                    _ => vec![],
                };
                (LoopState::Idle, actions)
            } else if has_loop_flag(&url) {
                enter_loop(&url)
            } else {
                let mut actions = Vec::new();
                if matches!(state, LoopState::Looping { .. }) {
                    actions.push(LoopAction::Disarm);
                }
                actions.push(LoopAction::OfferLoop { url: url.clone() });
                (LoopState::Offered { url }, actions)
            }
        }

        LoopEvent::ActionClicked { url } => {
            if matcher.is_presenting(&url) {
                enter_loop(&url)
            } else {
                (state.clone(), vec![])
            }
        }

        LoopEvent::TimerFired { current_url } => match state {
            LoopState::Looping { next_url } if matcher.is_presenting(&current_url) => (
                LoopState::Looping {
                    next_url: next_url.clone(),
                },
                vec![LoopAction::Navigate {
                    url: next_url.clone(),
                }],
            ),
            LoopState::Looping { .. } => (LoopState::Stopped, vec![]),
            // Stale timer: nothing is looping any more
            other => (other.clone(), vec![]),
        },

        LoopEvent::Stop => (LoopState::Stopped, vec![LoopAction::Disarm]),
    }
}

fn enter_loop(url: &str) -> (LoopState, Vec<LoopAction>) {
    let next_url = next_slide_url(url).into_url(url);
    (
        LoopState::Looping {
            next_url: next_url.clone(),
        },
        vec![LoopAction::EnterFullscreen, LoopAction::Arm { next_url }],
    )
}
