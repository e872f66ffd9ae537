//! Step flow controller.
//!
//! Sequences a user through a caller-supplied set of named steps. Transitions
//! are explicit: the controller never infers "next" from position, it only
//! checks that the requested step belongs to the flow. A history stack backs
//! `retreat`, and a string-keyed data bag accumulates whatever the caller
//! chooses to attach to each transition.
//!
//! Invariants held by every [`FlowState`] produced here:
//!
//! - `history` is never empty
//! - `current_step == history.last()`
//! - `history` may repeat a step when it is revisited

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FlowError;

/// Data carried alongside a flow. Keys are chosen by the caller.
pub type StepData = Map<String, Value>;

/// Snapshot of a flow: where it is, how it got there, and what was collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState<S> {
    current_step: S,
    history: Vec<S>,
    data: StepData,
}

impl<S: Clone> FlowState<S> {
    /// The state of a freshly initialized or reset flow.
    #[must_use]
    pub fn initial(step: S) -> Self {
        Self {
            current_step: step.clone(),
            history: vec![step],
            data: StepData::new(),
        }
    }

    /// Move to `next`, recording it in history and shallow-merging `payload`
    /// into the data bag (existing keys are overwritten).
    #[must_use]
    pub fn advanced(&self, next: S, payload: StepData) -> Self {
        let mut history = self.history.clone();
        history.push(next.clone());
        let mut data = self.data.clone();
        data.extend(payload);
        Self {
            current_step: next,
            history,
            data,
        }
    }

    /// Step back one entry in history. Data is kept.
    ///
    /// With a single history entry there is nowhere to go and the state is
    /// returned unchanged.
    #[must_use]
    pub fn retreated(&self) -> Self {
        if self.history.len() <= 1 {
            return self.clone();
        }
        let mut history = self.history.clone();
        history.pop();
        let current_step = history
            .last()
            .cloned()
            .unwrap_or_else(|| self.current_step.clone());
        Self {
            current_step,
            history,
            data: self.data.clone(),
        }
    }

    /// The step currently shown.
    pub fn current_step(&self) -> &S {
        &self.current_step
    }

    /// Every step visited, oldest first. Never empty.
    pub fn history(&self) -> &[S] {
        &self.history
    }

    /// Accumulated transition payloads.
    pub fn data(&self) -> &StepData {
        &self.data
    }
}

/// A flow over a fixed set of steps.
///
/// # Examples
///
/// ```
/// # use keeptouch_core::flow::{StepFlow, StepData};
/// let mut flow = StepFlow::new(["name", "blocker", "plan"], "name").unwrap();
/// assert!(flow.advance("blocker", StepData::new()));
/// assert!(!flow.advance("checkout", StepData::new()));
/// assert_eq!(*flow.current_step(), "blocker");
/// flow.retreat();
/// assert_eq!(flow.history(), ["name"]);
/// ```
#[derive(Debug, Clone)]
pub struct StepFlow<S> {
    steps: Vec<S>,
    initial: S,
    state: FlowState<S>,
}

impl<S: Clone + Eq + fmt::Debug> StepFlow<S> {
    /// Initialize a flow positioned at `initial`.
    ///
    /// # Errors
    ///
    /// - [`FlowError::EmptySteps`] if `steps` is empty.
    /// - [`FlowError::UnknownInitialStep`] if `initial` is not in `steps`.
    pub fn new(steps: impl IntoIterator<Item = S>, initial: S) -> Result<Self, FlowError> {
        let steps: Vec<S> = steps.into_iter().collect();
        if steps.is_empty() {
            return Err(FlowError::EmptySteps);
        }
        if !steps.contains(&initial) {
            return Err(FlowError::UnknownInitialStep {
                step: format!("{initial:?}"),
            });
        }
        Ok(Self {
            state: FlowState::initial(initial.clone()),
            steps,
            initial,
        })
    }

    /// Move to `next`, merging `payload` into the data bag.
    ///
    /// A step outside the flow is reported and ignored so the caller's UI
    /// stays usable. Returns whether the transition happened.
    pub fn advance(&mut self, next: S, payload: StepData) -> bool {
        if !self.steps.contains(&next) {
            tracing::warn!(step = ?next, "step is not defined in this flow, ignoring");
            return false;
        }
        self.state = self.state.advanced(next, payload);
        true
    }

    /// Go back to the previous step. Returns `false` when already at the
    /// first entry of history.
    pub fn retreat(&mut self) -> bool {
        if self.state.history.len() <= 1 {
            return false;
        }
        self.state = self.state.retreated();
        true
    }

    /// Restart at `initial`, discarding history and data.
    ///
    /// A step outside the flow is reported and ignored. Returns whether the
    /// reset happened.
    pub fn reset(&mut self, initial: S) -> bool {
        if !self.steps.contains(&initial) {
            tracing::warn!(step = ?initial, "step is not defined in this flow, ignoring");
            return false;
        }
        self.state = FlowState::initial(initial.clone());
        self.initial = initial;
        true
    }

    /// Merge `payload` into the data bag without changing step.
    pub fn set_data(&mut self, payload: StepData) {
        self.state.data.extend(payload);
    }

    /// Whether `step` belongs to this flow.
    pub fn contains(&self, step: &S) -> bool {
        self.steps.contains(step)
    }

    pub fn current_step(&self) -> &S {
        self.state.current_step()
    }

    pub fn history(&self) -> &[S] {
        self.state.history()
    }

    pub fn data(&self) -> &StepData {
        self.state.data()
    }

    pub fn state(&self) -> &FlowState<S> {
        &self.state
    }

    pub fn initial_step(&self) -> &S {
        &self.initial
    }
}
