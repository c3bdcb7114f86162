//! Per-marker hover/click state machine.
//!
//! ```text
//! Idle --enter--> Hovered --leave--> Shown --dismiss elapsed--> Idle
//!                    ^                 |
//!                    +-----enter-------+
//! any --click--> ActiveClicked   (sticky: ignores enter/leave)
//! ```
//!
//! The board is pure: it returns the side effects a transition calls for
//! and the presenter carries them out.

/// Where one facility marker is in its popup lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerState {
    #[default]
    Idle,
    /// Pointer is over the marker; popup open.
    Hovered,
    /// Pointer left; popup open until the dismiss delay elapses.
    Shown,
    /// Selected by a click; popup stays open.
    ActiveClicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerInput {
    Enter,
    Leave,
    Click,
    DismissElapsed,
}

/// Side effect requested by a transition, addressed by facility id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerEffect {
    ShowPopup(String),
    HidePopup(String),
    ScheduleDismiss(String),
    CancelDismiss(String),
    Highlight(String),
    ClearHighlight(String),
}

#[derive(Debug, Clone, Default)]
pub struct MarkerBoard {
    markers: Vec<(String, MarkerState)>,
    active: Option<usize>,
}

impl MarkerBoard {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: ids
                .into_iter()
                .map(|id| (id.into(), MarkerState::Idle))
                .collect(),
            active: None,
        }
    }

    #[must_use]
    pub fn state(&self, id: &str) -> Option<MarkerState> {
        self.index_of(id).map(|i| self.markers[i].1)
    }

    /// The single clicked marker, if any.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.map(|i| self.markers[i].0.as_str())
    }

    /// Unknown ids produce no effects.
    pub fn apply(&mut self, id: &str, input: MarkerInput) -> Vec<MarkerEffect> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        let id = id.to_owned();
        let current = self.markers[index].1;

        let (next, effects) = match (current, input) {
            (MarkerState::Idle, MarkerInput::Enter) => {
                (MarkerState::Hovered, vec![MarkerEffect::ShowPopup(id)])
            }
            (MarkerState::Hovered, MarkerInput::Leave) => {
                (MarkerState::Shown, vec![MarkerEffect::ScheduleDismiss(id)])
            }
            (MarkerState::Shown, MarkerInput::Enter) => {
                (MarkerState::Hovered, vec![MarkerEffect::CancelDismiss(id)])
            }
            (MarkerState::Shown, MarkerInput::DismissElapsed) => {
                (MarkerState::Idle, vec![MarkerEffect::HidePopup(id)])
            }
            (_, MarkerInput::Click) => return self.select(index),
            (state, _) => (state, Vec::new()),
        };

        self.markers[index].1 = next;
        effects
    }

    /// Returns every marker to `Idle`, as a click on empty map canvas does.
    pub fn clear_all(&mut self) -> Vec<MarkerEffect> {
        let mut effects = Vec::new();
        for (id, state) in &mut self.markers {
            match *state {
                MarkerState::Idle => continue,
                MarkerState::Hovered => {}
                MarkerState::Shown => effects.push(MarkerEffect::CancelDismiss(id.clone())),
                MarkerState::ActiveClicked => {
                    effects.push(MarkerEffect::ClearHighlight(id.clone()));
                }
            }
            effects.push(MarkerEffect::HidePopup(id.clone()));
            *state = MarkerState::Idle;
        }
        self.active = None;
        effects
    }

    fn select(&mut self, index: usize) -> Vec<MarkerEffect> {
        let mut effects = Vec::new();
        if self.active == Some(index) {
            return effects;
        }

        if let Some(previous) = self.active.take() {
            let (prev_id, prev_state) = &mut self.markers[previous];
            *prev_state = MarkerState::Idle;
            effects.push(MarkerEffect::HidePopup(prev_id.clone()));
            effects.push(MarkerEffect::ClearHighlight(prev_id.clone()));
        }

        let (id, state) = &mut self.markers[index];
        match *state {
            MarkerState::Idle => effects.push(MarkerEffect::ShowPopup(id.clone())),
            MarkerState::Shown => effects.push(MarkerEffect::CancelDismiss(id.clone())),
            MarkerState::Hovered | MarkerState::ActiveClicked => {}
        }
        effects.push(MarkerEffect::Highlight(id.clone()));
        *state = MarkerState::ActiveClicked;
        self.active = Some(index);
        effects
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.markers.iter().position(|(marker, _)| marker == id)
    }
}
