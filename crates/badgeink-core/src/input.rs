//! Input state management for mouse/touch drag events.

use crate::position::{BadgePosition, ClampBounds, container_contains, map_client_point};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Which input device produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputModality {
    Pointer,
    Touch,
}

/// Phase of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Button press or first touch point.
    Start,
    /// Pointer or touch movement.
    Move,
    /// Release, pointer leave, touch end or touch cancel.
    End,
}

/// Input event type for unified mouse/touch handling.
///
/// `position` is in client coordinates, the same space as the container rect
/// handed to [`DragTracker::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    pub position: Point,
    pub modality: InputModality,
}

impl InputEvent {
    pub fn new(kind: InputKind, position: Point, modality: InputModality) -> Self {
        Self {
            kind,
            position,
            modality,
        }
    }

    pub fn pointer_down(position: Point) -> Self {
        Self::new(InputKind::Start, position, InputModality::Pointer)
    }

    pub fn pointer_move(position: Point) -> Self {
        Self::new(InputKind::Move, position, InputModality::Pointer)
    }

    pub fn pointer_up(position: Point) -> Self {
        Self::new(InputKind::End, position, InputModality::Pointer)
    }

    /// The pointer left the tracked container; ends any drag.
    pub fn pointer_leave(position: Point) -> Self {
        Self::new(InputKind::End, position, InputModality::Pointer)
    }

    /// Touch start from the list of active touch points. Only the first counts.
    pub fn touch_start(touches: &[Point]) -> Option<Self> {
        touches
            .first()
            .map(|p| Self::new(InputKind::Start, *p, InputModality::Touch))
    }

    /// Touch move from the list of active touch points. Only the first counts.
    pub fn touch_move(touches: &[Point]) -> Option<Self> {
        touches
            .first()
            .map(|p| Self::new(InputKind::Move, *p, InputModality::Touch))
    }

    pub fn touch_end(position: Point) -> Self {
        Self::new(InputKind::End, position, InputModality::Touch)
    }
}

/// Drag state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Modality that opened the drag.
        modality: InputModality,
    },
}

/// Tracks whether the badge is being dragged and turns moves into positions.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    state: DragState,
    bounds: ClampBounds,
}

impl DragTracker {
    /// Create an idle tracker clamping into the default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle tracker clamping into `bounds`.
    pub fn with_bounds(bounds: ClampBounds) -> Self {
        Self {
            state: DragState::Idle,
            bounds,
        }
    }

    /// Process one input event.
    ///
    /// A drag only opens on a press inside `container` (edges included).
    /// Returns the new badge position for moves during a drag, `None` otherwise.
    /// Every qualifying move is published, there is no throttling.
    pub fn handle(&mut self, event: &InputEvent, container: Rect) -> Option<BadgePosition> {
        match (event.kind, self.state) {
            (InputKind::Start, DragState::Idle) if !container_contains(container, event.position) => {
                log::debug!("Ignoring press outside the container at {:?}", event.position);
                None
            }
            (InputKind::Start, DragState::Idle) => {
                log::debug!("Drag started ({:?})", event.modality);
                self.state = DragState::Dragging {
                    modality: event.modality,
                };
                None
            }
            (InputKind::Start, DragState::Dragging { .. }) => None,
            (InputKind::Move, DragState::Dragging { .. }) => {
                Some(map_client_point(event.position, container, &self.bounds))
            }
            (InputKind::Move, DragState::Idle) => None,
            (InputKind::End, DragState::Dragging { modality }) => {
                log::debug!("Drag ended ({:?} opened, {:?} closed)", modality, event.modality);
                self.state = DragState::Idle;
                None
            }
            (InputKind::End, DragState::Idle) => None,
        }
    }

    /// Current state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a drag is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Modality of the active drag, if any.
    pub fn modality(&self) -> Option<InputModality> {
        match self.state {
            DragState::Dragging { modality } => Some(modality),
            DragState::Idle => None,
        }
    }

    /// Drop any active drag without publishing a position.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}
