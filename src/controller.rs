//! The annotation interaction state machine.
//!
//! One controller instance owns the whole mutable session state: the
//! outline buffer, the committed polygon set, the current-class selector
//! and the drag mode. All mutation is routed through
//! [`AnnotationController::handle_event`], which a frontend feeds with
//! data-space input events.
//!
//! The controller is either idle or dragging one vertex of the in-progress
//! outline. A primary press near an outline vertex (within the locator's
//! normalized threshold) picks it up; the following release drops it at the
//! release position. A release with nothing picked appends a new vertex.

use crate::annotation::{AnnotationSet, CLASS_MIN, PointBuffer};
use crate::display::{DisplaySurface, InputEvent, Key, MouseButton};
use crate::geometry::Point;
use crate::pick::VertexLocator;

/// Edit commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// Discard the in-progress outline.
    Clear,
    /// Commit the in-progress outline with the current class.
    Commit,
    /// Drop the last outline vertex.
    PopVertex,
    /// Remove the first polygon containing the pointer position.
    Delete,
    /// Restore the last removed polygon.
    Undo,
    /// Select a class, or reclassify the polygons under the pointer.
    SetClass(u8),
    /// Rasterize and write the labeled copy.
    Export,
}

impl EditCommand {
    /// Map a key to its command, if it has one.
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Enter => Some(Self::Commit),
            Key::Escape => Some(Self::Clear),
            Key::Backspace => Some(Self::PopVertex),
            Key::Char('d') => Some(Self::Delete),
            Key::Char('u') => Some(Self::Undo),
            Key::Char('w') => Some(Self::Export),
            Key::Digit(n) if (1..=9).contains(&n) => Some(Self::SetClass(n)),
            _ => None,
        }
    }
}

/// Side effects the controller cannot perform itself; surfaced to the
/// session owner, which holds the grid and the output paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    /// Rasterize the current annotations and export the labeled grid.
    Export,
}

/// Interaction state machine over the annotation session.
#[derive(Debug)]
pub struct AnnotationController {
    buffer: PointBuffer,
    annotations: AnnotationSet,
    locator: VertexLocator,
    /// Index of the outline vertex being dragged, if any.
    drag: Option<usize>,
    /// Class assigned to the next committed polygon.
    current_class: u8,
    /// Set while a competing interaction mode (pan, modal UI) claims the
    /// pointer; all annotation input is ignored meanwhile.
    blocked: bool,
}

impl AnnotationController {
    /// Create a controller for a section spanning `cols` x `rows` data
    /// units, with the given normalized pick threshold.
    pub fn new(rows: usize, cols: usize, pick_threshold: f64) -> Self {
        Self {
            buffer: PointBuffer::new(),
            annotations: AnnotationSet::new(),
            locator: VertexLocator::new(cols.max(1) as f64, rows.max(1) as f64, pick_threshold),
            drag: None,
            current_class: CLASS_MIN,
            blocked: false,
        }
    }

    /// The in-progress outline vertices.
    pub fn outline(&self) -> &[Point] {
        self.buffer.points()
    }

    /// The committed polygons.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// The class the next commit will carry.
    pub fn current_class(&self) -> u8 {
        self.current_class
    }

    /// Whether a vertex drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Claim or release the pointer for a competing interaction mode.
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    /// Feed one input event through the state machine.
    ///
    /// Requests the frontend redraw whenever visible geometry changed, and
    /// returns a [`SessionRequest`] when the event asks for work the
    /// controller does not own.
    pub fn handle_event(
        &mut self,
        event: InputEvent,
        display: &mut dyn DisplaySurface,
    ) -> Option<SessionRequest> {
        if self.blocked {
            // Leaving a drag dangling across a mode switch would teleport
            // the vertex on the next unrelated release.
            self.drag = None;
            return None;
        }

        match event {
            InputEvent::PointerPressed { pos, button } => {
                if button == MouseButton::Primary {
                    self.drag = self.locator.pick(pos, self.buffer.points());
                    if let Some(index) = self.drag {
                        log::debug!("picked outline vertex {}", index);
                    }
                }
                None
            }
            InputEvent::PointerReleased { pos, button } => {
                if let Some(index) = self.drag.take() {
                    // A release that moved nothing still ends the drag.
                    self.buffer.move_vertex(index, pos);
                    display.request_redraw();
                } else if button == MouseButton::Primary {
                    self.buffer.append(pos);
                    display.request_redraw();
                }
                None
            }
            InputEvent::KeyPressed { key, pos } => match EditCommand::from_key(key) {
                Some(command) => self.apply(command, pos, display),
                None => None,
            },
        }
    }

    /// Apply an edit command. `pos` is the pointer position associated with
    /// the triggering event, when it was over the section view.
    pub fn apply(
        &mut self,
        command: EditCommand,
        pos: Option<Point>,
        display: &mut dyn DisplaySurface,
    ) -> Option<SessionRequest> {
        match command {
            EditCommand::Clear => {
                if !self.buffer.is_empty() {
                    self.buffer.clear();
                    display.request_redraw();
                }
            }
            EditCommand::Commit => {
                if let Some(vertices) = self.buffer.take_polygon() {
                    self.annotations.commit(vertices, self.current_class);
                    display.request_redraw();
                }
            }
            EditCommand::PopVertex => {
                if self.buffer.pop_last() {
                    display.request_redraw();
                }
            }
            EditCommand::Delete => {
                if let Some(pos) = pos
                    && self.annotations.remove_at(pos)
                {
                    display.request_redraw();
                }
            }
            EditCommand::Undo => {
                if self.annotations.undo_removal() {
                    display.request_redraw();
                }
            }
            EditCommand::SetClass(class) => {
                // Reclassify the polygons under the pointer; only when the
                // pointer hits nothing does the digit select the class for
                // future commits.
                let hits = match pos {
                    Some(pos) => self.annotations.reclassify(pos, class),
                    None => 0,
                };
                if hits > 0 {
                    display.request_redraw();
                } else {
                    self.current_class = class;
                }
            }
            EditCommand::Export => return Some(SessionRequest::Export),
        }
        None
    }
}
