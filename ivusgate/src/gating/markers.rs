//! Interactive frame-marker editing.
//!
//! The host's plot surface forwards abstract pointer events; the editor
//! owns the marker list and the selection state, and answers the ordered
//! frame-index query that is the terminal artifact of a gating session.
//! Rendering and event wiring stay with the host.

use ivuscore::data::range::FrameRange;

/// Pointer input in frame-number plot units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent {
    ButtonDown { x: f64 },
    Drag { x: f64 },
    ButtonUp,
}

/// Observable outcome of one pointer event.
///
/// `display_frame` is the 0-based frame the host's current-frame cursor
/// should jump to, derived from the pointer position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkerAction {
    /// A new marker was created at the pointer position.
    Placed { marker: usize, display_frame: usize },
    /// An existing marker within the sensitivity radius was selected;
    /// the marker count is unchanged.
    Selected { marker: usize, display_frame: usize },
    /// The selected marker tracked the pointer.
    Moved { marker: usize, display_frame: usize },
    /// The selection was released; the marker keeps its last position.
    Released,
    /// The event fell outside the plot or had no selection to act on.
    Ignored,
}

/// Marker editor state machine for one gating plot session.
///
/// Two states: idle, and dragging one selected marker. A button press
/// near an existing marker selects it instead of creating a new one;
/// the selection follows the pointer until release. Markers are never
/// deleted by interaction.
#[derive(Clone, Debug)]
pub struct MarkerEditor {
    x_min: f64,
    x_max: f64,
    sensitivity: f64,
    positions: Vec<f64>,
    selected: Option<usize>,
}

impl MarkerEditor {
    /// Creates an editor for a plot whose x axis spans `x_min..=x_max`
    /// frame numbers, selecting markers within `sensitivity` plot units
    /// of a press.
    pub fn new(x_min: f64, x_max: f64, sensitivity: f64) -> Self {
        MarkerEditor {
            x_min,
            x_max,
            sensitivity,
            positions: Vec::new(),
            selected: None,
        }
    }

    /// Editor for the gated range, with the selection radius derived
    /// from the frame count (`len / sensitivity_divisor`).
    pub fn for_range(range: &FrameRange, sensitivity_divisor: f64) -> Self {
        MarkerEditor::new(
            range.lower as f64 + 1.0,
            range.upper as f64,
            range.len() as f64 / sensitivity_divisor,
        )
    }

    /// Feeds one pointer event through the state machine.
    pub fn handle(&mut self, event: PointerEvent) -> MarkerAction {
        match event {
            PointerEvent::ButtonDown { x } => self.button_down(x),
            PointerEvent::Drag { x } => self.drag(x),
            PointerEvent::ButtonUp => self.button_up(),
        }
    }

    /// Marker x-positions in creation order.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Index of the marker currently being dragged, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The ordered output query: marker positions rounded to the nearest
    /// 1-based frame number, in creation order.
    ///
    /// Callers treating alternating markers as systole/diastole
    /// candidates must account for the ordering being creation order,
    /// not left-to-right position order.
    pub fn frame_indices(&self) -> Vec<u32> {
        self.positions.iter().map(|x| x.round() as u32).collect()
    }

    fn button_down(&mut self, x: f64) -> MarkerAction {
        if !self.in_bounds(x) {
            return MarkerAction::Ignored;
        }
        let display_frame = self.display_frame(x);

        if let Some((index, distance)) = self.nearest(x) {
            if distance < self.sensitivity {
                self.selected = Some(index);
                return MarkerAction::Selected {
                    marker: index,
                    display_frame,
                };
            }
        }
        self.positions.push(x);
        MarkerAction::Placed {
            marker: self.positions.len() - 1,
            display_frame,
        }
    }

    fn drag(&mut self, x: f64) -> MarkerAction {
        let Some(index) = self.selected else {
            return MarkerAction::Ignored;
        };
        if !self.in_bounds(x) {
            return MarkerAction::Ignored;
        }
        self.positions[index] = x;
        MarkerAction::Moved {
            marker: index,
            display_frame: self.display_frame(x),
        }
    }

    fn button_up(&mut self) -> MarkerAction {
        match self.selected.take() {
            Some(_) => MarkerAction::Released,
            None => MarkerAction::Ignored,
        }
    }

    fn in_bounds(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }

    /// 0-based frame for the host's current-frame cursor.
    fn display_frame(&self, x: f64) -> usize {
        (x - 1.0).round().max(0.0) as usize
    }

    fn nearest(&self, x: f64) -> Option<(usize, f64)> {
        self.positions
            .iter()
            .enumerate()
            .map(|(index, position)| (index, (position - x).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
