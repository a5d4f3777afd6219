use serde::{Deserialize, Serialize};

use crate::model::{ListId, TaskId};

/// A pointer position in presentation coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// An axis-aligned bounding box in presentation coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Midpoint along the given axis
    pub fn midpoint(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.y + self.height / 2.0,
            Axis::Horizontal => self.x + self.width / 2.0,
        }
    }
}

/// The axis a container stacks its children along: cards stack vertically
/// inside a column, columns sit horizontally across the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    fn coordinate(self, p: Point) -> f32 {
        match self {
            Axis::Vertical => p.y,
            Axis::Horizontal => p.x,
        }
    }
}

/// Resolve the insertion index for a pointer among sibling boxes.
///
/// `siblings` are in display order and must already exclude the dragged item
/// and any fixed trailing affordance (the add-a-card row, the add-a-list
/// column). The insertion point is immediately before the first sibling whose
/// midpoint the pointer has not yet passed, or `siblings.len()` once the
/// pointer is past every midpoint — which callers render as "immediately
/// before the trailing affordance", never after it. A pure function of its
/// inputs, so a stationary pointer always resolves to the same index.
pub fn insertion_index(pointer: Point, axis: Axis, siblings: &[Rect]) -> usize {
    let coord = axis.coordinate(pointer);
    for (i, sibling) in siblings.iter().enumerate() {
        if coord < sibling.midpoint(axis) {
            return i;
        }
    }
    siblings.len()
}

// ---------------------------------------------------------------------------
// Layout snapshot supplied by the presentation layer
// ---------------------------------------------------------------------------

/// A card's bounding box tagged with its task
#[derive(Debug, Clone, PartialEq)]
pub struct CardBox {
    pub id: TaskId,
    pub bounds: Rect,
}

/// One list column's geometry for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub id: ListId,
    /// Full column bounds, header included
    pub bounds: Rect,
    /// Card boxes in display order, trailing affordances excluded
    pub cards: Vec<CardBox>,
}

impl ColumnLayout {
    /// Insertion index for a task dragged over this column, with the dragged
    /// card excluded from the sibling set
    pub fn card_insertion(&self, pointer: Point, dragged: &TaskId) -> usize {
        let siblings: Vec<Rect> = self
            .cards
            .iter()
            .filter(|c| &c.id != dragged)
            .map(|c| c.bounds)
            .collect();
        insertion_index(pointer, Axis::Vertical, &siblings)
    }
}

/// Geometry of the whole board for the current frame, rebuilt by the
/// presentation layer whenever it lays out
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardLayout {
    /// Columns in display order
    pub columns: Vec<ColumnLayout>,
}

impl BoardLayout {
    /// The column under the pointer, if any
    pub fn column_at(&self, pointer: Point) -> Option<&ColumnLayout> {
        self.columns.iter().find(|c| c.bounds.contains(pointer))
    }

    /// Insertion index for a list dragged across the board, with the dragged
    /// column excluded from the sibling set
    pub fn column_insertion(&self, pointer: Point, dragged: &ListId) -> usize {
        let siblings: Vec<Rect> = self
            .columns
            .iter()
            .filter(|c| &c.id != dragged)
            .map(|c| c.bounds)
            .collect();
        insertion_index(pointer, Axis::Horizontal, &siblings)
    }
}
