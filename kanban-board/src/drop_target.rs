//! Drop-position resolution for drag and drop.
//!
//! The UI hands over the pointer's vertical coordinate and the on-screen
//! rectangles of a list's cards, top to bottom. The target index follows the
//! midpoint rule: a pointer above the first card's midpoint lands at 0, below
//! the last card's midpoint lands at the end, otherwise it lands before the
//! first card whose midpoint is still below the pointer.

use serde::{Deserialize, Serialize};

/// Vertical extent of one rendered card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Build from `top` and `bottom`, as a DOM rect reports them
    pub fn from_bounds(top: f64, bottom: f64) -> Self {
        Self {
            top,
            height: bottom - top,
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Insertion index for a pointer at `pointer_y` among `rects`.
///
/// The result is in `0..=rects.len()`. A pointer exactly on a midpoint counts
/// as below it.
pub fn resolve_drop_index(pointer_y: f64, rects: &[ElementRect]) -> usize {
    rects
        .iter()
        .position(|rect| pointer_y < rect.midpoint())
        .unwrap_or(rects.len())
}

/// Target index for a move, given where the dragged card currently sits.
///
/// `rects` includes the dragged card when it is being reordered inside its
/// own list, in which case `dragged_index` is its index there. Dropping below
/// the card's own slot shifts the insertion point up by one, since the card
/// is removed before it is reinserted.
pub fn resolve_move_index(pointer_y: f64, rects: &[ElementRect], dragged_index: Option<usize>) -> usize {
    let insertion = resolve_drop_index(pointer_y, rects);
    match dragged_index {
        Some(from) if insertion > from => insertion - 1,
        _ => insertion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three 40px cards with 10px gaps: midpoints at 20, 70, 120.
    fn column() -> Vec<ElementRect> {
        vec![
            ElementRect::new(0.0, 40.0),
            ElementRect::new(50.0, 40.0),
            ElementRect::new(100.0, 40.0),
        ]
    }

    #[test]
    fn test_above_first_midpoint_is_zero() {
        assert_eq!(resolve_drop_index(-100.0, &column()), 0);
        assert_eq!(resolve_drop_index(19.9, &column()), 0);
    }

    #[test]
    fn test_after_last_midpoint_is_len() {
        assert_eq!(resolve_drop_index(120.0, &column()), 3);
        assert_eq!(resolve_drop_index(1_000.0, &column()), 3);
    }

    #[test]
    fn test_between_midpoints() {
        assert_eq!(resolve_drop_index(20.0, &column()), 1);
        assert_eq!(resolve_drop_index(69.0, &column()), 1);
        assert_eq!(resolve_drop_index(71.0, &column()), 2);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(resolve_drop_index(42.0, &[]), 0);
    }

    #[test]
    fn test_from_bounds() {
        let rect = ElementRect::from_bounds(10.0, 30.0);
        assert_eq!(rect.midpoint(), 20.0);
    }

    #[test]
    fn test_move_index_within_own_list() {
        let rects = column();
        // Dragging card 0 below card 1's midpoint: insertion 2, target 1.
        assert_eq!(resolve_move_index(80.0, &rects, Some(0)), 1);
        // Dragging card 2 to the top.
        assert_eq!(resolve_move_index(5.0, &rects, Some(2)), 0);
        // Dropping back onto its own slot is a no-op.
        assert_eq!(resolve_move_index(30.0, &rects, Some(0)), 0);
        // From another list nothing is removed first.
        assert_eq!(resolve_move_index(80.0, &rects, None), 2);
    }
}
