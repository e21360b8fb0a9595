//! Focus System - Keyboard navigation and focus state
//!
//! Manages which code cell owns the keyboard:
//! - `focused_index` signal (currently focused cell, -1 for none)
//! - Cell allocation (widgets claim a contiguous index range)
//! - Focus cycling (Tab/Shift+Tab)
//! - Focus callbacks (onFocus/onBlur)
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::state::focus;
//!
//! // Widgets claim their cell indices up front
//! let first = focus::allocate_cells(6);
//!
//! // Navigate with Tab
//! focus::focus_next();
//! focus::focus_previous();
//!
//! // Focus a specific cell
//! focus::focus(first + 2);
//!
//! // Register callbacks
//! let cleanup = focus::register_callbacks(first, FocusCallbacks {
//!     on_focus: Some(Rc::new(|| println!("Focused!"))),
//!     on_blur: Some(Rc::new(|| println!("Blurred!"))),
//! });
//! ```

use spark_signals::{Signal, signal};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

// =============================================================================
// FOCUSED INDEX SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<i32> = signal(-1);
}

/// Get the currently focused cell index (-1 if none)
pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

/// Check if any cell is focused
pub fn has_focus() -> bool {
    get_focused_index() >= 0
}

/// Check if a specific cell is focused
pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

// =============================================================================
// CELL ALLOCATION
// =============================================================================

thread_local! {
    static NEXT_INDEX: Cell<usize> = const { Cell::new(0) };
    // Kept in allocation order, which is also tab order
    static FOCUSABLE: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Allocate `count` sequential focusable cell indices.
/// Returns the first index of the range. Indices are not recycled.
pub fn allocate_cells(count: usize) -> usize {
    let first = NEXT_INDEX.with(|n| {
        let first = n.get();
        n.set(first + count);
        first
    });
    FOCUSABLE.with(|list| {
        let mut list = list.borrow_mut();
        list.extend(first..first + count);
    });
    first
}

/// Release a range of cell indices.
/// Blurs first when the focused cell is inside the range.
pub fn release_cells(first: usize, count: usize) {
    let focused = get_focused_index();
    if focused >= 0 {
        let index = focused as usize;
        if index >= first && index < first + count {
            set_focus_with_callbacks(-1);
        }
    }

    FOCUSABLE.with(|list| {
        list.borrow_mut()
            .retain(|&i| i < first || i >= first + count);
    });
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        for index in first..first + count {
            reg.remove(&index);
        }
    });
}

/// Get all focusable cell indices in tab order
pub fn get_focusable_indices() -> Vec<usize> {
    FOCUSABLE.with(|list| list.borrow().clone())
}

// =============================================================================
// FOCUS CALLBACKS
// =============================================================================

/// Callbacks fired when focus changes.
///
/// Rc so the firing path can snapshot them out of the registry and run
/// them without holding the registry borrow.
#[derive(Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Rc<dyn Fn()>>,
    pub on_blur: Option<Rc<dyn Fn()>>,
}

thread_local! {
    // Multiple callbacks per index supported
    static FOCUS_CALLBACK_REGISTRY: RefCell<HashMap<usize, Vec<FocusCallbacks>>> =
        RefCell::new(HashMap::new());
}

/// Register focus callbacks for a cell.
/// Returns cleanup function to unregister.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let callback_id = FOCUS_CALLBACK_REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let list = reg.entry(index).or_default();
        let id = list.len();
        list.push(callbacks);
        id
    });

    move || {
        FOCUS_CALLBACK_REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.get_mut(&index) {
                if callback_id < list.len() {
                    // Mark as removed (can't remove from Vec while preserving IDs)
                    list[callback_id].on_focus = None;
                    list[callback_id].on_blur = None;
                }
                // Clean up if all callbacks removed
                if list
                    .iter()
                    .all(|cb| cb.on_focus.is_none() && cb.on_blur.is_none())
                {
                    reg.remove(&index);
                }
            }
        });
    }
}

/// Snapshot one side of a cell's registered callbacks.
///
/// The registry borrow is released before the caller runs any of them,
/// so a callback may register or unregister callbacks itself.
fn snapshot_callbacks<F>(index: usize, pick: F) -> Vec<Rc<dyn Fn()>>
where
    F: Fn(&FocusCallbacks) -> Option<Rc<dyn Fn()>>,
{
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        let reg = reg.borrow();
        reg.get(&index)
            .map(|callbacks| callbacks.iter().filter_map(pick).collect())
            .unwrap_or_default()
    })
}

/// Internal: Set focus and fire callbacks at the source
fn set_focus_with_callbacks(new_index: i32) {
    let old_index = get_focused_index();

    // No change, no callbacks
    if old_index == new_index {
        return;
    }

    // Fire onBlur for all callbacks on old focus
    if old_index >= 0 {
        for on_blur in snapshot_callbacks(old_index as usize, |cb| cb.on_blur.clone()) {
            on_blur();
        }
    }

    // Update reactive state
    FOCUSED_INDEX.with(|s| s.set(new_index));

    // Fire onFocus for all callbacks on new focus
    if new_index >= 0 {
        for on_focus in snapshot_callbacks(new_index as usize, |cb| cb.on_focus.clone()) {
            on_focus();
        }
    }
}

// =============================================================================
// FOCUS NAVIGATION
// =============================================================================

/// Find next focusable cell
fn find_next_focusable(from_index: i32, direction: i32) -> i32 {
    let focusables = get_focusable_indices();

    if focusables.is_empty() {
        return -1;
    }

    let current_pos = if from_index >= 0 {
        focusables.iter().position(|&i| i == from_index as usize)
    } else {
        None
    };

    match current_pos {
        None => {
            // Not currently focused on a focusable
            if direction == 1 {
                focusables[0] as i32
            } else {
                focusables[focusables.len() - 1] as i32
            }
        }
        Some(pos) => {
            // Move in direction with wrap
            let len = focusables.len() as i32;
            let next_pos = ((pos as i32 + direction) % len + len) % len;
            focusables[next_pos as usize] as i32
        }
    }
}

/// Move focus to the next focusable cell
pub fn focus_next() -> bool {
    let current = get_focused_index();
    let next = find_next_focusable(current, 1);
    if next != -1 && next != current {
        set_focus_with_callbacks(next);
        return true;
    }
    false
}

/// Move focus to the previous focusable cell
pub fn focus_previous() -> bool {
    let current = get_focused_index();
    let prev = find_next_focusable(current, -1);
    if prev != -1 && prev != current {
        set_focus_with_callbacks(prev);
        return true;
    }
    false
}

/// Focus a specific cell by index
pub fn focus(index: usize) -> bool {
    let focusable = FOCUSABLE.with(|list| list.borrow().contains(&index));
    if focusable {
        set_focus_with_callbacks(index as i32);
        return true;
    }
    false
}

/// Clear focus (no cell focused)
pub fn blur() {
    if get_focused_index() >= 0 {
        set_focus_with_callbacks(-1);
    }
}

/// Focus the first focusable cell
pub fn focus_first() -> bool {
    let focusables = get_focusable_indices();
    if !focusables.is_empty() {
        return focus(focusables[0]);
    }
    false
}

/// Focus the last focusable cell
pub fn focus_last() -> bool {
    let focusables = get_focusable_indices();
    if !focusables.is_empty() {
        return focus(focusables[focusables.len() - 1]);
    }
    false
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing)
pub fn reset_focus_state() {
    set_focus_with_callbacks(-1);
    NEXT_INDEX.with(|n| n.set(0));
    FOCUSABLE.with(|list| list.borrow_mut().clear());
    FOCUS_CALLBACK_REGISTRY.with(|reg| reg.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn setup() {
        reset_focus_state();
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert_eq!(get_focused_index(), -1);
        assert!(!has_focus());
    }

    #[test]
    fn test_allocate_cells_sequential() {
        setup();

        let a = allocate_cells(6);
        let b = allocate_cells(4);

        assert_eq!(a, 0);
        assert_eq!(b, 6);
        assert_eq!(get_focusable_indices().len(), 10);
    }

    #[test]
    fn test_focus_allocated_cell() {
        setup();

        let first = allocate_cells(6);

        assert!(focus(first + 2));
        assert_eq!(get_focused_index(), (first + 2) as i32);
        assert!(has_focus());
        assert!(is_focused(first + 2));
    }

    #[test]
    fn test_focus_unallocated_cell_fails() {
        setup();

        allocate_cells(3);

        assert!(!focus(7));
        assert_eq!(get_focused_index(), -1);
    }

    #[test]
    fn test_focus_next_previous_wraps() {
        setup();

        let first = allocate_cells(3);

        assert!(focus_first());
        assert_eq!(get_focused_index(), first as i32);

        assert!(focus_next());
        assert_eq!(get_focused_index(), (first + 1) as i32);

        assert!(focus_next());
        assert_eq!(get_focused_index(), (first + 2) as i32);

        // Wrap around to the start
        assert!(focus_next());
        assert_eq!(get_focused_index(), first as i32);

        // And back
        assert!(focus_previous());
        assert_eq!(get_focused_index(), (first + 2) as i32);
    }

    #[test]
    fn test_focus_next_with_nothing_focused() {
        setup();

        allocate_cells(3);

        // Starts at the first cell going forward
        assert!(focus_next());
        assert_eq!(get_focused_index(), 0);

        blur();

        // And the last going backward
        assert!(focus_previous());
        assert_eq!(get_focused_index(), 2);
    }

    #[test]
    fn test_focus_next_with_no_cells() {
        setup();
        assert!(!focus_next());
        assert!(!focus_previous());
        assert!(!focus_first());
        assert!(!focus_last());
    }

    #[test]
    fn test_blur() {
        setup();

        let first = allocate_cells(2);
        focus(first);
        assert!(has_focus());

        blur();
        assert!(!has_focus());
        assert_eq!(get_focused_index(), -1);
    }

    #[test]
    fn test_callbacks_fire_on_change() {
        setup();

        let first = allocate_cells(2);

        let focus_count = Rc::new(Cell::new(0));
        let blur_count = Rc::new(Cell::new(0));

        let fc = focus_count.clone();
        let bc = blur_count.clone();
        let _cleanup = register_callbacks(
            first,
            FocusCallbacks {
                on_focus: Some(Rc::new(move || fc.set(fc.get() + 1))),
                on_blur: Some(Rc::new(move || bc.set(bc.get() + 1))),
            },
        );

        focus(first);
        assert_eq!(focus_count.get(), 1);
        assert_eq!(blur_count.get(), 0);

        // Focusing the same cell again is a no-op
        focus(first);
        assert_eq!(focus_count.get(), 1);

        focus(first + 1);
        assert_eq!(blur_count.get(), 1);

        focus(first);
        assert_eq!(focus_count.get(), 2);
    }

    #[test]
    fn test_callback_cleanup() {
        setup();

        let first = allocate_cells(1);

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let cleanup = register_callbacks(
            first,
            FocusCallbacks {
                on_focus: Some(Rc::new(move || count_clone.set(count_clone.get() + 1))),
                on_blur: None,
            },
        );

        focus(first);
        assert_eq!(count.get(), 1);

        blur();
        cleanup();

        focus(first);
        assert_eq!(count.get(), 1); // Not called after cleanup
    }

    #[test]
    fn test_callback_can_unregister_during_blur() {
        setup();

        let first = allocate_cells(2);

        let cleanup_slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
        let blur_count = Rc::new(Cell::new(0));

        let slot = cleanup_slot.clone();
        let bc = blur_count.clone();
        let cleanup = register_callbacks(
            first,
            FocusCallbacks {
                on_focus: None,
                on_blur: Some(Rc::new(move || {
                    bc.set(bc.get() + 1);
                    let taken = slot.borrow_mut().take();
                    if let Some(cleanup) = taken {
                        cleanup();
                    }
                })),
            },
        );
        *cleanup_slot.borrow_mut() = Some(Box::new(cleanup));

        focus(first);
        // Blurring unregisters the callbacks from inside on_blur
        focus(first + 1);
        assert_eq!(blur_count.get(), 1);

        focus(first);
        focus(first + 1);
        assert_eq!(blur_count.get(), 1);
    }

    #[test]
    fn test_release_cells_blurs_and_removes() {
        setup();

        let a = allocate_cells(3);
        let b = allocate_cells(3);

        focus(a + 1);
        release_cells(a, 3);

        // Focus cleared, released indices gone from the cycle
        assert_eq!(get_focused_index(), -1);
        assert_eq!(get_focusable_indices(), vec![b, b + 1, b + 2]);

        // Tab lands on the surviving range
        assert!(focus_next());
        assert_eq!(get_focused_index(), b as i32);

        // Released indices can no longer be focused
        assert!(!focus(a));
    }

    #[test]
    fn test_release_keeps_unrelated_focus() {
        setup();

        let a = allocate_cells(3);
        let b = allocate_cells(3);

        focus(b);
        release_cells(a, 3);

        assert_eq!(get_focused_index(), b as i32);
    }
}
