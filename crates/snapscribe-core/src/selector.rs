//! Mouse-driven region selection on a full-screen overlay.
//!
//! The selector never touches pixels. It drives a [`SelectionHost`] (the
//! front-end owning the controlling window and the overlay surface) and turns
//! pointer events into a normalized [`CaptureRegion`].

use snapscribe_types::{CaptureRegion, Point, PointerEvent};

use crate::error::SelectionError;

/// Front-end operations the selector needs
pub trait SelectionHost {
    fn hide_window(&mut self);
    /// Make the controlling window visible again and give it focus
    fn restore_window(&mut self);
    fn show_overlay(&mut self);
    fn close_overlay(&mut self);
    fn draw_selection(&mut self, region: CaptureRegion);
    fn clear_selection(&mut self);
}

/// Scoped ownership of the overlay.
///
/// While held, the controlling window is hidden. Releasing (explicitly or on
/// drop) tears the overlay down and restores the window, at most once per
/// acquisition.
pub struct OverlayGuard<H: SelectionHost> {
    host: H,
    held: bool,
}

impl<H: SelectionHost> OverlayGuard<H> {
    pub fn new(host: H) -> Self {
        Self { host, held: false }
    }

    fn acquire(&mut self) {
        if self.held {
            return;
        }
        self.host.hide_window();
        self.host.show_overlay();
        self.held = true;
    }

    fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        self.host.clear_selection();
        self.host.close_overlay();
        self.host.restore_window();
    }

    fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: SelectionHost> Drop for OverlayGuard<H> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Transient drag data, only alive while the pointer is down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    pub anchor: Point,
    pub current: Point,
}

impl SelectionState {
    pub fn region(&self) -> CaptureRegion {
        CaptureRegion::from_corners(self.anchor, self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    /// Overlay shown, waiting for pointer-down
    Armed,
    Dragging(SelectionState),
    Resolved(CaptureRegion),
    Cancelled,
}

impl SelectionPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Armed | Self::Dragging(_))
    }
}

/// What a pointer event did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Event has no meaning in the current phase
    Ignored,
    Anchored(Point),
    Redrawn(CaptureRegion),
    Resolved(CaptureRegion),
    Cancelled,
}

pub struct RegionSelector<H: SelectionHost> {
    overlay: OverlayGuard<H>,
    phase: SelectionPhase,
}

impl<H: SelectionHost> RegionSelector<H> {
    pub fn new(host: H) -> Self {
        Self {
            overlay: OverlayGuard::new(host),
            phase: SelectionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn host(&self) -> &H {
        self.overlay.host()
    }

    /// Hide the controlling window and take over the screen.
    ///
    /// Returns immediately; the outcome arrives through [`Self::handle`].
    /// A selector may be reused once it reached a terminal phase.
    pub fn begin(&mut self) -> Result<(), SelectionError> {
        if self.phase.is_active() {
            return Err(SelectionError::AlreadyActive);
        }
        self.overlay.acquire();
        self.phase = SelectionPhase::Armed;
        tracing::debug!("Region selection armed");
        Ok(())
    }

    /// Cancel an armed or dragging selection; anything else is ignored
    pub fn cancel(&mut self) -> SelectionUpdate {
        if !self.phase.is_active() {
            return SelectionUpdate::Ignored;
        }
        self.phase = SelectionPhase::Cancelled;
        self.overlay.release();
        tracing::debug!("Region selection cancelled");
        SelectionUpdate::Cancelled
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectionUpdate {
        match (self.phase, event) {
            (_, PointerEvent::Cancel) => self.cancel(),
            (SelectionPhase::Armed, PointerEvent::Down(point)) => {
                self.phase = SelectionPhase::Dragging(SelectionState {
                    anchor: point,
                    current: point,
                });
                SelectionUpdate::Anchored(point)
            }
            (SelectionPhase::Dragging(mut state), PointerEvent::Move(point)) => {
                state.current = point;
                self.phase = SelectionPhase::Dragging(state);

                let region = state.region();
                let host = self.overlay.host_mut();
                host.clear_selection();
                host.draw_selection(region);
                SelectionUpdate::Redrawn(region)
            }
            (SelectionPhase::Dragging(mut state), PointerEvent::Up(point)) => {
                state.current = point;
                let region = state.region();
                self.phase = SelectionPhase::Resolved(region);
                self.overlay.release();
                tracing::debug!("Region selection resolved: {}", region);
                SelectionUpdate::Resolved(region)
            }
            _ => SelectionUpdate::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum HostCall {
        Hide,
        Restore,
        ShowOverlay,
        CloseOverlay,
        Draw(CaptureRegion),
        Clear,
    }

    #[derive(Clone, Default)]
    struct RecordingHost {
        calls: Rc<RefCell<Vec<HostCall>>>,
    }

    impl RecordingHost {
        fn count(&self, call: &HostCall) -> usize {
            self.calls.borrow().iter().filter(|c| *c == call).count()
        }
    }

    impl SelectionHost for RecordingHost {
        fn hide_window(&mut self) {
            self.calls.borrow_mut().push(HostCall::Hide);
        }
        fn restore_window(&mut self) {
            self.calls.borrow_mut().push(HostCall::Restore);
        }
        fn show_overlay(&mut self) {
            self.calls.borrow_mut().push(HostCall::ShowOverlay);
        }
        fn close_overlay(&mut self) {
            self.calls.borrow_mut().push(HostCall::CloseOverlay);
        }
        fn draw_selection(&mut self, region: CaptureRegion) {
            self.calls.borrow_mut().push(HostCall::Draw(region));
        }
        fn clear_selection(&mut self) {
            self.calls.borrow_mut().push(HostCall::Clear);
        }
    }

    fn drag(from: Point, to: Point) -> SelectionUpdate {
        let mut selector = RegionSelector::new(RecordingHost::default());
        selector.begin().unwrap();
        selector.handle(PointerEvent::Down(from));
        selector.handle(PointerEvent::Up(to))
    }

    #[test]
    fn test_drag_resolves_normalized_region() {
        let expected = CaptureRegion::new(50, 50, 100, 150);

        assert_eq!(
            drag(Point::new(50, 50), Point::new(150, 200)),
            SelectionUpdate::Resolved(expected)
        );
        assert_eq!(
            drag(Point::new(150, 200), Point::new(50, 50)),
            SelectionUpdate::Resolved(expected)
        );
    }

    #[test]
    fn test_begin_hides_window_and_shows_overlay() {
        let host = RecordingHost::default();
        let mut selector = RegionSelector::new(host.clone());
        assert_eq!(selector.phase(), SelectionPhase::Idle);

        selector.begin().unwrap();
        assert_eq!(selector.phase(), SelectionPhase::Armed);
        assert_eq!(
            *host.calls.borrow(),
            vec![HostCall::Hide, HostCall::ShowOverlay]
        );
    }

    #[test]
    fn test_resolve_restores_window_once() {
        let host = RecordingHost::default();
        let mut selector = RegionSelector::new(host.clone());
        selector.begin().unwrap();
        selector.handle(PointerEvent::Down(Point::new(1, 1)));
        selector.handle(PointerEvent::Up(Point::new(5, 5)));
        // Late events after the terminal transition
        selector.handle(PointerEvent::Up(Point::new(9, 9)));
        selector.handle(PointerEvent::Cancel);
        drop(selector);

        assert_eq!(host.count(&HostCall::Restore), 1);
        assert_eq!(host.count(&HostCall::CloseOverlay), 1);
    }

    #[test]
    fn test_cancel_while_dragging() {
        let host = RecordingHost::default();
        let mut selector = RegionSelector::new(host.clone());
        selector.begin().unwrap();
        selector.handle(PointerEvent::Down(Point::new(10, 10)));
        selector.handle(PointerEvent::Move(Point::new(40, 40)));

        assert_eq!(selector.handle(PointerEvent::Cancel), SelectionUpdate::Cancelled);
        assert_eq!(selector.phase(), SelectionPhase::Cancelled);
        assert_eq!(selector.cancel(), SelectionUpdate::Ignored);
        drop(selector);

        assert_eq!(host.count(&HostCall::Restore), 1);
        assert_eq!(host.count(&HostCall::Hide), 1);
    }

    #[test]
    fn test_cancel_without_selection_is_ignored() {
        let host = RecordingHost::default();
        let mut selector = RegionSelector::new(host.clone());

        assert_eq!(selector.cancel(), SelectionUpdate::Ignored);
        assert_eq!(selector.handle(PointerEvent::Cancel), SelectionUpdate::Ignored);
        assert_eq!(selector.phase(), SelectionPhase::Idle);
        assert!(host.calls.borrow().is_empty());

        selector.begin().unwrap();
        assert_eq!(selector.cancel(), SelectionUpdate::Cancelled);
    }

    #[test]
    fn test_drop_while_armed_restores_window() {
        let host = RecordingHost::default();
        {
            let mut selector = RegionSelector::new(host.clone());
            selector.begin().unwrap();
        }
        assert_eq!(host.count(&HostCall::Restore), 1);
    }

    #[test]
    fn test_drop_when_idle_touches_nothing() {
        let host = RecordingHost::default();
        drop(RegionSelector::new(host.clone()));
        assert!(host.calls.borrow().is_empty());
    }

    #[test]
    fn test_move_clears_before_drawing() {
        let host = RecordingHost::default();
        let mut selector = RegionSelector::new(host.clone());
        selector.begin().unwrap();
        selector.handle(PointerEvent::Down(Point::new(0, 0)));
        selector.handle(PointerEvent::Move(Point::new(10, 10)));
        selector.handle(PointerEvent::Move(Point::new(20, 5)));

        let calls = host.calls.borrow();
        assert_eq!(
            calls[2..],
            [
                HostCall::Clear,
                HostCall::Draw(CaptureRegion::new(0, 0, 10, 10)),
                HostCall::Clear,
                HostCall::Draw(CaptureRegion::new(0, 0, 20, 5)),
            ]
        );
    }

    #[test]
    fn test_begin_rejected_while_active() {
        let mut selector = RegionSelector::new(RecordingHost::default());
        selector.begin().unwrap();
        assert_eq!(selector.begin(), Err(SelectionError::AlreadyActive));

        selector.handle(PointerEvent::Down(Point::new(0, 0)));
        assert_eq!(selector.begin(), Err(SelectionError::AlreadyActive));
    }

    #[test]
    fn test_reuse_after_terminal() {
        let host = RecordingHost::default();
        let mut selector = RegionSelector::new(host.clone());
        selector.begin().unwrap();
        selector.cancel();
        selector.begin().unwrap();
        selector.handle(PointerEvent::Down(Point::new(3, 4)));
        assert_eq!(
            selector.handle(PointerEvent::Up(Point::new(3, 4))),
            SelectionUpdate::Resolved(CaptureRegion::new(3, 4, 0, 0))
        );
        assert_eq!(host.count(&HostCall::Hide), 2);
        assert_eq!(host.count(&HostCall::Restore), 2);
    }

    #[test]
    fn test_pointer_events_outside_drag_are_ignored() {
        let mut selector = RegionSelector::new(RecordingHost::default());
        assert_eq!(
            selector.handle(PointerEvent::Down(Point::new(1, 1))),
            SelectionUpdate::Ignored
        );

        selector.begin().unwrap();
        assert_eq!(
            selector.handle(PointerEvent::Move(Point::new(1, 1))),
            SelectionUpdate::Ignored
        );
        assert_eq!(
            selector.handle(PointerEvent::Up(Point::new(1, 1))),
            SelectionUpdate::Ignored
        );
        assert_eq!(selector.phase(), SelectionPhase::Armed);
    }
}
