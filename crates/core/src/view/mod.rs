//! Views and the view stack.
//!
//! A [`View`] bundles controls that are rendered and fed together. A
//! [`ViewSet`] keeps a stack of views over one surface; only the top view
//! receives input and owns the surface's colors. Subscribers change the
//! stack through a [`Navigator`].

use std::{cell::RefCell, collections::VecDeque, convert::Infallible, fmt, rc::Rc};

use crate::{
    control::SharedControl,
    surface::{Address, Surface},
    Result,
};

/// Fixed bundle of controls. Controls may appear in several views.
pub struct View {
    name: String,
    controls: Vec<SharedControl>,
}

impl View {
    pub fn new(name: impl Into<String>, controls: impl IntoIterator<Item = SharedControl>) -> Self {
        Self {
            name: name.into(),
            controls: controls.into_iter().collect(),
        }
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controls(&self) -> &[SharedControl] {
        &self.controls
    }

    /// Offers the value to every control; each filters by its own set.
    pub fn dispatch(&self, surface: &mut dyn Surface, address: &Address, value: u8) -> Result<()> {
        for control in &self.controls {
            control.dispatch(surface, address, value)?;
        }
        Ok(())
    }

    pub fn render(&self, surface: &mut dyn Surface) -> Result<()> {
        tracing::debug!(view = %self.name, "render view");
        for control in &self.controls {
            control.render(surface)?;
        }
        Ok(())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self
            .controls
            .iter()
            .map(|control| control.name().to_string())
            .collect();
        f.debug_struct("View")
            .field("name", &self.name)
            .field("controls", &names)
            .finish()
    }
}

#[derive(Debug, Clone)]
enum ViewChange {
    Push(Rc<View>),
    Pop(Option<Rc<View>>),
}

/// Requests view-stack changes from inside a subscriber.
///
/// The owning [`ViewSet`] applies requests in order once the event being
/// dispatched has reached every control of the top view.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    requests: Rc<RefCell<VecDeque<ViewChange>>>,
}

impl Navigator {
    pub fn push(&self, view: Rc<View>) {
        self.requests.borrow_mut().push_back(ViewChange::Push(view));
    }

    /// Same as [`ViewSet::pop`].
    pub fn pop(&self, target: Option<&Rc<View>>) {
        self.requests
            .borrow_mut()
            .push_back(ViewChange::Pop(target.cloned()));
    }

    pub fn pending(&self) -> usize {
        self.requests.borrow().len()
    }

    fn next_request(&self) -> Option<ViewChange> {
        self.requests.borrow_mut().pop_front()
    }
}

/// Stack of views bound to one surface.
#[derive(Debug)]
pub struct ViewSet<S> {
    surface: S,
    stack: Vec<Rc<View>>,
    navigator: Navigator,
}

impl<S: Surface> ViewSet<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            stack: Vec::new(),
            navigator: Navigator::default(),
        }
    }

    /// Handle for subscribers that push or pop views.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn top(&self) -> Option<&Rc<View>> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Repaints the top view, or resets the surface when the stack is empty.
    pub fn render(&mut self) -> Result<()> {
        match self.stack.last() {
            Some(view) => view.render(&mut self.surface),
            None => {
                tracing::debug!("view stack empty, resetting surface");
                self.surface.reset(&[]);
                Ok(())
            }
        }
    }

    pub fn push(&mut self, view: Rc<View>) -> Result<()> {
        tracing::info!(view = view.name(), depth = self.stack.len() + 1, "push view");
        self.stack.push(view);
        self.render()
    }

    /// Without a target, removes the top view. With one, removes views until
    /// the target is on top, or until the stack is empty if the target was
    /// never pushed. Either way the result is rendered once.
    pub fn pop(&mut self, target: Option<&Rc<View>>) -> Result<()> {
        match target {
            None => {
                if let Some(view) = self.stack.pop() {
                    tracing::info!(view = view.name(), "pop view");
                }
            }
            Some(target) => {
                while let Some(top) = self.stack.last() {
                    if Rc::ptr_eq(top, target) {
                        break;
                    }
                    tracing::info!(view = top.name(), "pop view");
                    self.stack.pop();
                }
            }
        }
        self.render()
    }

    /// Drains the surface's pending input once and feeds it to the top view.
    /// Returns the number of events drained; input arriving while the stack
    /// is empty is dropped. Navigator requests are applied after each event,
    /// so the next event already reaches the new top view.
    pub fn dispatch(&mut self) -> Result<usize> {
        let events = self.surface.pending_events();
        let count = events.len();
        for event in events {
            match self.stack.last() {
                Some(view) => view.dispatch(&mut self.surface, &event.address, event.value)?,
                None => tracing::trace!(address = %event.address, "dropping input, no view"),
            }
            self.apply_requests()?;
        }
        Ok(count)
    }

    fn apply_requests(&mut self) -> Result<()> {
        while let Some(change) = self.navigator.next_request() {
            match change {
                ViewChange::Push(view) => self.push(view)?,
                ViewChange::Pop(target) => self.pop(target.as_ref())?,
            }
        }
        Ok(())
    }

    /// Dispatches forever. Only returns on error; pacing is up to the
    /// surface's `pending_events`.
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            self.dispatch()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        control::{Control, EventKind},
        control_set::ControlSet,
        surface::{Catalog, MemorySurface},
        variants::{Momentary, Radio, VirtualFader, OFF, ON},
        SurfaceError,
    };

    fn surface() -> MemorySurface {
        MemorySurface::new(Catalog::new().with_group("NAV", ["A", "B"]).with_grid(2, 2))
    }

    fn nav(name: &str) -> Address {
        Address::new("NAV", name)
    }

    fn momentary_view(name: &str, on: &str) -> Rc<View> {
        let control = Control::new(
            name,
            ControlSet::group("NAV"),
            Momentary::new(on, OFF).unwrap(),
        );
        View::new(name, [control.shared()]).shared()
    }

    #[test]
    fn push_renders_and_pop_reveals_previous_view() {
        let base = View::new(
            "base",
            [Control::new("radio", ControlSet::group("NAV"), Radio::new()).shared()],
        )
        .shared();
        let overlay = momentary_view("overlay", "red");
        let mut views = ViewSet::new(surface());

        views.push(Rc::clone(&base)).unwrap();
        assert_eq!(views.surface().color(&nav("A")), Some(ON));

        views.push(Rc::clone(&overlay)).unwrap();
        assert_eq!(views.surface().color(&nav("A")), Some(OFF));
        assert_eq!(views.depth(), 2);

        views.pop(None).unwrap();
        assert!(Rc::ptr_eq(views.top().unwrap(), &base));
        assert_eq!(views.surface().color(&nav("A")), Some(ON));

        views.pop(None).unwrap();
        assert_eq!(views.depth(), 0);
        assert_eq!(views.surface().resets(), 1);
    }

    #[test]
    fn pop_to_target_stops_at_target() {
        let a = momentary_view("a", "red");
        let b = momentary_view("b", "green");
        let c = momentary_view("c", "blue");
        let mut views = ViewSet::new(surface());
        for view in [&a, &b, &c] {
            views.push(Rc::clone(view)).unwrap();
        }

        views.pop(Some(&a)).unwrap();

        assert_eq!(views.depth(), 1);
        assert!(Rc::ptr_eq(views.top().unwrap(), &a));
        assert_eq!(views.surface().resets(), 0);
    }

    #[test]
    fn pop_to_missing_target_resets_once() {
        let stray = momentary_view("stray", "red");
        let mut views = ViewSet::new(surface());
        for name in ["a", "b", "c"] {
            views.push(momentary_view(name, "green")).unwrap();
        }

        views.pop(Some(&stray)).unwrap();

        assert_eq!(views.depth(), 0);
        assert_eq!(views.surface().resets(), 1);
    }

    #[test]
    fn dispatch_feeds_only_the_top_view() {
        let below = momentary_view("below", "red");
        let above = momentary_view("above", "green");
        let mut views = ViewSet::new(surface());
        views.push(below).unwrap();
        views.push(above).unwrap();

        views.surface_mut().queue(nav("B"), 127);
        assert_eq!(views.dispatch().unwrap(), 1);

        assert_eq!(views.surface().color(&nav("B")), Some("green"));
        assert!(!views
            .surface()
            .writes()
            .iter()
            .any(|(_, spec)| spec == "red"));
    }

    #[test]
    fn dispatch_without_views_drops_input() {
        let mut views = ViewSet::new(surface());
        views.surface_mut().queue(nav("A"), 127);

        assert_eq!(views.dispatch().unwrap(), 1);
        assert!(views.surface().writes().is_empty());
        assert!(views.surface_mut().pending_events().is_empty());
    }

    #[test]
    fn shared_controls_keep_state_across_views() {
        let radio = Control::new("radio", ControlSet::group("NAV"), Radio::new()).shared();
        let first = View::new("first", [Rc::clone(&radio)]).shared();
        let second = View::new("second", [radio]).shared();
        let mut views = ViewSet::new(surface());

        views.push(first).unwrap();
        views.surface_mut().queue(nav("B"), 127);
        views.dispatch().unwrap();
        views.push(second).unwrap();

        assert_eq!(views.surface().color(&nav("B")), Some(ON));
        assert_eq!(views.surface().color(&nav("A")), Some(OFF));
    }

    #[test]
    fn subscribers_push_and_pop_views() {
        let mut views = ViewSet::new(surface());
        let navigator = views.navigator();

        let close = Control::new("close", ControlSet::grid(0, 0, 0, 0), Momentary::default());
        let back = navigator.clone();
        close.on(EventKind::Press, move |_, _| {
            back.pop(None);
            Ok(())
        });
        let overlay = View::new("overlay", [close.shared()]).shared();

        let open = Control::new("open", ControlSet::group("NAV"), Momentary::default());
        let target = Rc::clone(&overlay);
        open.on(EventKind::Press, move |_, _| {
            navigator.push(Rc::clone(&target));
            Ok(())
        });
        let base = View::new("base", [open.shared()]).shared();
        views.push(Rc::clone(&base)).unwrap();

        views.surface_mut().queue(nav("A"), 127);
        views.surface_mut().queue(Address::cell(0, 0), 127);
        views.dispatch().unwrap();
        assert!(Rc::ptr_eq(views.top().unwrap(), &base));
        // The cell press reached the overlay, not the base view.
        assert_eq!(views.surface().color(&Address::cell(0, 0)), Some(ON));
        assert_eq!(views.navigator().pending(), 0);

        views.surface_mut().queue(nav("B"), 127);
        views.dispatch().unwrap();
        assert!(Rc::ptr_eq(views.top().unwrap(), &overlay));
        assert_eq!(views.surface().color(&Address::cell(0, 0)), Some(OFF));
    }

    #[test]
    fn run_returns_the_first_error() {
        let strip = Control::new("strip", ControlSet::group("GRID"), VirtualFader::default());
        let mut views = ViewSet::new(surface());
        views.push(View::new("strip", [strip.shared()]).shared()).unwrap();
        views.surface_mut().queue(Address::cell(1, 1), 127);

        let err = views.run().unwrap_err();
        assert!(matches!(err, SurfaceError::UnknownPosition { .. }));
    }
}
