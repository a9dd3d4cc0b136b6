use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Duration;

use overpanel_surface::{NodeId, NodeRole, Surface};

use super::event::{PanelEvent, PanelSignal};
use super::registry::DismissHandle;
use super::sidebar::{Sidebar, retain_unique_options};
use crate::callbacks::CallbackRegistry;
use crate::config::{PanelConfig, PanelTimings};
use crate::error::{PanelError, Result};
use crate::notification::{
    NotificationId, NotificationQueue, NotificationSpec,
};
use crate::scale::{ScaleCalculator, Viewport};
use crate::section::{Category, ControlHit, SectionDecl, SectionTree};
use crate::timer::{TimerId, Timers};

const MAX_PENDING_EVENTS: usize = 1024;

/// Visibility lifecycle of the panel window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    /// Window shown, content rebuild still pending.
    Opening,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelTimer {
    FinishOpen,
    Greeting,
}

#[derive(Debug, Default)]
struct Frame {
    overlay: Option<NodeId>,
    window: Option<NodeId>,
    body: Option<NodeId>,
    main: Option<NodeId>,
}

pub(crate) type Deferred = Rc<RefCell<Vec<NotificationId>>>;

/// The single panel instance and everything it owns.
///
/// Obtained through [`PanelRegistry::construct`]. All operations are
/// infallible from the host's point of view; failures are logged and leave
/// the panel in a consistent, possibly degraded, state. After
/// [`PanelController::destroy`] every operation is a no-op.
///
/// Callbacks registered here run while the controller is mutably borrowed.
/// They must not borrow the [`PanelHandle`] again; [`DismissHandle`] is safe
/// to use from inside them.
///
/// [`PanelRegistry::construct`]: super::PanelRegistry::construct
/// [`PanelHandle`]: super::PanelHandle
pub struct PanelController<S: Surface> {
    surface: S,
    container: NodeId,
    logo_text: String,
    toggle_key: String,
    greeting: Option<NotificationSpec>,
    timings: PanelTimings,
    scaler: ScaleCalculator,
    viewport: Option<Viewport>,
    scale: f32,
    state: PanelState,
    open_timer: Option<TimerId>,
    destroyed: bool,
    categories: Vec<Category>,
    current_section: Option<String>,
    frame: Frame,
    sidebar: Sidebar,
    sections: SectionTree,
    notifications: NotificationQueue,
    callbacks: CallbackRegistry,
    timers: Timers<PanelTimer>,
    events: VecDeque<PanelEvent>,
    deferred_dismissals: Deferred,
    this: Weak<RefCell<PanelController<S>>>,
}

impl<S: Surface> PanelController<S> {
    pub(crate) fn new(
        config: PanelConfig,
        surface: S,
        this: Weak<RefCell<PanelController<S>>>,
    ) -> Self {
        let container = config.container.unwrap_or_else(|| surface.root());
        let categories =
            config
                .categories
                .into_iter()
                .fold(Vec::new(), |mut kept, category| {
                    let category = retain_unique_options(&kept, category);
                    kept.push(category);
                    kept
                });
        let scale = config
            .viewport
            .map(|viewport| config.scale.compute_for(viewport))
            .unwrap_or(1.0);

        let mut panel = Self {
            surface,
            container,
            logo_text: config.logo_text,
            toggle_key: config.toggle_key,
            greeting: config.greeting,
            timings: config.timings,
            scaler: config.scale,
            viewport: config.viewport,
            scale,
            state: PanelState::Closed,
            open_timer: None,
            destroyed: false,
            categories,
            current_section: None,
            frame: Frame::default(),
            sidebar: Sidebar::new(),
            sections: SectionTree::new(),
            notifications: NotificationQueue::new(config.notifications),
            callbacks: CallbackRegistry::new(),
            timers: Timers::new(),
            events: VecDeque::new(),
            deferred_dismissals: Rc::new(RefCell::new(Vec::new())),
            this,
        };

        let root = panel.surface.root();
        if let Err(err) = panel.notifications.attach(&mut panel.surface, root)
        {
            log::error!("notification stack could not be attached: {err}");
        }
        if let Err(err) = panel.ensure_frame() {
            log::error!("panel frame could not be built: {err}");
        }
        if panel.greeting.is_some() {
            let delay = panel.timings.greeting_delay();
            let _ = panel.timers.schedule(delay, PanelTimer::Greeting);
        }

        log::debug!("panel constructed under {container}");
        panel
    }

    /// Show the panel and schedule the content rebuild.
    ///
    /// The scale is applied immediately. Opening an already opening or open
    /// panel is a no-op.
    pub fn open(&mut self) {
        if let Err(err) = self.ensure_live() {
            log::debug!("open ignored: {err}");
            return;
        }
        if self.state != PanelState::Closed {
            log::debug!("open ignored; panel is {:?}", self.state);
            return;
        }

        if let Err(err) = self.ensure_frame() {
            log::error!("panel frame could not be built: {err}");
        }
        if self.recompute_scale() {
            self.push_event(PanelEvent::ScaleChanged(self.scale));
        }
        self.apply_scale();
        self.set_frame_visible(true);

        let settle = self.timings.open_settle();
        if settle.is_zero() {
            self.finish_open();
        } else {
            self.state = PanelState::Opening;
            let timer = self.timers.schedule(settle, PanelTimer::FinishOpen);
            self.open_timer = Some(timer);
        }
    }

    /// Hide the panel, keeping its nodes for the next open.
    ///
    /// Closing while the rebuild is pending cancels it.
    pub fn close(&mut self) {
        if let Err(err) = self.ensure_live() {
            log::debug!("close ignored: {err}");
            return;
        }
        match self.state {
            PanelState::Closed => {
                log::debug!("close ignored; panel is already closed");
                return;
            },
            PanelState::Opening => {
                if let Some(timer) = self.open_timer.take() {
                    let _ = self.timers.cancel(timer);
                }
            },
            PanelState::Open => {},
        }
        self.set_frame_visible(false);
        self.state = PanelState::Closed;
        self.push_event(PanelEvent::Closed);
    }

    pub fn toggle(&mut self) {
        match self.state {
            PanelState::Closed => self.open(),
            PanelState::Opening | PanelState::Open => self.close(),
        }
    }

    /// Append a sidebar category.
    ///
    /// Options pointing at a section that already has one are dropped. When
    /// the content was built before, it is rebuilt so the sidebar reflects
    /// the new category.
    pub fn add_category(&mut self, category: Category) {
        if let Err(err) = self.ensure_live() {
            log::debug!("add_category ignored: {err}");
            return;
        }
        let category = retain_unique_options(&self.categories, category);
        log::debug!("category `{}` added", category.name);
        self.categories.push(category);

        if self.sidebar.is_built() {
            if let Err(err) = self.rebuild_content() {
                log::error!("panel content could not be rebuilt: {err}");
            }
        }
    }

    /// Register a section or replace the one with the same id.
    pub fn add_section(&mut self, decl: SectionDecl) {
        if let Err(err) = self.ensure_live() {
            log::debug!("add_section ignored: {err}");
            return;
        }
        self.log_unbound_callbacks(&decl);

        let id = decl.id.clone();
        let outcome = self.sections.upsert(
            &mut self.surface,
            decl,
            self.current_section.as_deref(),
        );
        if let Some(outcome) = outcome {
            self.push_event(PanelEvent::SectionRendered {
                id: id.clone(),
                outcome,
            });
            if self.state == PanelState::Open && self.current_section.is_none()
            {
                let _ = self.apply_selection(&id);
            }
        }
        self.refresh_sidebar();
    }

    /// Show section `id` and hide the rest.
    ///
    /// Unknown or not yet rendered ids leave everything unchanged.
    pub fn select_section(&mut self, id: &str) -> bool {
        if let Err(err) = self.ensure_live() {
            log::debug!("select_section ignored: {err}");
            return false;
        }
        if !self.apply_selection(id) {
            log::debug!("select ignored for unknown section `{id}`");
            return false;
        }
        true
    }

    /// Display a notification.
    ///
    /// The returned handle dismisses it early; it stays valid, as a no-op,
    /// once the notification or the panel is gone.
    pub fn show_message(
        &mut self,
        spec: impl Into<NotificationSpec>,
    ) -> DismissHandle<S> {
        if let Err(err) = self.ensure_live() {
            log::debug!("show_message ignored: {err}");
            return DismissHandle::detached();
        }
        let id = self.notifications.enqueue(&mut self.surface, spec.into());
        self.flush_notification_events();
        DismissHandle::new(id, self.this.clone(), &self.deferred_dismissals)
    }

    /// Start the exit of notification `id`.
    pub fn dismiss_message(&mut self, id: NotificationId) -> bool {
        if let Err(err) = self.ensure_live() {
            log::debug!("dismiss ignored: {err}");
            return false;
        }
        let dismissed = self.notifications.dismiss(&mut self.surface, id);
        self.flush_notification_events();
        dismissed
    }

    /// Route host input. Returns whether the signal was consumed.
    pub fn handle_signal(&mut self, signal: PanelSignal) -> bool {
        if self.destroyed {
            log::trace!("signal ignored after destroy: {signal:?}");
            return false;
        }
        let consumed = match signal {
            PanelSignal::Key { code, repeat } => {
                if repeat || code != self.toggle_key {
                    false
                } else {
                    self.toggle();
                    true
                }
            },
            PanelSignal::Resize { width, height } => {
                self.resize(Viewport::new(width, height));
                false
            },
            PanelSignal::Click { target } => self.click(target),
        };
        self.apply_deferred_dismissals();
        consumed
    }

    /// Move logical time forward by `elapsed`, firing every due timer.
    ///
    /// Panel and notification timers fire in deadline order across both
    /// queues. Dismissals queued while the panel was borrowed apply first.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.destroyed {
            return;
        }
        self.apply_deferred_dismissals();
        let target = self.timers.now().saturating_add(elapsed);
        while let Some(deadline) =
            self.timers.next_deadline().filter(|at| *at <= target)
        {
            self.notifications.advance_to(&mut self.surface, deadline);
            self.flush_notification_events();
            let Some((_, timer)) = self.timers.pop_due(deadline) else {
                break;
            };
            self.fire(timer);
        }
        self.notifications.advance_to(&mut self.surface, target);
        self.timers.advance_to(target);
        self.flush_notification_events();
        self.apply_deferred_dismissals();
    }

    /// Tear the instance down: cancel timers, drop notifications and remove
    /// every node the panel created.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.timers.clear();
        self.open_timer = None;
        self.notifications.clear(&mut self.surface);
        self.flush_notification_events();

        self.sidebar.remove(&mut self.surface);
        self.sections.detach();
        for node in [self.frame.window, self.frame.overlay].into_iter().flatten()
        {
            self.surface.remove(node);
        }
        self.frame = Frame::default();
        self.callbacks = CallbackRegistry::new();
        self.deferred_dismissals.borrow_mut().clear();

        self.state = PanelState::Closed;
        self.destroyed = true;
        self.push_event(PanelEvent::Destroyed);
        log::debug!("panel destroyed");
    }

    /// Bind a toggle callback name used by section declarations.
    pub fn register_toggle_callback<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.callbacks.register_toggle(name, f);
    }

    /// Bind a settings callback name used by section declarations.
    pub fn register_settings_callback<F>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) where
        F: FnMut() + 'static,
    {
        self.callbacks.register_settings(name, f);
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    /// Take the transitions recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<PanelEvent> {
        self.events.drain(..).collect()
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn current_scale(&self) -> f32 {
        self.scale
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn sections(&self) -> &SectionTree {
        &self.sections
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.frame.overlay
    }

    pub fn window(&self) -> Option<NodeId> {
        self.frame.window
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Earliest pending deadline across panel and notification timers.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.timers.next_deadline(), self.notifications.next_deadline())
        {
            (Some(panel), Some(queue)) => Some(panel.min(queue)),
            (panel, queue) => panel.or(queue),
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.destroyed {
            return Err(PanelError::Destroyed);
        }
        Ok(())
    }

    /// Create overlay and window, hidden, unless they are still attached.
    fn ensure_frame(&mut self) -> Result<()> {
        if !self.surface.contains(self.container) {
            return Err(PanelError::MissingContainer(self.container));
        }

        let overlay_live =
            self.frame.overlay.is_some_and(|n| self.surface.contains(n));
        if !overlay_live {
            let overlay =
                self.surface.create(self.container, NodeRole::Overlay)?;
            self.surface.set_visible(overlay, false);
            self.frame.overlay = Some(overlay);
        }

        let window_live =
            self.frame.window.is_some_and(|n| self.surface.contains(n));
        if !window_live {
            self.frame.body = None;
            self.frame.main = None;
            self.sidebar.remove(&mut self.surface);
            self.sections.detach();

            let window = self.surface.create(self.container, NodeRole::Window)?;
            self.surface.set_visible(window, false);
            self.surface.set_scale(window, self.scale);
            self.frame.window = Some(window);
            let body = self.surface.create(window, NodeRole::WindowBody)?;
            self.frame.body = Some(body);
        }
        Ok(())
    }

    fn set_frame_visible(&mut self, visible: bool) {
        for node in [self.frame.overlay, self.frame.window].into_iter().flatten()
        {
            self.surface.set_visible(node, visible);
        }
    }

    fn finish_open(&mut self) {
        self.open_timer = None;
        if let Err(err) = self.rebuild_content() {
            log::error!("panel content could not be built: {err}");
        }
        self.state = PanelState::Open;
        self.push_event(PanelEvent::Opened);
    }

    /// Replace sidebar and main content, then replay every section.
    fn rebuild_content(&mut self) -> Result<()> {
        let body = self
            .frame
            .body
            .filter(|node| self.surface.contains(*node))
            .ok_or(PanelError::MissingContainer(self.container))?;

        self.sidebar.remove(&mut self.surface);
        if let Some(main) = self.frame.main.take() {
            self.surface.remove(main);
        }
        self.sections.detach();

        let _ = self.sidebar.build(
            &mut self.surface,
            body,
            &self.logo_text,
            &self.categories,
        )?;
        self.push_event(PanelEvent::SidebarRebuilt);

        let main = self.surface.create(body, NodeRole::MainContent)?;
        self.frame.main = Some(main);
        let _ = self.surface.create(main, NodeRole::TopControls)?;
        let _ = self.surface.create(main, NodeRole::Divider)?;
        let container =
            self.surface.create(main, NodeRole::SectionsContainer)?;
        self.sections.attach(container);

        let replayed = self
            .sections
            .replay(&mut self.surface, self.current_section.as_deref());
        for (id, outcome) in replayed {
            self.push_event(PanelEvent::SectionRendered { id, outcome });
        }

        let target = self
            .current_section
            .clone()
            .filter(|id| self.sections.is_rendered(id))
            .or_else(|| self.sections.first_rendered().map(str::to_string));
        if let Some(id) = target {
            let _ = self.apply_selection(&id);
        }
        self.refresh_sidebar();
        Ok(())
    }

    fn apply_selection(&mut self, id: &str) -> bool {
        if !self.sections.select(&mut self.surface, id) {
            return false;
        }
        self.current_section = Some(id.to_string());
        self.sidebar.mark_active(&mut self.surface, Some(id));
        self.push_event(PanelEvent::SectionSelected(id.to_string()));
        true
    }

    fn refresh_sidebar(&mut self) {
        let sections = &self.sections;
        self.sidebar
            .refresh_availability(&mut self.surface, |id| {
                sections.is_registered(id)
            });
        self.sidebar
            .mark_active(&mut self.surface, self.current_section.as_deref());
    }

    fn recompute_scale(&mut self) -> bool {
        let Some(viewport) = self.viewport else {
            return false;
        };
        let scale = self.scaler.compute_for(viewport);
        let changed = scale != self.scale;
        self.scale = scale;
        changed
    }

    fn apply_scale(&mut self) {
        if let Some(window) = self.frame.window {
            self.surface.set_scale(window, self.scale);
        }
    }

    /// Cache the viewport; the scale follows it only while shown.
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if self.state == PanelState::Closed {
            return;
        }
        if self.recompute_scale() {
            self.apply_scale();
            self.push_event(PanelEvent::ScaleChanged(self.scale));
        }
    }

    fn click(&mut self, target: NodeId) -> bool {
        for node in self.surface.ancestors(target) {
            if let Some(id) = self.notifications.close_target(node) {
                let _ = self.dismiss_message(id);
                return true;
            }
            if self.state != PanelState::Open {
                continue;
            }
            if let Some(section_id) = self.sidebar.section_at(node) {
                let section_id = section_id.to_string();
                if !self.sections.is_registered(&section_id) {
                    log::debug!(
                        "option for unregistered section `{section_id}` ignored"
                    );
                    return true;
                }
                let _ = self.select_section(&section_id);
                return true;
            }
            if let Some(hit) = self.sections.activate(&mut self.surface, node) {
                self.dispatch(hit);
                return true;
            }
        }
        false
    }

    fn dispatch(&mut self, hit: ControlHit) {
        match hit {
            ControlHit::Toggle { active, callback } => {
                log::debug!("toggle switched to {active}");
                if let Some(name) = callback {
                    let _ = self.callbacks.dispatch_toggle(&name, active);
                }
            },
            ControlHit::Settings {
                callback: Some(name),
            } => {
                let _ = self.callbacks.dispatch_settings(&name);
            },
            ControlHit::Settings { callback: None } => {},
        }
    }

    fn fire(&mut self, timer: PanelTimer) {
        match timer {
            PanelTimer::FinishOpen => {
                if self.state == PanelState::Opening {
                    self.finish_open();
                }
            },
            PanelTimer::Greeting => {
                if let Some(greeting) = self.greeting.clone() {
                    let _ = self.show_message(greeting);
                }
            },
        }
    }

    fn log_unbound_callbacks(&self, decl: &SectionDecl) {
        let unbound: Vec<&str> = decl
            .callback_names()
            .into_iter()
            .filter(|name| !self.callbacks.contains(name))
            .collect();
        if !unbound.is_empty() {
            log::debug!(
                "section `{}` references unbound callbacks: {}",
                decl.id,
                unbound.join(", ")
            );
        }
    }

    fn apply_deferred_dismissals(&mut self) {
        let pending = std::mem::take(&mut *self.deferred_dismissals.borrow_mut());
        for id in pending {
            let _ = self.dismiss_message(id);
        }
    }

    fn flush_notification_events(&mut self) {
        for event in self.notifications.drain_events() {
            self.push_event(PanelEvent::Notification(event));
        }
    }

    fn push_event(&mut self, event: PanelEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let _ = self.events.pop_front();
            log::trace!("panel event buffer full; oldest event dropped");
        }
        self.events.push_back(event);
    }
}
