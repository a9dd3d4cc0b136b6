use std::collections::HashMap;
use std::time::Duration;

use overpanel_surface::{NodeFlags, NodeId, NodeRole, Surface};

use super::event::NotificationEvent;
use super::model::{
    NotificationId, NotificationSpec, NotificationState, NotificationTimings,
};
use crate::error::Result;
use crate::timer::{TimerId, Timers};

const KIND_ATTR: &str = "kind";
const CLOSE_GLYPH: &str = "×";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationTimer {
    Settle(NotificationId),
    ClearHighlight(NotificationId),
    Expire(NotificationId),
    Purge(NotificationId),
}

#[derive(Debug)]
struct ActiveRecord {
    id: NotificationId,
    node: NodeId,
    close: Option<NodeId>,
    visible: bool,
    highlight: bool,
    auto_dismiss: Option<Duration>,
    settle_timer: Option<TimerId>,
    highlight_timer: Option<TimerId>,
    expiry_timer: Option<TimerId>,
}

impl ActiveRecord {
    fn state(&self) -> NotificationState {
        if self.visible {
            NotificationState::Visible
        } else {
            NotificationState::Pending
        }
    }

    fn take_timers(&mut self) -> impl Iterator<Item = TimerId> {
        [
            self.settle_timer.take(),
            self.highlight_timer.take(),
            self.expiry_timer.take(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Ordered set of live notifications with independent lifecycles.
///
/// Each notification walks `Pending -> Visible -> Hiding -> Removed`. The
/// active list holds Pending and Visible records in display order (newest
/// last); Hiding records only wait for their exit window to elapse.
#[derive(Debug)]
pub struct NotificationQueue {
    timings: NotificationTimings,
    next_id: u64,
    stack: Option<NodeId>,
    active: Vec<ActiveRecord>,
    hiding: HashMap<NotificationId, NodeId>,
    close_targets: HashMap<NodeId, NotificationId>,
    timers: Timers<NotificationTimer>,
    events: Vec<NotificationEvent>,
}

impl NotificationQueue {
    pub fn new(timings: NotificationTimings) -> Self {
        Self {
            timings,
            next_id: 1,
            stack: None,
            active: Vec::new(),
            hiding: HashMap::new(),
            close_targets: HashMap::new(),
            timers: Timers::new(),
            events: Vec::new(),
        }
    }

    /// Create the stack node under `parent` unless it already exists.
    pub fn attach<S: Surface>(
        &mut self,
        surface: &mut S,
        parent: NodeId,
    ) -> Result<NodeId> {
        if let Some(stack) = self.stack.filter(|id| surface.contains(*id)) {
            return Ok(stack);
        }
        let stack = surface.create(parent, NodeRole::NotificationStack)?;
        self.stack = Some(stack);
        Ok(stack)
    }

    /// Stack node holding every notification, once attached.
    pub fn stack(&self) -> Option<NodeId> {
        self.stack
    }

    /// Create a notification and schedule its entrance.
    ///
    /// The id is consumed even if the surface refuses the node, in which
    /// case the notification is reported as removed straight away.
    pub fn enqueue<S: Surface>(
        &mut self,
        surface: &mut S,
        spec: NotificationSpec,
    ) -> NotificationId {
        let id = NotificationId::new(self.next_id);
        self.next_id += 1;

        let (node, close) = match self.build_node(surface, &spec) {
            Ok(nodes) => nodes,
            Err(err) => {
                log::error!("notification {id} could not be displayed: {err}");
                self.events.push(NotificationEvent::Removed(id));
                return id;
            },
        };
        if let Some(close) = close {
            self.close_targets.insert(close, id);
        }

        let settle_timer = self
            .timers
            .schedule(self.timings.settle(), NotificationTimer::Settle(id));
        self.active.push(ActiveRecord {
            id,
            node,
            close,
            visible: false,
            highlight: spec.highlight,
            auto_dismiss: spec.auto_dismiss(),
            settle_timer: Some(settle_timer),
            highlight_timer: None,
            expiry_timer: None,
        });
        self.events.push(NotificationEvent::Enqueued(id));
        id
    }

    /// Start the exit of a Pending or Visible notification.
    ///
    /// Unknown ids and notifications already leaving are ignored. Every
    /// outstanding timer of the record is cancelled first, so nothing
    /// scheduled for it can fire afterwards.
    pub fn dismiss<S: Surface>(
        &mut self,
        surface: &mut S,
        id: NotificationId,
    ) -> bool {
        let Some(index) = self.active.iter().position(|r| r.id == id) else {
            log::debug!("dismiss ignored for inactive notification {id}");
            return false;
        };
        let mut record = self.active.remove(index);
        for timer in record.take_timers() {
            let _ = self.timers.cancel(timer);
        }
        if let Some(close) = record.close {
            self.close_targets.remove(&close);
        }

        surface.set_flags(
            record.node,
            NodeFlags::SHOWN | NodeFlags::HIGHLIGHT,
            false,
        );
        surface.set_flags(record.node, NodeFlags::HIDING, true);

        let _ = self
            .timers
            .schedule(self.timings.exit(), NotificationTimer::Purge(id));
        self.hiding.insert(id, record.node);
        self.events.push(NotificationEvent::Hiding(id));
        true
    }

    /// Notification whose close affordance is `node`.
    pub fn close_target(&self, node: NodeId) -> Option<NotificationId> {
        self.close_targets.get(&node).copied()
    }

    /// Lifecycle state of `id`, `None` if it was never issued.
    pub fn state(&self, id: NotificationId) -> Option<NotificationState> {
        if let Some(record) = self.active.iter().find(|r| r.id == id) {
            return Some(record.state());
        }
        if self.hiding.contains_key(&id) {
            return Some(NotificationState::Hiding);
        }
        (id.raw() > 0 && id.raw() < self.next_id)
            .then_some(NotificationState::Removed)
    }

    /// Ids of Pending and Visible notifications in display order.
    pub fn active_ids(&self) -> Vec<NotificationId> {
        self.active.iter().map(|record| record.id).collect()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Presentation node of a notification that is still on the surface.
    pub fn node(&self, id: NotificationId) -> Option<NodeId> {
        self.active
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.node)
            .or_else(|| self.hiding.get(&id).copied())
    }

    /// Timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Fire every timer due at or before `until`, then move time there.
    pub fn advance_to<S: Surface>(&mut self, surface: &mut S, until: Duration) {
        while let Some((_, timer)) = self.timers.pop_due(until) {
            self.fire(surface, timer);
        }
        self.timers.advance_to(until);
    }

    /// Take the transitions recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<NotificationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop every notification, its timers and the stack node.
    pub fn clear<S: Surface>(&mut self, surface: &mut S) {
        self.timers.clear();
        let active = std::mem::take(&mut self.active);
        let hiding = std::mem::take(&mut self.hiding);
        let mut removed: Vec<NotificationId> = active
            .iter()
            .map(|record| record.id)
            .chain(hiding.keys().copied())
            .collect();
        removed.sort();
        self.events
            .extend(removed.into_iter().map(NotificationEvent::Removed));
        self.close_targets.clear();

        if let Some(stack) = self.stack.take() {
            surface.remove(stack);
        }
    }

    fn build_node<S: Surface>(
        &mut self,
        surface: &mut S,
        spec: &NotificationSpec,
    ) -> Result<(NodeId, Option<NodeId>)> {
        let root = surface.root();
        let stack = self.attach(surface, root)?;
        let node = surface.create(stack, NodeRole::Notification)?;
        surface.set_attr(node, KIND_ATTR, spec.kind.as_str());

        if let Some(title) = spec.display_title() {
            let title_node = surface.create(node, NodeRole::NotificationTitle)?;
            surface.set_text(title_node, title);
        }
        let body = surface.create(node, NodeRole::NotificationBody)?;
        surface.set_text(body, &spec.message);

        let close = if spec.dismissible {
            let close = surface.create(node, NodeRole::NotificationClose)?;
            surface.set_text(close, CLOSE_GLYPH);
            Some(close)
        } else {
            None
        };
        Ok((node, close))
    }

    fn fire<S: Surface>(&mut self, surface: &mut S, timer: NotificationTimer) {
        log::trace!("notification timer fired: {timer:?}");
        match timer {
            NotificationTimer::Settle(id) => self.show(surface, id),
            NotificationTimer::ClearHighlight(id) => {
                let Some(record) = self.active_mut(id) else {
                    return;
                };
                record.highlight_timer = None;
                let node = record.node;
                surface.set_flags(node, NodeFlags::HIGHLIGHT, false);
                self.events.push(NotificationEvent::HighlightCleared(id));
            },
            NotificationTimer::Expire(id) => {
                if let Some(record) = self.active_mut(id) {
                    record.expiry_timer = None;
                }
                let _ = self.dismiss(surface, id);
            },
            NotificationTimer::Purge(id) => {
                let Some(node) = self.hiding.remove(&id) else {
                    return;
                };
                surface.remove(node);
                self.events.push(NotificationEvent::Removed(id));
            },
        }
    }

    fn show<S: Surface>(&mut self, surface: &mut S, id: NotificationId) {
        let timings = self.timings;
        let Some(index) = self.active.iter().position(|r| r.id == id) else {
            return;
        };

        let highlight_timer = self.active[index].highlight.then(|| {
            self.timers
                .schedule(timings.highlight(), NotificationTimer::ClearHighlight(id))
        });
        let expiry_timer = self.active[index].auto_dismiss.map(|delay| {
            self.timers.schedule(delay, NotificationTimer::Expire(id))
        });

        let record = &mut self.active[index];
        record.visible = true;
        record.settle_timer = None;
        record.highlight_timer = highlight_timer;
        record.expiry_timer = expiry_timer;

        surface.set_flags(record.node, NodeFlags::SHOWN, true);
        if highlight_timer.is_some() {
            surface.set_flags(record.node, NodeFlags::HIGHLIGHT, true);
        }
        self.events.push(NotificationEvent::Shown(id));
    }

    fn active_mut(&mut self, id: NotificationId) -> Option<&mut ActiveRecord> {
        self.active.iter_mut().find(|record| record.id == id)
    }
}
