use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use overpanel_surface::Surface;

use super::controller::{Deferred, PanelController};
use crate::config::PanelConfig;
use crate::notification::NotificationId;

/// Shared reference to the live panel.
///
/// Clones point at the same instance; compare them with
/// [`PanelHandle::ptr_eq`].
pub struct PanelHandle<S: Surface> {
    inner: Rc<RefCell<PanelController<S>>>,
}

impl<S: Surface> Clone for PanelHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Surface> PanelHandle<S> {
    /// # Panics
    ///
    /// Panics if the panel is currently mutably borrowed, for example from
    /// inside one of its own callbacks.
    pub fn borrow(&self) -> Ref<'_, PanelController<S>> {
        self.inner.borrow()
    }

    /// # Panics
    ///
    /// Panics if the panel is already borrowed, for example from inside one
    /// of its own callbacks.
    pub fn borrow_mut(&self) -> RefMut<'_, PanelController<S>> {
        self.inner.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn is_live(&self) -> bool {
        // A panel borrowed by the caller is by definition still in use.
        self.inner
            .try_borrow()
            .map(|panel| !panel.is_destroyed())
            .unwrap_or(true)
    }
}

/// Owner of the at-most-one live panel of a host.
///
/// Constructing while a live panel exists hands back that panel and ignores
/// the new arguments. A destroyed panel no longer counts, so a fresh one can
/// be constructed afterwards.
pub struct PanelRegistry<S: Surface> {
    slot: Option<PanelHandle<S>>,
}

impl<S: Surface> Default for PanelRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Surface> PanelRegistry<S> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn construct(&mut self, config: PanelConfig, surface: S) -> PanelHandle<S> {
        if let Some(existing) = self.current() {
            log::warn!("panel already constructed; reusing the live instance");
            return existing;
        }
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(PanelController::new(config, surface, this.clone()))
        });
        let handle = PanelHandle { inner };
        self.slot = Some(handle.clone());
        handle
    }

    /// The live panel, if any.
    pub fn current(&self) -> Option<PanelHandle<S>> {
        self.slot.as_ref().filter(|handle| handle.is_live()).cloned()
    }

    /// Destroy the live panel and empty the slot.
    ///
    /// Returns `false` when there was nothing to release. A panel that is
    /// borrowed at the time cannot be destroyed, so it stays in the slot and
    /// the call returns `false` as well.
    pub fn release(&mut self) -> bool {
        let Some(handle) = self.slot.take() else {
            return false;
        };
        let released = match handle.inner.try_borrow_mut() {
            Ok(mut panel) => {
                let live = !panel.is_destroyed();
                panel.destroy();
                Some(live)
            },
            Err(_) => None,
        };
        match released {
            Some(live) => live,
            None => {
                log::warn!("panel released while borrowed; slot kept");
                self.slot = Some(handle);
                false
            },
        }
    }
}

/// Early-dismiss capability for one notification.
///
/// Holds the panel weakly, so it never keeps a released panel alive. Used
/// while the panel is busy running a callback, the dismissal is queued and
/// applied once that callback returns.
pub struct DismissHandle<S: Surface> {
    id: Option<NotificationId>,
    panel: Weak<RefCell<PanelController<S>>>,
    deferred: Weak<RefCell<Vec<NotificationId>>>,
}

impl<S: Surface> Clone for DismissHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            panel: Weak::clone(&self.panel),
            deferred: Weak::clone(&self.deferred),
        }
    }
}

impl<S: Surface> DismissHandle<S> {
    pub(crate) fn new(
        id: NotificationId,
        panel: Weak<RefCell<PanelController<S>>>,
        deferred: &Deferred,
    ) -> Self {
        Self {
            id: Some(id),
            panel,
            deferred: Rc::downgrade(deferred),
        }
    }

    /// Handle that refers to no notification.
    pub(crate) fn detached() -> Self {
        Self {
            id: None,
            panel: Weak::new(),
            deferred: Weak::new(),
        }
    }

    pub fn id(&self) -> Option<NotificationId> {
        self.id
    }

    /// Start the exit of the notification.
    ///
    /// Returns whether a dismissal was started or queued.
    pub fn dismiss(&self) -> bool {
        let Some(id) = self.id else {
            return false;
        };
        let Some(panel) = self.panel.upgrade() else {
            return false;
        };
        match panel.try_borrow_mut() {
            Ok(mut panel) => panel.dismiss_message(id),
            Err(_) => match self.deferred.upgrade() {
                Some(deferred) => {
                    log::debug!("panel busy; dismissal of {id} deferred");
                    deferred.borrow_mut().push(id);
                    true
                },
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use overpanel_surface::MemorySurface;

    use super::PanelRegistry;
    use crate::config::PanelConfig;

    #[test]
    fn given_live_panel_when_constructing_again_then_same_instance_is_returned()
    {
        let mut registry = PanelRegistry::new();
        let first = registry.construct(PanelConfig::new(), MemorySurface::new());

        let second = registry
            .construct(PanelConfig::new().logo_text("OTHER"), MemorySurface::new());

        assert!(first.ptr_eq(&second));
        assert!(registry.current().is_some_and(|c| c.ptr_eq(&first)));
    }

    #[test]
    fn given_destroyed_panel_when_constructing_then_fresh_instance_is_built() {
        let mut registry = PanelRegistry::new();
        let first = registry.construct(PanelConfig::new(), MemorySurface::new());
        first.borrow_mut().destroy();
        assert!(registry.current().is_none());

        let second = registry.construct(PanelConfig::new(), MemorySurface::new());

        assert!(!first.ptr_eq(&second));
        assert!(!second.borrow().is_destroyed());
    }

    #[test]
    fn given_live_panel_when_released_then_it_is_destroyed() {
        let mut registry = PanelRegistry::new();
        let panel = registry.construct(PanelConfig::new(), MemorySurface::new());

        assert!(registry.release());
        assert!(!registry.release());

        assert!(panel.borrow().is_destroyed());
        assert!(registry.current().is_none());
    }

    #[test]
    fn given_borrowed_panel_when_released_then_slot_is_kept() {
        let mut registry = PanelRegistry::new();
        let first = registry.construct(PanelConfig::new(), MemorySurface::new());

        {
            let _guard = first.borrow_mut();
            assert!(!registry.release());
        }

        assert!(!first.borrow().is_destroyed());
        let second = registry.construct(PanelConfig::new(), MemorySurface::new());
        assert!(first.ptr_eq(&second));

        assert!(registry.release());
        assert!(first.borrow().is_destroyed());
    }

    #[test]
    fn given_dropped_panel_when_dismissing_then_handle_is_inert() {
        let mut registry = PanelRegistry::new();
        let panel = registry.construct(PanelConfig::new(), MemorySurface::new());
        let handle = panel.borrow_mut().show_message("bye");
        let _ = registry.release();
        drop(panel);
        drop(registry);

        assert!(handle.id().is_some());
        assert!(!handle.dismiss());
    }
}
