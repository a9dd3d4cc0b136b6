use std::collections::HashMap;
use std::fmt;

type ToggleFn = Box<dyn FnMut(bool)>;
type SettingsFn = Box<dyn FnMut()>;

/// Host functions bound to the callback names used in declarations.
///
/// Declarations only carry names, which keeps them serializable. A name with
/// no registered function is a silent no-op at dispatch time.
#[derive(Default)]
pub struct CallbackRegistry {
    toggles: HashMap<String, ToggleFn>,
    settings: HashMap<String, SettingsFn>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("toggles", &self.toggles.keys().collect::<Vec<_>>())
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a function receiving the new toggle state.
    pub fn register_toggle<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(bool) + 'static,
    {
        let _ = self.toggles.insert(name.into(), Box::new(callback));
    }

    /// Bind `name` to a settings affordance handler.
    pub fn register_settings<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut() + 'static,
    {
        let _ = self.settings.insert(name.into(), Box::new(callback));
    }

    /// Drop every binding for `name`. Returns whether anything was bound.
    pub fn unregister(&mut self, name: &str) -> bool {
        let toggle = self.toggles.remove(name).is_some();
        let settings = self.settings.remove(name).is_some();
        toggle || settings
    }

    pub fn contains(&self, name: &str) -> bool {
        self.toggles.contains_key(name) || self.settings.contains_key(name)
    }

    /// Invoke the toggle callback bound to `name`, if any.
    pub fn dispatch_toggle(&mut self, name: &str, active: bool) -> bool {
        match self.toggles.get_mut(name) {
            Some(callback) => {
                callback(active);
                true
            },
            None => {
                log::debug!("no toggle callback registered for `{name}`");
                false
            },
        }
    }

    /// Invoke the settings callback bound to `name`, if any.
    pub fn dispatch_settings(&mut self, name: &str) -> bool {
        match self.settings.get_mut(name) {
            Some(callback) => {
                callback();
                true
            },
            None => {
                log::debug!("no settings callback registered for `{name}`");
                false
            },
        }
    }
}
