use overpanel_surface::{NodeFlags, NodeId, NodeRole, Surface};

use super::model::{CardDecl, SettingsDecl, ToggleDecl, ToggleSlot};
use crate::error::Result;

const CALLBACK_ATTR: &str = "callback";
const SETTINGS_GLYPH: &str = "⚙";

/// What a rendered control does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlBinding {
    Toggle(ToggleSlot),
    Settings(Option<String>),
}

/// Presentation subtree produced for one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub node: NodeId,
    pub bindings: Vec<(NodeId, ControlBinding)>,
}

/// Stateless projection of a [`CardDecl`] onto the surface.
pub struct CardRenderer;

impl CardRenderer {
    /// Build the card subtree under `parent`.
    ///
    /// Layout: header row (title, settings, toggle), then a divider when both
    /// header and rows exist, then one row per content entry. Toggle nodes
    /// carry [`NodeFlags::ACTIVE`] mirroring the declared state.
    pub fn render<S: Surface>(
        surface: &mut S,
        parent: NodeId,
        index: usize,
        card: &CardDecl,
    ) -> Result<RenderedCard> {
        let node = surface.create(parent, NodeRole::Card)?;
        let mut bindings = Vec::new();

        if let Some(header) = &card.header {
            let row = surface.create(node, NodeRole::CardHeader)?;
            let title = surface.create(row, NodeRole::CardTitle)?;
            surface.set_text(title, &header.title);

            let controls = surface.create(row, NodeRole::CardControls)?;
            render_controls(
                surface,
                controls,
                header.settings.as_ref(),
                header.toggle.as_ref(),
                ToggleSlot {
                    card: index,
                    row: None,
                },
                &mut bindings,
            )?;
        }

        if !card.content.is_empty() && card.header.is_some() {
            let _ = surface.create(node, NodeRole::CardDivider)?;
        }

        for (row_index, content) in card.content.iter().enumerate() {
            let row = surface.create(node, NodeRole::ContentRow)?;
            let title = surface.create(row, NodeRole::ContentTitle)?;
            surface.set_text(title, &content.title);

            let controls = surface.create(row, NodeRole::ContentControls)?;
            render_controls(
                surface,
                controls,
                content.settings.as_ref(),
                content.toggle.as_ref(),
                ToggleSlot {
                    card: index,
                    row: Some(row_index),
                },
                &mut bindings,
            )?;
        }

        Ok(RenderedCard { node, bindings })
    }
}

fn render_controls<S: Surface>(
    surface: &mut S,
    controls: NodeId,
    settings: Option<&SettingsDecl>,
    toggle: Option<&ToggleDecl>,
    slot: ToggleSlot,
    bindings: &mut Vec<(NodeId, ControlBinding)>,
) -> Result<()> {
    if let Some(settings) = settings {
        let icon = surface.create(controls, NodeRole::SettingsIcon)?;
        surface.set_text(icon, SETTINGS_GLYPH);
        if let Some(name) = &settings.callback {
            surface.set_attr(icon, CALLBACK_ATTR, name);
        }
        bindings.push((icon, ControlBinding::Settings(settings.callback.clone())));
    }

    if let Some(toggle) = toggle {
        let switch = surface.create(controls, NodeRole::Toggle)?;
        surface.set_flags(switch, NodeFlags::ACTIVE, toggle.active);
        if let Some(name) = &toggle.callback {
            surface.set_attr(switch, CALLBACK_ATTR, name);
        }
        bindings.push((switch, ControlBinding::Toggle(slot)));
    }

    Ok(())
}
