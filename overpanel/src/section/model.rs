use serde::Deserialize;

use crate::error::Result;

/// Switch control with its current state and optional host callback name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToggleDecl {
    pub active: bool,
    pub callback: Option<String>,
}

impl ToggleDecl {
    pub fn new(active: bool) -> Self {
        Self {
            active,
            callback: None,
        }
    }

    pub fn callback(mut self, name: impl Into<String>) -> Self {
        self.callback = Some(name.into());
        self
    }
}

/// Settings affordance, optionally bound to a host callback name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsDecl {
    pub callback: Option<String>,
}

impl SettingsDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            callback: Some(name.into()),
        }
    }
}

/// Title row of a card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardHeader {
    pub title: String,
    pub settings: Option<SettingsDecl>,
    pub toggle: Option<ToggleDecl>,
}

impl CardHeader {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn settings(mut self, name: impl Into<String>) -> Self {
        self.settings = Some(SettingsDecl::new(name));
        self
    }

    pub fn toggle(mut self, toggle: ToggleDecl) -> Self {
        self.toggle = Some(toggle);
        self
    }
}

/// One labelled row inside a card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentRow {
    pub title: String,
    pub settings: Option<SettingsDecl>,
    pub toggle: Option<ToggleDecl>,
}

impl ContentRow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn settings(mut self, name: impl Into<String>) -> Self {
        self.settings = Some(SettingsDecl::new(name));
        self
    }

    pub fn toggle(mut self, toggle: ToggleDecl) -> Self {
        self.toggle = Some(toggle);
        self
    }
}

/// Group of rows under an optional header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardDecl {
    pub header: Option<CardHeader>,
    pub content: Vec<ContentRow>,
}

impl CardDecl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, header: CardHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn row(mut self, row: ContentRow) -> Self {
        self.content.push(row);
        self
    }
}

/// Address of a toggle inside a [`SectionDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToggleSlot {
    pub card: usize,
    /// `None` addresses the card header toggle.
    pub row: Option<usize>,
}

/// Exclusively shown content area, identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionDecl {
    pub id: String,
    pub title: Option<String>,
    pub cards: Vec<CardDecl>,
}

impl SectionDecl {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn card(mut self, card: CardDecl) -> Self {
        self.cards.push(card);
        self
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn toggle(&self, slot: ToggleSlot) -> Option<&ToggleDecl> {
        let card = self.cards.get(slot.card)?;
        match slot.row {
            None => card.header.as_ref()?.toggle.as_ref(),
            Some(row) => card.content.get(row)?.toggle.as_ref(),
        }
    }

    pub fn toggle_mut(&mut self, slot: ToggleSlot) -> Option<&mut ToggleDecl> {
        let card = self.cards.get_mut(slot.card)?;
        match slot.row {
            None => card.header.as_mut()?.toggle.as_mut(),
            Some(row) => card.content.get_mut(row)?.toggle.as_mut(),
        }
    }

    /// Every callback name referenced by this section.
    pub fn callback_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for card in &self.cards {
            if let Some(header) = &card.header {
                push_control_names(
                    &mut names,
                    header.settings.as_ref(),
                    header.toggle.as_ref(),
                );
            }
            for row in &card.content {
                push_control_names(
                    &mut names,
                    row.settings.as_ref(),
                    row.toggle.as_ref(),
                );
            }
        }
        names
    }
}

fn push_control_names<'a>(
    names: &mut Vec<&'a str>,
    settings: Option<&'a SettingsDecl>,
    toggle: Option<&'a ToggleDecl>,
) {
    names.extend(settings.and_then(|s| s.callback.as_deref()));
    names.extend(toggle.and_then(|t| t.callback.as_deref()));
}

/// Sidebar entry pointing at a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidebarOption {
    pub section_id: String,
    pub label: String,
    pub icon: Option<String>,
}

impl SidebarOption {
    pub fn new(section_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            label: label.into(),
            icon: None,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Named group of sidebar options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub options: Vec<SidebarOption>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, option: SidebarOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CardDecl, CardHeader, Category, ContentRow, SectionDecl, ToggleDecl,
        ToggleSlot,
    };

    fn sample() -> SectionDecl {
        SectionDecl::new("aim").title("Aim").card(
            CardDecl::new()
                .header(
                    CardHeader::new("Aimbot")
                        .settings("aimSettings")
                        .toggle(ToggleDecl::new(true).callback("aimToggle")),
                )
                .row(ContentRow::new("Smooth").toggle(ToggleDecl::new(false)))
                .row(ContentRow::new("FOV").settings("fovSettings")),
        )
    }

    #[test]
    fn given_section_when_addressing_toggles_then_slots_resolve() {
        let mut section = sample();
        let header = ToggleSlot { card: 0, row: None };
        let smooth = ToggleSlot {
            card: 0,
            row: Some(0),
        };
        let fov = ToggleSlot {
            card: 0,
            row: Some(1),
        };

        assert_eq!(section.toggle(header).map(|t| t.active), Some(true));
        assert!(section.toggle(fov).is_none());

        section.toggle_mut(smooth).unwrap().active = true;
        assert_eq!(section.toggle(smooth).map(|t| t.active), Some(true));
    }

    #[test]
    fn given_section_when_listing_callbacks_then_all_names_are_returned() {
        assert_eq!(
            sample().callback_names(),
            vec!["aimSettings", "aimToggle", "fovSettings"]
        );
    }

    #[test]
    fn given_json_section_when_decoding_then_nested_cards_are_read() {
        let section = SectionDecl::from_json(
            r#"{
                "id": "visuals",
                "cards": [{
                    "header": {"title": "ESP", "toggle": {"active": true, "callback": "esp"}},
                    "content": [{"title": "Boxes", "settings": {"callback": "boxes"}}]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(section.id, "visuals");
        assert_eq!(section.title, None);
        assert_eq!(section.callback_names(), vec!["esp", "boxes"]);
    }

    #[test]
    fn given_json_category_when_decoding_then_camel_case_ids_are_read() {
        let category = Category::from_json(
            r#"{"name":"Combat","options":[{"sectionId":"aim","label":"Aim","icon":"+"}]}"#,
        )
        .unwrap();

        assert_eq!(category.options[0].section_id, "aim");
        assert_eq!(category.options[0].icon.as_deref(), Some("+"));
    }

    #[test]
    fn given_malformed_json_when_decoding_then_error_is_returned() {
        assert!(SectionDecl::from_json("{\"id\": 3}").is_err());
    }
}
