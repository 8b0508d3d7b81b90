pub mod pause;
pub mod skip;

use twilight_model::channel::message::{
    Component,
    component::{ActionRow, Button, ButtonStyle},
};

use super::ComponentRegistry;

pub const PAUSE_ID: &str = "pause";
pub const SKIP_ID: &str = "skip";

pub fn register_buttons(reg: &mut ComponentRegistry) {
    reg.register(SKIP_ID, |state, interaction| {
        Box::pin(skip::skip_button_handler(state, interaction))
    });
    reg.register(PAUSE_ID, |state, interaction| {
        Box::pin(pause::pause_button_handler(state, interaction))
    });
}

fn button(custom_id: &str, label: &str, style: ButtonStyle) -> Component {
    Component::Button(Button {
        label: Some(label.to_string()),
        custom_id: Some(custom_id.to_string()),
        style,
        emoji: None,
        disabled: false,
        url: None,
        sku_id: None,
    })
}

/// Player controls attached to the now playing message.
pub fn action_menu(paused: bool) -> Component {
    let pause_label = if paused { "▶️ Resume" } else { "⏸️ Pause" };
    Component::ActionRow(ActionRow {
        components: vec![
            button(PAUSE_ID, pause_label, ButtonStyle::Secondary),
            button(SKIP_ID, "⏩ Skip", ButtonStyle::Danger),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(component: &Component) -> Vec<String> {
        let Component::ActionRow(row) = component else {
            panic!("expected an action row");
        };
        row.components
            .iter()
            .filter_map(|component| match component {
                Component::Button(button) => button.label.clone(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_action_menu_reflects_pause_state() {
        assert_eq!(labels(&action_menu(false)), ["⏸️ Pause", "⏩ Skip"]);
        assert_eq!(labels(&action_menu(true)), ["▶️ Resume", "⏩ Skip"]);
    }
}
