//! Start screen and notification toasts

use shared::display_name;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const MAX_NAME_LEN: usize = 16;
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
}

/// Keys the start screen reacts to in one frame
#[derive(Debug, Default)]
pub struct MenuInput {
    pub typed: Vec<char>,
    pub backspace: bool,
    pub submit: bool,
}

pub struct UiShell {
    screen: Screen,
    name_input: String,
    status: Option<String>,
    notifications: VecDeque<(String, Instant)>,
}

impl UiShell {
    pub fn new(prefill: Option<String>) -> Self {
        let name_input = prefill
            .unwrap_or_default()
            .chars()
            .take(MAX_NAME_LEN)
            .collect();
        Self {
            screen: Screen::Menu,
            name_input,
            status: None,
            notifications: VecDeque::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn name_input(&self) -> &str {
        &self.name_input
    }

    /// Message shown under the name field, e.g. why the last session ended
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Applies one frame of start-screen input. Returns the display name to
    /// join with when the player submits.
    pub fn update_menu(&mut self, input: MenuInput) -> Option<String> {
        if self.screen != Screen::Menu {
            return None;
        }

        for c in input.typed {
            if !c.is_control() && self.name_input.chars().count() < MAX_NAME_LEN {
                self.name_input.push(c);
            }
        }
        if input.backspace {
            self.name_input.pop();
        }

        if input.submit {
            self.screen = Screen::Playing;
            self.status = None;
            return Some(display_name(Some(&self.name_input)).to_string());
        }
        None
    }

    /// Back to the start screen after a session ends
    pub fn return_to_menu(&mut self, reason: Option<String>) {
        self.screen = Screen::Menu;
        self.status = Some(match reason {
            Some(reason) => format!("Disconnected: {}", reason),
            None => "Disconnected from server".to_string(),
        });
    }

    pub fn notify(&mut self, message: String, now: Instant) {
        self.notifications.push_back((message, now + NOTIFICATION_TTL));
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    /// Drops expired toasts and returns the rest, oldest first
    pub fn notifications(&mut self, now: Instant) -> impl Iterator<Item = &str> {
        self.notifications.retain(|(_, expires)| *expires > now);
        self.notifications.iter().map(|(message, _)| message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> MenuInput {
        MenuInput {
            typed: text.chars().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut ui = UiShell::new(None);
        ui.update_menu(typed("bob\u{8}"));
        ui.update_menu(MenuInput {
            backspace: true,
            ..Default::default()
        });
        assert_eq!(ui.name_input(), "bo");

        let name = ui.update_menu(MenuInput {
            submit: true,
            ..Default::default()
        });
        assert_eq!(name.as_deref(), Some("bo"));
        assert_eq!(ui.screen(), Screen::Playing);

        // Input is ignored while playing
        assert_eq!(ui.update_menu(typed("x")), None);
        assert_eq!(ui.name_input(), "bo");
    }

    #[test]
    fn test_blank_name_joins_as_default() {
        let mut ui = UiShell::new(Some("   ".to_string()));
        let name = ui.update_menu(MenuInput {
            submit: true,
            ..Default::default()
        });
        assert_eq!(name.as_deref(), Some(shared::DEFAULT_PLAYER_NAME));
    }

    #[test]
    fn test_name_length_capped() {
        let mut ui = UiShell::new(None);
        ui.update_menu(typed(&"x".repeat(40)));
        assert_eq!(ui.name_input().len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_return_to_menu_sets_status() {
        let mut ui = UiShell::new(Some("amy".to_string()));
        ui.update_menu(MenuInput {
            submit: true,
            ..Default::default()
        });
        ui.return_to_menu(Some("server shutdown".to_string()));

        assert_eq!(ui.screen(), Screen::Menu);
        assert_eq!(ui.status(), Some("Disconnected: server shutdown"));
        assert_eq!(ui.name_input(), "amy");
    }

    #[test]
    fn test_notifications_expire() {
        let mut ui = UiShell::new(None);
        let start = Instant::now();
        ui.notify("one".to_string(), start);
        ui.notify("two".to_string(), start + Duration::from_secs(2));

        let shown: Vec<&str> = ui.notifications(start + Duration::from_secs(1)).collect();
        assert_eq!(shown, vec!["one", "two"]);

        let shown: Vec<&str> = ui.notifications(start + Duration::from_secs(4)).collect();
        assert_eq!(shown, vec!["two"]);
    }
}
