use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Preview commands. The click actions synthesize a click on the matching
/// node of the in-memory document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ClickToggler,
    ClickBackdrop,
    ClickClose,
    Hide,
    Destroy,
    ToggleLog,
    Quit,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::ClickToggler,
        Action::ClickBackdrop,
        Action::ClickClose,
        Action::Hide,
        Action::Destroy,
        Action::ToggleLog,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::ClickToggler => "Click toggler",
            Action::ClickBackdrop => "Click backdrop",
            Action::ClickClose => "Click close",
            Action::Hide => "Hide",
            Action::Destroy => "Destroy",
            Action::ToggleLog => "Toggle log",
            Action::Quit => "Quit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(ClickToggler, KeyCombo::plain(KeyCode::Char('t')));
        kb.add(ClickToggler, KeyCombo::plain(KeyCode::Enter));
        kb.add(ClickBackdrop, KeyCombo::plain(KeyCode::Char('b')));
        kb.add(ClickClose, KeyCombo::plain(KeyCode::Char('c')));
        kb.add(Hide, KeyCombo::plain(KeyCode::Char('h')));
        kb.add(Hide, KeyCombo::plain(KeyCode::Esc));
        kb.add(Destroy, KeyCombo::plain(KeyCode::Char('d')));
        kb.add(ToggleLog, KeyCombo::plain(KeyCode::Char('l')));
        kb.add(Quit, KeyCombo::plain(KeyCode::Char('q')));
        kb.add(Quit, KeyCombo::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| self.matches(*action, key))
    }

    /// Display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(KeyCombo::display).collect())
            .unwrap_or_default()
    }

    /// One `key: action` hint per action, in declaration order.
    pub fn hint_line(&self) -> String {
        Action::ALL
            .into_iter()
            .filter_map(|action| {
                let combos = self.combos_for(action);
                (!combos.is_empty()).then(|| format!("{}: {action}", combos.join("/")))
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}
