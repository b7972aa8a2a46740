// SPDX-License-Identifier: MIT OR Apache-2.0
//! Context menu of the clips area.

use crate::actions::{ActionKind, ActionRegistry, MenuEntry};
use crate::state::WindowState;
use egui::Pos2;

/// Menu row or submenu, with the submenu path stripped from labels
#[derive(Debug, Clone, PartialEq)]
pub enum MenuNode {
    /// Clickable action
    Action {
        /// Action to run
        kind: ActionKind,
        /// Label within its submenu
        label: String,
        /// Check mark
        checked: bool,
    },
    /// Greyed-out row
    Disabled(String),
    /// Separator
    Separator,
    /// Nested menu
    Submenu(String, Vec<MenuNode>),
}

fn split_path(label: &str) -> (Option<&str>, &str) {
    match label.split_once('/') {
        Some((head, rest)) => (Some(head), rest),
        None => (None, label),
    }
}

fn strip(entry: &MenuEntry, depth: usize) -> MenuEntry {
    let tail = |label: &str| label.splitn(depth + 1, '/').last().unwrap_or(label).to_string();
    match entry {
        MenuEntry::Action { kind, label, checked } => MenuEntry::Action {
            kind: *kind,
            label: tail(label),
            checked: *checked,
        },
        MenuEntry::Disabled { label } => MenuEntry::Disabled { label: tail(label) },
        MenuEntry::Separator { category } => MenuEntry::Separator {
            category: tail(category),
        },
    }
}

/// Group flat menu entries into submenus by their `a/b/label` paths
pub fn build_menu_tree(entries: &[MenuEntry]) -> Vec<MenuNode> {
    let mut nodes: Vec<MenuNode> = Vec::new();
    let mut pending: Option<(String, Vec<MenuEntry>)> = None;

    let flush = |pending: &mut Option<(String, Vec<MenuEntry>)>, nodes: &mut Vec<MenuNode>| {
        if let Some((name, children)) = pending.take() {
            let stripped: Vec<MenuEntry> = children.iter().map(|e| strip(e, 1)).collect();
            nodes.push(MenuNode::Submenu(name, build_menu_tree(&stripped)));
        }
    };

    for entry in entries {
        let path = match entry {
            MenuEntry::Action { label, .. } | MenuEntry::Disabled { label } => label.as_str(),
            MenuEntry::Separator { category } => category.as_str(),
        };
        let (head, leaf) = split_path(path);

        match head {
            Some(head) => {
                if pending.as_ref().is_some_and(|(name, _)| name != head) {
                    flush(&mut pending, &mut nodes);
                }
                pending
                    .get_or_insert_with(|| (head.to_string(), Vec::new()))
                    .1
                    .push(entry.clone());
            }
            None => {
                flush(&mut pending, &mut nodes);
                nodes.push(match entry {
                    MenuEntry::Action { kind, checked, .. } => MenuNode::Action {
                        kind: *kind,
                        label: leaf.to_string(),
                        checked: *checked,
                    },
                    MenuEntry::Disabled { .. } => MenuNode::Disabled(leaf.to_string()),
                    MenuEntry::Separator { .. } => MenuNode::Separator,
                });
            }
        }
    }
    flush(&mut pending, &mut nodes);
    nodes
}

fn show_nodes(ui: &mut egui::Ui, nodes: &[MenuNode], state: &WindowState, clicked: &mut Option<ActionKind>) {
    for node in nodes {
        match node {
            MenuNode::Action { kind, label, checked } => {
                let mut button = egui::Button::new(label.as_str()).selected(*checked);
                if let Some(shortcut) = ActionRegistry::shared().shortcut_display(*kind, &state.settings) {
                    button = button.shortcut_text(shortcut);
                }
                if ui.add(button).clicked() {
                    *clicked = Some(*kind);
                    ui.close_menu();
                }
            }
            MenuNode::Disabled(label) => {
                ui.add_enabled(false, egui::Button::new(label.as_str()));
            }
            MenuNode::Separator => {
                ui.separator();
            }
            MenuNode::Submenu(name, children) => {
                ui.menu_button(name.as_str(), |ui| show_nodes(ui, children, state, clicked));
            }
        }
    }
}

/// Draw the context menu opened at `pointer` and run the picked action.
///
/// Returns the action that ran.
pub fn context_menu(ui: &mut egui::Ui, state: &mut WindowState, pointer: Pos2) -> Option<ActionKind> {
    let registry = ActionRegistry::shared();
    let tree = build_menu_tree(&registry.build_menu_entries(state, Some(pointer)));

    let mut clicked = None;
    show_nodes(ui, &tree, state, &mut clicked);

    let kind = clicked?;
    let handled = registry.execute_from_menu(kind, state, pointer);
    tracing::debug!("Menu item {:?} ran (handled: {})", kind, handled);
    Some(kind)
}
