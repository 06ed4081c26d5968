//! Auto-generate help text from the keybindings registry.

use super::registry::BINDINGS;
use super::{Category, KeyPattern, Mode};

/// Format a binding's keys for display (primary + alternatives).
fn format_binding_keys(pattern: &KeyPattern, alternatives: &[KeyPattern]) -> String {
    let mut parts = vec![pattern.display()];
    for alt in alternatives {
        parts.push(alt.display());
    }
    parts.join(", ")
}

/// Help lines for a mode, grouped by category in registry order.
pub fn generate_help_for_mode(mode: Mode) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_category: Option<Category> = None;

    let mode_bindings = BINDINGS
        .iter()
        .filter(|b| b.modes.contains(&mode) && b.show_in_help);

    for binding in mode_bindings {
        if current_category != Some(binding.category) {
            if current_category.is_some() {
                lines.push(String::new());
            }
            let label = binding.category.label();
            lines.push(format!("  {}", label));
            lines.push(format!("  {}", "─".repeat(label.chars().count())));
            current_category = Some(binding.category);
        }

        let keys = format_binding_keys(&binding.pattern, binding.alternatives);
        lines.push(format!("  {:14}{}", keys, binding.description));
    }

    lines
}
