use std::fmt::Write;

use hear2read_voices_lib::reconcile::{ItemAction, VoiceItem};

use crate::utils::{pad_right, progress_bar};

const NAME_WIDTH: usize = 31;

pub fn render_list(items: &[VoiceItem]) -> String {
    if items.is_empty() {
        return "No voices available.\n".to_string();
    }

    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", index + 1, render_item(item));
    }
    out
}

pub fn render_item(item: &VoiceItem) -> String {
    let label = match item.action {
        ItemAction::None => "REQUIRED",
        ItemAction::Install => "Include",
        ItemAction::Remove => "Remove",
    };

    let mut line = format!("{}{label}", pad_right(item.display_name(), NAME_WIDTH));
    if item.action == ItemAction::Install && item.progress_percent > 0 {
        line.push_str("  ");
        line.push_str(&progress_bar(item.progress_percent));
    }
    line
}
