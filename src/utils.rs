const BAR_WIDTH: usize = 20;

/// Pads on the right to `width` characters, counting chars rather than bytes.
pub fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return format!("{text} ");
    }
    format!("{text}{}", " ".repeat(width - len))
}

pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        percent
    )
}
