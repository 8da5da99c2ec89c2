use crate::utils::progress_bar;

pub fn render_status(message: &str, is_error: bool) -> String {
    if is_error {
        render_error(message)
    } else {
        message.to_string()
    }
}

pub fn render_error(message: &str) -> String {
    format!("! {message}")
}

pub fn render_progress(filename: &str, percent: u8) -> String {
    format!("Downloading {filename} {}", progress_bar(percent))
}
