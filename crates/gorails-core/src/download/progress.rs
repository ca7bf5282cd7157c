use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PB_STYLE: &str = "{spinner:.blue} {prefix} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Used when the server sends no Content-Length
const SPINNER_STYLE: &str = "{spinner:.blue} {prefix} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

#[derive(Debug, Clone)]
pub struct ProgressTrackerConfig {
    pub len: Option<u64>,
    pub label: String,
    pub visible: bool,
}

/// Byte progress for one transfer.
pub struct ProgressTracker {
    pb: ProgressBar,
}

impl ProgressTracker {
    pub fn new(ctx: ProgressTrackerConfig) -> Self {
        let pb = match (ctx.visible, ctx.len) {
            (false, len) => ProgressBar::with_draw_target(len, ProgressDrawTarget::hidden()),
            (true, Some(len)) => ProgressBar::new(len),
            (true, None) => ProgressBar::no_length(),
        };

        let template = if ctx.len.is_some() { PB_STYLE } else { SPINNER_STYLE };
        if let Ok(style) = ProgressStyle::with_template(template) {
            pb.set_style(style.tick_chars(TICK).progress_chars(PB_CHARS));
        }
        pb.set_prefix(ctx.label);
        ProgressTracker { pb }
    }

    pub fn advance(&self, bytes: u64) {
        self.pb.inc(bytes);
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
