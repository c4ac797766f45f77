use console::style;

/// User-facing terminal output. Backend failures are rendered through
/// [`Output::error`] at the command layer; they never escape as panics.
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn item(&self, message: &str) {
        println!("  {} {}", style("•").dim(), message);
    }

    pub fn key_value(&self, key: &str, value: &str) {
        println!("  {:<12} {}", style(key).dim(), value);
    }

    /// One progress line of a running task watch
    pub fn progress(&self, message: &str) {
        println!("{} {}", style("→").cyan(), message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
