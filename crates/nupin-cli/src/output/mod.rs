//! Terminal output formatting.
//!
//! Keeps command output consistent: results go to stdout, diagnostics to
//! stderr.

pub mod colors;
pub mod errors;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print an indented list entry
    pub fn item(&self, message: &str) {
        println!("  {}", message);
    }

    /// Print a section heading
    pub fn heading(&self, message: &str) {
        println!("{}", self.colors.bold(message));
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
