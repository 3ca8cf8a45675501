//! Terminal user interface components.
//!
//! Themed status lines, progress bars and the final run summary.

use console::{Style, Term};
use dialoguer::theme::ColorfulTheme;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

use crate::context::SortStats;

pub const BANNER: &str = r#"
     ▌▘      ▗
   ▛▌▌▛▘▛▘▛▌▛▘▜▘
   ▙▌▌▌ ▄▌▙▌▌ ▐▖ "#;

/// Styles derived from a color theme name.
struct Palette {
    base: Style,
    warning: Style,
    error: Style,
    success: Style,
    /// Color suffix for indicatif templates, e.g. ".cyan"
    spinner: &'static str,
    bar: &'static str,
}

impl Palette {
    fn for_theme(theme: &str) -> Self {
        let (base, warning, error, success, spinner, bar) = match theme {
            "cyan" => (Style::new().cyan(), 51, 87, 123, ".cyan", "bright_cyan"),
            "magenta" => (Style::new().magenta(), 201, 126, 213, ".magenta", "bright_magenta"),
            "yellow" => (Style::new().yellow(), 226, 178, 227, ".yellow", "bright_yellow"),
            "green" => (Style::new().green(), 46, 28, 120, ".green", "bright_green"),
            "red" => (Style::new().red(), 196, 124, 210, ".red", "bright_red"),
            "blue" => (Style::new().blue(), 39, 25, 117, ".blue", "bright_blue"),
            _ => (Style::new().white(), 255, 250, 255, ".white", "bright_white"),
        };

        Self {
            base,
            warning: Style::new().color256(warning),
            error: Style::new().color256(error),
            success: Style::new().color256(success),
            spinner,
            bar,
        }
    }
}

pub struct UI {
    pub term: Term,
    pub color_theme: String,
    palette: Palette,
}

impl UI {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            color_theme: "default".to_string(),
            palette: Palette::for_theme("default"),
        }
    }

    pub fn with_color_theme(mut self, theme: String) -> Self {
        self.palette = Palette::for_theme(&theme);
        self.color_theme = theme;
        self
    }

    /// Get a ColorfulTheme for dialoguer prompts
    pub fn get_colorful_theme(theme: &str) -> ColorfulTheme {
        let base = Palette::for_theme(theme).base;

        ColorfulTheme {
            values_style: base.clone(),
            active_item_style: base.clone().bold(),
            active_item_prefix: base.apply_to("❯".to_string()).bold(),
            ..ColorfulTheme::default()
        }
    }

    /// Print the banner followed by the sorted root
    pub fn init(&self, message: &str) -> io::Result<()> {
        let white_bold = Style::new().white().bold();

        println!("{}", self.palette.base.apply_to(BANNER).bold());
        println!();
        println!("{}", white_bold.apply_to("=".repeat(70)));
        if !message.is_empty() {
            println!("{}", white_bold.apply_to(message));
            println!("{}", white_bold.apply_to("=".repeat(70)));
        }
        println!();

        Ok(())
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let template = format!("{{spinner:{}}} {{msg}}", self.palette.spinner);
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Progress bar with a known total
    pub fn create_progress_bar(&self, total: u64, message: &str) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let template = format!(
            "{{spinner:{}}} {{bar:40.{}/{}}} {{pos}}/{{len}} ({{percent}}%) {{msg}}",
            self.palette.spinner, self.palette.bar, self.palette.bar
        );
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█ ")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Print the counters of a finished run
    pub fn print_summary(&self, stats: &SortStats) -> io::Result<()> {
        let white_bold = Style::new().white().bold();
        let rows = [
            ("Files moved", stats.moved),
            ("Files renamed", stats.renamed),
            ("Already sorted", stats.unchanged),
            ("Files failed", stats.failed),
            ("Archives unpacked", stats.unpacked),
            ("Archives failed", stats.unpack_failed),
            ("Empty folders removed", stats.removed_dirs),
        ];

        println!();
        println!("{}", self.palette.base.apply_to("SUMMARY").bold());
        println!("{}", white_bold.apply_to("─".repeat(70)));
        for (label, value) in rows {
            println!(
                "{} {}",
                white_bold.apply_to(format!("{:<24}", label)),
                self.palette.base.apply_to(value)
            );
        }
        println!("{}", white_bold.apply_to("─".repeat(70)));
        println!();

        Ok(())
    }

    pub fn print_info(&self, message: &str) -> io::Result<()> {
        self.print_status(&self.palette.base, "[*]", message)
    }

    pub fn print_error(&self, message: &str) -> io::Result<()> {
        self.print_status(&self.palette.error, "[!] ERROR:", message)
    }

    pub fn print_success(&self, message: &str) -> io::Result<()> {
        self.print_status(&self.palette.success, "[✓]", message)
    }

    pub fn print_warning(&self, message: &str) -> io::Result<()> {
        self.print_status(&self.palette.warning, "[!] WARNING:", message)
    }

    fn print_status(&self, tag_style: &Style, tag: &str, message: &str) -> io::Result<()> {
        let white_bold = Style::new().white().bold();
        self.term.write_line(&format!(
            "{} {}",
            tag_style.apply_to(tag).bold(),
            white_bold.apply_to(message)
        ))
    }

    /// Cleanup the terminal (show cursor, etc.)
    pub fn cleanup(&self) -> io::Result<()> {
        self.term.show_cursor()
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_color_theme() {
        let ui = UI::new().with_color_theme("cyan".to_string());
        assert_eq!(ui.color_theme, "cyan");
        assert_eq!(ui.palette.spinner, ".cyan");
    }

    #[test]
    fn test_unknown_theme_falls_back_to_white() {
        let palette = Palette::for_theme("neon");
        assert_eq!(palette.spinner, ".white");
        assert_eq!(palette.bar, "bright_white");
    }

    #[test]
    fn test_progress_bar_total() {
        let ui = UI::new();
        let pb = ui.create_progress_bar(42, "Sorting");
        assert_eq!(pb.length(), Some(42));
        pb.finish_and_clear();
    }
}
