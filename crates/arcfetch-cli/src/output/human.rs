//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use arcfetch_core::FetchReport;
use arcfetch_core::report::format_bytes;
use console::Term;
use console::style;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, c) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    fn summary_lines(&self, report: &FetchReport) -> Vec<String> {
        let extraction = &report.extraction;
        let mut lines = vec![
            format!("  Format:           {}", report.format),
            format!("  Downloaded:       {}", format_bytes(report.bytes_downloaded)),
            format!(
                "  Files extracted:  {}",
                Self::format_number(extraction.files_extracted)
            ),
            format!(
                "  Directories:      {}",
                Self::format_number(extraction.directories_created)
            ),
            format!("  Total size:       {}", format_bytes(extraction.bytes_written)),
        ];

        if extraction.entries_skipped > 0 {
            lines.push(format!(
                "  Entries skipped:  {}",
                Self::format_number(extraction.entries_skipped)
            ));
        }

        if self.verbose {
            lines.push(format!("  URL:              {}", report.url));
            lines.push(format!(
                "  Content-Length:   {}",
                report
                    .content_length
                    .map_or_else(|| "unknown".to_string(), |len| len.to_string())
            ));
            lines.push(format!("  Duration:         {:?}", report.duration));
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_fetch_result(&self, report: &FetchReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} Fetch complete", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line("Fetch complete");
        }

        for line in self.summary_lines(report) {
            let _ = self.term.write_line(&line);
        }

        if report.extraction.has_warnings() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                let _ = self.term.write_line("Warnings:");
            }
            for warning in &report.extraction.warnings {
                let _ = self.term.write_line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:#}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:#}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}
