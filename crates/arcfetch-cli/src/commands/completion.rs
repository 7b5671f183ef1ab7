//! Shell completion generation command.

use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;
use std::io::Write;

/// Prints the completion script for `shell` to stdout.
pub fn execute(shell: Shell) {
    generate(shell, &mut io::stdout());
}

/// Writes the completion script for `shell`, covering both subcommands and
/// their options, to `out`.
fn generate(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut output = Vec::new();
        generate(shell, &mut output);
        String::from_utf8_lossy(&output).into_owned()
    }

    #[test]
    fn test_bash_completes_fetch_options() {
        let script = script(Shell::Bash);
        for option in ["--chunk-size", "--temp-dir", "--timeout", "--connect-timeout"] {
            assert!(script.contains(option), "bash completion lacks {option}");
        }
        assert!(script.contains("completion"));
    }

    #[test]
    fn test_completion_offers_global_flags() {
        for shell in [Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let script = script(shell);
            assert!(script.contains("arcfetch"), "no completions for {shell:?}");
            assert!(script.contains("json"), "--json missing for {shell:?}");
            assert!(script.contains("chunk-size"), "--chunk-size missing for {shell:?}");
        }
    }
}
