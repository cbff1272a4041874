mod commands;
pub mod exit_codes;
mod output;

pub use commands::{Cli, CommandError};

use anyhow::Result;
use output::OutputMode;

/// run a command and exit with its status code
pub fn run(cli: Cli) -> Result<()> {
    let output_mode = OutputMode::from_flags(cli.json, cli.quiet);

    let code = match commands::execute(cli) {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<CommandError>() {
            Some(cmd) => {
                report_error(output_mode, cmd.code, &cmd.message, &cmd.suggestions);
                cmd.code
            }
            None => {
                report_error(output_mode, exit_codes::ERROR, &format!("{:#}", err), &[]);
                exit_codes::ERROR
            }
        },
    };

    if code != exit_codes::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}

fn report_error(output_mode: OutputMode, code: i32, message: &str, suggestions: &[String]) {
    if output_mode.is_json() {
        output::print_json_error(code, message, suggestions.to_vec());
        return;
    }

    eprintln!("Error: {}", message);
    if !suggestions.is_empty() {
        eprintln!("Did you mean: {}", suggestions.join(", "));
    }
}
