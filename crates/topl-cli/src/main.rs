use std::process::ExitCode;

fn main() -> ExitCode {
    topl_cli::run()
}
