use std::process::ExitCode;

fn main() -> ExitCode {
    moltbot_cli::run()
}
