use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(webpconv::run_cli(env::args_os().skip(1)))
}
