use std::process::ExitCode;

fn main() -> ExitCode {
    match sales_eda::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = err.kind().name(), "run failed");
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
