use clap::Parser;
use env_logger::{Builder, Target};
use log::{info, warn};
use metasift::{Cli, Config};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn init_logger(cli: &Cli) {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else {
        Builder::new()
            .target(Target::Stderr)
            .filter_level(cli.log_level())
            .init();
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logger(&cli);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let config = Config::from_cli(cli, io::stdout().is_terminal());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = metasift::run(&config, Some(interrupted), &mut out);
    let _ = out.flush();

    match result {
        Ok(summary) => {
            info!(
                "Done: {} fields{}",
                summary.total_lines,
                summary
                    .report
                    .map(|p| format!(", report at {}", p.display()))
                    .unwrap_or_default()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = metasift::report_failure(&config, &err, &mut out, &mut io::stderr());
            let _ = out.flush();
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
