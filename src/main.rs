use anyhow::Result;
use clap::Parser;
use hashwish::cli::CliArgs;
use hashwish::config::Config;
use hashwish::{CommitRecord, PrefixSet, WishError, git};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_FAILURE: u8 = 4;

fn run(cli_args: CliArgs) -> Result<()> {
    let wished = PrefixSet::new(cli_args.prefixes.iter().cloned())?;
    let config = Config::from_cli_and_file(&cli_args, cli_args.config.clone())?;

    let raw = git::read_input(&cli_args)?;
    let mut record = CommitRecord::parse(raw)?;

    let solution = config.search().run(&mut record, &wished).into_result()?;

    println!("Found");
    print!("{}", solution.record_text());
    println!("{}", solution.digest);
    println!("{}", solution.committer_timestamp);
    println!("{}", solution.author_timestamp);
    println!();
    println!("use:");
    println!("{}", solution.amend_command());

    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the result
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting hashwish");

    match run(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<WishError>()
                .map(WishError::exit_code)
                .unwrap_or(EXIT_FAILURE);

            match err.downcast_ref::<WishError>() {
                Some(WishError::NoPrefixSupplied) => {
                    eprintln!("Call with argument(s)! 'hashwish wished-hash1 wished-hash2 ...'")
                }
                Some(WishError::NoMatchFound { attempts }) => {
                    eprintln!("Not found ({} candidates tried)", attempts)
                }
                Some(wish_error) => eprintln!("Error: {}", wish_error),
                None => {
                    error!("hashwish failed: {:#}", err);
                    eprintln!("Error: {:#}", err);
                }
            }
            ExitCode::from(code)
        }
    }
}
