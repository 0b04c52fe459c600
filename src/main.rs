use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use chunkget::cli::Cli;
use chunkget::models::{Destination, TransferOptions};
use chunkget::utils::{basic_auth_header, parse_request_headers, parse_size, resolve_output_path};
use chunkget::{logging, transfer};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version are not errors; everything else is the
            // generic failure code.
            let returncode = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(returncode);
        }
    };

    logging::init(cli.verbose);

    let returncode = match run(&cli) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("{err:#}");
            1
        }
    };
    tracing::debug!("Script finished. Returncode: {returncode}");
    ExitCode::from(returncode)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let destination = match cli.output.as_deref() {
        Some("-") => Destination::Stdout,
        output => Destination::Path(resolve_output_path(output, &cli.url)?),
    };

    let chunk_size = cli.chunk_size.as_deref().map(parse_size).transpose()?;

    let mut headers = parse_request_headers(&cli.header);
    if let Some(user) = &cli.user {
        let password = rpassword::prompt_password(format!(
            "QUESTION | Please enter password for {user:?}: "
        ))?;
        let (name, value) = basic_auth_header(user, &password);
        headers.insert(name, value);
    }

    let mut options = TransferOptions {
        headers,
        checksums: cli.checksum.clone(),
        show_progress: cli.progress,
        destination,
        chunk_size,
        ..Default::default()
    };
    if let Some(user_agent) = &cli.user_agent {
        options.user_agent = user_agent.clone();
    }

    let report = transfer(&cli.url, options)?;
    for (algorithm, digest) in &report.digests {
        tracing::info!("{algorithm} checksum: {digest}");
    }
    Ok(())
}
