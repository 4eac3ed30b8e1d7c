use clap::Parser;
use cmds_nft::RunReport;
use nft_lib::MintConfig;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Upload an image and its metadata to Arweave, then mint or update the NFT
/// pointing at it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {}

/// Print the outcome of a run and return the process exit code.
fn report(
    result: cmds_nft::Result<RunReport>,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> i32 {
    match result {
        Ok(report) => {
            tracing::debug!("{:?}", report);
            writeln!(stdout, "Finished successfully").ok();
            0
        }
        Err(error) => {
            writeln!(stderr, "{}", error).ok();
            1
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = cmds_nft::run(&MintConfig::default()).await;
    let code = report(result, &mut std::io::stdout(), &mut std::io::stderr());
    std::process::exit(code);
}
