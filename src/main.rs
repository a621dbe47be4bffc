use xss_hunter::cli;

#[tokio::main]
async fn main() {
    let cli = cli::parse_cli();
    if let Err(e) = xss_hunter::runner::run_from_cli(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(exit_code_for(&e));
    }
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<xss_hunter::error::ScanError>()
        .map(|e| matches!(e, xss_hunter::error::ScanError::InputInvalid(_)))
        .unwrap_or(false)
    {
        2
    } else {
        1
    }
}
