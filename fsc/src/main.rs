use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fsc::{LineOutcome, Shell};
use fsc_client::FscClient;

/// fsc - Interactive console for share-based remote storage
#[derive(Parser, Debug)]
#[command(name = "fsc", version, about)]
struct Args {
    /// Storage service endpoint URL
    #[arg(long, env = "FSC_ENDPOINT", default_value = "http://localhost:9999")]
    endpoint: String,

    /// Account name, or a SAS token when no key follows
    credential: String,

    /// Account key
    key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging();

    let builder = FscClient::builder(&args.endpoint);
    let builder = match &args.key {
        Some(key) => builder.shared_key(&args.credential, key),
        None => builder.sas_token(&args.credential),
    };
    let client = builder.build().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let mut shell = Shell::new(Arc::new(client));
    run_repl(&mut shell).await
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

async fn run_repl(shell: &mut Shell) -> Result<(), Box<dyn std::error::Error>> {
    use rustyline::error::ReadlineError;
    use rustyline::{Config, DefaultEditor};

    let rl_config = Config::builder()
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .build();

    let mut rl = DefaultEditor::with_config(rl_config)?;

    println!("fsc v{}", env!("CARGO_PKG_VERSION"));
    println!("Commands: dir, cd <name>, upload <localPath> [remoteName], delete <name>, exit");

    loop {
        println!();
        println!(">>{}", shell.prompt_uri());

        match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match shell.execute(&line).await {
                    Ok(LineOutcome::Exit) => break,
                    Ok(LineOutcome::Continue) => {}
                    Err(e) => eprintln!("fsc: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}
