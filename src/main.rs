use solo_orderer::{
    Envelope,
    blockcutter::CountCutter,
    config::Config,
    consensus::{ChainSupport, Consenter},
    ledger::MemoryLedger,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// The main entry point for the orderer.
///
/// Loads the configuration, starts one solo chain backed by an in-memory
/// ledger, and feeds it one envelope per stdin line until EOF or Ctrl-C.
/// On shutdown the chain is halted and the ledger is printed as JSON lines.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .with_writer(std::io::stderr)
        .init();
    info!("Orderer starting with config: {:?}", config);

    let ledger = MemoryLedger::new(config.ledger.chain_id.clone());
    let ledger_handle = ledger.handle();
    let support = ChainSupport::new(
        config.ledger.chain_id.clone(),
        CountCutter::new(config.batch_size.max_message_count),
        ledger,
    );

    let consenter = Consenter::from_config(&config.solo);
    let chain = consenter.handle_chain(support)?;
    chain.start()?;
    info!("Chain {} started", chain.chain_id());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !chain.enqueue(Envelope::new(line.into_bytes())).await {
                            warn!("Chain halted, dropping remaining input");
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    chain.halt();
    chain.wait_terminated().await;
    info!("Chain {} stopped at height {}", chain.chain_id(), ledger_handle.height());

    for summary in ledger_handle.summaries() {
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
