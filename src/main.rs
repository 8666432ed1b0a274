use clap::Parser;
use custodia::application::engine::EscrowEngine;
use custodia::domain::account::{AccountId, Amount};
use custodia::domain::ports::MediatorRef;
use custodia::domain::transaction::{ContentHash, CreateRequest};
use custodia::error::EscrowError;
use custodia::infrastructure::clock::SystemClock;
use custodia::infrastructure::in_memory::{InMemoryLedger, InMemoryTransactionStore};
use custodia::infrastructure::mediator::FlatFeeMediator;
use custodia::interfaces::csv::balance_writer::BalanceWriter;
use custodia::interfaces::csv::command_reader::{Command, CommandReader, OpKind};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Flat fee quoted by the standard mediator
    #[arg(long, default_value_t = 10)]
    mediation_fee: u64,

    /// Mediation window of the standard mediator, in seconds
    #[arg(long, default_value_t = 600)]
    mediation_expiry: u64,

    /// Print the notification log as JSON lines after the balances
    #[arg(long)]
    events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut engine = EscrowEngine::new(
        Box::new(InMemoryLedger::new()),
        Box::new(InMemoryTransactionStore::new()),
        Box::new(SystemClock),
    );
    let mediator = Arc::new(FlatFeeMediator::new(cli.mediation_fee, cli.mediation_expiry));

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = apply(&mut engine, &mediator, command).await {
                    eprintln!("Error processing operation: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {e}");
            }
        }
    }

    let balances = engine.balances().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_balances(&balances).into_diagnostic()?;

    if cli.events {
        for event in engine.notifications() {
            let line = serde_json::to_string(event).into_diagnostic()?;
            println!("{line}");
        }
    }

    Ok(())
}

async fn apply(
    engine: &mut EscrowEngine,
    mediator: &Arc<FlatFeeMediator>,
    command: Command,
) -> std::result::Result<(), EscrowError> {
    let actor = AccountId::new(command.actor)?;
    match command.op {
        OpKind::Deposit => {
            let amount = Amount::new(require(command.amount, "amount")?)?;
            engine.deposit(&actor, amount).await
        }
        OpKind::Transfer => {
            let to = AccountId::new(require(command.target, "target")?)?;
            let amount = Amount::new(require(command.amount, "amount")?)?;
            engine.transfer(&actor, &to, amount).await
        }
        OpKind::Create => {
            let seller = AccountId::new(require(command.target, "target")?)?;
            let amount = Amount::new(require(command.amount, "amount")?)?;
            let mediated = command.note.as_deref() == Some("mediated");
            let request = CreateRequest {
                seller,
                amount,
                metadata: ContentHash::default(),
                policy: mediated.then(|| AccountId::new("policy")).transpose()?,
                mediator: match mediated {
                    true => Some(MediatorRef {
                        id: AccountId::new("mediator")?,
                        adapter: mediator.clone(),
                    }),
                    false => None,
                },
                owner: None,
            };
            engine.create_transaction(&actor, request).await.map(|_| ())
        }
        OpKind::Dispute => engine.dispute_transaction(&actor, tx_id(command.target)?).await,
        OpKind::Escalate => engine.escalate_transaction(&actor, tx_id(command.target)?).await,
        OpKind::Revoke => engine.revoke_transaction(&actor, tx_id(command.target)?).await,
        OpKind::Confirm => engine.confirm_transaction(&actor, tx_id(command.target)?).await,
        OpKind::Settle => engine.settle_transaction(&actor, tx_id(command.target)?).await,
        OpKind::Feedback => {
            let id = tx_id(command.target)?;
            let rating = require(command.amount, "amount")?;
            let rating = u8::try_from(rating).map_err(|_| {
                EscrowError::InvalidArgument(format!("rating out of range: {rating}"))
            })?;
            let comment = ContentHash::new(command.note.unwrap_or_default());
            engine.provide_feedback(&actor, id, rating, comment).await
        }
    }
}

fn require<T>(value: Option<T>, field: &str) -> std::result::Result<T, EscrowError> {
    value.ok_or_else(|| EscrowError::InvalidArgument(format!("missing {field}")))
}

fn tx_id(target: Option<String>) -> std::result::Result<u64, EscrowError> {
    let target = require(target, "target")?;
    target
        .parse::<u64>()
        .map_err(|_| EscrowError::InvalidArgument(format!("invalid transaction id: {target}")))
}
