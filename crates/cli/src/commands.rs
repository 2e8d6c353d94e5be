use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use stockroom_core::{ItemType, OperatorId};
use stockroom_infra::{ConfiguredStore, StoreConfig, open_configured};
use stockroom_inventory::{ReceiptForm, StockUpdate, WithdrawalForm};

use crate::cli::*;
use crate::render;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let operator = resolve_operator(cli.operator.as_deref())?;

    let mut config = StoreConfig::from_env().context("failed to load store configuration")?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    let store = open_configured(&config)
        .with_context(|| format!("failed to open inventory store in {}", config.data_dir.display()))?;

    let format = cli.format;
    match cli.command {
        Command::Receive(args) => cmd_receive(&store, &operator, args),
        Command::Withdraw(args) => cmd_withdraw(&store, &operator, args),
        Command::Stock(args) => cmd_stock(&store, &operator, args, format),
        Command::History => cmd_history(&store, &operator, format),
        Command::Types(args) => cmd_types(&store, &operator, args, format),
        Command::Operators => cmd_operators(&store, format),
    }
}

fn resolve_operator(raw: Option<&str>) -> anyhow::Result<OperatorId> {
    match raw {
        Some(raw) => OperatorId::parse(raw).context("invalid --operator"),
        None => {
            tracing::warn!(operator = DEFAULT_OPERATOR, "STOCKROOM_OPERATOR not set; using default operator");
            Ok(OperatorId::parse(DEFAULT_OPERATOR)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply an update, then wait on the change notification to re-query the
/// item's current stock.
fn record(store: &ConfiguredStore, update: StockUpdate) -> anyhow::Result<u64> {
    let changes = store.subscribe();
    let item_type: ItemType = update.item_type.clone();
    let operator = update.operator.clone();

    store.apply_update(update)?;

    let mut on_hand = 0;
    for _ in changes.drain() {
        on_hand = store
            .stock_levels(&operator)?
            .into_iter()
            .find(|level| level.item_type == item_type)
            .map(|level| level.quantity)
            .unwrap_or(0);
    }
    Ok(on_hand)
}

fn cmd_receive(store: &ConfiguredStore, operator: &OperatorId, args: ReceiveArgs) -> anyhow::Result<()> {
    let receipt = ReceiptForm::new(args.item_type, args.quantity).validate()?;
    let (quantity, item_type) = (receipt.quantity, receipt.item_type.clone());

    let on_hand = record(store, receipt.into_update(operator.clone(), Utc::now()))?;
    println!(
        "{} Receipt of {} {} recorded",
        "✓".green().bold(),
        quantity.to_string().bold(),
        item_type.to_string().yellow()
    );
    println!("  On hand: {on_hand}");
    Ok(())
}

fn cmd_withdraw(store: &ConfiguredStore, operator: &OperatorId, args: WithdrawArgs) -> anyhow::Result<()> {
    let withdrawal = WithdrawalForm::new(args.item_type, args.quantity, args.service).validate()?;
    let (quantity, item_type) = (withdrawal.quantity, withdrawal.item_type.clone());
    let service = withdrawal.service.clone().unwrap_or_else(|| "-".to_string());

    let on_hand = record(store, withdrawal.into_update(operator.clone(), Utc::now()))?;
    println!(
        "{} Withdrawal of {} {} to {} recorded",
        "✓".green().bold(),
        quantity.to_string().bold(),
        item_type.to_string().yellow(),
        service.cyan()
    );
    println!("  On hand: {on_hand}");
    Ok(())
}

fn cmd_stock(
    store: &ConfiguredStore,
    operator: &OperatorId,
    args: StockArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let levels = if args.all {
        store.combined_stock()?
    } else {
        store.stock_levels(operator)?
    };

    match format {
        OutputFormat::Json => print_json(&levels),
        OutputFormat::Text => {
            println!("{}", render::render_stock(&levels));
            Ok(())
        }
    }
}

fn cmd_history(store: &ConfiguredStore, operator: &OperatorId, format: OutputFormat) -> anyhow::Result<()> {
    let history = store.history(operator)?;
    match format {
        OutputFormat::Json => print_json(&history),
        OutputFormat::Text => {
            println!("{}", render::render_history(&history));
            Ok(())
        }
    }
}

fn cmd_types(
    store: &ConfiguredStore,
    operator: &OperatorId,
    args: TypesArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let types = if args.withdrawable {
        store.withdrawable_types(operator)?
    } else {
        store.item_types(operator)?
    };

    match format {
        OutputFormat::Json => print_json(&types),
        OutputFormat::Text => {
            println!("{}", render::render_types(&types));
            Ok(())
        }
    }
}

fn cmd_operators(store: &ConfiguredStore, format: OutputFormat) -> anyhow::Result<()> {
    let operators = store.operators()?;
    match format {
        OutputFormat::Json => print_json(&operators),
        OutputFormat::Text => {
            println!("{}", render::render_operators(&operators));
            Ok(())
        }
    }
}
