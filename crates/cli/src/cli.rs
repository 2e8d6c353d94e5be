use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Operator recorded when none is configured.
pub const DEFAULT_OPERATOR: &str = "username";

#[derive(Parser, Debug)]
#[command(
    name = "stockroom",
    about = "Per-operator stock receipts, withdrawals and history",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Operator under which actions are recorded and queried.
    #[arg(long, global = true, env = "STOCKROOM_OPERATOR")]
    pub operator: Option<String>,

    /// Override the storage directory (file backend).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a stock receipt
    Receive(ReceiveArgs),
    /// Record a withdrawal to a service
    Withdraw(WithdrawArgs),
    /// Show current stock
    Stock(StockArgs),
    /// Show transaction history, most recent first
    History,
    /// List item types
    Types(TypesArgs),
    /// List operators with recorded inventory
    Operators,
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Item type label
    pub item_type: String,
    /// Quantity received (positive integer)
    #[arg(allow_hyphen_values = true)]
    pub quantity: String,
}

#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Item type label
    pub item_type: String,
    /// Quantity withdrawn (positive integer)
    #[arg(allow_hyphen_values = true)]
    pub quantity: String,
    /// Destination service
    #[arg(long, short, default_value = "")]
    pub service: String,
}

#[derive(Args, Debug)]
pub struct StockArgs {
    /// Sum stock across all operators
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Only types with stock on hand
    #[arg(long)]
    pub withdrawable: bool,
}
