use bank_sdk::BankClient;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "bank-cli")]
#[command(about = "Management CLI for the token bank", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a named account (prints its private key once)
    CreateAccount { name: String },
    /// Show an account's token balance
    Balance {
        name: String,
        /// Token symbol or contract address
        #[arg(short, long)]
        token: String,
    },
    /// Transfer tokens between two accounts
    Transfer {
        from: String,
        to: String,
        /// Amount in the token's smallest unit
        amount: i128,
        #[arg(short, long)]
        token: String,
    },
    /// Request the faucet amount for an account
    Fund { name: String },
    /// Check service and chain health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = BankClient::new(&cli.url);

    let result = match cli.command {
        Commands::CreateAccount { name } => print_json(client.create_account(&name).await),
        Commands::Balance { name, token } => print_json(client.get_balance(&name, &token).await),
        Commands::Transfer {
            from,
            to,
            amount,
            token,
        } => print_json(client.transfer(&from, &to, amount, &token).await),
        Commands::Fund { name } => print_json(client.get_initial_fund(&name).await),
        Commands::Health => print_json(client.health().await),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(
    response: Result<T, bank_sdk::ClientError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = response?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
