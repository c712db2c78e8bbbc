use std::process::ExitCode;

use clap::Parser;
use market_store::db::probe::{DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT, ProbeConfig, probe};
use secrecy::SecretString;

#[derive(Parser)]
#[command(version, about = "Check MySQL connectivity and create the target database")]
struct Cli {
    #[arg(long, env = "MYSQL_HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, env = "MYSQL_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long, env = "MYSQL_USER")]
    user: Option<String>,
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long = "db", env = "MYSQL_DB", default_value = DEFAULT_DATABASE)]
    database: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env is fine; the variables may come from the real environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = ProbeConfig {
        host: cli.host,
        port: cli.port,
        user: cli.user,
        password: cli
            .password
            .filter(|p| !p.is_empty())
            .map(SecretString::from),
        database: cli.database,
    };

    println!("Testing MySQL Connection...");
    println!("Testing connection to MySQL at {}:{}", config.host, config.port);
    println!("User: {}", config.user.as_deref().unwrap_or("None"));
    println!(
        "Password: {}",
        config.masked_password().as_deref().unwrap_or("None")
    );

    match probe(&config).await {
        Ok(report) => {
            println!(
                "✅ MySQL connection successful! Version: {}",
                report.server_version
            );
            println!(
                "✅ Database '{}' created/verified successfully!",
                report.database
            );
            println!("\n🎉 MySQL setup is working correctly!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("❌ MySQL connection failed: {e}");
            println!("\n💥 Please check your MySQL configuration and try again.");
            ExitCode::FAILURE
        }
    }
}
