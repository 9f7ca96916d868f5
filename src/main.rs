use anyhow::Result;
use callctl::{
    CallClient, Config, PollConfig, PollOutcome, commands, config::DEFAULT_BASE_URL,
};
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Exit code used when polling ran out of attempts.
const EXIT_EXHAUSTED: u8 = 2;

/// callctl - start phone calls and follow their status
///
/// Talks to a call-initiation API: start a call with optional audio playback,
/// check its status, or poll until the call finishes.
///
/// Examples:
///   callctl call +15551234567 --audio-url https://example.com/hello.mp3
///   callctl poll 3f2a9c
///   callctl dial +15551234567
#[derive(Parser, Debug)]
#[command(author, version = env!("CALLCTL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the call API (also via CALLCTL_BASE_URL)
    #[arg(
        long = "base-url",
        env = "CALLCTL_BASE_URL",
        value_name = "URL",
        default_value = DEFAULT_BASE_URL,
        global = true
    )]
    pub base_url: String,

    /// Shared API key (also via CALLCTL_API_KEY)
    #[arg(
        long = "api-key",
        env = "CALLCTL_API_KEY",
        value_name = "KEY",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,

    /// Seconds to wait for a single API request before giving up
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start a call and print its request id
    Call(CallArgs),

    /// Print the current status of a call
    Status(StatusArgs),

    /// Poll a call until it finishes or the attempt budget runs out
    Poll(PollArgs),

    /// Start a call and poll it until it finishes
    Dial(DialArgs),
}

#[derive(clap::Args, Debug)]
pub struct CallArgs {
    /// Destination phone number
    #[arg(value_name = "NUMBER")]
    pub number: String,

    /// Audio to play when the call is answered
    #[arg(long = "audio-url", value_name = "URL")]
    pub audio_url: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Request id returned when the call was started
    #[arg(value_name = "REQUEST_ID")]
    pub request_id: String,
}

#[derive(clap::Args, Debug)]
pub struct PollArgs {
    /// Request id returned when the call was started
    #[arg(value_name = "REQUEST_ID")]
    pub request_id: String,

    #[command(flatten)]
    pub budget: PollBudget,
}

#[derive(clap::Args, Debug)]
pub struct DialArgs {
    #[command(flatten)]
    pub call: CallArgs,

    #[command(flatten)]
    pub budget: PollBudget,
}

#[derive(clap::Args, Debug)]
pub struct PollBudget {
    /// Seconds between status checks
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub interval: u64,

    /// Maximum number of status checks
    #[arg(long = "max-attempts", value_name = "N", default_value_t = 12)]
    pub max_attempts: u32,
}

impl PollBudget {
    fn to_config(&self) -> PollConfig {
        PollConfig::new(Duration::from_secs(self.interval), self.max_attempts)
    }
}

fn exit_status(outcome: &PollOutcome) -> u8 {
    match outcome {
        PollOutcome::Completed(_) => 0,
        PollOutcome::Exhausted { .. } => EXIT_EXHAUSTED,
        // Standard exit code for Ctrl-C
        PollOutcome::Cancelled { .. } => 130,
    }
}

/// Cancel `token` on Ctrl-C. The returned handle should be aborted once polling ends.
fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping...");
            token.cancel();
        }
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::new(&cli.base_url, cli.api_key.as_deref().unwrap_or_default())?
        .with_request_timeout(Duration::from_secs(cli.timeout));
    let client = CallClient::new(config)?;

    match cli.command {
        Commands::Call(args) => {
            commands::call(&client, &args.number, args.audio_url.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status(args) => {
            commands::status(&client, &args.request_id).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Poll(args) => {
            let cancel = CancellationToken::new();
            let ctrl_c_handler = cancel_on_ctrl_c(cancel.clone());
            let outcome = commands::poll(
                &client,
                &args.request_id,
                &args.budget.to_config(),
                &cancel,
            )
            .await;
            ctrl_c_handler.abort();
            Ok(ExitCode::from(exit_status(&outcome)))
        }
        Commands::Dial(args) => {
            let cancel = CancellationToken::new();
            let ctrl_c_handler = cancel_on_ctrl_c(cancel.clone());
            let outcome = commands::dial(
                &client,
                &args.call.number,
                args.call.audio_url.as_deref(),
                &args.budget.to_config(),
                &cancel,
            )
            .await;
            ctrl_c_handler.abort();
            Ok(ExitCode::from(exit_status(&outcome?)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_call_parsing() {
        let cli = Cli::try_parse_from([
            "callctl",
            "--api-key",
            "k",
            "call",
            "+1555",
            "--audio-url",
            "http://x/a.mp3",
        ])
        .unwrap();
        match cli.command {
            Commands::Call(args) => {
                assert_eq!(args.number, "+1555");
                assert_eq!(args.audio_url.as_deref(), Some("http://x/a.mp3"));
            }
            _ => panic!("Expected Call command"),
        }
        assert_eq!(cli.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_cli_poll_defaults() {
        let cli = Cli::try_parse_from(["callctl", "poll", "abc123"]).unwrap();
        match cli.command {
            Commands::Poll(args) => {
                assert_eq!(args.request_id, "abc123");
                assert_eq!(args.budget.to_config(), PollConfig::default());
            }
            _ => panic!("Expected Poll command"),
        }
    }

    #[test]
    fn test_cli_dial_budget() {
        let cli = Cli::try_parse_from([
            "callctl",
            "dial",
            "+1555",
            "--interval",
            "2",
            "--max-attempts",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Dial(args) => {
                assert_eq!(args.call.number, "+1555");
                assert_eq!(args.call.audio_url, None);
                assert_eq!(args.budget.interval, 2);
                assert_eq!(args.budget.max_attempts, 3);
            }
            _ => panic!("Expected Dial command"),
        }
    }

    #[test]
    fn test_cli_global_base_url_after_subcommand() {
        let cli =
            Cli::try_parse_from(["callctl", "status", "abc", "--base-url", "http://h:1/"]).unwrap();
        assert_eq!(cli.base_url, "http://h:1/");
    }

    #[test]
    fn test_cli_timeout() {
        let cli = Cli::try_parse_from(["callctl", "status", "abc"]).unwrap();
        assert_eq!(
            Duration::from_secs(cli.timeout),
            callctl::http::REQUEST_TIMEOUT
        );

        let cli = Cli::try_parse_from(["callctl", "poll", "abc", "--timeout", "5"]).unwrap();
        assert_eq!(cli.timeout, 5);

        assert!(Cli::try_parse_from(["callctl", "status", "abc", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["callctl"]).is_err());
    }

    #[test]
    fn test_exit_status_for_outcomes() {
        assert_eq!(exit_status(&PollOutcome::Exhausted { attempts: 3 }), 2);
        assert_eq!(exit_status(&PollOutcome::Completed(Default::default())), 0);
        assert_eq!(exit_status(&PollOutcome::Cancelled { attempts: 1 }), 130);
    }
}
