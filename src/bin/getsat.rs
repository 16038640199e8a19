//! Get Satisfaction API CLI binary.
//!
//! A command-line interface for browsing the Get Satisfaction API.

use clap::Parser;
use getsat::cli::{step_refs, Cli, Command, Step};
use getsat::output::{PrettyPrint, ResourceRow};
use getsat::{Decoded, GetSatClient, TokenPair};
use std::process::ExitCode;
use tabled::Table;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match cli.auth.to_config().and_then(GetSatClient::new) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: check GETSAT_API_URL and GETSAT_OAUTH_URL");
            return ExitCode::FAILURE;
        }
    };

    match run(client, cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(mut client: GetSatClient, command: Command, json: bool) -> getsat::Result<()> {
    match command {
        Command::Fetch { steps, query } => handle_fetch(&client, &steps, &query, json).await,
        Command::Paths => handle_paths(&client),
        Command::RequestToken => {
            let pair = client.request_token().await.inspect_err(|_| {
                eprintln!("Hint: set GETSAT_CONSUMER_KEY and GETSAT_CONSUMER_SECRET");
            })?;
            println!("oauth_token={}", pair.token);
            println!("oauth_token_secret={}", pair.secret);
            println!("authorize at: {}", client.authorize_url(&pair.token)?);
            Ok(())
        }
        Command::AuthorizeUrl { token } => {
            println!("{}", client.authorize_url(&token)?);
            Ok(())
        }
        Command::AccessToken {
            token,
            secret,
            verifier,
        } => {
            let pair = client
                .access_token(&TokenPair::new(token, secret), &verifier)
                .await?;
            println!("GETSAT_ACCESS_TOKEN={}", pair.token);
            println!("GETSAT_ACCESS_TOKEN_SECRET={}", pair.secret);
            Ok(())
        }
    }
}

async fn handle_fetch(
    client: &GetSatClient,
    steps: &[Step],
    query: &[(String, String)],
    json: bool,
) -> getsat::Result<()> {
    let mut tree = client.endpoints()?;
    let id = tree.navigate(&step_refs(steps))?;
    let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let decoded = client.fetch_node(&tree, id, &query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    match decoded {
        Decoded::One(resource) => println!("{}", resource.pretty_print()),
        Decoded::Many(resources) => {
            let rows: Vec<ResourceRow> = resources.iter().map(ResourceRow::from).collect();
            println!("{}", Table::new(rows));
            println!("\n{} result(s)", resources.len());
        }
    }
    Ok(())
}

fn handle_paths(client: &GetSatClient) -> getsat::Result<()> {
    let tree = client.endpoints()?;
    for id in tree.nodes() {
        println!("{:<45} {}", tree.template(id), tree.resource(id));
    }
    Ok(())
}
