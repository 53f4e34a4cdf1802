//! CaseGraph CLI, a command-line interface for the CaseGraph API
//!
//! Uses the casegraph-sdk RemoteClient to talk to a running server.

use casegraph_sdk::{CaseGraphClient, RemoteClient};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "casegraph", version, about = "CaseGraph crime-analytics CLI")]
struct Cli {
    /// Server HTTP URL
    #[arg(long, default_value = "http://localhost:5000", global = true, env = "CASEGRAPH_URL")]
    url: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a suspect's case file by family name
    Record { family_name: String },
    /// Full-text search over biographies and crimes
    Search { query: String },
    /// Shortest connection between two people, by given name
    Path { from: String, to: String },
    /// List the relationship network
    Network,
    /// Show the most influential people
    Ranking,
    /// Report a call to a phone number
    Alert { number: String },
    /// Show server and store health
    Health,
}

/// Headers plus string rows, rendered as a table or CSV
struct Rows {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = RemoteClient::new(&cli.url);

    if let Err(e) = run(&client, cli.command, cli.format).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(client: &RemoteClient, command: Commands, format: OutputFormat) -> CliResult {
    match command {
        Commands::Record { family_name } => {
            let record = client.record(&family_name).await?;
            let rows = Rows {
                headers: vec!["field", "value"],
                rows: vec![
                    vec!["familyName".into(), record.family_name.clone()],
                    vec!["givenName".into(), record.given_name.clone()],
                    vec!["address".into(), record.address.clone()],
                    vec!["crimes".into(), record.crimes.join("; ")],
                    vec!["biography".into(), record.biography.clone()],
                    vec!["description".into(), record.description.clone()],
                ],
            };
            emit(&record, rows, format)
        }
        Commands::Search { query } => {
            let results = client.search(&query).await?;
            let rows = Rows {
                headers: vec!["familyName", "givenName", "crimes", "score"],
                rows: results
                    .iter()
                    .map(|r| {
                        vec![
                            r.family_name.clone(),
                            r.given_name.clone(),
                            r.crimes.join("; "),
                            r.score.map(|s| format!("{:.3}", s)).unwrap_or_default(),
                        ]
                    })
                    .collect(),
            };
            emit(&results, rows, format)
        }
        Commands::Path { from, to } => {
            let path = client.path(&from, &to).await?;
            let Some(data) = &path.data else {
                if matches!(format, OutputFormat::Json) {
                    println!("{}", serde_json::to_string_pretty(&path)?);
                } else {
                    println!("No path between {} and {}", from, to);
                }
                return Ok(());
            };
            let caption = |id: &str| {
                data.nodes
                    .iter()
                    .find(|n| n.id == id)
                    .map(|n| n.label.clone())
                    .unwrap_or_else(|| id.to_string())
            };
            let rows = Rows {
                headers: vec!["from", "relationship", "to"],
                rows: data
                    .links
                    .iter()
                    .map(|l| vec![caption(&l.source), l.label.clone(), caption(&l.target)])
                    .collect(),
            };
            emit(&path, rows, format)
        }
        Commands::Network => {
            let network = client.network().await?;
            let rows = Rows {
                headers: vec!["source", "relationship", "target"],
                rows: network
                    .links
                    .iter()
                    .map(|l| vec![l.source.clone(), l.label.clone(), l.target.clone()])
                    .collect(),
            };
            emit(&network, rows, format)?;
            if matches!(format, OutputFormat::Table) {
                println!("{} node(s), {} link(s)", network.nodes.len(), network.links.len());
            }
            Ok(())
        }
        Commands::Ranking => {
            let ranking = client.ranking().await?;
            let rows = Rows {
                headers: vec!["givenName", "familyName", "score"],
                rows: ranking
                    .data
                    .iter()
                    .map(|e| vec![e.given_name.clone(), e.family_name.clone(), format!("{:.4}", e.score)])
                    .collect(),
            };
            emit(&ranking, rows, format)?;
            if matches!(format, OutputFormat::Table) {
                println!("method: {}{}", ranking.method, if ranking.cached { " (cached)" } else { "" });
            }
            Ok(())
        }
        Commands::Alert { number } => {
            let alert = client.report_call(&number).await?;
            let rows = Rows {
                headers: vec!["number", "callCount", "highAlert"],
                rows: vec![vec![alert.number.clone(), alert.call_count.to_string(), alert.high_alert.to_string()]],
            };
            emit(&alert, rows, format)
        }
        Commands::Health => {
            let health = client.health().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
                _ => {
                    println!("Status:   {}", health.status);
                    println!("Version:  {}", health.version);
                    println!("Document: {}", health.stores.document);
                    println!("Graph:    {}", health.stores.graph);
                    println!("Cache:    {}", health.stores.cache);
                }
            }
            Ok(())
        }
    }
}

fn emit<T: Serialize>(value: &T, rows: Rows, format: OutputFormat) -> CliResult {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Csv => {
            println!("{}", rows.headers.join(","));
            for row in &rows.rows {
                let cells: Vec<String> = row.iter().map(|c| format_csv_value(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if rows.rows.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&rows.headers);
            for row in &rows.rows {
                table.add_row(row);
            }

            println!("{}", table);
            println!("{} row(s)", rows.rows.len());
        }
    }
    Ok(())
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quoting() {
        assert_eq!(format_csv_value("CHARRO"), "CHARRO");
        assert_eq!(format_csv_value("Casablanca, Anfa"), "\"Casablanca, Anfa\"");
        assert_eq!(format_csv_value("known as \"K-Ghost\""), "\"known as \"\"K-Ghost\"\"\"");
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["casegraph", "--format", "json", "path", "Amine", "Said"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Path { ref from, ref to } if from == "Amine" && to == "Said"));
    }
}
