use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::{app, engine, JobDoneResponse, JobSnapshot, JobStatus};
use reqwest::Client;
use std::{env, path::PathBuf, time::Duration};

/// Igual que en el worker:
/// - MR_COORDINATOR_URL si está definida
/// - Local: default http://127.0.0.1:8080
fn coordinator_base_url() -> String {
    env::var("MR_COORDINATOR_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el coordinator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Muestra el estado del job
    Status {
        /// Imprime el JSON tal cual lo devuelve el coordinator
        #[arg(long)]
        json: bool,
    },
    /// Espera hasta que el job termine
    Wait {
        /// Intervalo entre consultas, en milisegundos
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Corre el job completo en este proceso (referencia para comparar salidas)
    Sequential {
        /// Aplicación: wc o indexer
        #[arg(long, default_value = "wc")]
        app: String,

        /// Directorio donde se escribe mr-seq-out
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = coordinator_base_url();

    match cli.command {
        Commands::Status { json } => {
            let snapshot = fetch_snapshot(&client, &base_url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        Commands::Wait { interval_ms } => {
            let url = format!("{}/api/v1/job/done", base_url);
            loop {
                let resp: JobDoneResponse = client.get(&url).send().await?.json().await?;
                if resp.done {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }

            // el coordinator puede apagarse apenas ve done; el estado final es best-effort
            match fetch_snapshot(&client, &base_url).await {
                Ok(snapshot) => {
                    print_snapshot(&snapshot);
                    if snapshot.status == JobStatus::Failed {
                        bail!("el job falló");
                    }
                }
                Err(_) => println!("Job terminado"),
            }
        }
        Commands::Sequential {
            app: app_name,
            out_dir,
            files,
        } => {
            let app = app::lookup(&app_name)?;
            let out = tokio::task::spawn_blocking(move || {
                engine::run_sequential(&app, &files, &out_dir)
            })
            .await??;
            println!("Salida secuencial en {}", out.display());
        }
    }

    Ok(())
}

async fn fetch_snapshot(client: &Client, base_url: &str) -> Result<JobSnapshot> {
    let url = format!("{}/api/v1/job", base_url);
    let resp = client.get(&url).send().await?;
    if !resp.status().is_success() {
        bail!("el coordinator respondió {}", resp.status());
    }
    Ok(resp.json().await?)
}

fn print_snapshot(s: &JobSnapshot) {
    println!("Job:");
    println!("  estado: {:?}", s.status);
    println!("  fase: {:?}", s.phase);
    println!(
        "  map: {}/{} completadas ({} en progreso)",
        s.map.completed, s.n_map, s.map.in_progress
    );
    println!(
        "  reduce: {}/{} completadas ({} en progreso)",
        s.reduce.completed, s.n_reduce, s.reduce.in_progress
    );
    println!("  inicio: {}", s.started_at);
    if let Some(fin) = s.finished_at {
        println!("  fin: {}", fin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsea_subcomandos() {
        let cli = Cli::try_parse_from(["client", "wait", "--interval-ms", "250"]).unwrap();
        assert!(matches!(cli.command, Commands::Wait { interval_ms: 250 }));

        let cli = Cli::try_parse_from(["client", "sequential", "--app", "indexer", "a.txt"]).unwrap();
        match cli.command {
            Commands::Sequential { app, files, .. } => {
                assert_eq!(app, "indexer");
                assert_eq!(files, vec!["a.txt"]);
            }
            other => panic!("subcomando inesperado: {:?}", other),
        }
    }

    #[test]
    fn sequential_requiere_archivos() {
        assert!(Cli::try_parse_from(["client", "sequential"]).is_err());
    }
}
