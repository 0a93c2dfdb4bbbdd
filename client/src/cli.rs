use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::{apps, engine, DoneResponse, JobStatus};
use reqwest::Client;
use std::{path::PathBuf, process::ExitCode, time::Duration};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el coordinator")]
struct Cli {
    /// URL base del coordinator
    #[arg(
        long,
        global = true,
        env = "COORDINATOR_URL",
        default_value = "http://localhost:8080"
    )]
    coordinator_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consulta el estado del job
    Status,
    /// Pregunta si el job terminó (código de salida 0 si sí, 1 si no)
    Done,
    /// Espera hasta que el job termine
    Wait {
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Ejecuta una aplicación en local, sin coordinator, y muestra el resultado
    Local {
        #[arg(long, default_value = "wordcount")]
        app: String,

        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli.coordinator_url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Status => {
            let status = fetch_status(&client, &base_url).await?;
            print!("{}", render_status(&status));
        }
        Commands::Done => {
            let done = fetch_done(&client, &base_url).await?;
            if done {
                println!("Job terminado");
            } else {
                println!("Job en curso");
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Wait { interval_ms } => {
            while !fetch_done(&client, &base_url).await? {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }
            println!("Job terminado");
        }
        Commands::Local { app, inputs } => {
            let app = apps::by_name(&app)?;
            let result =
                tokio::task::spawn_blocking(move || engine::run_sequential(&*app, &inputs))
                    .await??;

            for (key, value) in result {
                println!("{} {}", key, value);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn fetch_status(client: &Client, base_url: &str) -> Result<JobStatus> {
    let url = format!("{}/api/v1/job", base_url);
    let status = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("no se pudo contactar al coordinator en {}", base_url))?
        .error_for_status()?
        .json::<JobStatus>()
        .await?;
    Ok(status)
}

async fn fetch_done(client: &Client, base_url: &str) -> Result<bool> {
    let url = format!("{}/api/v1/job/done", base_url);
    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("no se pudo contactar al coordinator en {}", base_url))?
        .error_for_status()?
        .json::<DoneResponse>()
        .await?;
    Ok(resp.done)
}

fn render_status(status: &JobStatus) -> String {
    let mut out = String::new();

    out.push_str("Job:\n");
    out.push_str(&format!("  fase: {:?}\n", status.phase));
    out.push_str(&format!(
        "  tareas map: {}, particiones: {}\n",
        status.map_tasks, status.partition_count
    ));
    out.push_str(&format!(
        "  fase actual: {} idle, {} en curso, {} completadas\n",
        status.idle, status.in_progress, status.completed
    ));
    out.push_str(&format!(
        "  reasignaciones: {}, workers vistos: {}\n",
        status.redispatches, status.workers_seen
    ));
    out.push_str(&format!("  inicio: {}\n", status.started_at.to_rfc3339()));
    if let Some(fin) = status.finished_at {
        let secs = (fin - status.started_at).num_milliseconds() as f64 / 1000.0;
        out.push_str(&format!("  fin: {} ({:.1}s)\n", fin.to_rfc3339(), secs));
    }
    for output in &status.outputs {
        out.push_str(&format!("  salida: {}\n", output));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Phase;

    fn status(phase: Phase) -> JobStatus {
        let started = "2024-05-01T10:00:00Z".parse().unwrap();
        JobStatus {
            phase,
            partition_count: 2,
            map_tasks: 3,
            idle: 0,
            in_progress: 1,
            completed: 1,
            redispatches: 4,
            workers_seen: 2,
            started_at: started,
            finished_at: None,
            outputs: vec![],
        }
    }

    #[test]
    fn render_status_shows_progress() {
        let out = render_status(&status(Phase::Reduce));

        assert!(out.contains("fase: Reduce"));
        assert!(out.contains("1 en curso, 1 completadas"));
        assert!(out.contains("reasignaciones: 4"));
        assert!(!out.contains("fin:"));
    }

    #[test]
    fn render_status_shows_outputs_and_duration_when_finished() {
        let mut s = status(Phase::Exit);
        s.finished_at = Some("2024-05-01T10:00:12.500Z".parse().unwrap());
        s.outputs = vec!["reduce-out-0".to_string(), "reduce-out-1".to_string()];

        let out = render_status(&s);

        assert!(out.contains("(12.5s)"));
        assert!(out.contains("salida: reduce-out-1"));
    }

    #[test]
    fn local_requires_inputs() {
        assert!(Cli::try_parse_from(["client", "local"]).is_err());
        assert!(Cli::try_parse_from(["client", "local", "a.txt", "--app", "indexer"]).is_ok());
    }
}
