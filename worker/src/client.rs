use common::{Assignment, CompletionAck, Task, TaskRequest};
use reqwest::Client;

use crate::error::WorkerError;

/// Lado cliente del contrato RPC. Cada llamada o termina con respuesta o
/// devuelve error; un error no dice si el coordinator llegó a procesarla.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request_task(&self, worker_id: &str) -> Result<Assignment, WorkerError> {
        let url = format!("{}/api/v1/tasks/next", self.base_url);
        let assignment = self
            .http
            .post(&url)
            .json(&TaskRequest {
                worker_id: worker_id.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<Assignment>()
            .await?;
        Ok(assignment)
    }

    /// Devuelve si el coordinator aceptó el reporte.
    pub async fn report_completion(&self, task: &Task) -> Result<bool, WorkerError> {
        let url = format!("{}/api/v1/tasks/complete", self.base_url);
        let ack = self
            .http
            .post(&url)
            .json(task)
            .send()
            .await?
            .error_for_status()?
            .json::<CompletionAck>()
            .await?;
        Ok(ack.accepted)
    }
}
