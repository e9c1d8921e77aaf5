use reqwest::{Client, Response};

use crate::api::types::{
    Block, BlockPatch, Corpus, DayPlan, Task, TaskPatch, WriteAction, WriteReceipt,
};
use crate::error::{PlannerError, Result};

/// HTTP adapter for the planner backend. Every mutation goes through `POST /write`
/// with a tagged [`WriteAction`] body.
#[derive(Clone)]
pub struct PlannerClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PlannerClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub async fn fetch_day(&self, day_id: &str) -> Result<DayPlan> {
        let resp = self
            .client
            .get(format!("{}/days/{}", self.base_url, day_id))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<DayPlan>().await?)
    }

    pub async fn fetch_corpus(&self) -> Result<Corpus> {
        let resp = self
            .client
            .get(format!("{}/corpus", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<Corpus>().await?)
    }

    pub async fn write(&self, action: &WriteAction) -> Result<WriteReceipt> {
        let resp = self
            .client
            .post(format!("{}/write", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(action)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        // Non-creating writes may answer with an empty body.
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(WriteReceipt::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn create_block(&self, day_id: &str, block: &Block) -> Result<Option<String>> {
        let action = WriteAction::CreateBlock {
            day_id: day_id.to_string(),
            block: block.clone(),
        };
        Ok(self.write(&action).await?.id)
    }

    pub async fn update_block(&self, id: &str, patch: BlockPatch) -> Result<()> {
        self.write(&WriteAction::UpdateBlock {
            id: id.to_string(),
            patch,
        })
        .await
        .map(|_| ())
    }

    pub async fn delete_block(&self, id: &str) -> Result<()> {
        self.write(&WriteAction::DeleteBlock { id: id.to_string() })
            .await
            .map(|_| ())
    }

    pub async fn reorder_block_indices(&self, day_id: &str, from_index: usize) -> Result<()> {
        self.write(&WriteAction::ReorderBlockIndices {
            day_id: day_id.to_string(),
            from_index,
        })
        .await
        .map(|_| ())
    }

    pub async fn create_task(
        &self,
        block_id: &str,
        task: &Task,
        position: usize,
    ) -> Result<Option<String>> {
        let action = WriteAction::CreateTask {
            block_id: block_id.to_string(),
            task: task.clone(),
            position,
        };
        Ok(self.write(&action).await?.id)
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<()> {
        self.write(&WriteAction::UpdateTask {
            id: id.to_string(),
            patch,
        })
        .await
        .map(|_| ())
    }

    pub async fn move_task(
        &self,
        task_id: &str,
        from_block_id: &str,
        to_block_id: &str,
        position: usize,
    ) -> Result<()> {
        self.write(&WriteAction::MoveTask {
            task_id: task_id.to_string(),
            from_block_id: from_block_id.to_string(),
            to_block_id: to_block_id.to_string(),
            position,
        })
        .await
        .map(|_| ())
    }

    pub async fn reorder_tasks(&self, block_id: &str, task_ids: Vec<String>) -> Result<()> {
        self.write(&WriteAction::ReorderTasks {
            block_id: block_id.to_string(),
            task_ids,
        })
        .await
        .map(|_| ())
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.write(&WriteAction::DeleteTask { id: id.to_string() })
            .await
            .map(|_| ())
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        return Err(PlannerError::Api { status, message });
    }
    Ok(resp)
}
