use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::types::{Block, DayPlan, Task};

pub type BlockId = String;
pub type TaskId = String;

/// Blocks of one day, keyed by id, with display order kept separately.
/// Indices are always derived from `order`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub day_id: String,
    blocks: HashMap<BlockId, Block>,
    order: Vec<BlockId>,
}

impl Schedule {
    pub fn new(day_id: &str) -> Self {
        Self {
            day_id: day_id.to_string(),
            ..Self::default()
        }
    }

    /// Keeps the first block when the backend sends a duplicated id.
    pub fn from_plan(plan: DayPlan) -> Self {
        let mut schedule = Self::new(&plan.day_id);
        for block in plan.blocks {
            if schedule.blocks.contains_key(&block.id) {
                tracing::warn!(target: "planner.load", id = %block.id, "duplicate block id dropped");
                continue;
            }
            let at = schedule.len();
            schedule.insert(at, block);
        }
        schedule
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[BlockId] {
        &self.order
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|b| b == id)
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn at(&self, index: usize) -> Option<&Block> {
        self.order.get(index).and_then(|id| self.blocks.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Inserts at `index` (clamped to the end) and returns the actual index.
    pub fn insert(&mut self, index: usize, block: Block) -> usize {
        let index = index.min(self.order.len());
        self.order.insert(index, block.id.clone());
        self.blocks.insert(block.id.clone(), block);
        index
    }

    pub fn remove(&mut self, id: &str) -> Option<(usize, Block)> {
        let index = self.index_of(id)?;
        self.order.remove(index);
        self.blocks.remove(id).map(|b| (index, b))
    }

    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.order.len() || b >= self.order.len() {
            return false;
        }
        self.order.swap(a, b);
        true
    }

    pub fn move_to(&mut self, id: &str, index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let id = self.order.remove(from);
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        true
    }

    /// Block id and index of a task anywhere in the schedule.
    pub fn find_task(&self, task_id: &str) -> Option<(BlockId, usize)> {
        self.iter()
            .find_map(|b| b.task_index(task_id).map(|i| (b.id.clone(), i)))
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        let (block_id, index) = self.find_task(task_id)?;
        self.blocks.get(&block_id).and_then(|b| b.tasks.get(index))
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        let (block_id, index) = self.find_task(task_id)?;
        self.blocks
            .get_mut(&block_id)
            .and_then(|b| b.tasks.get_mut(index))
    }

    /// Removes a task from whichever block owns it.
    pub fn take_task(&mut self, task_id: &str) -> Option<(BlockId, usize, Task)> {
        let (block_id, index) = self.find_task(task_id)?;
        let block = self.blocks.get_mut(&block_id)?;
        let task = block.tasks.remove(index);
        Some((block_id, index, task))
    }

    /// Inserts at `position` (clamped) and returns the actual position.
    pub fn insert_task(&mut self, block_id: &str, position: usize, task: Task) -> Option<usize> {
        let block = self.blocks.get_mut(block_id)?;
        let position = position.min(block.tasks.len());
        block.tasks.insert(position, task);
        Some(position)
    }

    /// Stable sort by start minutes. Returns the first index whose block changed.
    pub fn sort_by_time(&mut self) -> Option<usize> {
        let before = self.order.clone();
        let blocks = &self.blocks;
        self.order.sort_by_key(|id| blocks.get(id).map(|b| b.start_minutes()).unwrap_or(0));
        before.iter().zip(&self.order).position(|(a, b)| a != b)
    }

    pub fn is_sorted_by_time(&self) -> bool {
        self.iter()
            .zip(self.iter().skip(1))
            .all(|(a, b)| a.start_minutes() <= b.start_minutes())
    }
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Locally generated id; unique within the process even within one clock tick.
pub(crate) fn generate_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:x}-{:x}", prefix, nanos, seq)
}
