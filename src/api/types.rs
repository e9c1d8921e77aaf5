use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    DeepWork,
    Break,
    Meeting,
    Health,
    Exercise,
    Admin,
    Personal,
    Routine,
    Event,
}

impl BlockType {
    /// Types that can be created directly (routines and events come from the corpus).
    pub const CREATABLE: [BlockType; 7] = [
        BlockType::DeepWork,
        BlockType::Meeting,
        BlockType::Break,
        BlockType::Health,
        BlockType::Exercise,
        BlockType::Admin,
        BlockType::Personal,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deep-work" | "deep_work" | "deepwork" | "deep" => Some(Self::DeepWork),
            "break" => Some(Self::Break),
            "meeting" => Some(Self::Meeting),
            "health" => Some(Self::Health),
            "exercise" => Some(Self::Exercise),
            "admin" => Some(Self::Admin),
            "personal" => Some(Self::Personal),
            "routine" => Some(Self::Routine),
            "event" => Some(Self::Event),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DeepWork => "Deep work",
            Self::Break => "Break",
            Self::Meeting => "Meeting",
            Self::Health => "Health",
            Self::Exercise => "Exercise",
            Self::Admin => "Admin",
            Self::Personal => "Personal",
            Self::Routine => "Routine",
            Self::Event => "Event",
        }
    }

    pub fn default_duration(&self) -> u32 {
        match self {
            Self::DeepWork => 90,
            Self::Break => 15,
            Self::Meeting => 30,
            Self::Health => 30,
            Self::Exercise => 45,
            Self::Admin => 30,
            Self::Personal => 60,
            Self::Routine => 30,
            Self::Event => 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub duration: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_task_id: Option<String>,
}

impl Task {
    pub fn new(id: String, title: &str, duration: u32) -> Self {
        Self {
            id,
            title: title.to_string(),
            duration,
            completed: false,
            project_id: None,
            source_task_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub title: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub metadata: BlockMetadata,
}

impl Block {
    pub fn new(id: String, block_type: BlockType, title: &str, time: NaiveTime, duration: u32) -> Self {
        Self {
            id,
            block_type,
            title: title.to_string(),
            time,
            duration,
            tasks: Vec::new(),
            note: None,
            completed: false,
            metadata: BlockMetadata::default(),
        }
    }

    pub fn start_minutes(&self) -> u32 {
        minutes_of(self.time)
    }

    /// End of the block in minutes since midnight; may exceed a day for late blocks.
    pub fn end_minutes(&self) -> u32 {
        self.start_minutes() + self.duration
    }

    pub fn task_index(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.id.clone()).collect()
    }
}

pub fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Clamps to the last minute of the day.
pub fn time_from_minutes(minutes: u32) -> NaiveTime {
    let m = minutes.min(MINUTES_PER_DAY - 1);
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or(NaiveTime::MIN)
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `HH:MM` wire format for times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_str(&super::super::format_hhmm(*t)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day_id: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

// --- Predictive corpus ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default = "default_routine_minutes")]
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default, with = "hhmm::option")]
    pub time: Option<NaiveTime>,
    #[serde(default = "default_event_minutes")]
    pub duration: u32,
    #[serde(default)]
    pub zoom_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTask {
    pub id: String,
    pub title: String,
    #[serde(default = "default_task_minutes")]
    pub duration: u32,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub routines: Vec<Routine>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tasks: Vec<InventoryTask>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

fn default_routine_minutes() -> u32 {
    BlockType::Routine.default_duration()
}

fn default_event_minutes() -> u32 {
    BlockType::Event.default_duration()
}

fn default_task_minutes() -> u32 {
    15
}

// --- Outbound writes ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        with = "hhmm::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// `Some("")` clears the note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl BlockPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum WriteAction {
    CreateBlock {
        day_id: String,
        block: Block,
    },
    UpdateBlock {
        id: String,
        patch: BlockPatch,
    },
    DeleteBlock {
        id: String,
    },
    ReorderBlockIndices {
        day_id: String,
        from_index: usize,
    },
    CreateTask {
        block_id: String,
        task: Task,
        position: usize,
    },
    UpdateTask {
        id: String,
        patch: TaskPatch,
    },
    MoveTask {
        task_id: String,
        from_block_id: String,
        to_block_id: String,
        position: usize,
    },
    ReorderTasks {
        block_id: String,
        task_ids: Vec<String>,
    },
    DeleteTask {
        id: String,
    },
}

impl WriteAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateBlock { .. } => "create-block",
            Self::UpdateBlock { .. } => "update-block",
            Self::DeleteBlock { .. } => "delete-block",
            Self::ReorderBlockIndices { .. } => "reorder-block-indices",
            Self::CreateTask { .. } => "create-task",
            Self::UpdateTask { .. } => "update-task",
            Self::MoveTask { .. } => "move-task",
            Self::ReorderTasks { .. } => "reorder-tasks",
            Self::DeleteTask { .. } => "delete-task",
        }
    }
}

/// Body returned by the write endpoint. Only creations carry an id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteReceipt {
    #[serde(default)]
    pub id: Option<String>,
}
