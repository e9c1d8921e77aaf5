use crate::api::types::{format_hhmm, Corpus, Event, InventoryTask, Project, Routine};

pub const MIN_QUERY_CHARS: usize = 2;
pub const TASK_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Routine,
    Event,
    Task,
    Project,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Routine(Routine),
    Event(Event),
    Task(InventoryTask),
    Project(Project),
}

impl Candidate {
    pub fn id(&self) -> &str {
        match self {
            Self::Routine(r) => &r.id,
            Self::Event(e) => &e.id,
            Self::Task(t) => &t.id,
            Self::Project(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Routine(r) => &r.name,
            Self::Event(e) => &e.name,
            Self::Task(t) => &t.title,
            Self::Project(p) => &p.name,
        }
    }

    fn preview(&self) -> String {
        match self {
            Self::Routine(r) => format!("Routine: {} ({}m)", r.name, r.duration),
            Self::Event(e) => match e.time {
                Some(t) => format!("Event: {} at {} ({}m)", e.name, format_hhmm(t), e.duration),
                None => format!("Event: {} ({}m)", e.name, e.duration),
            },
            Self::Task(t) => format!("{} ({}m)", t.title, t.duration),
            Self::Project(p) => format!("@{}", p.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub item: Candidate,
    pub preview_text: String,
    pub score: u32,
}

fn candidates(corpus: &Corpus, kind: MatchKind) -> Vec<Candidate> {
    match kind {
        MatchKind::Routine => corpus.routines.iter().cloned().map(Candidate::Routine).collect(),
        MatchKind::Event => corpus.events.iter().cloned().map(Candidate::Event).collect(),
        MatchKind::Task => corpus.tasks.iter().cloned().map(Candidate::Task).collect(),
        MatchKind::Project => corpus.projects.iter().cloned().map(Candidate::Project).collect(),
    }
}

/// Exact > prefix > word start > substring > subsequence, case-insensitive.
fn score(name: &str, query: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Some(0);
    }
    if name == query {
        return Some(1000);
    }
    if name.starts_with(&query) {
        return Some(800);
    }
    if name.split_whitespace().any(|w| w.starts_with(&query)) {
        return Some(600);
    }
    if name.contains(&query) {
        return Some(400);
    }
    let mut rest = name.chars();
    if query.chars().all(|q| rest.any(|c| c == q)) {
        return Some(200);
    }
    None
}

fn rank(mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.item.name().cmp(b.item.name()))
            .then_with(|| a.item.id().cmp(b.item.id()))
    });
    matches
}

/// Ranked matches of one kind. An empty query lists everything.
pub fn search(corpus: &Corpus, kind: MatchKind, query: &str) -> Vec<Match> {
    let matches = candidates(corpus, kind)
        .into_iter()
        .filter_map(|item| {
            let score = score(item.name(), query)?;
            Some(Match {
                preview_text: item.preview(),
                item,
                score,
            })
        })
        .collect();
    rank(matches)
}

pub fn list(corpus: &Corpus, kind: MatchKind) -> Vec<Match> {
    search(corpus, kind, "")
}

/// Single best completion across several kinds, or `None` for short queries.
pub fn best(corpus: &Corpus, kinds: &[MatchKind], query: &str) -> Option<Match> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    let all = kinds
        .iter()
        .flat_map(|k| search(corpus, *k, query))
        .collect();
    rank(all).into_iter().next()
}
