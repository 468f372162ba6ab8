use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Todo,
    InPlan,
    Done,
}

impl CourseStatus {
    pub const ALL: [CourseStatus; 3] = [Self::Todo, Self::InPlan, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InPlan => "in_plan",
            Self::Done => "done",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "todo" => Some(Self::Todo),
            "in_plan" => Some(Self::InPlan),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Resolves a course code to its planning status. Must be total.
pub trait CourseStatusSource {
    fn status_of(&self, code: &str) -> CourseStatus;
}

impl<F> CourseStatusSource for F
where
    F: Fn(&str) -> CourseStatus,
{
    fn status_of(&self, code: &str) -> CourseStatus {
        self(code)
    }
}

impl CourseStatusSource for BTreeMap<String, CourseStatus> {
    fn status_of(&self, code: &str) -> CourseStatus {
        self.get(code).copied().unwrap_or_default()
    }
}

impl CourseStatusSource for HashMap<String, CourseStatus> {
    fn status_of(&self, code: &str) -> CourseStatus {
        self.get(code).copied().unwrap_or_default()
    }
}

/// Source used when no planning board is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTodo;

impl CourseStatusSource for AllTodo {
    fn status_of(&self, _code: &str) -> CourseStatus {
        CourseStatus::Todo
    }
}

/// `done` only when every course is done; any progress counts as `in_plan`.
pub fn aggregate_status<I>(statuses: I) -> CourseStatus
where
    I: IntoIterator<Item = CourseStatus>,
{
    let mut any = false;
    let mut all_done = true;
    let mut any_progress = false;
    for status in statuses {
        any = true;
        all_done &= status == CourseStatus::Done;
        any_progress |= status != CourseStatus::Todo;
    }
    if !any {
        CourseStatus::Todo
    } else if all_done {
        CourseStatus::Done
    } else if any_progress {
        CourseStatus::InPlan
    } else {
        CourseStatus::Todo
    }
}
