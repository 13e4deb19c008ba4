//! Task Catalog: the immutable bank of assessment tasks.
//!
//! Pure data plus dataset factories; holds no per-interview state.

pub mod bank;
pub mod datasets;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::InterviewError;
use datasets::{DatasetGenerator, Table};

pub use datasets::{CsvDatasetStore, DatasetProvider, DatasetRef};

/// Computes the single numeric answer a task expects from its generated table.
pub type ReferenceAnswer = fn(&Table) -> Option<f64>;

/// Concepts the evaluator looks for in a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub key_concepts: Vec<String>,
}

impl Rubric {
    pub fn new<I, S>(concepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_concepts: concepts.into_iter().map(Into::into).collect(),
        }
    }
}

/// One task in the bank. Never mutated after the catalog is built.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub id: String,
    pub title: String,
    /// Candidate-facing instructions. Carries no rubric details.
    pub prompt: String,
    pub rubric: Rubric,
    pub dataset: DatasetGenerator,
    pub reference_answer: Option<ReferenceAnswer>,
}

/// Ordered, keyed collection of task definitions.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    order: Vec<String>,
    tasks: HashMap<String, TaskDefinition>,
}

impl TaskCatalog {
    /// Builds a catalog preserving insertion order. A later duplicate id replaces the
    /// earlier definition but keeps its original position.
    pub fn new(definitions: Vec<TaskDefinition>) -> Self {
        let mut order = Vec::with_capacity(definitions.len());
        let mut tasks = HashMap::with_capacity(definitions.len());
        for def in definitions {
            if !tasks.contains_key(&def.id) {
                order.push(def.id.clone());
            }
            tasks.insert(def.id.clone(), def);
        }
        Self { order, tasks }
    }

    /// The built-in ten-task spreadsheet skills bank.
    pub fn builtin() -> Self {
        Self::new(bank::builtin_tasks())
    }

    pub fn task_ids(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, task_id: &str) -> Result<&TaskDefinition, InterviewError> {
        self.tasks
            .get(task_id)
            .ok_or_else(|| InterviewError::TaskNotFound(task_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, title: &str) -> TaskDefinition {
        TaskDefinition {
            id: id.to_string(),
            title: title.to_string(),
            prompt: format!("Do {title}"),
            rubric: Rubric::new(["IF function"]),
            dataset: datasets::student_scores,
            reference_answer: None,
        }
    }

    #[test]
    fn test_task_ids_keep_insertion_order() {
        let catalog = TaskCatalog::new(vec![def("b", "B"), def("a", "A"), def("c", "C")]);
        assert_eq!(catalog.task_ids(), ["b", "a", "c"]);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let catalog = TaskCatalog::new(vec![def("a", "A")]);
        let err = catalog.get("zzz").unwrap_err();
        assert!(matches!(err, InterviewError::TaskNotFound(id) if id == "zzz"));
    }

    #[test]
    fn test_duplicate_id_keeps_first_position() {
        let catalog = TaskCatalog::new(vec![def("a", "A"), def("b", "B"), def("a", "A2")]);
        assert_eq!(catalog.task_ids(), ["a", "b"]);
        assert_eq!(catalog.get("a").unwrap().title, "A2");
    }

    #[test]
    fn test_builtin_has_ten_tasks() {
        let catalog = TaskCatalog::builtin();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.task_ids()[0], "task_1");
        assert_eq!(catalog.task_ids()[9], "task_10");
        for id in catalog.task_ids() {
            let task = catalog.get(id).unwrap();
            assert!(!task.prompt.is_empty());
            assert!(!task.rubric.key_concepts.is_empty());
        }
    }
}
