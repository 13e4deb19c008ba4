//! Task selection policies.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Chooses the next task among the ids not yet completed.
///
/// `candidates` is never empty when called and keeps catalog order.
pub trait TaskPicker: Send + Sync {
    fn pick(&self, candidates: &[String]) -> Option<String>;
}

/// Uniform choice from the thread RNG. Every interview gets its own task order.
pub struct RandomPicker;

impl TaskPicker for RandomPicker {
    fn pick(&self, candidates: &[String]) -> Option<String> {
        candidates.choose(&mut rand::thread_rng()).cloned()
    }
}

/// Always takes the first candidate in catalog order.
#[cfg(test)]
pub struct FirstPicker;

#[cfg(test)]
impl TaskPicker for FirstPicker {
    fn pick(&self, candidates: &[String]) -> Option<String> {
        candidates.first().cloned()
    }
}

/// Uniform choice from a seeded RNG, for reproducible task orders.
///
/// One picker is shared by every interview in the process, so the sequence of picks is
/// reproducible across the process rather than per interview.
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TaskPicker for SeededPicker {
    fn pick(&self, candidates: &[String]) -> Option<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        candidates.choose(&mut *rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("task_{i}")).collect()
    }

    #[test]
    fn test_first_picker_takes_head() {
        assert_eq!(FirstPicker.pick(&ids(3)), Some("task_1".to_string()));
    }

    #[test]
    fn test_pickers_return_none_on_empty() {
        assert_eq!(FirstPicker.pick(&[]), None);
        assert_eq!(RandomPicker.pick(&[]), None);
        assert_eq!(SeededPicker::new(1).pick(&[]), None);
    }

    #[test]
    fn test_random_picker_stays_within_candidates() {
        let candidates = ids(4);
        for _ in 0..50 {
            let picked = RandomPicker.pick(&candidates).unwrap();
            assert!(candidates.contains(&picked));
        }
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let candidates = ids(10);
        let a = SeededPicker::new(7);
        let b = SeededPicker::new(7);
        let seq_a: Vec<_> = (0..5).map(|_| a.pick(&candidates)).collect();
        let seq_b: Vec<_> = (0..5).map(|_| b.pick(&candidates)).collect();
        assert_eq!(seq_a, seq_b);
    }
}
