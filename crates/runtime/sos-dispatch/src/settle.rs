//! One-shot settlement flag shared by the two race branches.

use std::sync::atomic::{AtomicBool, Ordering};

/// First `claim` wins; every later claim returns `false`.
#[derive(Debug, Default)]
pub struct Settlement {
    settled: AtomicBool,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let s = Settlement::new();
        assert!(!s.is_settled());
        assert!(s.claim());
        assert!(!s.claim());
        assert!(s.is_settled());
    }

    #[test]
    fn test_single_winner_across_threads() {
        let s = Arc::new(Settlement::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = s.clone();
                std::thread::spawn(move || s.claim())
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
