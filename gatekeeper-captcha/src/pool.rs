use crate::generator::CaptchaGenerator;
use rand::Rng;
use std::collections::VecDeque;

/// A single pre-rendered CAPTCHA challenge, ready to be handed to a verification session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaArtifact {
    pub id: u64,
    pub answer: String,
    pub image_bytes: Vec<u8>,
}

/// A pool of pre-rendered [`CaptchaArtifact`]s, so rendering cost is paid on a background
/// schedule rather than on the hot path of a player's first move.
///
/// Mirrors the teacher's rate limiter in shape: a bounded [`VecDeque`] guarded behind a single
/// owner, refilled by [`CaptchaPool::prime`] and drained by [`CaptchaPool::take`].
#[derive(Debug)]
pub struct CaptchaPool {
    generator: CaptchaGenerator,
    artifacts: VecDeque<CaptchaArtifact>,
    capacity: usize,
    next_id: u64,
}

impl CaptchaPool {
    pub fn new(generator: CaptchaGenerator, capacity: usize) -> Self {
        Self {
            generator,
            artifacts: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Renders enough fresh artifacts to bring the pool back up to capacity.
    pub fn prime(&mut self, rng: &mut impl Rng) {
        let before = self.artifacts.len();
        while self.artifacts.len() < self.capacity {
            let answer = self.generator.generate_code(rng);
            let image_bytes = self.generator.render(&answer, rng);
            let id = self.next_id;
            self.next_id += 1;
            self.artifacts.push_back(CaptchaArtifact {
                id,
                answer,
                image_bytes,
            });
        }
        if self.artifacts.len() > before {
            tracing::debug!(
                rendered = self.artifacts.len() - before,
                pool_size = self.artifacts.len(),
                "refilled captcha pool"
            );
        }
    }

    /// Removes and returns one artifact, or `None` if the pool is currently empty. Callers
    /// should follow up with [`CaptchaPool::prime`] on their own refill schedule; `take` never
    /// renders synchronously.
    pub fn take(&mut self) -> Option<CaptchaArtifact> {
        self.artifacts.pop_front()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(capacity: usize) -> CaptchaPool {
        let generator = CaptchaGenerator::new(['A', 'B', 'C', 'D'], 4).unwrap();
        CaptchaPool::new(generator, capacity)
    }

    #[test]
    fn prime_fills_up_to_capacity() {
        let mut pool = pool(3);
        let mut rng = StdRng::seed_from_u64(7);
        pool.prime(&mut rng);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn take_drains_one_artifact_at_a_time() {
        let mut pool = pool(2);
        let mut rng = StdRng::seed_from_u64(8);
        pool.prime(&mut rng);
        let first = pool.take().unwrap();
        assert_eq!(pool.len(), 1);
        let second = pool.take().unwrap();
        assert_ne!(first.id, second.id);
        assert!(pool.is_empty());
        assert!(pool.take().is_none());
    }

    #[test]
    fn prime_is_idempotent_once_full() {
        let mut pool = pool(2);
        let mut rng = StdRng::seed_from_u64(9);
        pool.prime(&mut rng);
        pool.prime(&mut rng);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn artifact_ids_are_assigned_in_increasing_order() {
        let mut pool = pool(3);
        let mut rng = StdRng::seed_from_u64(10);
        pool.prime(&mut rng);
        let ids: Vec<u64> = std::iter::from_fn(|| pool.take()).map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
