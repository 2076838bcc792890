use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::Move;

/// CPU 对手：在三种手势中等概率抽取，绝不返回 `Unset`。
pub struct CpuOpponent {
    rng: SmallRng,
}

impl CpuOpponent {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// 固定种子，供测试与回放复现抽取序列。
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn draw(&mut self) -> Move {
        let index = self.rng.gen_range(0..Move::PLAYABLE.len());
        Move::PLAYABLE[index]
    }
}

impl Default for CpuOpponent {
    fn default() -> Self {
        Self::new()
    }
}
