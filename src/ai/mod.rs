//! AI 模块：CPU 对手的出招抽取。

pub mod opponent;

pub use opponent::CpuOpponent;
