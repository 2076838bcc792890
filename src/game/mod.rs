//! 游戏核心逻辑模块（状态机、规则引擎、判定函数）。

pub mod rules;
pub mod state;

pub use rules::{resolve, RuleEngine, RuleError, RuleResolution, SelectMoveAction};
pub use state::{
    GameEvent,
    GameState,
    IntegrityError,
    Move,
    MoveIndex,
    Outcome,
    Round,
    RoundPhase,
    DEFAULT_MESSAGE,
};
