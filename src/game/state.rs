use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 未决出结果时前端展示的默认文案。
pub const DEFAULT_MESSAGE: &str = "READY";

/// 出招编号，和前端按钮顺序保持一致。
pub type MoveIndex = u8;

/// 玩家可选的手势；`Unset` 表示尚未选择。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Paper,
    Hammer,
    Scissors,
    Unset,
}

impl Default for Move {
    fn default() -> Self {
        Move::Unset
    }
}

impl Move {
    /// 三种可出的手势，顺序与按钮编号一致。
    pub const PLAYABLE: [Move; 3] = [Move::Paper, Move::Hammer, Move::Scissors];

    pub fn is_playable(self) -> bool {
        !matches!(self, Move::Unset)
    }

    pub fn index(self) -> MoveIndex {
        match self {
            Move::Paper => 0,
            Move::Hammer => 1,
            Move::Scissors => 2,
            Move::Unset => 3,
        }
    }

    pub fn from_index(index: MoveIndex) -> Option<Move> {
        match index {
            0 => Some(Move::Paper),
            1 => Some(Move::Hammer),
            2 => Some(Move::Scissors),
            3 => Some(Move::Unset),
            _ => None,
        }
    }

    /// 固定的循环克制关系：锤子克剪刀，剪刀克布，布克锤子。
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Hammer, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Hammer)
        )
    }
}

impl FromStr for Move {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paper" => Ok(Move::Paper),
            "hammer" => Ok(Move::Hammer),
            "scissors" => Ok(Move::Scissors),
            "unset" | "none" => Ok(Move::Unset),
            _ => Err(()),
        }
    }
}

/// 从玩家视角看的单局结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

impl Outcome {
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Win => "✅",
            Outcome::Lose => "❌",
            Outcome::Tie => "🤷‍♀️",
        }
    }
}

/// 单局评估的瞬态值：双方出招与判定结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Round {
    pub player: Move,
    pub opponent: Move,
    pub outcome: Outcome,
}

/// 回合状态机。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Selected,
    Resolved,
}

impl Default for RoundPhase {
    fn default() -> Self {
        RoundPhase::Idle
    }
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MoveSelected { selection: Move },
    MoveDeselected { selection: Move },
    OpponentDrawn { selection: Move },
    RoundResolved { round: Round },
    RoundReset,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    PhaseMismatch { phase: RoundPhase },
    MissingOutcome,
    OutcomeMismatch { expected: Outcome, actual: Outcome },
}

/// 游戏整体状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    #[serde(default)]
    pub player_move: Move,
    #[serde(default)]
    pub opponent_move: Move,
    #[serde(default)]
    pub phase: RoundPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub rounds_played: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: Move) -> Self {
        self.player_move = selection;
        self.phase = RoundPhase::Selected;
        self
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    /// 当前选中的手势；未选择时为 `None`。
    pub fn selection(&self) -> Option<Move> {
        if self.player_move.is_playable() {
            Some(self.player_move)
        } else {
            None
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// 前端展示用的结果文案；未判定时返回默认文案。
    pub fn outcome_message(&self) -> &'static str {
        self.outcome.map_or(DEFAULT_MESSAGE, Outcome::message)
    }

    pub fn clear_round(&mut self) {
        self.player_move = Move::Unset;
        self.opponent_move = Move::Unset;
        self.outcome = None;
        self.phase = RoundPhase::Idle;
    }

    /// 校验状态字段与阶段标记的一致性。经由 wasm 边界传入的状态不可信。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let consistent = match self.phase {
            RoundPhase::Idle => {
                !self.player_move.is_playable()
                    && !self.opponent_move.is_playable()
                    && self.outcome.is_none()
            }
            RoundPhase::Selected => {
                self.player_move.is_playable()
                    && !self.opponent_move.is_playable()
                    && self.outcome.is_none()
            }
            RoundPhase::Resolved => {
                self.player_move.is_playable() && self.opponent_move.is_playable()
            }
        };
        if !consistent {
            return Err(IntegrityError::PhaseMismatch { phase: self.phase });
        }

        if self.phase == RoundPhase::Resolved {
            let actual = self.outcome.ok_or(IntegrityError::MissingOutcome)?;
            let expected = if self.player_move == self.opponent_move {
                Outcome::Tie
            } else if self.player_move.beats(self.opponent_move) {
                Outcome::Win
            } else {
                Outcome::Lose
            };
            if expected != actual {
                return Err(IntegrityError::OutcomeMismatch { expected, actual });
            }
        }

        Ok(())
    }

    /// 返回一个进行到一半的示例状态，方便前端调试或初始化。
    pub fn sample() -> Self {
        let mut state = GameState::new().with_selection(Move::Paper);
        state.record_event(GameEvent::MoveSelected {
            selection: Move::Paper,
        });
        state
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_move: Move::Unset,
            opponent_move: Move::Unset,
            phase: RoundPhase::default(),
            outcome: None,
            rounds_played: 0,
            event_log: Vec::new(),
        }
    }
}
