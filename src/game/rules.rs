use serde::{Deserialize, Serialize};

use crate::ai::CpuOpponent;

use super::state::{GameEvent, GameState, IntegrityError, Move, Outcome, Round, RoundPhase};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectMoveAction {
    pub selection: Move,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    RoundAlreadyResolved,
    UnplayableMove {
        selection: Move,
    },
    NoSelection,
    UnsetMove {
        player: Move,
        opponent: Move,
    },
    IntegrityViolation {
        error: IntegrityError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome;
        Self {
            state,
            events,
            outcome,
        }
    }
}

/// 判定单局胜负。双方出招必须都已设置，否则视为调用方契约错误。
pub fn resolve(player: Move, opponent: Move) -> Result<Outcome, RuleError> {
    if !player.is_playable() || !opponent.is_playable() {
        return Err(RuleError::UnsetMove { player, opponent });
    }
    if player == opponent {
        Ok(Outcome::Tie)
    } else if player.beats(opponent) {
        Ok(Outcome::Win)
    } else {
        Ok(Outcome::Lose)
    }
}

/// 规则引擎：驱动选招、出招、重置的回合状态机。
pub struct RuleEngine {
    opponent: CpuOpponent,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            opponent: CpuOpponent::new(),
        }
    }

    /// 用固定种子驱动对手抽取，供测试与回放使用。
    pub fn with_seed(seed: u64) -> Self {
        Self {
            opponent: CpuOpponent::from_seed(seed),
        }
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    fn ensure_not_resolved(state: &GameState) -> Result<(), RuleError> {
        if state.phase == RoundPhase::Resolved {
            return Err(RuleError::RoundAlreadyResolved);
        }
        Ok(())
    }

    /// 选招。再次点击同一手势取消选择；已选中时换选其他手势等价于
    /// 先取消再选中。已判定的回合在重置前拒绝改选。
    pub fn select_move(
        &mut self,
        state: &mut GameState,
        action: SelectMoveAction,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;
        Self::ensure_not_resolved(state)?;

        if !action.selection.is_playable() {
            return Err(RuleError::UnplayableMove {
                selection: action.selection,
            });
        }

        let mut events = Vec::new();
        if let Some(current) = state.selection() {
            events.push(GameEvent::MoveDeselected { selection: current });
            if current == action.selection {
                state.player_move = Move::Unset;
                state.phase = RoundPhase::Idle;
                for event in &events {
                    state.record_event(event.clone());
                }
                return Ok(events);
            }
        }

        state.player_move = action.selection;
        state.phase = RoundPhase::Selected;
        events.push(GameEvent::MoveSelected {
            selection: action.selection,
        });
        for event in &events {
            state.record_event(event.clone());
        }
        Ok(events)
    }

    /// 出招：抽取对手手势并判定本局。
    pub fn play(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;
        Self::ensure_not_resolved(state)?;
        if state.selection().is_none() {
            return Err(RuleError::NoSelection);
        }

        let drawn = self.opponent.draw();
        Self::resolve_round(state, drawn)
    }

    /// 以指定的对手手势完成判定，是 `play` 的确定性入口。
    pub fn resolve_round(
        state: &mut GameState,
        opponent: Move,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_not_resolved(state)?;
        let player = state.selection().ok_or(RuleError::NoSelection)?;
        let outcome = resolve(player, opponent)?;

        state.opponent_move = opponent;
        state.outcome = Some(outcome);
        state.phase = RoundPhase::Resolved;
        state.rounds_played += 1;

        let events = vec![
            GameEvent::OpponentDrawn {
                selection: opponent,
            },
            GameEvent::RoundResolved {
                round: Round {
                    player,
                    opponent,
                    outcome,
                },
            },
        ];
        for event in &events {
            state.record_event(event.clone());
        }
        Ok(events)
    }

    /// 重置：任意阶段均可，同时清空双方出招与判定结果。
    pub fn reset(&mut self, state: &mut GameState) -> Vec<GameEvent> {
        state.clear_round();
        let event = GameEvent::RoundReset;
        state.record_event(event.clone());
        vec![event]
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::DEFAULT_MESSAGE;

    fn selected_state(selection: Move) -> GameState {
        GameState::new().with_selection(selection)
    }

    #[test]
    fn resolve_matches_decision_table() {
        let table = [
            (Move::Paper, Move::Paper, Outcome::Tie),
            (Move::Paper, Move::Hammer, Outcome::Win),
            (Move::Paper, Move::Scissors, Outcome::Lose),
            (Move::Hammer, Move::Paper, Outcome::Lose),
            (Move::Hammer, Move::Hammer, Outcome::Tie),
            (Move::Hammer, Move::Scissors, Outcome::Win),
            (Move::Scissors, Move::Paper, Outcome::Win),
            (Move::Scissors, Move::Hammer, Outcome::Lose),
            (Move::Scissors, Move::Scissors, Outcome::Tie),
        ];

        for (player, opponent, expected) in table {
            let outcome = resolve(player, opponent).expect("playable moves should resolve");
            assert_eq!(
                outcome, expected,
                "resolve({player:?}, {opponent:?}) should be {expected:?}"
            );
        }
    }

    #[test]
    fn equal_moves_always_tie() {
        for m in Move::PLAYABLE {
            assert_eq!(resolve(m, m), Ok(Outcome::Tie));
        }
    }

    #[test]
    fn unequal_moves_are_complementary() {
        for a in Move::PLAYABLE {
            for b in Move::PLAYABLE {
                if a == b {
                    continue;
                }
                let forward = resolve(a, b).expect("playable moves should resolve");
                let backward = resolve(b, a).expect("playable moves should resolve");
                match forward {
                    Outcome::Win => assert_eq!(backward, Outcome::Lose),
                    Outcome::Lose => assert_eq!(backward, Outcome::Win),
                    Outcome::Tie => panic!("unequal moves must never tie"),
                }
            }
        }
    }

    #[test]
    fn resolve_rejects_unset_operands() {
        for m in Move::PLAYABLE {
            assert!(matches!(
                resolve(Move::Unset, m),
                Err(RuleError::UnsetMove { .. })
            ));
            assert!(matches!(
                resolve(m, Move::Unset),
                Err(RuleError::UnsetMove { .. })
            ));
        }
        assert!(matches!(
            resolve(Move::Unset, Move::Unset),
            Err(RuleError::UnsetMove { .. })
        ));
    }

    #[test]
    fn select_toggle_off_returns_to_idle() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();

        let events = engine
            .select_move(
                &mut state,
                SelectMoveAction {
                    selection: Move::Paper,
                },
            )
            .expect("first selection should succeed");
        assert_eq!(
            events,
            vec![GameEvent::MoveSelected {
                selection: Move::Paper
            }]
        );
        assert_eq!(state.phase, RoundPhase::Selected);

        let events = engine
            .select_move(
                &mut state,
                SelectMoveAction {
                    selection: Move::Paper,
                },
            )
            .expect("toggle-off should succeed");
        assert_eq!(
            events,
            vec![GameEvent::MoveDeselected {
                selection: Move::Paper
            }]
        );
        assert_eq!(state.phase, RoundPhase::Idle);
        assert_eq!(state.player_move, Move::Unset);
    }

    #[test]
    fn reselect_replaces_current_selection() {
        let mut engine = RuleEngine::new();
        let mut state = selected_state(Move::Paper);

        let events = engine
            .select_move(
                &mut state,
                SelectMoveAction {
                    selection: Move::Hammer,
                },
            )
            .expect("reselect should succeed");

        assert_eq!(
            events,
            vec![
                GameEvent::MoveDeselected {
                    selection: Move::Paper
                },
                GameEvent::MoveSelected {
                    selection: Move::Hammer
                },
            ]
        );
        assert_eq!(state.phase, RoundPhase::Selected);
        assert_eq!(state.selection(), Some(Move::Hammer));
    }

    #[test]
    fn select_rejects_unset_input() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();
        assert_eq!(
            engine.select_move(
                &mut state,
                SelectMoveAction {
                    selection: Move::Unset
                }
            ),
            Err(RuleError::UnplayableMove {
                selection: Move::Unset
            })
        );
    }

    #[test]
    fn play_without_selection_is_rejected() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();
        assert_eq!(engine.play(&mut state), Err(RuleError::NoSelection));
    }

    #[test]
    fn play_resolves_round_with_playable_opponent_move() {
        let mut engine = RuleEngine::with_seed(7);
        let mut state = selected_state(Move::Hammer);

        let events = engine.play(&mut state).expect("play should resolve");

        assert_eq!(state.phase, RoundPhase::Resolved);
        assert!(state.opponent_move.is_playable());
        assert_eq!(state.rounds_played, 1);
        assert!(events
            .iter()
            .any(|event| matches!(event, GameEvent::OpponentDrawn { selection } if selection.is_playable())));
        let expected = resolve(Move::Hammer, state.opponent_move).expect("both moves playable");
        assert_eq!(state.outcome, Some(expected));
        state.integrity_check().expect("resolved state should be consistent");
    }

    #[test]
    fn paper_beats_drawn_hammer() {
        let mut state = selected_state(Move::Paper);
        RuleEngine::resolve_round(&mut state, Move::Hammer).expect("round should resolve");
        assert_eq!(state.outcome, Some(Outcome::Win));
        assert_eq!(state.outcome_message(), "✅");
    }

    #[test]
    fn scissors_against_scissors_ties() {
        let mut state = selected_state(Move::Scissors);
        RuleEngine::resolve_round(&mut state, Move::Scissors).expect("round should resolve");
        assert_eq!(state.outcome, Some(Outcome::Tie));
        assert_eq!(state.outcome_message(), "🤷‍♀️");
    }

    #[test]
    fn hammer_loses_to_drawn_paper() {
        let mut state = selected_state(Move::Hammer);
        RuleEngine::resolve_round(&mut state, Move::Paper).expect("round should resolve");
        assert_eq!(state.outcome, Some(Outcome::Lose));
        assert_eq!(state.outcome_message(), "❌");
    }

    #[test]
    fn selection_is_locked_after_resolution() {
        let mut engine = RuleEngine::new();
        let mut state = selected_state(Move::Paper);
        RuleEngine::resolve_round(&mut state, Move::Hammer).expect("round should resolve");

        assert_eq!(
            engine.select_move(
                &mut state,
                SelectMoveAction {
                    selection: Move::Scissors
                }
            ),
            Err(RuleError::RoundAlreadyResolved)
        );
        assert_eq!(engine.play(&mut state), Err(RuleError::RoundAlreadyResolved));
    }

    #[test]
    fn reset_clears_both_moves_and_message() {
        let mut engine = RuleEngine::new();
        let mut state = selected_state(Move::Paper);

        let events = engine.reset(&mut state);

        assert_eq!(events, vec![GameEvent::RoundReset]);
        assert_eq!(state.player_move, Move::Unset);
        assert_eq!(state.opponent_move, Move::Unset);
        assert_eq!(state.phase, RoundPhase::Idle);
        assert_eq!(state.outcome_message(), DEFAULT_MESSAGE);
    }

    #[test]
    fn reset_after_resolution_allows_new_round() {
        let mut engine = RuleEngine::with_seed(11);
        let mut state = selected_state(Move::Scissors);
        RuleEngine::resolve_round(&mut state, Move::Paper).expect("round should resolve");

        engine.reset(&mut state);
        engine
            .select_move(
                &mut state,
                SelectMoveAction {
                    selection: Move::Hammer,
                },
            )
            .expect("selection after reset should succeed");
        engine.play(&mut state).expect("second round should resolve");
        assert_eq!(state.rounds_played, 2);
    }

    #[test]
    fn integrity_check_rejects_inconsistent_states() {
        // Opponent move present without a player selection.
        let mut state = GameState::new();
        state.opponent_move = Move::Hammer;
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::PhaseMismatch { .. })
        ));

        // Resolved phase with a stored outcome contradicting the table.
        let mut state = selected_state(Move::Paper);
        state.opponent_move = Move::Hammer;
        state.phase = RoundPhase::Resolved;
        state.outcome = Some(Outcome::Lose);
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::OutcomeMismatch {
                expected: Outcome::Win,
                actual: Outcome::Lose,
            })
        );

        // Resolved phase with no outcome at all.
        state.outcome = None;
        assert_eq!(state.integrity_check(), Err(IntegrityError::MissingOutcome));
    }

    #[test]
    fn engine_surfaces_integrity_violation() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new();
        state.phase = RoundPhase::Selected;
        assert!(matches!(
            engine.play(&mut state),
            Err(RuleError::IntegrityViolation { .. })
        ));
    }
}
