pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::CpuOpponent;
pub use game::{
    resolve, GameEvent, GameState, IntegrityError, Move, MoveIndex, Outcome, Round, RoundPhase,
    RuleEngine, RuleError, RuleResolution, SelectMoveAction, DEFAULT_MESSAGE,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

/// 返回核心库版本，同时在控制台打一条启动日志。
#[wasm_bindgen(js_name = "coreVersion")]
pub fn core_version() -> String {
    let version = env!("CARGO_PKG_VERSION").to_string();
    web_sys::console::log_1(&format!("prs_core {version} ready").into());
    version
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn resolution_from_events(state: &GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state.clone(), events)
}

fn parse_move(value: &str) -> Result<Move, JsValue> {
    Move::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown move: {value}")))
}

#[derive(Serialize)]
struct ThinkResponse {
    selection: Move,
    resolution: RuleResolution,
}

#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
    engine: RuleEngine,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<GameEngine, JsValue> {
        let state = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameState::new()
        };
        Ok(GameEngine {
            state,
            engine: RuleEngine::new(),
        })
    }

    /// 固定对手抽取序列，供测试与回放使用。
    pub fn set_seed(&mut self, seed: u64) {
        self.engine = RuleEngine::with_seed(seed);
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn select_move(&mut self, selection: &str) -> Result<String, JsValue> {
        let selection = parse_move(selection)?;
        let events = self
            .engine
            .select_move(&mut self.state, SelectMoveAction { selection })
            .map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    pub fn play(&mut self) -> Result<String, JsValue> {
        let events = self.engine.play(&mut self.state).map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        let events = self.engine.reset(&mut self.state);
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 当前结果文案：✅ / ❌ / 🤷‍♀️，未判定时为 READY。
    pub fn outcome_message(&self) -> String {
        self.state.outcome_message().to_string()
    }

    pub fn rounds_played(&self) -> u32 {
        self.state.rounds_played
    }

    /// 模拟对手「思考」：延迟后在状态副本上抽取并判定，不提交结果。
    pub fn think_opponent(&self, delay_ms: Option<u32>, seed: Option<u64>) -> Promise {
        let state = self.state.clone();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut opponent = match seed {
                Some(seed) => CpuOpponent::from_seed(seed),
                None => CpuOpponent::new(),
            };
            let selection = opponent.draw();
            let mut preview = state;
            let events =
                RuleEngine::resolve_round(&mut preview, selection).map_err(to_js_error)?;
            let response = ThinkResponse {
                selection,
                resolution: resolution_from_events(&preview, events),
            };
            let json = serde_json::to_string(&response).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回一个示例游戏状态，方便前端调试或初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::sample()).map_err(JsValue::from)
}

/// 将传入的游戏状态进行深拷贝后返回。
#[wasm_bindgen(js_name = "cloneGameState")]
pub fn clone_game_state(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let cloned = state.clone();
    to_value(&cloned).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "selectMove")]
pub fn select_move(state: JsValue, selection: &str) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let selection = parse_move(selection)?;
    let mut engine = RuleEngine::new();
    match engine.select_move(&mut state, SelectMoveAction { selection }) {
        Ok(events) => to_value(&RuleResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "playRound")]
pub fn play_round(state: JsValue, seed: Option<u64>) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = match seed {
        Some(seed) => RuleEngine::with_seed(seed),
        None => RuleEngine::new(),
    };
    match engine.play(&mut state) {
        Ok(events) => to_value(&RuleResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "resetRound")]
pub fn reset_round(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    let events = engine.reset(&mut state);
    to_value(&RuleResolution::new(state, events)).map_err(JsValue::from)
}

/// 直接判定一对出招，返回结果枚举。
#[wasm_bindgen(js_name = "resolveOutcome")]
pub fn resolve_outcome(player: &str, opponent: &str) -> Result<JsValue, JsValue> {
    let player = parse_move(player)?;
    let opponent = parse_move(opponent)?;
    match resolve(player, opponent) {
        Ok(outcome) => to_value(&outcome).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
