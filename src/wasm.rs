use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::game::GameSession;

/// Browser-facing handle around a [`GameSession`].
///
/// Illegal clicks and out-of-turn requests are ignored and reported as
/// `false`; the page is expected to have hidden them already.
#[wasm_bindgen]
pub struct ReversiGame {
    session: GameSession,
}

#[wasm_bindgen]
impl ReversiGame {
    /// `config` is `undefined` or a partial
    /// `{ human: "black" | "white", search: { max_depth, time_limit_ms } }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReversiGame, JsError> {
        let config = parse_config(config)?;
        Ok(Self::with_config(&config)?)
    }

    /// Current `GameView` as a plain JS object.
    pub fn state(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.session.view())?)
    }

    #[wasm_bindgen(js_name = attemptMove)]
    pub fn attempt_move(&mut self, row: u8, col: u8) -> bool {
        match self.session.attempt_move(row, col) {
            Ok(_) => true,
            Err(err) => {
                log::debug!("ignored human move ({row}, {col}): {err}");
                false
            }
        }
    }

    /// Runs the computer's search and plays its move (or its pass). The page
    /// schedules this after rendering the human's move.
    #[wasm_bindgen(js_name = playComputerTurn)]
    pub fn play_computer_turn(&mut self) -> bool {
        match self.session.play_computer_turn() {
            Ok(_) => true,
            Err(err) => {
                log::debug!("ignored computer turn request: {err}");
                false
            }
        }
    }

    /// `notation` names the computer's opening square, or is `undefined` /
    /// `"AUTO"` to let the search choose.
    #[wasm_bindgen(js_name = requestComputerFirstMove)]
    pub fn request_computer_first_move(&mut self, notation: Option<String>) -> Result<(), JsError> {
        self.session.play_computer_opening(notation.as_deref())?;
        Ok(())
    }

    #[wasm_bindgen(js_name = requestUndo)]
    pub fn request_undo(&mut self) -> bool {
        self.session.undo()
    }

    #[wasm_bindgen(js_name = requestNewGame)]
    pub fn request_new_game(&mut self, config: JsValue) -> Result<(), JsError> {
        let config = parse_config(config)?;
        self.session = GameSession::new(&config)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = isComputerTurn)]
    pub fn is_computer_turn(&self) -> bool {
        !self.session.is_game_over()
            && self.session.current_player() == self.session.computer_player()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.session.is_game_over()
    }
}

impl ReversiGame {
    pub fn with_config(config: &GameConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            session: GameSession::new(config)?,
        })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }
}

fn parse_config(value: JsValue) -> Result<GameConfig, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(GameConfig::default());
    }
    let config: GameConfig = serde_wasm_bindgen::from_value(value)?;
    config.validate()?;
    Ok(config)
}
