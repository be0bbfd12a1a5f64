use serde::Serialize;

use crate::board::{Board, CORNERS};
use crate::types::{BOARD_SIZE, Cell, Player};

/// Static square weights. Corners are prized, the squares that give a corner
/// away are penalised.
pub const POSITION_WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [100, -20, 10, 5, 5, 10, -20, 100],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [10, -2, -1, -1, -1, -1, -2, 10],
    [5, -2, -1, -1, -1, -1, -2, 5],
    [5, -2, -1, -1, -1, -1, -2, 5],
    [10, -2, -1, -1, -1, -1, -2, 10],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [100, -20, 10, 5, 5, 10, -20, 100],
];

pub const MOBILITY_WEIGHT: i32 = 10;
pub const MATERIAL_WEIGHT: i32 = 5;
pub const CORNER_BONUS: i32 = 25;
/// Material only counts once more than this many stones are on the board.
pub const ENDGAME_STONES: u8 = 50;

/// The four evaluation terms, each from the evaluated player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Evaluation {
    pub positional: i32,
    pub mobility: i32,
    pub material: i32,
    pub corners: i32,
}

impl Evaluation {
    pub fn total(&self) -> i32 {
        self.positional + self.mobility + self.material + self.corners
    }
}

/// Hand-tuned evaluator: square weights, mobility, late-game material and
/// corner ownership.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    /// Positive values favor `player`.
    pub fn evaluate(&self, board: &Board, player: Player) -> i32 {
        self.breakdown(board, player).total()
    }

    pub fn breakdown(&self, board: &Board, player: Player) -> Evaluation {
        let opponent = player.opponent();
        let own = player.cell();

        let mut positional = 0;
        for (pos, cell) in board.squares() {
            let weight = POSITION_WEIGHTS[pos.row as usize][pos.col as usize];
            match cell {
                Cell::Empty => {}
                c if c == own => positional += weight,
                _ => positional -= weight,
            }
        }

        let mobility =
            (board.mobility(player) as i32 - board.mobility(opponent) as i32) * MOBILITY_WEIGHT;

        let own_stones = board.count_of(player) as i32;
        let opp_stones = board.count_of(opponent) as i32;
        let material = if board.stone_count() > ENDGAME_STONES {
            (own_stones - opp_stones) * MATERIAL_WEIGHT
        } else {
            0
        };

        // Counted on top of the corner square weight.
        let corners = CORNERS
            .iter()
            .map(|&corner| match board.get(corner) {
                Cell::Empty => 0,
                c if c == own => CORNER_BONUS,
                _ => -CORNER_BONUS,
            })
            .sum();

        Evaluation {
            positional,
            mobility,
            material,
            corners,
        }
    }
}
