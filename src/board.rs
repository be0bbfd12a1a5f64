use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::error::ParseBoardError;
use crate::types::{BOARD_SIZE, Cell, NUM_SQUARES, Player, Position};

pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const CORNERS: [Position; 4] = [
    Position { row: 0, col: 0 },
    Position { row: 0, col: 7 },
    Position { row: 7, col: 0 },
    Position { row: 7, col: 7 },
];

/// For every square, the in-bounds squares along each direction, nearest first.
static RAYS: Lazy<Vec<[Vec<Position>; 8]>> = Lazy::new(|| {
    (0..NUM_SQUARES)
        .map(|idx| {
            let origin = Position::from_index(idx);
            DIRECTIONS.map(|(dr, dc)| ray(origin, dr, dc))
        })
        .collect()
});

/// Reversi board state as a plain 8x8 grid. `Copy`, so every copy is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.set(Position { row: 3, col: 3 }, Cell::White);
        board.set(Position { row: 3, col: 4 }, Cell::Black);
        board.set(Position { row: 4, col: 3 }, Cell::Black);
        board.set(Position { row: 4, col: 4 }, Cell::White);
        board
    }

    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.row as usize][pos.col as usize] = cell;
    }

    /// Row-major iterator over every square.
    pub fn squares(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        (0..NUM_SQUARES).map(|idx| {
            let pos = Position::from_index(idx);
            (pos, self.get(pos))
        })
    }

    /// A move is legal when the square is empty and at least one direction
    /// brackets one or more opponent stones with a stone of `player`.
    pub fn is_legal(&self, pos: Position, player: Player) -> bool {
        if self.get(pos) != Cell::Empty {
            return false;
        }
        rays(pos).iter().any(|ray| self.bracketed(ray, player) > 0)
    }

    /// Places a stone for `player` and flips every bracketed run.
    /// Returns the number of flipped stones.
    ///
    /// Caller contract: `is_legal(pos, player)` holds. No re-check is done; a
    /// direction that does not qualify is left untouched.
    pub fn apply_flips(&mut self, pos: Position, player: Player) -> u32 {
        let own = player.cell();
        self.set(pos, own);

        let mut flipped = 0;
        for ray in rays(pos) {
            let run = self.bracketed(ray, player);
            for &square in &ray[..run] {
                self.set(square, own);
            }
            flipped += run as u32;
        }
        flipped
    }

    /// Squares that `apply_flips` would flip, in direction order.
    pub fn flipped_by(&self, pos: Position, player: Player) -> Vec<Position> {
        rays(pos)
            .iter()
            .flat_map(|ray| ray[..self.bracketed(ray, player)].iter().copied())
            .collect()
    }

    /// Returns the legal moves for `player` in row-major order.
    pub fn legal_moves(&self, player: Player) -> Vec<Position> {
        self.empty_squares()
            .filter(|&pos| self.is_legal(pos, player))
            .collect()
    }

    pub fn has_legal_move(&self, player: Player) -> bool {
        self.empty_squares().any(|pos| self.is_legal(pos, player))
    }

    /// Number of legal moves for `player`.
    pub fn mobility(&self, player: Player) -> usize {
        self.empty_squares()
            .filter(|&pos| self.is_legal(pos, player))
            .count()
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        self.cells
            .iter()
            .flatten()
            .fold((0, 0), |(black, white), cell| match cell {
                Cell::Black => (black + 1, white),
                Cell::White => (black, white + 1),
                Cell::Empty => (black, white),
            })
    }

    pub fn count_of(&self, player: Player) -> u8 {
        let (black, white) = self.count();
        match player {
            Player::Black => black,
            Player::White => white,
        }
    }

    pub fn stone_count(&self) -> u8 {
        let (black, white) = self.count();
        black + white
    }

    pub fn empty_count(&self) -> u8 {
        NUM_SQUARES as u8 - self.stone_count()
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (slot, (_, cell)) in board.iter_mut().zip(self.squares()) {
            *slot = cell.to_u8();
        }
        board
    }

    fn empty_squares(&self) -> impl Iterator<Item = Position> + '_ {
        self.squares()
            .filter(|(_, cell)| *cell == Cell::Empty)
            .map(|(pos, _)| pos)
    }

    /// Length of the opponent run at the start of `ray` that is closed by a
    /// stone of `player`. Zero when the run is empty or left open.
    fn bracketed(&self, ray: &[Position], player: Player) -> usize {
        let own = player.cell();
        let opp = player.opponent().cell();

        for (run, &square) in ray.iter().enumerate() {
            match self.get(square) {
                cell if cell == opp => continue,
                cell if cell == own => return run,
                _ => return 0,
            }
        }
        0
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders one row per line using `.`, `B` and `W`.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                let ch = match cell {
                    Cell::Empty => '.',
                    Cell::Black => 'B',
                    Cell::White => 'W',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses eight non-blank lines of eight squares each. Whitespace inside a
/// line is ignored; `.`/`-` is empty, `B`/`X` black, `W`/`O` white.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<char>> = s
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(ParseBoardError::RowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (row, squares) in rows.iter().enumerate() {
            if squares.len() != BOARD_SIZE {
                return Err(ParseBoardError::RowLength {
                    row,
                    len: squares.len(),
                });
            }
            for (col, &ch) in squares.iter().enumerate() {
                let cell = match ch.to_ascii_uppercase() {
                    '.' | '-' => Cell::Empty,
                    'B' | 'X' => Cell::Black,
                    'W' | 'O' => Cell::White,
                    _ => return Err(ParseBoardError::UnknownSquare { row, ch }),
                };
                board.cells[row][col] = cell;
            }
        }
        Ok(board)
    }
}

fn rays(pos: Position) -> &'static [Vec<Position>; 8] {
    &RAYS[pos.index()]
}

fn ray(origin: Position, dr: i8, dc: i8) -> Vec<Position> {
    let mut out = Vec::new();
    let mut r = origin.row as i8 + dr;
    let mut c = origin.col as i8 + dc;

    while in_bounds(r, c) {
        out.push(Position {
            row: r as u8,
            col: c as u8,
        });
        r += dr;
        c += dc;
    }
    out
}

fn in_bounds(row: i8, col: i8) -> bool {
    (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col)
}
