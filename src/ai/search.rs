use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;
use web_time::Instant;

use crate::ai::eval::HeuristicEvaluator;
use crate::board::Board;
use crate::config::SearchConfig;
use crate::game::MoveSelector;
use crate::types::{Player, Position};

const MIN_SCORE: i32 = i32::MIN;
const MAX_SCORE: i32 = i32::MAX;

/// Outcome of a subtree. `TimedOut` carries no usable score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    Complete(i32),
    TimedOut,
}

/// Wall-clock limit shared by every root branch. Read only.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    fn starting_now(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    fn expired(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

/// What the root search decided and how it got there.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub best_move: Position,
    /// Minimax value of `best_move`. `None` when the move was forced or when
    /// every branch ran out of time.
    pub score: Option<i32>,
    pub timed_out_branches: usize,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Depth-limited minimax with alpha-beta pruning, bounded by a deadline.
#[derive(Debug, Clone, Default)]
pub struct Searcher {
    evaluator: HeuristicEvaluator,
    config: SearchConfig,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            evaluator: HeuristicEvaluator,
            config,
        }
    }

    /// Searches the best move for `player`. Returns `None` only when `player`
    /// has no legal move.
    pub fn search(&self, board: &Board, player: Player) -> Option<SearchReport> {
        let deadline = Deadline::starting_now(self.config.time_limit());
        let nodes = AtomicU64::new(0);

        let moves = board.legal_moves(player);
        let first = *moves.first()?;
        if moves.len() == 1 {
            return Some(SearchReport {
                best_move: first,
                score: None,
                timed_out_branches: 0,
                nodes: 0,
                elapsed: deadline.start.elapsed(),
            });
        }

        let depth = self.config.max_depth.saturating_sub(1);
        let branch = |mv: &Position| {
            // Branches that start after the deadline never enter minimax.
            if deadline.expired() {
                return SearchResult::TimedOut;
            }
            let mut next = *board;
            next.apply_flips(*mv, player);
            self.minimax(&next, depth, false, player, MIN_SCORE, MAX_SCORE, &deadline, &nodes)
        };

        // Browser builds have no worker threads.
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        let results: Vec<SearchResult> = moves.par_iter().map(branch).collect();
        #[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
        let results: Vec<SearchResult> = moves.iter().map(branch).collect();

        let mut best: Option<(Position, i32)> = None;
        let mut timed_out_branches = 0;
        for (&mv, result) in moves.iter().zip(&results) {
            match *result {
                SearchResult::Complete(score) => {
                    log::trace!("root move {mv} scored {score}");
                    if best.is_none_or(|(_, best_score)| score > best_score) {
                        best = Some((mv, score));
                    }
                }
                SearchResult::TimedOut => {
                    log::trace!("root move {mv} timed out");
                    timed_out_branches += 1;
                }
            }
        }

        if best.is_none() {
            log::warn!(
                "all {} root branches timed out; falling back to {first}",
                moves.len()
            );
        }

        let report = SearchReport {
            best_move: best.map_or(first, |(mv, _)| mv),
            score: best.map(|(_, score)| score),
            timed_out_branches,
            nodes: nodes.load(Ordering::Relaxed),
            elapsed: deadline.start.elapsed(),
        };
        log::debug!(
            "{player} search: best={} score={:?} nodes={} timed_out={}/{} elapsed={:?}",
            report.best_move,
            report.score,
            report.nodes,
            report.timed_out_branches,
            moves.len(),
            report.elapsed
        );
        Some(report)
    }

    /// Minimax from `root`'s point of view. A node without legal moves for the
    /// side to move is scored statically instead of searching a forced pass.
    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &self,
        board: &Board,
        depth: u8,
        maximizing: bool,
        root: Player,
        mut alpha: i32,
        mut beta: i32,
        deadline: &Deadline,
        nodes: &AtomicU64,
    ) -> SearchResult {
        if deadline.expired() {
            return SearchResult::TimedOut;
        }
        nodes.fetch_add(1, Ordering::Relaxed);

        if depth == 0 {
            return SearchResult::Complete(self.evaluator.evaluate(board, root));
        }

        let side = if maximizing { root } else { root.opponent() };
        let moves = board.legal_moves(side);
        if moves.is_empty() {
            return SearchResult::Complete(self.evaluator.evaluate(board, root));
        }

        let mut best = if maximizing { MIN_SCORE } else { MAX_SCORE };
        for mv in moves {
            let mut next = *board;
            next.apply_flips(mv, side);

            let score = match self.minimax(
                &next,
                depth - 1,
                !maximizing,
                root,
                alpha,
                beta,
                deadline,
                nodes,
            ) {
                SearchResult::Complete(score) => score,
                SearchResult::TimedOut => return SearchResult::TimedOut,
            };

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        SearchResult::Complete(best)
    }
}

impl MoveSelector for Searcher {
    fn select_move(&self, board: &Board, player: Player) -> Option<Position> {
        self.search(board, player).map(|report| report.best_move)
    }
}
