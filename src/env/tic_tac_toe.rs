use std::fmt;

use crate::env::{Domain, GameDomain, GameTask, Task};
use crate::error::{RLError, Result};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// 3x3 board, cells numbered row by row from the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [Option<Mark>; 9],
}

impl Board {
    /// Parses nine cells of `X`, `O` and `.` (or space) for empty.
    pub fn parse(text: &str) -> Option<Self> {
        let mut cells: [Option<Mark>; 9] = [None; 9];
        let mut count: usize = 0;
        for c in text.chars() {
            if count == 9 {
                return None;
            }
            cells[count] = match c {
                'X' | 'x' => Some(Mark::X),
                'O' | 'o' => Some(Mark::O),
                '.' | ' ' => None,
                _ => return None,
            };
            count += 1;
        }
        (count == 9).then_some(Self { cells })
    }

    pub fn get(&self, cell: usize) -> Option<Mark> {
        self.cells.get(cell).copied().flatten()
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..9).filter(move |cell| self.cells[*cell].is_none())
    }

    /// Copy of the board with `mark` on `cell`; `cell` must be below 9.
    pub(crate) fn with(&self, cell: usize, mark: Mark) -> Self {
        let mut next: Board = *self;
        next.cells[cell] = Some(mark);
        next
    }

    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|[a, b, c]| match self.cells[*a] {
            Some(mark) if self.cells[*b] == Some(mark) && self.cells[*c] == Some(mark) => {
                Some(mark)
            }
            _ => None,
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// X always opens, so X moves whenever both marks have been placed equally often.
    pub fn to_move(&self) -> Mark {
        let xs: usize = self.cells.iter().filter(|c| **c == Some(Mark::X)).count();
        let os: usize = self.cells.iter().filter(|c| **c == Some(Mark::O)).count();
        if xs > os {
            Mark::O
        } else {
            Mark::X
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            let line: String = row
                .iter()
                .map(|cell| cell.map_or('.', Mark::symbol))
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Place {
    pub mark: Mark,
    pub cell: usize,
}

impl Place {
    pub fn new(mark: Mark, cell: usize) -> Self {
        Self { mark, cell }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TicTacToe {
    board: Board,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_board(board: Board) -> Self {
        Self { board }
    }
}

impl Domain for TicTacToe {
    type State = Board;
    type Action = Place;

    fn current_state(&self) -> Board {
        self.board
    }

    fn legal_actions(&self, state: &Board) -> Vec<Place> {
        if state.is_over() {
            return vec![];
        }
        let mark: Mark = state.to_move();
        state
            .empty_cells()
            .map(|cell| Place::new(mark, cell))
            .collect()
    }

    fn apply_action(&mut self, action: &Place) -> Result<()> {
        if self.board.is_over() {
            return Err(RLError::EnvNotReady);
        }
        self.board = self.successor(&self.board, action)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.board = Board::default();
    }
}

impl GameDomain for TicTacToe {
    fn successor(&self, state: &Board, action: &Place) -> Result<Board> {
        if action.cell >= 9 || state.get(action.cell).is_some() || action.mark != state.to_move() {
            return Err(RLError::illegal_action(action));
        }
        Ok(state.with(action.cell, action.mark))
    }
}

/// Rewards the move that completes a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToeTask;

impl Task<Board, Place> for TicTacToeTask {
    fn reward(&self, _state: &Board, action: &Place, next_state: &Board) -> f64 {
        if next_state.winner() == Some(action.mark) {
            1.0
        } else {
            0.0
        }
    }

    fn is_final(&self, state: &Board) -> bool {
        state.is_over()
    }
}

impl GameTask<Board> for TicTacToeTask {
    type Player = Mark;

    fn winner(&self, state: &Board) -> Option<Mark> {
        state.winner()
    }

    fn is_draw(&self, state: &Board) -> bool {
        state.winner().is_none() && state.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_through_display() {
        let board = Board::parse("XO.X..O..").unwrap();
        assert_eq!(board.to_string(), "XO.\nX..\nO..\n");
        assert!(Board::parse("XO").is_none());
        assert!(Board::parse("XO.X..O..X").is_none());
        assert!(Board::parse("XO.X..O.Z").is_none());
    }

    #[test]
    fn winner_checks_rows_columns_and_diagonals() {
        assert_eq!(Board::parse("XXXOO....").unwrap().winner(), Some(Mark::X));
        assert_eq!(Board::parse("OX.OX.O.X").unwrap().winner(), Some(Mark::O));
        assert_eq!(Board::parse("X.O.XO..X").unwrap().winner(), Some(Mark::X));
        assert_eq!(Board::parse("XOXXOOOXX").unwrap().winner(), None);
    }

    #[test]
    fn legal_actions_belong_to_the_player_to_move() {
        let game = TicTacToe::new();
        let board = Board::parse("X........").unwrap();
        let legal = game.legal_actions(&board);
        assert_eq!(legal.len(), 8);
        assert!(legal.iter().all(|p| p.mark == Mark::O && p.cell != 0));
        assert!(game.legal_actions(&Board::parse("XXXOO....").unwrap()).is_empty());
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let mut game = TicTacToe::new();
        game.apply_action(&Place::new(Mark::X, 4)).unwrap();
        let occupied = game.apply_action(&Place::new(Mark::O, 4)).unwrap_err();
        assert!(matches!(occupied, RLError::IllegalAction { .. }));
        let wrong_turn = game.apply_action(&Place::new(Mark::X, 0)).unwrap_err();
        assert!(matches!(wrong_turn, RLError::IllegalAction { .. }));
        let off_board = game.successor(&game.current_state(), &Place::new(Mark::O, 9));
        assert!(matches!(off_board, Err(RLError::IllegalAction { .. })));
    }

    #[test]
    fn finished_game_is_not_ready() {
        let mut game = TicTacToe::from_board(Board::parse("XXXOO....").unwrap());
        assert_eq!(
            game.apply_action(&Place::new(Mark::O, 5)),
            Err(RLError::EnvNotReady)
        );
        game.reset();
        assert_eq!(game.current_state(), Board::default());
    }

    #[test]
    fn task_rewards_the_winning_move() {
        let task = TicTacToeTask;
        let before = Board::parse("XX.OO....").unwrap();
        let after = before.with(2, Mark::X);
        assert_eq!(task.reward(&before, &Place::new(Mark::X, 2), &after), 1.0);
        assert!(task.is_final(&after));
        assert!(!task.is_draw(&after));
        assert!(task.is_draw(&Board::parse("XOXXOOOXX").unwrap()));
    }
}
