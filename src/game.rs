//! Turn-based session shell: a human explorer and a computer seeker
//! alternate moves on a shared [TerrainGrid] until one of them stands on the
//! treasure. The seeker walks a route precomputed once at session start; the
//! explorer is driven through a [MoveSource], so a session can run against
//! an interactive prompt or a scripted sequence in tests.

use crate::{GridError, TerrainGrid};
use grid_util::grid::Grid;
use grid_util::point::Point;
use log::info;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The eight directions a token can move in one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveCommand {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl MoveCommand {
    /// The cell offset of this move, with rows growing downward.
    pub fn delta(&self) -> Point {
        match self {
            MoveCommand::Up => Point::new(0, -1),
            MoveCommand::Down => Point::new(0, 1),
            MoveCommand::Left => Point::new(-1, 0),
            MoveCommand::Right => Point::new(1, 0),
            MoveCommand::UpLeft => Point::new(-1, -1),
            MoveCommand::UpRight => Point::new(1, -1),
            MoveCommand::DownLeft => Point::new(-1, 1),
            MoveCommand::DownRight => Point::new(1, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized direction `{0}`")]
pub struct ParseMoveError(String);

impl FromStr for MoveCommand {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<MoveCommand, ParseMoveError> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(MoveCommand::Up),
            "down" => Ok(MoveCommand::Down),
            "left" => Ok(MoveCommand::Left),
            "right" => Ok(MoveCommand::Right),
            "up-left" => Ok(MoveCommand::UpLeft),
            "up-right" => Ok(MoveCommand::UpRight),
            "down-left" => Ok(MoveCommand::DownLeft),
            "down-right" => Ok(MoveCommand::DownRight),
            other => Err(ParseMoveError(other.to_owned())),
        }
    }
}

/// Supplies the explorer's next move each turn.
pub trait MoveSource {
    /// The next move, or [None] when the supply of moves has ended.
    fn next_move(&mut self) -> Option<MoveCommand>;
}

/// A fixed move sequence, handy for driving sessions from tests.
#[derive(Debug)]
pub struct ScriptedMoves {
    moves: std::vec::IntoIter<MoveCommand>,
}

impl ScriptedMoves {
    pub fn new(moves: Vec<MoveCommand>) -> ScriptedMoves {
        ScriptedMoves {
            moves: moves.into_iter(),
        }
    }
}

impl MoveSource for ScriptedMoves {
    fn next_move(&mut self) -> Option<MoveCommand> {
        self.moves.next()
    }
}

/// Adapts a closure into a [MoveSource].
pub struct MoveFn<F>(pub F);

impl<F: FnMut() -> Option<MoveCommand>> MoveSource for MoveFn<F> {
    fn next_move(&mut self) -> Option<MoveCommand> {
        (self.0)()
    }
}

/// Starting cells for a session. All three must lie on the grid; coincident
/// cells are legal and simply shorten the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub player: Point,
    pub agent: Point,
    pub treasure: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Player,
    Agent,
}

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The explorer reached the treasure first.
    PlayerWin,
    /// The seeker reached the treasure first.
    AgentWin,
    /// The move source ran out before anyone reached the treasure.
    Abandoned,
}

/// A single game in progress. The grid is fixed at construction; the
/// seeker's route is computed once here and consumed one step per seeker
/// turn.
#[derive(Clone, Debug)]
pub struct HuntSession {
    pub grid: TerrainGrid,
    player: Point,
    agent: Point,
    treasure: Point,
    turn: Turn,
    route: Vec<Point>,
    route_index: usize,
}

impl HuntSession {
    /// Forces the three starting cells open, refreshes the component map,
    /// and precomputes the seeker's route. A session whose treasure the
    /// seeker cannot reach is still playable: the seeker holds position for
    /// the whole game.
    pub fn new(mut grid: TerrainGrid, placement: Placement) -> Result<HuntSession, GridError> {
        grid.force_walkable(&[placement.player, placement.agent, placement.treasure])?;
        grid.update();
        let route = match grid.find_path(placement.agent, placement.treasure)? {
            Some(route) => route,
            None => {
                info!(
                    "Treasure at {} is unreachable for the seeker",
                    placement.treasure
                );
                Vec::new()
            }
        };
        Ok(HuntSession {
            grid,
            player: placement.player,
            agent: placement.agent,
            treasure: placement.treasure,
            turn: Turn::Player,
            route,
            route_index: 0,
        })
    }

    pub fn player(&self) -> Point {
        self.player
    }

    pub fn agent(&self) -> Point {
        self.agent
    }

    pub fn treasure(&self) -> Point {
        self.treasure
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// The seeker's precomputed route: the steps after its starting cell up
    /// to and including the treasure. Empty when the treasure is
    /// unreachable.
    pub fn route(&self) -> &[Point] {
        &self.route
    }

    /// Moves the explorer one cell if the target lies on the board. Rubble
    /// does not stop the explorer; only the board edge does.
    pub fn move_player(&mut self, command: MoveCommand) {
        let target = self.player + command.delta();
        if self.grid.in_bounds(target.x, target.y) {
            self.player = target;
        }
    }

    /// Advances the seeker along its route, one step per call. Once the
    /// route is consumed the seeker stays where it is.
    fn advance_agent(&mut self) {
        if self.route_index < self.route.len() {
            self.agent = self.route[self.route_index];
            self.route_index += 1;
        }
    }

    /// Plays a single turn and returns the outcome if that turn ended the
    /// game. Win checks happen right after the moving token has moved.
    pub fn play_turn<S: MoveSource>(&mut self, source: &mut S) -> Option<Outcome> {
        match self.turn {
            Turn::Player => {
                let command = match source.next_move() {
                    Some(command) => command,
                    None => return Some(Outcome::Abandoned),
                };
                self.move_player(command);
                if self.player == self.treasure {
                    return Some(Outcome::PlayerWin);
                }
                self.turn = Turn::Agent;
            }
            Turn::Agent => {
                self.advance_agent();
                if self.agent == self.treasure {
                    return Some(Outcome::AgentWin);
                }
                self.turn = Turn::Player;
            }
        }
        None
    }

    /// Runs turns until the game ends.
    pub fn run<S: MoveSource>(&mut self, source: &mut S) -> Outcome {
        loop {
            if let Some(outcome) = self.play_turn(source) {
                info!("Session over: {:?}", outcome);
                return outcome;
            }
        }
    }
}

impl fmt::Display for HuntSession {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.grid.height() as i32 {
            for x in 0..self.grid.width() as i32 {
                let p = Point::new(x, y);
                let glyph = if p == self.player {
                    'P'
                } else if p == self.agent {
                    'A'
                } else if p == self.treasure {
                    'T'
                } else if self.grid.get(x as usize, y as usize) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::grid::Grid;

    fn open_grid(width: usize, height: usize) -> TerrainGrid {
        TerrainGrid::new(width, height, false)
    }

    #[test]
    fn commands_parse_from_their_textual_forms() {
        for (text, command) in [
            ("up", MoveCommand::Up),
            ("down", MoveCommand::Down),
            ("left", MoveCommand::Left),
            ("right", MoveCommand::Right),
            ("up-left", MoveCommand::UpLeft),
            ("up-right", MoveCommand::UpRight),
            ("down-left", MoveCommand::DownLeft),
            ("down-right", MoveCommand::DownRight),
        ] {
            assert_eq!(text.parse::<MoveCommand>().unwrap(), command);
        }
    }

    #[test]
    fn command_parsing_tolerates_case_and_whitespace() {
        assert_eq!(
            " DOWN-Right \n".parse::<MoveCommand>().unwrap(),
            MoveCommand::DownRight
        );
        assert!("sideways".parse::<MoveCommand>().is_err());
    }

    #[test]
    fn player_stops_at_the_board_edge() {
        let placement = Placement {
            player: Point::new(0, 0),
            agent: Point::new(2, 0),
            treasure: Point::new(2, 2),
        };
        let mut session = HuntSession::new(open_grid(3, 3), placement).unwrap();
        session.move_player(MoveCommand::Up);
        assert_eq!(session.player(), Point::new(0, 0));
    }

    #[test]
    fn player_crosses_rubble_unhindered() {
        let mut grid = open_grid(3, 3);
        grid.set(1, 0, true);
        let placement = Placement {
            player: Point::new(0, 0),
            agent: Point::new(0, 2),
            treasure: Point::new(2, 2),
        };
        let mut session = HuntSession::new(grid, placement).unwrap();
        session.move_player(MoveCommand::Right);
        assert_eq!(session.player(), Point::new(1, 0));
    }

    #[test]
    fn session_rejects_placements_off_the_board() {
        let placement = Placement {
            player: Point::new(0, 0),
            agent: Point::new(0, 1),
            treasure: Point::new(3, 3),
        };
        let err = HuntSession::new(open_grid(3, 3), placement).unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { x: 3, y: 3, .. }));
    }

    #[test]
    fn route_starts_beside_the_seeker_and_ends_on_the_treasure() {
        let placement = Placement {
            player: Point::new(4, 0),
            agent: Point::new(0, 0),
            treasure: Point::new(2, 2),
        };
        let session = HuntSession::new(open_grid(5, 5), placement).unwrap();
        let route = session.route();
        assert!(!route.is_empty());
        let first = route[0];
        assert!((first.x - 0).abs() <= 1 && (first.y - 0).abs() <= 1);
        assert_eq!(*route.last().unwrap(), Point::new(2, 2));
    }

    #[test]
    fn scripted_player_win() {
        let placement = Placement {
            player: Point::new(1, 0),
            agent: Point::new(4, 4),
            treasure: Point::new(2, 0),
        };
        let mut session = HuntSession::new(open_grid(5, 5), placement).unwrap();
        let mut moves = ScriptedMoves::new(vec![MoveCommand::Right]);
        assert_eq!(session.run(&mut moves), Outcome::PlayerWin);
        assert_eq!(session.player(), Point::new(2, 0));
    }

    #[test]
    fn seeker_wins_when_the_player_dawdles() {
        let placement = Placement {
            player: Point::new(4, 0),
            agent: Point::new(0, 0),
            treasure: Point::new(2, 2),
        };
        let mut session = HuntSession::new(open_grid(5, 5), placement).unwrap();
        let mut moves = ScriptedMoves::new(vec![
            MoveCommand::Left,
            MoveCommand::Right,
            MoveCommand::Left,
        ]);
        assert_eq!(session.run(&mut moves), Outcome::AgentWin);
        assert_eq!(session.agent(), Point::new(2, 2));
    }

    #[test]
    fn exhausted_move_source_abandons_the_session() {
        let placement = Placement {
            player: Point::new(0, 0),
            agent: Point::new(4, 0),
            treasure: Point::new(4, 4),
        };
        let mut session = HuntSession::new(open_grid(5, 5), placement).unwrap();
        let mut moves = ScriptedMoves::new(Vec::new());
        assert_eq!(session.run(&mut moves), Outcome::Abandoned);
    }

    #[test]
    fn seeker_holds_position_when_the_treasure_is_walled_off() {
        let mut grid = open_grid(5, 5);
        grid.set(3, 3, true);
        grid.set(4, 3, true);
        grid.set(3, 4, true);
        let placement = Placement {
            player: Point::new(0, 4),
            agent: Point::new(0, 0),
            treasure: Point::new(4, 4),
        };
        let mut session = HuntSession::new(grid, placement).unwrap();
        assert!(session.route().is_empty());
        let mut moves = ScriptedMoves::new(vec![MoveCommand::Right; 4]);
        assert_eq!(session.run(&mut moves), Outcome::PlayerWin);
        assert_eq!(session.agent(), Point::new(0, 0));
    }

    #[test]
    fn closures_drive_a_session() {
        let placement = Placement {
            player: Point::new(0, 4),
            agent: Point::new(1, 0),
            treasure: Point::new(1, 1),
        };
        let mut session = HuntSession::new(open_grid(5, 5), placement).unwrap();
        let mut moves = MoveFn(|| Some(MoveCommand::Up));
        assert_eq!(session.run(&mut moves), Outcome::AgentWin);
    }

    #[test]
    fn board_renders_tokens_over_terrain() {
        let mut grid = open_grid(3, 3);
        grid.set(1, 1, true);
        let placement = Placement {
            player: Point::new(0, 0),
            agent: Point::new(2, 0),
            treasure: Point::new(2, 2),
        };
        let session = HuntSession::new(grid, placement).unwrap();
        assert_eq!(format!("{session}"), "P.A\n.#.\n..T\n");
    }
}
