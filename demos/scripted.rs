use grid_treasure_hunt::game::{HuntSession, MoveCommand, Placement, ScriptedMoves};
use grid_treasure_hunt::TerrainGrid;
use grid_util::grid::Grid;
use grid_util::point::Point;

// In this demo a scripted explorer races the seeker on a 5x5 board with
// shape
// P....
// .##..
// .#T..
// .....
// A....
// P marks the explorer, A the seeker, T the treasure and # rubble. The
// explorer cuts straight across the rubble and wins by one turn.
fn main() {
    let mut terrain = TerrainGrid::new(5, 5, false);
    terrain.set(1, 1, true);
    terrain.set(2, 1, true);
    terrain.set(1, 2, true);
    let placement = Placement {
        player: Point::new(0, 0),
        agent: Point::new(0, 4),
        treasure: Point::new(2, 2),
    };
    let mut session = HuntSession::new(terrain, placement).expect("placement is on the board");
    println!("{session}");
    println!("Seeker route: {:?}", session.route());
    let mut moves = ScriptedMoves::new(vec![MoveCommand::DownRight, MoveCommand::DownRight]);
    let outcome = session.run(&mut moves);
    println!("{session}");
    println!("Outcome: {outcome:?}");
}
