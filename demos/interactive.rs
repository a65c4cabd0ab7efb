use grid_treasure_hunt::game::{HuntSession, MoveCommand, MoveSource, Outcome, Placement};
use grid_treasure_hunt::{GridConfig, TerrainGrid};
use grid_util::point::Point;
use std::io::{self, Write};

// An interactive treasure hunt on a random 10x10 board. Positions are
// entered as `row,col` pairs; moves as one of up, down, left, right,
// up-left, up-right, down-left, down-right. The seeker's route is computed
// once when the session starts.

fn parse_cell(line: &str) -> Option<Point> {
    let (row, col) = line.trim().split_once(',')?;
    let row: i32 = row.trim().parse().ok()?;
    let col: i32 = col.trim().parse().ok()?;
    Some(Point::new(col, row))
}

fn read_cell(prompt: &str, config: &GridConfig) -> Option<Point> {
    let mut line = String::new();
    loop {
        print!("{prompt}");
        io::stdout().flush().ok()?;
        line.clear();
        if io::stdin().read_line(&mut line).ok()? == 0 {
            return None;
        }
        match parse_cell(&line) {
            Some(cell)
                if cell.x >= 0
                    && cell.y >= 0
                    && (cell.x as usize) < config.width
                    && (cell.y as usize) < config.height =>
            {
                return Some(cell)
            }
            _ => println!(
                "Positions are `row,col` pairs within the {}x{} board.",
                config.height, config.width
            ),
        }
    }
}

struct PromptMoves;

impl MoveSource for PromptMoves {
    fn next_move(&mut self) -> Option<MoveCommand> {
        let mut line = String::new();
        loop {
            print!("Enter your move (up, down, left, right, or a diagonal like up-left): ");
            io::stdout().flush().ok()?;
            line.clear();
            if io::stdin().read_line(&mut line).ok()? == 0 {
                return None;
            }
            match line.parse::<MoveCommand>() {
                Ok(command) => return Some(command),
                Err(err) => println!("{err}"),
            }
        }
    }
}

fn main() {
    let config = GridConfig::default();
    let grid = TerrainGrid::random(&config, &mut rand::thread_rng());
    println!("Enter the positions (row,col) of the player, agent, and treasure.");
    let Some(player) = read_cell("Player position: ", &config) else {
        return;
    };
    let Some(agent) = read_cell("Agent position: ", &config) else {
        return;
    };
    let Some(treasure) = read_cell("Treasure position: ", &config) else {
        return;
    };
    let mut session = HuntSession::new(
        grid,
        Placement {
            player,
            agent,
            treasure,
        },
    )
    .expect("positions were validated against the board");
    println!("{session}");
    let mut moves = PromptMoves;
    loop {
        match session.play_turn(&mut moves) {
            None => println!("{session}"),
            Some(Outcome::PlayerWin) => {
                println!("{session}");
                println!("Congratulations! You found the treasure. You win!");
                break;
            }
            Some(Outcome::AgentWin) => {
                println!("{session}");
                println!("The agent has found the treasure. You lose!");
                break;
            }
            Some(Outcome::Abandoned) => break,
        }
    }
}
