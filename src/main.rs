use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::{Key, Term};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use jam_solver::solve::{Search, SearchConfig, Strategy};
use jam_solver::{Board, Move, VehicleId};

#[derive(Parser)]
#[command(name = "jam-solver")]
#[command(about = "Solve sliding-vehicle traffic jam puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve puzzles and print the replay of each solution
    Solve {
        /// Map files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Use the heuristic search instead of breadth-first search
        #[arg(long)]
        informed: bool,

        /// Run both searches side by side and compare them
        #[arg(long, conflicts_with = "informed")]
        compare: bool,

        /// Abort after this many visited nodes
        #[arg(long)]
        max_nodes: Option<u64>,

        /// Abort after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Only print the moves
        #[arg(long, short)]
        quiet: bool,
    },
    /// Move the vehicles by hand
    Play {
        /// Map file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Commands::Solve {
            files,
            informed,
            compare,
            max_nodes,
            timeout,
            quiet,
        } => {
            let config = SearchConfig {
                max_nodes,
                time_limit: timeout.map(Duration::from_secs),
            };
            let strategy = if informed {
                Strategy::Informed
            } else {
                Strategy::BreadthFirst
            };
            for path in &files {
                let board = load(path)?;
                let result = if compare {
                    run_compare(&board, &config)
                } else {
                    run_solve(&board, strategy, &config, quiet)
                };
                result.with_context(|| format!("Failed to solve {}", path.display()))?;
            }
            Ok(())
        }
        Commands::Play { file } => play(load(&file)?),
    }
}

fn load(path: &Path) -> Result<Board> {
    let map_data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read the map {}", path.display()))?;
    map_data
        .parse::<Board>()
        .with_context(|| format!("Failed to parse the map {}", path.display()))
}

fn spinner(strategy: Strategy) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {msg}: {pos} nodes ({per_sec})",
    )?);
    pb.set_message(strategy.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn run_solve(board: &Board, strategy: Strategy, config: &SearchConfig, quiet: bool) -> Result<()> {
    let pb = spinner(strategy)?;
    let mut search = Search::new(config.clone());
    let solution = search.solve(strategy, board, || pb.inc(1));
    pb.finish_and_clear();
    let solution = solution?;

    if quiet {
        let moves = solution.iter().map(Move::to_string).collect::<Vec<_>>();
        println!("{}", moves.join(" "));
        return Ok(());
    }

    let mut board = board.clone();
    for &mv in &solution {
        println!("{board}{mv}");
        board.apply_in_place(mv).context("Invalid solution")?;
    }
    println!("{board}");
    println!("Puzzle completed in {} moves.", solution.len());
    println!("Number of nodes visited in search: {}", search.nodes_visited());
    Ok(())
}

fn run_compare(board: &Board, config: &SearchConfig) -> Result<()> {
    let bars = MultiProgress::new();
    let run = |strategy: Strategy| -> Result<_> {
        let pb = bars.add(spinner(strategy)?);
        let mut search = Search::new(config.clone());
        let solution = search.solve(strategy, board, || pb.inc(1));
        pb.finish_and_clear();
        Ok((strategy, solution, search.stats().clone()))
    };
    let (bfs, informed) = rayon::join(
        || run(Strategy::BreadthFirst),
        || run(Strategy::Informed),
    );

    println!("{board}");
    for (strategy, solution, stats) in [bfs?, informed?] {
        let solution = solution.with_context(|| format!("{strategy} search failed"))?;
        println!("{strategy}: {} moves; {stats}", solution.len());
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Exit,
    Select(VehicleId),
    Slide(i8),
    Hint,
    Undo,
    Reset,
}

impl TryFrom<Key> for Action {
    type Error = ();

    // Letters are vehicle names, so commands stay off the letter keys.
    fn try_from(key: Key) -> Result<Self, Self::Error> {
        Ok(match key {
            Key::ArrowLeft | Key::ArrowUp => Self::Slide(-1),
            Key::ArrowRight | Key::ArrowDown => Self::Slide(1),
            Key::Escape => Self::Exit,
            Key::Backspace => Self::Undo,
            Key::Del => Self::Reset,
            Key::Char('?') => Self::Hint,
            Key::Char(ch) => Self::Select(VehicleId::from_letter(ch).ok_or(())?),
            _ => return Err(()),
        })
    }
}

fn play(init_board: Board) -> Result<()> {
    let mut board = init_board.clone();
    let mut history = Vec::new();
    let mut selected = VehicleId(0);

    let term = Term::stderr();
    loop {
        eprintln!("{board}selected: {selected}");
        if board.is_goal() {
            eprintln!("Solved in {} moves.", history.len());
        }

        let action = loop {
            if let Ok(action) = Action::try_from(term.read_key()?) {
                break action;
            }
        };

        let mv = match action {
            Action::Exit => break,
            Action::Select(id) => {
                if (id.0 as usize) < board.vehicles().len() {
                    selected = id;
                }
                continue;
            }
            Action::Slide(displacement) => Move::new(selected, displacement),
            Action::Hint => match jam_solver::solve::solve_breadth_first(&board) {
                Ok(solution) => match solution.first() {
                    Some(&mv) => mv,
                    None => continue,
                },
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            },
            Action::Undo => {
                if let Some(last_board) = history.pop() {
                    board = last_board;
                }
                continue;
            }
            Action::Reset => {
                history.push(board);
                board = init_board.clone();
                continue;
            }
        };

        let legal = (mv.vehicle.0 as usize) < board.vehicles().len()
            && board.move_range(mv.vehicle).contains(&mv.displacement);
        if !legal {
            continue;
        }
        let new_board = board.apply(mv)?;
        history.push(board);
        board = new_board;
    }

    Ok(())
}
