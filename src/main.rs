//! Headless duel runner
//!
//! Two scripted front ends, a chat bot and a browser client, play one game
//! against a shared engine. Each polls the game and acts when it holds the
//! turn; out-of-turn attempts are rejected immediately and counted.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use stackfield::battle::{
    ActionOutcome, ActionReply, BattleEngine, Collaborators, CreateReply, GameSnapshot, GameStatus,
    UnitState, UnitType, UnitView,
};
use stackfield::core::{load_config, Cell, EngineConfig, EngineResult, GameId, PlayerId};
use stackfield::economy::BattleReward;
use stackfield::persistence::{InMemoryStore, PlayerDirectory, StaticDirectory};

type Engine = BattleEngine<InMemoryStore>;

/// Headless duel between two front ends sharing one engine
#[derive(Parser, Debug)]
#[command(name = "stackfield")]
#[command(about = "Run a scripted duel and print the result")]
struct Args {
    /// Field size label, e.g. 7x7
    #[arg(long, default_value = "7x7")]
    field_size: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many accepted actions (draw)
    #[arg(long, default_value_t = 500)]
    max_actions: usize,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every accepted action
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct DuelResult {
    outcome: String,
    winner: Option<String>,
    field: String,
    rounds: u32,
    actions: usize,
    rejected_out_of_turn: usize,
    reward: Option<BattleReward>,
    seed: u64,
}

#[derive(Debug, Clone, Copy)]
enum FrontEnd {
    ChatBot,
    Browser,
}

impl FrontEnd {
    fn label(&self) -> &'static str {
        match self {
            FrontEnd::ChatBot => "chat bot",
            FrontEnd::Browser => "browser",
        }
    }
}

#[derive(Default)]
struct Counters {
    actions: AtomicUsize,
    rejected: AtomicUsize,
}

enum Step {
    Acted(ActionOutcome),
    Deferred(String),
}

#[tokio::main]
async fn main() -> EngineResult<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "stackfield=debug" } else { "stackfield=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config = config.with_seed(seed);

    let directory = Arc::new(StaticDirectory::new());
    let ember = directory.add_player("Ember");
    let tide = directory.add_player("Tide");
    stock_rosters(&directory, ember, tide);

    let engine = Arc::new(BattleEngine::new(
        config,
        InMemoryStore::new(),
        Collaborators::from_shared(directory.clone()),
    )?);

    let created: CreateReply = engine.create_game(ember, "Tide", &args.field_size).into();
    let Some(game_id) = created.game_id else {
        eprintln!("Could not create game: {}", created.message);
        return Ok(());
    };
    tracing::info!("{}", created.message);

    let accepted: ActionReply = engine.accept_game(game_id, tide).into();
    if !accepted.ok {
        eprintln!("Could not start game: {}", accepted.message);
        return Ok(());
    }
    tracing::info!("{}", accepted.message);

    let counters = Arc::new(Counters::default());
    let chat_bot = tokio::spawn(run_front_end(
        engine.clone(),
        game_id,
        ember,
        FrontEnd::ChatBot,
        counters.clone(),
        args.max_actions,
    ));
    let browser = tokio::spawn(run_front_end(
        engine.clone(),
        game_id,
        tide,
        FrontEnd::Browser,
        counters.clone(),
        args.max_actions,
    ));
    for (handle, kind) in [(chat_bot, FrontEnd::ChatBot), (browser, FrontEnd::Browser)] {
        if let Err(e) = handle.await {
            tracing::error!(front_end = kind.label(), "front end task failed: {}", e);
        }
    }

    let snapshot = engine.game_snapshot(game_id)?;
    let winner = snapshot
        .winner_id
        .map(|id| directory.display_name(id).unwrap_or_else(|| id.to_string()));
    let result = DuelResult {
        outcome: match snapshot.status {
            GameStatus::Completed if winner.is_some() => "victory".to_string(),
            GameStatus::Completed => "declined".to_string(),
            _ => "draw".to_string(),
        },
        winner,
        field: snapshot.field.clone(),
        rounds: snapshot.round,
        actions: counters.actions.load(Ordering::SeqCst),
        rejected_out_of_turn: counters.rejected.load(Ordering::SeqCst),
        reward: snapshot.reward,
        seed,
    };

    match args.format.as_str() {
        "text" => print_text(&result, &snapshot),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn print_text(result: &DuelResult, snapshot: &GameSnapshot) {
    println!("Duel Result");
    println!("===========");
    println!("Outcome: {}", result.outcome);
    if let Some(winner) = &result.winner {
        println!("Winner: {}", winner);
    }
    println!("Field: {}", result.field);
    println!("Rounds: {}", result.rounds);
    println!("Actions: {}", result.actions);
    println!("Out-of-turn rejections: {}", result.rejected_out_of_turn);
    if let Some(reward) = &result.reward {
        println!(
            "Reward: {} (enemy losses {}, own losses {}, net {})",
            reward.reward, reward.enemy_losses_value, reward.own_losses_value, reward.net_profit
        );
    }
    println!("Seed: {}", result.seed);
    println!();
    println!("{}", snapshot.render_ascii());
}

/// Two small armies with a mix of melee, ranged, flying and kamikaze stacks
fn stock_rosters(directory: &StaticDirectory, ember: PlayerId, tide: PlayerId) {
    directory.add_stack(ember, UnitType::new("Swordsman", 12, 4, 20).with_speed(2), 10);
    directory.add_stack(
        ember,
        UnitType::new("Archer", 8, 2, 12).with_range(4).with_chances(0.1, 0.1, 0.05, 0.0),
        12,
    );
    directory.add_stack(
        ember,
        UnitType::new("Fire Imp", 20, 1, 8).with_speed(3).flying().kamikaze(),
        6,
    );

    directory.add_stack(
        tide,
        UnitType::new("Pikeman", 10, 6, 22).with_chances(0.0, 0.05, 0.0, 0.4),
        10,
    );
    directory.add_stack(
        tide,
        UnitType::new("Slinger", 6, 2, 10).with_range(3).with_speed(2),
        14,
    );
    directory.add_stack(
        tide,
        UnitType::new("Gull", 7, 2, 9).with_speed(4).flying().with_chances(0.2, 0.0, 0.25, 0.0),
        8,
    );
}

async fn run_front_end(
    engine: Arc<Engine>,
    game_id: GameId,
    player: PlayerId,
    kind: FrontEnd,
    counters: Arc<Counters>,
    max_actions: usize,
) {
    loop {
        if counters.actions.load(Ordering::SeqCst) >= max_actions {
            tracing::info!(front_end = kind.label(), "action cap reached");
            return;
        }
        let snapshot = match engine.game_snapshot(game_id) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(front_end = kind.label(), "lost the game: {}", e);
                return;
            }
        };
        if snapshot.status != GameStatus::InProgress {
            return;
        }

        if snapshot.current_player_id == Some(player) {
            match take_turn(&engine, game_id, player, kind, &snapshot) {
                Some(Ok(Step::Acted(outcome))) => {
                    counters.actions.fetch_add(1, Ordering::SeqCst);
                    if outcome.turn_switched {
                        // Where a real front end would ping the opponent
                        tracing::info!(front_end = kind.label(), "turn passed to the opponent");
                    }
                }
                Some(Ok(Step::Deferred(message))) => {
                    tracing::debug!(front_end = kind.label(), "{}", message);
                }
                Some(Err(e)) => {
                    tracing::debug!(front_end = kind.label(), "action refused: {}", e);
                }
                None => {}
            }
        } else if let Some(unit) = snapshot.live_units_of(player).next() {
            // Impatient client: try anyway, get told it is not our turn
            let reply: ActionReply = engine.skip_unit_turn(game_id, player, unit.id).into();
            if reply.ok {
                counters.actions.fetch_add(1, Ordering::SeqCst);
            } else {
                counters.rejected.fetch_add(1, Ordering::SeqCst);
            }
        }

        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Pick and perform one action for the active player
fn take_turn(
    engine: &Engine,
    game_id: GameId,
    player: PlayerId,
    kind: FrontEnd,
    snapshot: &GameSnapshot,
) -> Option<EngineResult<Step>> {
    let mut pending: Vec<&UnitView> = snapshot
        .live_units_of(player)
        .filter(|u| u.state != UnitState::Acted)
        .collect();
    pending.sort_by_key(|u| u.state == UnitState::Deferred);
    let unit = *pending.first()?;

    let opponent = if player == snapshot.player1 { snapshot.player2 } else { snapshot.player1 };
    let enemies: Vec<&UnitView> = snapshot.live_units_of(opponent).collect();

    // Attack the weakest stack in reach
    let targets = engine.get_attack_targets(game_id, unit.id);
    let weakest = enemies
        .iter()
        .filter(|e| targets.contains(&e.id))
        .min_by_key(|e| e.total_count);
    if let Some(target) = weakest {
        return Some(engine.attack(game_id, player, unit.id, target.id).map(Step::Acted));
    }

    // The chat bot holds its shooters back until the rest of the line has moved
    if matches!(kind, FrontEnd::ChatBot)
        && unit.range > 1
        && unit.state == UnitState::Idle
        && pending.len() > 1
    {
        return Some(engine.defer_unit(game_id, player, unit.id).map(Step::Deferred));
    }

    // Otherwise close the distance
    let distance_to_enemy = |cell: Cell| {
        enemies
            .iter()
            .map(|e| e.position.distance(&cell))
            .min()
            .unwrap_or(0)
    };
    let here = distance_to_enemy(unit.position);
    let best = engine
        .get_available_movement_cells(game_id, unit.id)
        .into_iter()
        .min_by_key(|c| (distance_to_enemy(*c), *c));

    Some(match best {
        Some(cell) if distance_to_enemy(cell) < here => {
            engine.move_unit(game_id, player, unit.id, cell).map(Step::Acted)
        }
        _ => engine.skip_unit_turn(game_id, player, unit.id).map(Step::Acted),
    })
}
