//! Battle lifecycle integration tests
//!
//! Drive the engine the way the front ends do: create, accept, then take
//! turns through the public API only.

use std::sync::Arc;

use stackfield::battle::{
    ActionReply, BattleEngine, Collaborators, GameStatus, LogEventType, UnitState, UnitType,
};
use stackfield::core::{Cell, EngineConfig, EngineError, GameId, PlayerId, UnitId};
use stackfield::persistence::{GameStore, InMemoryStore, StaticDirectory};

struct Duel {
    engine: Arc<BattleEngine<InMemoryStore>>,
    alice: PlayerId,
    bob: PlayerId,
}

fn duel(alice_stacks: usize, bob_stacks: usize) -> Duel {
    let dir = Arc::new(StaticDirectory::new());
    let alice = dir.add_player("Alice");
    let bob = dir.add_player("Bob");
    for _ in 0..alice_stacks {
        dir.add_stack(alice, UnitType::new("Footman", 6, 2, 12).with_speed(2), 5);
    }
    for _ in 0..bob_stacks {
        dir.add_stack(bob, UnitType::new("Raider", 5, 1, 10).with_speed(3), 5);
    }

    let engine = BattleEngine::new(
        EngineConfig::new().with_seed(2024),
        InMemoryStore::new(),
        Collaborators::from_shared(dir),
    )
    .unwrap();
    Duel {
        engine: Arc::new(engine),
        alice,
        bob,
    }
}

fn start(d: &Duel, size: &str) -> GameId {
    let (game, _) = d.engine.create_game(d.alice, "Bob", size).unwrap();
    d.engine.accept_game(game.id, d.bob).unwrap();
    game.id
}

fn units_of(d: &Duel, game_id: GameId, player: PlayerId) -> Vec<UnitId> {
    d.engine
        .game_snapshot(game_id)
        .unwrap()
        .live_units_of(player)
        .map(|u| u.id)
        .collect()
}

#[test]
fn test_end_to_end_move_on_5x5() {
    let d = duel(2, 2);
    let game_id = start(&d, "5x5");
    let unit = units_of(&d, game_id, d.alice)[0];

    let cells = d.engine.get_available_movement_cells(game_id, unit);
    assert!(!cells.is_empty());
    let target = cells[0];

    let reply: ActionReply = d.engine.move_unit(game_id, d.alice, unit, target).into();
    assert!(reply.ok, "{}", reply.message);

    let snap = d.engine.game_snapshot(game_id).unwrap();
    let moved = snap.units.iter().find(|u| u.id == unit).unwrap();
    assert_eq!(moved.position, target);
    assert_eq!(moved.state, UnitState::Acted);
}

#[test]
fn test_creator_moves_first_after_accept() {
    let d = duel(1, 1);
    let game_id = start(&d, "7x7");
    let snap = d.engine.game_snapshot(game_id).unwrap();
    assert_eq!(snap.current_player_id, Some(d.alice));
    assert_eq!(snap.round, 1);
}

#[test]
fn test_current_player_always_participant() {
    let d = duel(2, 3);
    let game_id = start(&d, "6x6");

    for _ in 0..20 {
        let snap = d.engine.game_snapshot(game_id).unwrap();
        if snap.status != GameStatus::InProgress {
            break;
        }
        let current = snap.current_player_id.unwrap();
        assert!(current == d.alice || current == d.bob);

        let unit = snap
            .live_units_of(current)
            .find(|u| u.state != UnitState::Acted)
            .unwrap()
            .id;
        d.engine.skip_unit_turn(game_id, current, unit).unwrap();
    }
}

#[test]
fn test_exhausted_player_is_rejected_and_control_passes() {
    let d = duel(2, 1);
    let game_id = start(&d, "5x5");
    let mine = units_of(&d, game_id, d.alice);

    assert!(!d.engine.skip_unit_turn(game_id, d.alice, mine[0]).unwrap().turn_switched);
    assert!(d.engine.skip_unit_turn(game_id, d.alice, mine[1]).unwrap().turn_switched);

    let reply: ActionReply = d.engine.skip_unit_turn(game_id, d.alice, mine[0]).into();
    assert!(!reply.ok);
    assert_eq!(reply.message, "It is not your turn");
    assert_eq!(
        d.engine.game_snapshot(game_id).unwrap().current_player_id,
        Some(d.bob)
    );
}

#[test]
fn test_round_counter_advances() {
    let d = duel(1, 1);
    let game_id = start(&d, "5x5");
    let a = units_of(&d, game_id, d.alice)[0];
    let b = units_of(&d, game_id, d.bob)[0];

    d.engine.skip_unit_turn(game_id, d.alice, a).unwrap();
    d.engine.skip_unit_turn(game_id, d.bob, b).unwrap();

    let snap = d.engine.game_snapshot(game_id).unwrap();
    assert_eq!(snap.round, 2);
    assert_eq!(snap.current_player_id, Some(d.alice));
    // fresh round, alice may act again
    assert!(!d.engine.get_available_movement_cells(game_id, a).is_empty());
}

#[test]
fn test_deferred_unit_acts_later_in_round() {
    let d = duel(2, 1);
    let game_id = start(&d, "5x5");
    let mine = units_of(&d, game_id, d.alice);

    d.engine.defer_unit(game_id, d.alice, mine[0]).unwrap();
    let cells = d.engine.get_available_movement_cells(game_id, mine[0]);
    assert!(!cells.is_empty());

    d.engine.skip_unit_turn(game_id, d.alice, mine[1]).unwrap();
    let outcome = d.engine.move_unit(game_id, d.alice, mine[0], cells[0]).unwrap();
    assert!(outcome.turn_switched);
}

#[test]
fn test_movement_query_idempotent() {
    let d = duel(1, 1);
    let game_id = start(&d, "10x10");
    let unit = units_of(&d, game_id, d.alice)[0];

    let first = d.engine.get_available_movement_cells(game_id, unit);
    let second = d.engine.get_available_movement_cells(game_id, unit);
    assert_eq!(first, second);
}

#[test]
fn test_move_outside_list_rejected() {
    let d = duel(1, 1);
    let game_id = start(&d, "7x7");
    let unit = units_of(&d, game_id, d.alice)[0];
    let cells = d.engine.get_available_movement_cells(game_id, unit);

    let far = Cell::new(6, 0);
    assert!(!cells.contains(&far));
    assert!(matches!(
        d.engine.move_unit(game_id, d.alice, unit, far),
        Err(EngineError::CellUnreachable(_))
    ));
}

#[test]
fn test_obstacles_stay_fixed() {
    let d = duel(1, 1);
    let game_id = start(&d, "10x10");
    let before = d.engine.game_snapshot(game_id).unwrap().obstacles;
    assert_eq!(before.len(), 10);

    let unit = units_of(&d, game_id, d.alice)[0];
    d.engine.skip_unit_turn(game_id, d.alice, unit).unwrap();
    assert_eq!(d.engine.game_snapshot(game_id).unwrap().obstacles, before);
}

#[test]
fn test_log_records_lifecycle() {
    let d = duel(1, 1);
    let game_id = start(&d, "5x5");
    let unit = units_of(&d, game_id, d.alice)[0];
    d.engine.skip_unit_turn(game_id, d.alice, unit).unwrap();
    d.engine.forfeit_game(game_id, d.bob).unwrap();

    let kinds: Vec<LogEventType> = d
        .engine
        .game_log(game_id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            LogEventType::GameCreated,
            LogEventType::GameAccepted,
            LogEventType::UnitSkipped,
            LogEventType::TurnSwitched,
            LogEventType::GameForfeited,
            LogEventType::GameCompleted,
            LogEventType::RewardGranted,
        ]
    );
}

#[test]
fn test_games_for_player_lists_both_sides() {
    let d = duel(1, 1);
    let game_id = start(&d, "5x5");
    assert_eq!(d.engine.games_for_player(d.alice)[0].id, game_id);
    assert_eq!(d.engine.games_for_player(d.bob)[0].id, game_id);
    assert!(d.engine.games_for_player(PlayerId::new()).is_empty());
}

#[test]
fn test_roster_too_large_for_field() {
    let d = duel(8, 1);
    // 3x3 gives each side one column of three cells
    assert!(matches!(
        d.engine.create_game(d.alice, "bob", "3x3"),
        Err(EngineError::RosterTooLarge { stacks: 8, .. })
    ));
}

#[test]
fn test_concurrent_front_ends_only_one_acts() {
    let d = duel(1, 1);
    let game_id = start(&d, "5x5");
    let a = units_of(&d, game_id, d.alice)[0];
    let b = units_of(&d, game_id, d.bob)[0];

    let (alice, bob) = (d.alice, d.bob);
    let (e1, e2) = (d.engine.clone(), d.engine.clone());
    let chat = std::thread::spawn(move || e1.skip_unit_turn(game_id, bob, b).is_ok());
    let browser = std::thread::spawn(move || e2.skip_unit_turn(game_id, alice, a).is_ok());
    let bob_ok = chat.join().unwrap();
    let alice_ok = browser.join().unwrap();

    // alice always succeeds; bob only if he ran after her
    assert!(alice_ok);
    let ctx = d.engine.store().load_game(game_id).unwrap();
    if bob_ok {
        assert_eq!(ctx.game.round, 2);
    } else {
        assert_eq!(ctx.game.current_player_id, Some(bob));
    }
}

#[tokio::test]
async fn test_front_ends_as_tasks() {
    let d = duel(1, 1);
    let game_id = start(&d, "5x5");
    let a = units_of(&d, game_id, d.alice)[0];

    let engine = d.engine.clone();
    let bob = d.bob;
    let rejected = tokio::spawn(async move {
        let snap = engine.game_snapshot(game_id).unwrap();
        let unit = snap.live_units_of(bob).next().unwrap().id;
        engine.skip_unit_turn(game_id, bob, unit)
    })
    .await
    .unwrap();

    assert!(matches!(rejected, Err(EngineError::NotYourTurn)));
    assert!(d.engine.skip_unit_turn(game_id, d.alice, a).unwrap().turn_switched);
}
