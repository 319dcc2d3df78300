use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{
    AttackStatus, Cell, Game, GameError, GameStatus, Orientation, Position, Ship,
};

const A: u64 = 1;
const B: u64 = 2;

fn pos(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

fn ship(x: i32, y: i32, length: usize, orientation: Orientation) -> Ship {
    Ship::new(pos(x, y), length, orientation).unwrap()
}

/// Started game where `first` is to move. B's fleet is a single length-2
/// ship at (0,0); A's fleet is a single ship far away.
fn started_game(first: u64) -> (Game, SmallRng) {
    for seed in 0.. {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut game = Game::new(1, [A, B]);
        game.set_ships(A, vec![ship(9, 9, 1, Orientation::Horizontal)], &mut rng)
            .unwrap();
        game.set_ships(B, vec![ship(0, 0, 2, Orientation::Horizontal)], &mut rng)
            .unwrap();
        if game.current_player() == first {
            return (game, rng);
        }
    }
    unreachable!()
}

#[test]
fn test_status_progression() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut game = Game::new(5, [A, B]);
    assert_eq!(game.status(), GameStatus::Created);

    game.set_ships(A, vec![ship(0, 0, 1, Orientation::Horizontal)], &mut rng)
        .unwrap();
    assert_eq!(game.status(), GameStatus::Created);
    game.set_ships(B, vec![ship(0, 0, 1, Orientation::Horizontal)], &mut rng)
        .unwrap();
    assert_eq!(game.status(), GameStatus::Started);

    game.give_up(A);
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), Some(B));
}

#[test]
fn test_set_ships_errors() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut game = Game::new(5, [A, B]);
    let fleet = || vec![ship(0, 0, 1, Orientation::Horizontal)];

    assert_eq!(game.set_ships(99, fleet(), &mut rng), Err(GameError::UnknownPlayer));
    assert_eq!(game.set_ships(A, vec![], &mut rng), Err(GameError::InvalidShip));
    assert_eq!(
        game.set_ships(A, vec![ship(8, 0, 3, Orientation::Horizontal)], &mut rng),
        Err(GameError::InvalidShip)
    );

    game.set_ships(A, fleet(), &mut rng).unwrap();
    assert_eq!(game.set_ships(A, fleet(), &mut rng), Err(GameError::AlreadyPlaced));

    game.give_up(B);
    assert_eq!(game.set_ships(B, fleet(), &mut rng), Err(GameError::AlreadyFinished));
}

#[test]
fn test_attack_before_start_is_ignored() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut game = Game::new(5, [A, B]);
    assert!(game.attack(A, Some(pos(0, 0)), &mut rng).unwrap().is_empty());
    assert!(game.attack(B, None, &mut rng).unwrap().is_empty());
}

#[test]
fn test_sinking_length_two_ship() {
    let (mut game, mut rng) = started_game(A);

    let shot = game.attack(A, Some(pos(0, 0)), &mut rng).unwrap();
    assert_eq!(shot.len(), 1);
    assert_eq!(shot[0].status, AttackStatus::Shot);
    assert_eq!(shot[0].player, A);
    assert_eq!(game.current_player(), A);

    let kill = game.attack(A, Some(pos(1, 0)), &mut rng).unwrap();
    let summary: Vec<_> = kill.iter().map(|r| (r.position, r.status)).collect();
    assert_eq!(
        summary,
        vec![
            (pos(0, 0), AttackStatus::Killed),
            (pos(1, 0), AttackStatus::Killed),
            (pos(2, 0), AttackStatus::Miss),
            (pos(0, 1), AttackStatus::Miss),
            (pos(1, 1), AttackStatus::Miss),
            (pos(2, 1), AttackStatus::Miss),
        ]
    );
    assert_eq!(game.winner(), Some(A));
    assert_eq!(game.status(), GameStatus::Finished);

    let board = game.board_of(B).unwrap();
    assert_eq!(board.get(pos(0, 0)), Some(Cell::Hit));
    assert_eq!(board.get(pos(2, 1)), Some(Cell::Miss));

    // Nothing moves once finished.
    assert!(game.attack(A, Some(pos(5, 5)), &mut rng).unwrap().is_empty());
}

#[test]
fn test_miss_passes_turn() {
    let (mut game, mut rng) = started_game(A);
    let results = game.attack(A, Some(pos(5, 5)), &mut rng).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, AttackStatus::Miss);
    assert_eq!(game.current_player(), B);
    assert_eq!(game.enemy_player(), A);
}

#[test]
fn test_out_of_turn_and_repeated_shots_are_ignored() {
    let (mut game, mut rng) = started_game(A);
    assert!(game.attack(B, Some(pos(9, 9)), &mut rng).unwrap().is_empty());

    game.attack(A, Some(pos(0, 0)), &mut rng).unwrap();
    let before = *game.board_of(B).unwrap();
    assert!(game.attack(A, Some(pos(0, 0)), &mut rng).unwrap().is_empty());
    assert!(game.attack(A, Some(pos(-1, 3)), &mut rng).unwrap().is_empty());
    assert_eq!(*game.board_of(B).unwrap(), before);
    assert_eq!(game.current_player(), A);
}

#[test]
fn test_kill_in_corner_clips_perimeter() {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut game = loop {
        let mut game = Game::new(2, [A, B]);
        game.set_ships(A, vec![ship(0, 0, 1, Orientation::Horizontal)], &mut rng)
            .unwrap();
        game.set_ships(
            B,
            vec![
                ship(9, 6, 4, Orientation::Vertical),
                ship(0, 0, 1, Orientation::Horizontal),
            ],
            &mut rng,
        )
        .unwrap();
        if game.current_player() == A {
            break game;
        }
    };
    for y in 6..9 {
        let r = game.attack(A, Some(pos(9, y)), &mut rng).unwrap();
        assert_eq!(r[0].status, AttackStatus::Shot);
    }
    let kill = game.attack(A, Some(pos(9, 9)), &mut rng).unwrap();
    let killed = kill.iter().filter(|r| r.status == AttackStatus::Killed).count();
    let missed: Vec<_> = kill
        .iter()
        .filter(|r| r.status == AttackStatus::Miss)
        .map(|r| r.position)
        .collect();
    assert_eq!(killed, 4);
    // Column 8 from row 5 to 9, plus (9, 5).
    assert_eq!(missed.len(), 6);
    assert!(missed.iter().all(|p| p.x >= 8 && p.x <= 9 && p.y >= 5));
    assert_eq!(game.winner(), None);
    assert_eq!(game.current_player(), A);
}

#[test]
fn test_random_attack_hits_unknown_cell() {
    let (mut game, mut rng) = started_game(A);
    let results = game.attack(A, None, &mut rng).unwrap();
    assert!(!results.is_empty());
    assert_eq!(
        game.board_of(B).unwrap().empty_count(),
        100 - results.len()
    );
}

#[test]
fn test_give_up_only_once() {
    let (mut game, _) = started_game(A);
    game.give_up(99);
    assert_eq!(game.winner(), None);
    game.give_up(B);
    assert_eq!(game.winner(), Some(A));
    game.give_up(A);
    assert_eq!(game.winner(), Some(A));
}

#[test]
fn test_overlapping_fleet_is_rejected() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut game = Game::new(3, [A, B]);
    let crossed = vec![
        ship(2, 2, 3, Orientation::Horizontal),
        ship(3, 1, 3, Orientation::Vertical),
    ];
    assert_eq!(game.set_ships(A, crossed, &mut rng), Err(GameError::InvalidShip));
    assert!(game.ships_of(A).is_empty());

    let stacked = vec![
        ship(4, 4, 1, Orientation::Horizontal),
        ship(4, 4, 1, Orientation::Horizontal),
    ];
    assert_eq!(game.set_ships(A, stacked, &mut rng), Err(GameError::InvalidShip));
    assert_eq!(game.status(), GameStatus::Created);
}

#[test]
fn test_touching_fleet_is_rejected() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut game = Game::new(4, [A, B]);
    for neighbour in [pos(1, 0), pos(0, 1), pos(1, 1)] {
        let fleet = vec![
            ship(0, 0, 1, Orientation::Horizontal),
            Ship::new(neighbour, 1, Orientation::Horizontal).unwrap(),
        ];
        assert_eq!(
            game.set_ships(A, fleet, &mut rng),
            Err(GameError::InvalidShip),
            "neighbour at {}",
            neighbour
        );
    }

    // One free cell between ships is enough.
    let spaced = vec![
        ship(0, 0, 1, Orientation::Horizontal),
        ship(2, 0, 1, Orientation::Horizontal),
        ship(0, 2, 2, Orientation::Vertical),
    ];
    game.set_ships(A, spaced, &mut rng).unwrap();
    assert_eq!(game.ships_of(A).len(), 3);
}

#[test]
fn test_every_ship_of_a_valid_fleet_can_be_sunk() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mut game = loop {
        let mut game = Game::new(6, [A, B]);
        game.set_ships(A, vec![ship(9, 9, 1, Orientation::Horizontal)], &mut rng)
            .unwrap();
        game.set_ships(
            B,
            vec![
                ship(0, 0, 1, Orientation::Horizontal),
                ship(2, 0, 1, Orientation::Horizontal),
            ],
            &mut rng,
        )
        .unwrap();
        if game.current_player() == A {
            break game;
        }
    };

    let r = game.attack(A, Some(pos(0, 0)), &mut rng).unwrap();
    assert_eq!(r[0].status, AttackStatus::Killed);
    assert_eq!(game.board_of(B).unwrap().get(pos(2, 0)), Some(Cell::Unknown));

    let r = game.attack(A, Some(pos(2, 0)), &mut rng).unwrap();
    assert_eq!(r[0].status, AttackStatus::Killed);
    assert_eq!(game.winner(), Some(A));
}
