use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{
    Directory, GameError, GameStatus, Orientation, Position, Ship, BOT_ID, FLEET,
};

fn login(dir: &mut Directory, session: u64, name: &str) {
    dir.login(session, name, "pw").unwrap();
}

fn tiny_fleet() -> Vec<Ship> {
    vec![Ship::new(Position::new(0, 0), 1, Orientation::Horizontal).unwrap()]
}

#[test]
fn test_login_registers_and_rebinds() {
    let mut dir = Directory::new();
    let p = dir.login(1, "alice", "secret").unwrap();
    assert_eq!((p.id(), p.name(), p.wins()), (1, "alice", 0));

    assert_eq!(
        dir.login(2, "alice", "wrong").unwrap_err(),
        GameError::InvalidCredentials
    );
    assert_eq!(dir.player_by_name("alice").unwrap().id(), 1);

    let p = dir.login(3, "alice", "secret").unwrap();
    assert_eq!(p.id(), 3);
    assert!(dir.player_by_session(1).is_none());
    assert_eq!(dir.player_by_session(3).unwrap().name(), "alice");
}

#[test]
fn test_create_room_twice() {
    let mut dir = Directory::new();
    assert_eq!(dir.create_room(1).unwrap_err(), GameError::UnknownPlayer);

    login(&mut dir, 1, "alice");
    let room = dir.create_room(1).unwrap().id;
    assert_eq!(room, 1);
    assert_eq!(dir.create_room(1).unwrap_err(), GameError::RoomAlreadyExists);
    assert_eq!(dir.rooms().count(), 1);
}

#[test]
fn test_join_room_creates_game() {
    let mut dir = Directory::new();
    login(&mut dir, 1, "alice");
    login(&mut dir, 2, "bob");
    let room = dir.create_room(1).unwrap().id;
    dir.create_room(2).unwrap();

    assert!(dir.join_room(room, 1).unwrap().is_none());
    assert_eq!(dir.join_room(99, 2).unwrap_err(), GameError::RoomNotFound);
    assert_eq!(dir.join_room(room, 7).unwrap_err(), GameError::UnknownPlayer);

    let game = dir.join_room(room, 2).unwrap().unwrap();
    assert_eq!(game.players(), [1, 2]);
    assert_eq!(game.status(), GameStatus::Created);
    let game = game.id();

    // Both the joined room and the joiner's own room are gone.
    assert_eq!(dir.rooms().count(), 0);
    assert_eq!(dir.active_games(), 1);
    assert!(dir.game(game).is_some());
}

#[test]
fn test_single_player_places_bot_fleet() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut dir = Directory::new();
    assert_eq!(
        dir.start_single_player(1, &mut rng).unwrap_err(),
        GameError::UnknownPlayer
    );
    login(&mut dir, 1, "alice");
    dir.create_room(1).unwrap();

    let game = dir.start_single_player(1, &mut rng).unwrap();
    assert_eq!(game.players(), [BOT_ID, 1]);
    assert_eq!(game.ships_of(BOT_ID).len(), FLEET.len());
    assert!(game.ships_of(1).is_empty());
    assert_eq!(dir.rooms().count(), 0);
}

#[test]
fn test_add_ships_reports_start_once() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut dir = Directory::new();
    login(&mut dir, 1, "alice");
    login(&mut dir, 2, "bob");
    let room = dir.create_room(1).unwrap().id;
    let game = dir.join_room(room, 2).unwrap().unwrap().id();

    assert_eq!(
        dir.add_ships(99, 1, tiny_fleet(), &mut rng).unwrap_err(),
        GameError::MatchNotFound
    );
    assert!(dir.add_ships(game, 1, tiny_fleet(), &mut rng).unwrap().is_none());
    assert_eq!(
        dir.add_ships(game, 1, tiny_fleet(), &mut rng).unwrap_err(),
        GameError::AlreadyPlaced
    );
    let started = dir.add_ships(game, 2, tiny_fleet(), &mut rng).unwrap().unwrap();
    assert_eq!(started.status(), GameStatus::Started);
}

#[test]
fn test_finished_game_is_closed_and_credited() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut dir = Directory::new();
    login(&mut dir, 1, "alice");
    login(&mut dir, 2, "bob");
    let room = dir.create_room(1).unwrap().id;
    let game = dir.join_room(room, 2).unwrap().unwrap().id();
    dir.add_ships(game, 1, tiny_fleet(), &mut rng).unwrap();
    let first = dir
        .add_ships(game, 2, tiny_fleet(), &mut rng)
        .unwrap()
        .unwrap()
        .current_player();

    let outcome = dir
        .attack(game, first, Some(Position::new(0, 0)), &mut rng)
        .unwrap();
    assert_eq!(outcome.status, GameStatus::Finished);
    assert_eq!(outcome.winner, Some(first));
    assert_eq!(outcome.players, [1, 2]);
    assert!(dir.game(game).is_none());

    let winners = dir.winners();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].id(), first);
    assert_eq!(winners[0].wins(), 1);

    assert_eq!(
        dir.attack(game, first, None, &mut rng).unwrap_err(),
        GameError::MatchNotFound
    );
}

#[test]
fn test_logout_forfeits_running_game() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut dir = Directory::new();
    login(&mut dir, 1, "alice");
    login(&mut dir, 2, "bob");
    login(&mut dir, 3, "carol");
    let room = dir.create_room(1).unwrap().id;
    let game = dir.join_room(room, 2).unwrap().unwrap().id();
    dir.add_ships(game, 1, tiny_fleet(), &mut rng).unwrap();
    dir.add_ships(game, 2, tiny_fleet(), &mut rng).unwrap();
    dir.create_room(3).unwrap();

    let logout = dir.logout(1);
    assert!(logout.closed_rooms.is_empty());
    assert_eq!(logout.closed_games.len(), 1);
    assert_eq!(logout.closed_games[0].winner(), Some(2));
    assert!(dir.game(game).is_none());
    assert_eq!(dir.player_by_name("bob").unwrap().wins(), 1);

    // A second logout finds nothing left to forfeit.
    let again = dir.logout(1);
    assert!(again.closed_games.is_empty());
    assert_eq!(dir.player_by_name("bob").unwrap().wins(), 1);

    let logout = dir.logout(3);
    assert_eq!(logout.closed_rooms.len(), 1);
    assert_eq!(dir.rooms().count(), 0);
}

#[test]
fn test_bot_wins_are_not_credited() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut dir = Directory::new();
    login(&mut dir, 1, "alice");
    let game = dir.start_single_player(1, &mut rng).unwrap().id();
    dir.add_ships(game, 1, tiny_fleet(), &mut rng).unwrap();

    let logout = dir.logout(1);
    assert_eq!(logout.closed_games[0].winner(), Some(BOT_ID));
    assert!(dir.winners().is_empty());
}

#[test]
fn test_winners_sorted_stably() {
    let mut dir = Directory::new();
    for (session, name) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
        login(&mut dir, session, name);
    }
    // "d" wins twice, "b" and "c" once each; "a" never.
    for (winner, loser) in [(2, 1), (3, 1), (4, 1), (4, 1)] {
        let room = dir.create_room(winner).unwrap().id;
        dir.join_room(room, loser).unwrap();
        dir.logout(loser);
    }
    let names: Vec<_> = dir.winners().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["d", "b", "c"]);
}

#[test]
fn test_session_cannot_log_in_twice_under_different_names() {
    let mut dir = Directory::new();
    login(&mut dir, 1, "alice");

    assert_eq!(
        dir.login(1, "bob", "pw").unwrap_err(),
        GameError::AlreadyLoggedIn
    );
    assert!(dir.player_by_name("bob").is_none());
    assert_eq!(dir.player_by_session(1).unwrap().name(), "alice");

    // Same name again on the same session is fine.
    assert_eq!(dir.login(1, "alice", "pw").unwrap().id(), 1);

    // Once alice moves to another session, the old one is free.
    login(&mut dir, 2, "alice");
    assert_eq!(dir.login(1, "bob", "pw").unwrap().id(), 1);
    assert_eq!(dir.player_by_session(2).unwrap().name(), "alice");
}
