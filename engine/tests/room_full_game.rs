//! End-to-end coverage for `Room` driving a game through to completion,
//! the kind of cross-module check a single file's `#[cfg(test)]` module
//! can't exercise since it needs `Room`, `GameType::new_engine`, and a
//! `GameEngine` impl wired together the way the server crate actually
//! uses them.

use tablehub_engine::{GameType, Move, Room, RoomLifecycle, Seat};

#[test]
fn tic_tac_toe_plays_to_a_win_and_supports_rematch() {
    let mut room = Room::new(
        "ABCD".to_string(),
        Seat::human("x".to_string(), "X".to_string()),
        GameType::TicTacToe,
    );
    room.join(Seat::human("o".to_string(), "O".to_string())).unwrap();
    room.start(0, tablehub_engine::BotDifficulty::Easy, || unreachable!()).unwrap();
    assert_eq!(room.lifecycle(), RoomLifecycle::Playing);

    let engine = room.engine.as_mut().unwrap();
    // X takes the top row, O takes the middle column; X wins on the third move.
    let moves = [
        ("x", Move::PlaceMark { row: 0, col: 0 }),
        ("o", Move::PlaceMark { row: 1, col: 1 }),
        ("x", Move::PlaceMark { row: 0, col: 1 }),
        ("o", Move::PlaceMark { row: 2, col: 1 }),
        ("x", Move::PlaceMark { row: 0, col: 2 }),
    ];
    for (player, mv) in moves {
        let outcome = engine.make_move(&player.to_string(), mv);
        assert!(outcome.valid, "{player}'s move was rejected: {:?}", outcome.message);
    }
    assert!(engine.is_over());

    let quorum_x = room.request_rematch(&"x".to_string()).unwrap();
    assert!(!quorum_x, "o hasn't voted yet");
    let quorum_o = room.request_rematch(&"o".to_string()).unwrap();
    assert!(quorum_o, "both seats have now voted");
    assert!(!room.engine.as_ref().unwrap().is_over(), "rematch should reset the engine");
}

#[test]
fn out_of_turn_move_is_rejected_without_mutating_state() {
    let mut room = Room::new(
        "EFGH".to_string(),
        Seat::human("x".to_string(), "X".to_string()),
        GameType::TicTacToe,
    );
    room.join(Seat::human("o".to_string(), "O".to_string())).unwrap();
    room.start(0, tablehub_engine::BotDifficulty::Easy, || unreachable!()).unwrap();

    let engine = room.engine.as_mut().unwrap();
    let outcome = engine.make_move(&"o".to_string(), Move::PlaceMark { row: 0, col: 0 });
    assert!(!outcome.valid, "o moved before x, the opening player");
    assert_eq!(engine.current_actor(), Some("x".to_string()));
}

#[test]
fn two_player_room_closes_as_soon_as_either_human_leaves() {
    // TicTacToe's min_players() is 2, so dropping below that threshold
    // happens on the very first departure, unlike a lobby-mode game.
    let mut room = Room::new(
        "IJKL".to_string(),
        Seat::human("x".to_string(), "X".to_string()),
        GameType::TicTacToe,
    );
    room.join(Seat::human("o".to_string(), "O".to_string())).unwrap();
    room.start(0, tablehub_engine::BotDifficulty::Easy, || unreachable!()).unwrap();

    room.remove(&"o".to_string());
    assert_eq!(room.lifecycle(), RoomLifecycle::Closed);
}

#[test]
fn lobby_mode_room_stays_open_with_one_human_and_bots_seated() {
    // Poker's min_players() is 1, so a human leaving a bot-filled table
    // doesn't close the room on its own.
    let mut room = Room::new(
        "MNOP".to_string(),
        Seat::human("h1".to_string(), "H1".to_string()),
        GameType::Poker,
    );
    room.join(Seat::human("h2".to_string(), "H2".to_string())).unwrap();
    let mut n = 0;
    room.start(1, tablehub_engine::BotDifficulty::Medium, || {
        n += 1;
        format!("bot-{n}")
    }).unwrap();

    room.remove(&"h2".to_string());
    assert_eq!(room.lifecycle(), RoomLifecycle::Playing, "one human plus bots remain");
}
