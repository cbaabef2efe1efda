use std::thread;

use ferz::{
    available_variants, initial_fen, register_variant, to_960_uci, validate_fen, Error, Notation, Options, Position,
    Variant, VALUE_DRAW, VALUE_MATE,
};

#[test]
fn test_every_variant_has_a_playable_start() {
    ferz::initialize();

    for variant in available_variants() {
        let fen = initial_fen(&variant).unwrap();
        assert!(validate_fen(&variant, &fen, false), "{} start is invalid", variant);

        let position = Position::new(&variant, false).unwrap();
        assert!(!position.get_legal_moves().is_empty(), "{} has no legal move", variant);
        assert_eq!(position.get_fen(false, false, 0), fen);
    }
}

#[test]
fn test_piece_counts() {
    assert_eq!(Position::new("chess", false).unwrap().pieces_on_board().len(), 32);
    assert_eq!(Position::new("capablanca", false).unwrap().pieces_on_board().len(), 40);
    assert!(Position::new("crazyhouse", false).unwrap().pieces_in_hand().is_empty());
}

#[test]
fn test_validate_fen() {
    assert!(validate_fen("chess", "4k3/8/8/8/8/8/8/4K3 w - - 0 1", false));
    assert!(!validate_fen("chess", "4k3/8/8/8/8/8/8/8 w - - 0 1", false));
    assert!(!validate_fen("notavariant", "4k3/8/8/8/8/8/8/4K3 w - - 0 1", false));
}

#[test]
fn test_make_moves_is_deterministic() {
    let start = Position::new("crazyhouse", false).unwrap();
    let moves = ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "P@d4"];
    let first = start.make_moves(&moves).unwrap();
    let second = start.make_moves(&moves).unwrap();

    assert_eq!(first.get_fen(false, false, 0), second.get_fen(false, false, 0));
    assert_eq!(first.get_legal_moves(), second.get_legal_moves());
    assert_eq!(first.get_fen(false, false, 0), "rnb1kbnr/ppp1pppp/8/q7/3P4/2N5/PPPP1PPP/R1BQKBNR[p] b KQkq - 0 4");
}

#[test]
fn test_branches_are_isolated_across_threads() {
    let start = Position::new("chess", false).unwrap().make_moves(&["e2e4", "e7e5"]).unwrap();
    let lines: [&[&str]; 3] = [&["g1f3", "b8c6"], &["f1c4", "f8c5"], &["d2d4", "e5d4"]];

    let results: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = lines
            .iter()
            .map(|line| {
                let start = start.clone();
                scope.spawn(move || start.make_moves(*line).unwrap().get_fen(false, false, 0))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(results[0], "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    assert_eq!(results[1], "rnbqk1nr/pppp1ppp/8/2b1p3/2B1P3/8/PPPP1PPP/RNBQK1NR w KQkq - 2 3");
    assert_eq!(results[2], "rnbqkbnr/pppp1ppp/8/8/3pP3/8/PPP2PPP/RNBQKBNR w KQkq - 0 3");
    assert_eq!(start.get_fen(false, false, 0), "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
}

#[test]
fn test_scholars_mate() {
    let position = Position::new("chess", false)
        .unwrap()
        .make_moves(&["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"])
        .unwrap();

    assert!(position.get_legal_moves().is_empty());
    assert!(position.gives_check());
    assert_eq!(position.game_result().unwrap(), -VALUE_MATE);
}

#[test]
fn test_registered_variant() {
    let variant = Variant::chess().based_on("shortdraw").with_n_move_rule(2);
    register_variant(variant).unwrap();
    assert!(available_variants().contains(&String::from("shortdraw")));

    let position = Position::new("shortdraw", false).unwrap().make_moves(&["g1f3", "g8f6", "b1c3"]).unwrap();
    assert_eq!(position.is_optional_game_end(0), None);
    let position = position.make_moves(&["b8c6"]).unwrap();
    assert_eq!(position.is_optional_game_end(0), Some(VALUE_DRAW));
}

#[test]
fn test_san_of_a_game() {
    let position = Position::new("chess", false).unwrap();
    let moves = to_960_uci("chess", &["e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "e1g1"]).unwrap();
    assert_eq!(moves[6], "e1h1");

    let sans = position.get_san_moves(&["e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "e1g1"], Notation::San);
    assert_eq!(sans.unwrap().last().map(String::as_str), Some("O-O"));
    assert!(matches!(
        position.get_san("e2e4", Notation::Janggi),
        Err(Error::UnsupportedNotation { notation: Notation::Janggi, .. })
    ));
}

#[test]
fn test_options() {
    Options::set_option("UCI_Variant", "capablanca").unwrap();
    Options::set_option("uci_chess960", "true").unwrap();

    let position = Position::from_options().unwrap();
    assert_eq!(position.variant(), "capablanca");
    assert!(position.is_chess960());

    Options::set_option("UCI_Variant", "chess").unwrap();
    Options::set_option("UCI_Chess960", "false").unwrap();
    assert_eq!(Position::from_options().unwrap().variant(), "chess");
}
