use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    thread,
};

use log::debug;

use crate::{engine::EngineHandle, position::Position};

/// Counts the leaf nodes of the legal move tree of `engine` to the given depth.
///
/// At depth 1 the legal moves are counted without being played.
pub fn perft<E: EngineHandle>(engine: &E, depth: u16) -> u64 {
    match depth {
        0 => 1,
        1 => engine.legal_moves().len() as u64,
        _ => engine
            .legal_moves()
            .into_iter()
            .map(|mv| {
                let mut child = engine.duplicate();
                child.apply_move(mv);
                perft(&child, depth - 1)
            })
            .sum(),
    }
}

/// Counts the leaf nodes beneath each legal move of `engine`, in the order the engine generates them.
///
/// The root moves are shared between `threads` workers, each taking the next unclaimed move.
pub fn divide<E: EngineHandle>(engine: &E, depth: u16, threads: usize) -> Vec<(String, u64)> {
    let moves = engine.legal_moves();
    if depth == 0 {
        return Vec::new();
    }

    let next = AtomicUsize::new(0);
    let results = Mutex::new(vec![0u64; moves.len()]);
    let threads = threads.clamp(1, moves.len().max(1));
    debug!("Divide to depth {} over {} root moves with {} threads", depth, moves.len(), threads);

    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(mv) = moves.get(index) else {
                    break;
                };

                let mut child = engine.duplicate();
                child.apply_move(*mv);
                let nodes = perft(&child, depth - 1);
                results.lock().expect("No perft worker should panic while holding the results")[index] = nodes;
            });
        }
    });

    let results = results.into_inner().expect("No perft worker should panic while holding the results");
    moves.iter().zip(results).map(|(mv, nodes)| (engine.move_to_uci(*mv), nodes)).collect()
}

impl<E: EngineHandle> Position<E> {
    /// Counts the leaf nodes of the legal move tree to the given depth.
    pub fn perft(&self, depth: u16) -> u64 {
        perft(self.engine(), depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position() {
        let position = Position::new("chess", false).unwrap();
        assert_eq!(position.perft(0), 1);
        assert_eq!(position.perft(1), 20);
        assert_eq!(position.perft(2), 400);
        assert_eq!(position.perft(3), 8902);
    }

    #[test]
    fn test_divide_matches_perft() {
        let position = Position::new("chess", false).unwrap();
        let divided = divide(position.engine(), 3, 4);
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, nodes)| nodes).sum::<u64>(), 8902);
        assert!(divided.iter().any(|(mv, nodes)| mv == "e2e4" && *nodes == 600));
    }

    #[test]
    fn test_divide_on_terminal_position() {
        let position =
            Position::from_fen("chess", "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", false).unwrap();
        assert!(divide(position.engine(), 2, 2).is_empty());
        assert_eq!(position.perft(2), 0);
    }
}
