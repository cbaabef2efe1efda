use std::sync::Arc;

use crate::{
    chess::{Bitboard, CastlingRight, Move, Square},
    zobrist::Zobrist,
};

/// The bookkeeping the rule engine records for every position of a game.
///
/// A new record is created for each applied move and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInfo {
    pub castling_rights: CastlingRight,
    pub en_passant_square: Option<Square>,
    /// Plies since the last capture or pawn move.
    pub rule50: u16,
    /// Plies since the root of the history.
    pub plies_from_null: u16,
    pub key: Zobrist,
    /// Pieces giving check to the side to move.
    pub checkers: Bitboard,
    /// Distance to the previous occurrence of the same position, negative if that occurrence was itself a repetition,
    /// zero if the position did not occur before.
    pub repetition: i32,
    pub last_move: Option<Move>,
}

/// One link of the history chain.
///
/// Nodes form a persistent singly linked list: each node shares ownership of its predecessor, so positions derived from
/// a common ancestor share the prefix of their history and only own the nodes they appended themselves.
#[derive(Debug)]
pub struct StateNode {
    previous: Option<Arc<StateNode>>,
    depth: usize,
    info: StateInfo,
}

impl StateNode {
    /// Creates the first node of a history.
    pub fn root(info: StateInfo) -> Arc<StateNode> {
        Arc::new(StateNode { previous: None, depth: 1, info })
    }

    /// Creates a new node whose predecessor is `previous`. The predecessor is shared, never copied.
    pub fn extend(previous: &Arc<StateNode>, info: StateInfo) -> Arc<StateNode> {
        Arc::new(StateNode { previous: Some(Arc::clone(previous)), depth: previous.depth + 1, info })
    }

    /// Returns the bookkeeping of this node.
    pub fn info(&self) -> &StateInfo {
        &self.info
    }

    /// Returns the node recorded one ply earlier.
    pub fn previous(&self) -> Option<&StateNode> {
        self.previous.as_deref()
    }

    /// Returns the node recorded `plies` plies earlier.
    pub fn ancestor(&self, plies: usize) -> Option<&StateNode> {
        let mut node = self;
        for _ in 0..plies {
            node = node.previous()?;
        }
        Some(node)
    }

    /// Returns the number of nodes in the chain ending with this node.
    pub fn len(&self) -> usize {
        self.depth
    }
}

impl Drop for StateNode {
    /// Releases the chain iteratively, so that dropping a very long history does not recurse once per node.
    fn drop(&mut self) {
        let mut previous = self.previous.take();
        while let Some(node) = previous {
            match Arc::try_unwrap(node) {
                Ok(mut node) => previous = node.previous.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(key: Zobrist) -> StateInfo {
        StateInfo {
            castling_rights: CastlingRight::empty(),
            en_passant_square: None,
            rule50: 0,
            plies_from_null: 0,
            key,
            checkers: Bitboard::EMPTY,
            repetition: 0,
            last_move: None,
        }
    }

    #[test]
    fn test_extend_shares_prefix() {
        let root = StateNode::root(info(1));
        let left = StateNode::extend(&root, info(2));
        let right = StateNode::extend(&root, info(3));

        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert!(std::ptr::eq(left.previous().unwrap(), right.previous().unwrap()));
        assert_eq!(Arc::strong_count(&root), 3);
    }

    #[test]
    fn test_ancestor() {
        let mut node = StateNode::root(info(0));
        for key in 1..=5 {
            node = StateNode::extend(&node, info(key));
        }

        assert_eq!(node.ancestor(0).unwrap().info().key, 5);
        assert_eq!(node.ancestor(3).unwrap().info().key, 2);
        assert_eq!(node.ancestor(5).unwrap().info().key, 0);
        assert!(node.ancestor(6).is_none());
    }

    #[test]
    fn test_dropping_a_branch_keeps_shared_prefix_alive() {
        let root = StateNode::root(info(1));
        let child = StateNode::extend(&root, info(2));
        let grandchild = StateNode::extend(&child, info(3));

        drop(grandchild);
        assert_eq!(Arc::strong_count(&child), 1);
        assert_eq!(child.previous().unwrap().info().key, 1);
    }

    #[test]
    fn test_dropping_a_long_chain_does_not_overflow_the_stack() {
        let mut node = StateNode::root(info(0));
        for key in 1..500_000 {
            node = StateNode::extend(&node, info(key));
        }
        assert_eq!(node.len(), 500_000);
        drop(node);
    }
}
