//! Game record with variations.
//!
//! A [`Game`] owns an arena of [`Node`]s. The root holds the start position;
//! every other node holds the move that reached it and the resulting
//! position. Children are ordered and the first child is the main line.
//! A cursor selects the current node, and the outcome is recomputed
//! whenever the cursor moves.

use crate::config::GameConfig;
use crate::rules::{self, GameResult, Method};
use crate::san::{move_to_san, san_to_move, SanError};
use crate::{movegen, MoveError, MoveList, Position};
use chess_core::{Color, FenError, Move, Piece};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors returned by [`Game`] operations. A failed operation leaves the
/// game untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error(transparent)]
    San(#[from] SanError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("invalid UCI move: {0}")]
    InvalidUci(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("game has already ended")]
    GameAlreadyOver,

    #[error("cannot claim draw: conditions not met")]
    CannotClaimDraw,

    #[error("no such node")]
    UnknownNode,
}

impl GameError {
    /// Well-formed input naming a move that cannot be played here.
    pub fn is_illegal_move(&self) -> bool {
        match self {
            GameError::San(e) => !e.is_format_error(),
            GameError::Move(_) | GameError::IllegalMove(_) => true,
            _ => false,
        }
    }

    /// Malformed FEN, SAN or UCI text.
    pub fn is_format_error(&self) -> bool {
        match self {
            GameError::San(e) => e.is_format_error(),
            GameError::Fen(_) | GameError::InvalidUci(_) => true,
            _ => false,
        }
    }
}

/// Index of a node in a [`Game`]. Ids stay valid for the life of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The start position.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in creation order.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A position in the game tree.
#[derive(Debug, Clone)]
pub struct Node {
    position: Position,
    key: u64,
    mov: Option<Move>,
    san: Option<String>,
    comments: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(position: Position, mov: Option<Move>, san: Option<String>, parent: Option<NodeId>) -> Self {
        Node {
            key: position.zobrist_hash(),
            position,
            mov,
            san,
            comments: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// The position after [`mov`](Node::mov).
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The move that led here; `None` at the root.
    pub fn mov(&self) -> Option<Move> {
        self.mov
    }

    /// SAN of [`mov`](Node::mov) as played from the parent position.
    pub fn san(&self) -> Option<&str> {
        self.san.as_deref()
    }

    /// Comments attached after this move.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// `None` at the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Continuations, main line first.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The first child, i.e. the main-line continuation.
    pub fn main_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Options for pushing a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Insert a new node as the first child, making it the main line.
    pub force_mainline: bool,
}

impl PushOptions {
    /// Options with `force_mainline` set.
    pub const MAINLINE: PushOptions = PushOptions {
        force_mainline: true,
    };
}

/// Ordered PGN-style header pairs such as `Event` or `White`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPairs(Vec<(String, String)>);

impl TagPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping its original place if already present.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ways a game ends without reaching a terminal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The given side resigned.
    Resignation(Color),
    DrawAgreement,
    /// A claim under the fifty-move rule or threefold repetition.
    DrawClaim(Method),
}

impl Termination {
    fn outcome(self) -> (GameResult, Method) {
        match self {
            Termination::Resignation(color) => {
                (GameResult::win_for(color.opposite()), Method::Resignation)
            }
            Termination::DrawAgreement => (GameResult::Draw, Method::DrawAgreement),
            Termination::DrawClaim(method) => (GameResult::Draw, method),
        }
    }
}

/// A game tree with a cursor.
///
/// # Example
///
/// ```
/// use chess_engine::{Game, PushOptions};
///
/// let mut game = Game::new();
/// game.push_move("e4", PushOptions::default()).unwrap();
/// game.push_move("e5", PushOptions::default()).unwrap();
/// game.go_back();
/// game.push_move("c5", PushOptions::default()).unwrap();
///
/// assert_eq!(game.to_string(), "1. e4 e5 (1... c5) *");
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    nodes: Vec<Node>,
    cursor: NodeId,
    tags: TagPairs,
    config: GameConfig,
    termination: Option<Termination>,
    result: GameResult,
    method: Method,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// A game whose root is `position`.
    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            nodes: vec![Node::new(position, None, None, None)],
            cursor: NodeId::ROOT,
            tags: TagPairs::new(),
            config: GameConfig::default(),
            termination: None,
            result: GameResult::InProgress,
            method: Method::None,
        };
        game.refresh();
        game
    }

    /// A game starting from a FEN position.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Replaces the draw configuration.
    #[must_use]
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.set_config(config);
        self
    }

    /// Replaces the draw configuration and re-evaluates the cursor.
    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
        self.refresh();
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Id of the start position, always [`NodeId::ROOT`].
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The current node.
    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Looks up a node; `None` for an id from another game.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn current(&self) -> &Node {
        &self.nodes[self.cursor.0]
    }

    // ---- moves ----

    /// Plays a SAN move at the cursor.
    ///
    /// An existing child with the same move is reused. Otherwise a new node
    /// becomes the main line when `options.force_mainline` is set or the
    /// cursor has no children, and a new variation after the existing
    /// children otherwise. The cursor moves to the resulting node.
    pub fn push_move(&mut self, text: &str, options: PushOptions) -> Result<NodeId, GameError> {
        self.ensure_in_progress()?;
        let m = san_to_move(self.position(), text)?;
        Ok(self.insert(m, options))
    }

    /// Plays a UCI move such as `e2e4` or `e7e8q` at the cursor. A pawn
    /// reaching the last rank without a promotion letter becomes a queen.
    pub fn push_uci(&mut self, text: &str, options: PushOptions) -> Result<NodeId, GameError> {
        let m = Move::from_uci(text.trim()).ok_or_else(|| GameError::InvalidUci(text.to_string()))?;
        self.push(m, options)
    }

    /// Plays `m` at the cursor after checking it is legal.
    pub fn push(&mut self, m: Move, options: PushOptions) -> Result<NodeId, GameError> {
        self.ensure_in_progress()?;
        let legal = self.resolve(m).ok_or_else(|| GameError::IllegalMove(m.to_uci()))?;
        Ok(self.insert(legal, options))
    }

    /// The generator's copy of `m`, defaulting a missing promotion piece to
    /// a queen.
    fn resolve(&self, m: Move) -> Option<Move> {
        let legal = self.legal_moves();
        let exact = legal.iter().find(|candidate| **candidate == m);
        let queened = || {
            legal.iter().find(|candidate| {
                m.promotion_piece().is_none()
                    && candidate.from() == m.from()
                    && candidate.to() == m.to()
                    && candidate.promotion_piece() == Some(Piece::Queen)
            })
        };
        exact.or_else(queened).copied()
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.result.is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        Ok(())
    }

    fn insert(&mut self, m: Move, options: PushOptions) -> NodeId {
        let parent = self.cursor;
        let existing = self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].mov == Some(m));

        let id = match existing {
            Some(id) => {
                trace!(node = id.0, mv = %m, "reusing existing child");
                id
            }
            None => {
                let before = &self.nodes[parent.0].position;
                let san = move_to_san(before, m);
                let position = movegen::make_move(before, m);
                let id = NodeId(self.nodes.len());
                self.nodes.push(Node::new(position, Some(m), Some(san), Some(parent)));

                let siblings = &mut self.nodes[parent.0].children;
                if options.force_mainline || siblings.is_empty() {
                    siblings.insert(0, id);
                } else {
                    siblings.push(id);
                }
                debug!(
                    node = id.0,
                    parent = parent.0,
                    mv = %m,
                    variation = siblings.first() != Some(&id),
                    "added node"
                );
                id
            }
        };

        self.cursor = id;
        self.refresh();
        id
    }

    // ---- navigation ----

    /// Moves to the parent. Returns false at the root.
    pub fn go_back(&mut self) -> bool {
        match self.current().parent {
            Some(parent) => {
                self.set_cursor(parent);
                true
            }
            None => false,
        }
    }

    /// Moves to the main-line child. Returns false at a leaf.
    pub fn go_forward(&mut self) -> bool {
        match self.current().main_child() {
            Some(child) => {
                self.set_cursor(child);
                true
            }
            None => false,
        }
    }

    /// Moves the cursor to the root.
    pub fn go_to_start(&mut self) {
        self.set_cursor(NodeId::ROOT);
    }

    /// Follows main-line children from the cursor to a leaf.
    pub fn go_to_end(&mut self) {
        let mut id = self.cursor;
        while let Some(child) = self.nodes[id.0].main_child() {
            id = child;
        }
        self.set_cursor(id);
    }

    /// Moves the cursor to any node of the tree.
    pub fn go_to(&mut self, id: NodeId) -> Result<(), GameError> {
        if id.0 >= self.nodes.len() {
            return Err(GameError::UnknownNode);
        }
        self.set_cursor(id);
        Ok(())
    }

    /// Moves the cursor to the closest node at or above it that lies on the
    /// main line from the root.
    pub fn navigate_to_main_line(&mut self) {
        let mut id = self.cursor;
        while !self.is_on_main_line(id) {
            match self.nodes[id.0].parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
        self.set_cursor(id);
    }

    /// True when every step from the root to `id` takes the first child.
    pub fn is_on_main_line(&self, id: NodeId) -> bool {
        let mut id = id;
        while let Some(parent) = self.nodes.get(id.0).and_then(|n| n.parent) {
            if self.nodes[parent.0].main_child() != Some(id) {
                return false;
            }
            id = parent;
        }
        true
    }

    pub fn is_at_start(&self) -> bool {
        self.cursor == NodeId::ROOT
    }

    /// True when the cursor node has no continuation.
    pub fn is_at_end(&self) -> bool {
        self.current().children.is_empty()
    }

    fn set_cursor(&mut self, id: NodeId) {
        if id != self.cursor {
            trace!(from = self.cursor.0, to = id.0, "cursor moved");
            self.cursor = id;
            self.refresh();
        }
    }

    // ---- queries ----

    /// Position at the cursor.
    pub fn position(&self) -> &Position {
        &self.current().position
    }

    /// Position at the root.
    pub fn start_position(&self) -> &Position {
        &self.nodes[0].position
    }

    /// Node ids from the root to the cursor.
    pub fn path(&self) -> Vec<NodeId> {
        let mut path = vec![self.cursor];
        let mut id = self.cursor;
        while let Some(parent) = self.nodes[id.0].parent {
            path.push(parent);
            id = parent;
        }
        path.reverse();
        path
    }

    /// Every position from the root to the cursor.
    pub fn positions(&self) -> Vec<&Position> {
        self.path().into_iter().map(|id| &self.nodes[id.0].position).collect()
    }

    /// Moves from the root to the cursor.
    pub fn moves(&self) -> Vec<Move> {
        self.path().into_iter().filter_map(|id| self.nodes[id.0].mov).collect()
    }

    /// SAN of the moves from the root to the cursor.
    pub fn san_moves(&self) -> Vec<&str> {
        self.path()
            .into_iter()
            .filter_map(|id| self.nodes[id.0].san.as_deref())
            .collect()
    }

    /// Moves along first children from the root.
    pub fn main_line(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut id = NodeId::ROOT;
        while let Some(child) = self.nodes[id.0].main_child() {
            moves.extend(self.nodes[child.0].mov);
            id = child;
        }
        moves
    }

    /// Children of `id`, main line first. Empty for unknown ids.
    pub fn variations(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    /// Legal moves at the cursor, sorted.
    pub fn legal_moves(&self) -> MoveList {
        self.position().legal_moves()
    }

    pub fn is_check(&self) -> bool {
        self.position().is_check()
    }

    /// FEN of the cursor position.
    pub fn to_fen(&self) -> String {
        self.position().to_fen()
    }

    /// Half-moves from the root to the cursor.
    pub fn ply_count(&self) -> usize {
        self.path().len() - 1
    }

    /// Occurrences of the cursor position along the path from the root.
    pub fn repetition_count(&self) -> usize {
        rules::repetition_count(&self.path_keys())
    }

    fn path_keys(&self) -> Vec<u64> {
        self.path().into_iter().map(|id| self.nodes[id.0].key).collect()
    }

    // ---- variations ----

    /// Makes `id` the first child of its parent. The root is left alone.
    pub fn promote_variation(&mut self, id: NodeId) -> Result<(), GameError> {
        let parent = self.node(id).ok_or(GameError::UnknownNode)?.parent;
        if let Some(parent) = parent {
            let siblings = &mut self.nodes[parent.0].children;
            if let Some(index) = siblings.iter().position(|c| *c == id) {
                siblings.remove(index);
                siblings.insert(0, id);
                debug!(node = id.0, "promoted variation");
            }
            self.refresh();
        }
        Ok(())
    }

    // ---- comments ----

    /// Appends a comment to the cursor node.
    pub fn add_comment(&mut self, text: impl Into<String>) {
        let cursor = self.cursor.0;
        self.nodes[cursor].comments.push(text.into());
    }

    /// Replaces every comment on the cursor node with `text`.
    pub fn set_comment(&mut self, text: impl Into<String>) {
        let cursor = self.cursor.0;
        self.nodes[cursor].comments = vec![text.into()];
    }

    /// Comments of every node in the tree, keyed by node.
    pub fn comments(&self) -> BTreeMap<NodeId, Vec<String>> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.comments.is_empty())
            .map(|(index, node)| (NodeId(index), node.comments.clone()))
            .collect()
    }

    // ---- tag pairs ----

    /// Sets a header tag, replacing any previous value.
    pub fn add_tag_pair(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.add(key, value);
    }

    pub fn get_tag_pair(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }

    pub fn remove_tag_pair(&mut self, key: &str) -> Option<String> {
        self.tags.remove(key)
    }

    /// All header tags in insertion order.
    pub fn tag_pairs(&self) -> &TagPairs {
        &self.tags
    }

    // ---- outcome ----

    /// Result at the cursor, or the fixed result of an external termination.
    pub fn outcome(&self) -> GameResult {
        self.result
    }

    /// How [`outcome`](Game::outcome) was reached.
    pub fn method(&self) -> Method {
        self.method
    }

    /// True once a result other than `*` is known.
    pub fn is_over(&self) -> bool {
        self.result.is_over()
    }

    /// The external event that ended the game, if any.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// `color` resigns.
    pub fn resign(&mut self, color: Color) -> Result<(), GameError> {
        self.terminate(Termination::Resignation(color))
    }

    /// Both players agree to a draw.
    pub fn agree_draw(&mut self) -> Result<(), GameError> {
        self.terminate(Termination::DrawAgreement)
    }

    /// Draws the side to move may claim at the cursor.
    pub fn eligible_draws(&self) -> Vec<Method> {
        if self.is_over() {
            return Vec::new();
        }
        rules::eligible_draws(self.position(), &self.path_keys())
    }

    /// Ends the game by claiming `method`, which must be eligible.
    pub fn claim_draw(&mut self, method: Method) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        if !self.eligible_draws().contains(&method) {
            return Err(GameError::CannotClaimDraw);
        }
        self.terminate(Termination::DrawClaim(method))
    }

    fn terminate(&mut self, termination: Termination) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        debug!(?termination, "game terminated");
        self.termination = Some(termination);
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        let (result, method) = match self.termination {
            Some(termination) => termination.outcome(),
            None => rules::evaluate(self.position(), &self.path_keys(), &self.config),
        };
        if result != self.result || method != self.method {
            debug!(%result, %method, node = self.cursor.0, "outcome changed");
        }
        self.result = result;
        self.method = method;
    }

    // ---- export ----

    fn write_line(&self, from: NodeId, mut force_number: bool, tokens: &mut Vec<String>) {
        let mut id = from;
        loop {
            let node = &self.nodes[id.0];
            let Some((&main, variations)) = node.children.split_first() else {
                break;
            };
            self.write_move(main, force_number, tokens);

            for &variation in variations {
                let mut inner = Vec::new();
                self.write_move(variation, true, &mut inner);
                let commented = !self.nodes[variation.0].comments.is_empty();
                self.write_line(variation, commented, &mut inner);
                tokens.push(format!("({})", inner.join(" ")));
            }

            force_number = !variations.is_empty() || !self.nodes[main.0].comments.is_empty();
            id = main;
        }
    }

    fn write_move(&self, id: NodeId, force_number: bool, tokens: &mut Vec<String>) {
        let node = &self.nodes[id.0];
        let Some(parent) = node.parent else {
            return;
        };
        let before = &self.nodes[parent.0].position;
        match before.side_to_move {
            Color::White => tokens.push(format!("{}.", before.fullmove_number)),
            Color::Black if force_number => tokens.push(format!("{}...", before.fullmove_number)),
            Color::Black => {}
        }
        if let Some(san) = &node.san {
            tokens.push(san.clone());
        }
        tokens.extend(node.comments.iter().map(|c| format!("{{{c}}}")));
    }
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// PGN text: tag pairs, movetext with comments and variations, result.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.tags.iter() {
            writeln!(f, "[{} \"{}\"]", key, escape_tag(value))?;
        }
        if !self.tags.is_empty() {
            writeln!(f)?;
        }

        let root = &self.nodes[0];
        let mut tokens: Vec<String> = root.comments.iter().map(|c| format!("{{{c}}}")).collect();
        self.write_line(NodeId::ROOT, true, &mut tokens);
        tokens.push(self.result.as_pgn().to_string());
        write!(f, "{}", tokens.join(" "))
    }
}
