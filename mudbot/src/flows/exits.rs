//! Compass directions and exit-list parsing.
//!
//! kmud ends every room description with a line such as
//!
//! ```text
//!  Exits: [N]orth [NE]North East [S]outh [U]p
//! ```
//!
//! The markers always appear in the same order, so the line is matched by a
//! single regex with one optional named group per compass direction.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::channel::Match;

/// One of the eight compass directions a bot can walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions, in the order the server lists them.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The movement command sent to the server.
    pub fn code(&self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }

    /// Name of this direction's capture group in [`EXIT_LIST_PATTERN`].
    pub fn capture_name(&self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Matches one complete exit line.
///
/// Each direction is an optional `[CODE]label` group; up/down markers and
/// the literal `None` are accepted and ignored. The trailing newline keeps a
/// half-received line from matching early.
pub const EXIT_LIST_PATTERN: &str = concat!(
    r"Exits:[ \t]*",
    r"(?:\[(?P<n>N)\][^\[\r\n]*)?",
    r"(?:\[(?P<ne>NE)\][^\[\r\n]*)?",
    r"(?:\[(?P<e>E)\][^\[\r\n]*)?",
    r"(?:\[(?P<se>SE)\][^\[\r\n]*)?",
    r"(?:\[(?P<s>S)\][^\[\r\n]*)?",
    r"(?:\[(?P<sw>SW)\][^\[\r\n]*)?",
    r"(?:\[(?P<w>W)\][^\[\r\n]*)?",
    r"(?:\[(?P<nw>NW)\][^\[\r\n]*)?",
    r"(?:\[[UD]\][^\[\r\n]*)*",
    r"(?:None)?[ \t]*\r?\n",
);

/// The set of directions leaving the current room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitSet {
    present: [bool; 8],
}

impl ExitSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a match of [`EXIT_LIST_PATTERN`].
    pub fn from_match<T>(found: &Match<T>) -> Self {
        Direction::ALL
            .into_iter()
            .filter(|dir| found.has(dir.capture_name()))
            .collect()
    }

    /// Add a direction.
    pub fn insert(&mut self, direction: Direction) {
        self.present[direction.index()] = true;
    }

    /// Check if `direction` is an exit.
    pub fn contains(&self, direction: Direction) -> bool {
        self.present[direction.index()]
    }

    /// Check if the room has no compass exits.
    pub fn is_empty(&self) -> bool {
        !self.present.iter().any(|p| *p)
    }

    /// Number of compass exits.
    pub fn len(&self) -> usize {
        self.present.iter().filter(|p| **p).count()
    }

    /// Present directions in server order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|dir| self.contains(*dir))
    }

    /// Pick a present direction uniformly at random.
    ///
    /// Returns `None` for a room with no exits.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Direction> {
        let exits: Vec<Direction> = self.iter().collect();
        exits.choose(rng).copied()
    }
}

impl FromIterator<Direction> for ExitSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = ExitSet::new();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}
