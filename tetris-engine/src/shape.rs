//! Tetromino geometry and rotation

use serde::{Deserialize, Serialize};

use crate::matrix::Color;

/// Offset of a single block relative to the piece anchor
pub type Offset = (isize, isize);

/// Four block offsets of a piece in one orientation
pub type Offsets = [Offset; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
    ];

    pub fn default_color(&self) -> Color {
        match self {
            ShapeKind::I => Color::CYAN,
            ShapeKind::O => Color::YELLOW,
            ShapeKind::T => Color::PURPLE,
            ShapeKind::S => Color::GREEN,
            ShapeKind::Z => Color::RED,
            ShapeKind::J => Color::BLUE,
            ShapeKind::L => Color::ORANGE,
        }
    }

    /// Side of the square box the shape rotates in
    pub fn box_size(&self) -> usize {
        match self {
            ShapeKind::I => 4,
            ShapeKind::O => 2,
            _ => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::I => "I",
            ShapeKind::O => "O",
            ShapeKind::T => "T",
            ShapeKind::S => "S",
            ShapeKind::Z => "Z",
            ShapeKind::J => "J",
            ShapeKind::L => "L",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orientation, in clockwise quarter-turns from the spawn orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn rotate_right(&self) -> Rotation {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    fn index(&self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }
}

// Offset tables, one row per rotation. Each row is the clockwise
// quarter-turn of the previous one inside the shape's box:
// (x, y) -> (box - 1 - y, x).

const I_OFFSETS: [Offsets; 4] = [
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
    [(0, 1), (1, 1), (2, 1), (3, 1)],
];

const O_OFFSETS: [Offsets; 4] = [[(0, 0), (1, 0), (0, 1), (1, 1)]; 4];

const T_OFFSETS: [Offsets; 4] = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

const S_OFFSETS: [Offsets; 4] = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(1, 1), (2, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_OFFSETS: [Offsets; 4] = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

const J_OFFSETS: [Offsets; 4] = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

const L_OFFSETS: [Offsets; 4] = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

fn offset_table(kind: ShapeKind) -> &'static [Offsets; 4] {
    match kind {
        ShapeKind::I => &I_OFFSETS,
        ShapeKind::O => &O_OFFSETS,
        ShapeKind::T => &T_OFFSETS,
        ShapeKind::S => &S_OFFSETS,
        ShapeKind::Z => &Z_OFFSETS,
        ShapeKind::J => &J_OFFSETS,
        ShapeKind::L => &L_OFFSETS,
    }
}

/// One tetromino: kind, current orientation and block color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    kind: ShapeKind,
    rotation: Rotation,
    color: Color,
}

impl Shape {
    /// New shape in its spawn orientation
    pub fn new(kind: ShapeKind, color: Color) -> Self {
        Shape {
            kind,
            rotation: Rotation::R0,
            color,
        }
    }

    pub fn i(color: Color) -> Self {
        Self::new(ShapeKind::I, color)
    }

    pub fn o(color: Color) -> Self {
        Self::new(ShapeKind::O, color)
    }

    pub fn t(color: Color) -> Self {
        Self::new(ShapeKind::T, color)
    }

    pub fn s(color: Color) -> Self {
        Self::new(ShapeKind::S, color)
    }

    pub fn z(color: Color) -> Self {
        Self::new(ShapeKind::Z, color)
    }

    pub fn j(color: Color) -> Self {
        Self::new(ShapeKind::J, color)
    }

    pub fn l(color: Color) -> Self {
        Self::new(ShapeKind::L, color)
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn box_size(&self) -> usize {
        self.kind.box_size()
    }

    /// Cells occupied in the current orientation
    pub fn occupied_offsets(&self) -> Offsets {
        offset_table(self.kind)[self.rotation.index()]
    }

    /// Turn clockwise in place. Never checked against a board.
    pub fn rotate(&mut self) {
        self.rotation = self.rotation.rotate_right();
    }

    /// Copy turned clockwise
    pub fn rotated(&self) -> Shape {
        let mut shape = *self;
        shape.rotate();
        shape
    }

    /// Topmost occupied row of the current orientation
    pub(crate) fn top(&self) -> isize {
        self.occupied_offsets()
            .iter()
            .map(|&(_, dy)| dy)
            .min()
            .unwrap_or(0)
    }
}
