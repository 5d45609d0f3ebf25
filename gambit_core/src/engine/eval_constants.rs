// Piece Values (pawn units, White positive)
pub const VAL_PAWN: f64 = 1.0;
pub const VAL_KNIGHT: f64 = 3.0;
pub const VAL_BISHOP: f64 = 3.0;
pub const VAL_ROOK: f64 = 5.0;
pub const VAL_QUEEN: f64 = 9.0;
pub const VAL_KING: f64 = 100.0;

pub const MATE_SCORE: f64 = 1000.0;
pub const MOBILITY_WEIGHT: f64 = 0.1;

// Piece-Square Tables, written from White's point of view.
// Row 0 is the eighth rank, column 0 is the a-file.
// Black pieces read the rank-mirrored row.

#[rustfmt::skip]
pub const PST_PAWN: [[f64; 8]; 8] = [
    [0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, 0.0],
    [5.0,  5.0,  5.0,  5.0,  5.0,  5.0,  5.0, 5.0],
    [1.0,  1.0,  2.0,  3.0,  3.0,  2.0,  1.0, 1.0],
    [0.5,  0.5,  1.0,  2.5,  2.5,  1.0,  0.5, 0.5],
    [0.0,  0.0,  0.0,  2.0,  2.0,  0.0,  0.0, 0.0],
    [0.5, -0.5, -1.0,  0.0,  0.0, -1.0, -0.5, 0.5],
    [0.5,  1.0,  1.0, -2.0, -2.0,  1.0,  1.0, 0.5],
    [0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, 0.0],
];

#[rustfmt::skip]
pub const PST_KNIGHT: [[f64; 8]; 8] = [
    [-5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0],
    [-4.0, -2.0,  0.0,  0.0,  0.0,  0.0, -2.0, -4.0],
    [-3.0,  0.0,  1.0,  1.5,  1.5,  1.0,  0.0, -3.0],
    [-3.0,  0.5,  1.5,  2.0,  2.0,  1.5,  0.5, -3.0],
    [-3.0,  0.0,  1.5,  2.0,  2.0,  1.5,  0.0, -3.0],
    [-3.0,  0.5,  1.0,  1.5,  1.5,  1.0,  0.5, -3.0],
    [-4.0, -2.0,  0.0,  0.5,  0.5,  0.0, -2.0, -4.0],
    [-5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0],
];

#[rustfmt::skip]
pub const PST_BISHOP: [[f64; 8]; 8] = [
    [-2.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -2.0],
    [-1.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -1.0],
    [-1.0,  0.0,  0.5,  1.0,  1.0,  0.5,  0.0, -1.0],
    [-1.0,  0.5,  0.5,  1.0,  1.0,  0.5,  0.5, -1.0],
    [-1.0,  0.0,  1.0,  1.0,  1.0,  1.0,  0.0, -1.0],
    [-1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0, -1.0],
    [-1.0,  0.5,  0.0,  0.0,  0.0,  0.0,  0.5, -1.0],
    [-2.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -2.0],
];

#[rustfmt::skip]
pub const PST_ROOK: [[f64; 8]; 8] = [
    [ 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,  0.0],
    [ 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,  0.5],
    [-0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.5],
    [-0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.5],
    [-0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.5],
    [-0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.5],
    [-0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.5],
    [ 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0,  0.0],
];

#[rustfmt::skip]
pub const PST_QUEEN: [[f64; 8]; 8] = [
    [-2.0, -1.0, -1.0, -0.5, -0.5, -1.0, -1.0, -2.0],
    [-1.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -1.0],
    [-1.0,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -1.0],
    [-0.5,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -0.5],
    [ 0.0,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -0.5],
    [-1.0,  0.5,  0.5,  0.5,  0.5,  0.5,  0.0, -1.0],
    [-1.0,  0.0,  0.5,  0.0,  0.0,  0.0,  0.0, -1.0],
    [-2.0, -1.0, -1.0, -0.5, -0.5, -1.0, -1.0, -2.0],
];

#[rustfmt::skip]
pub const PST_KING: [[f64; 8]; 8] = [
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0],
    [-2.0, -3.0, -3.0, -4.0, -4.0, -3.0, -3.0, -2.0],
    [-1.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, -1.0],
    [ 2.0,  2.0,  0.0,  0.0,  0.0,  0.0,  2.0,  2.0],
    [ 2.0,  3.0,  1.0,  0.0,  0.0,  1.0,  3.0,  2.0],
];
