//! A fixed-size cell set using const generics.
//!
//! The type is `no_std` friendly and avoids heap allocations. Boards are
//! represented as an `N×N` grid packed into an unsigned integer `T`, cell
//! `(x, y)` living at bit `y * N + x`.

use core::ops::{BitAnd, BitOr, Not};
use core::{fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

/// A fixed-size N×N set of cells stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Number of usable bits in the board (`N * N`).
    const BOARD_BITS: usize = N * N;

    /// Rejects, at compile time, boards that do not fit in `T`.
    const FITS: () = assert!(
        N * N <= mem::size_of::<T>() * 8,
        "N*N exceeds the bit width of the backing integer"
    );

    #[inline]
    fn mask() -> T {
        if Self::BOARD_BITS == mem::size_of::<T>() * 8 {
            !T::zero()
        } else {
            (T::one() << Self::BOARD_BITS) - T::one()
        }
    }

    #[inline]
    fn index(x: usize, y: usize) -> Option<usize> {
        (x < N && y < N).then_some(y * N + x)
    }

    /// Create an empty set.
    #[inline]
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        BitBoard { bits: T::zero() }
    }

    /// Create a set with every cell present.
    #[inline]
    pub fn full() -> Self {
        let mut board = Self::new();
        board.bits = Self::mask();
        board
    }

    /// Side length of the board.
    #[inline]
    pub const fn side() -> usize {
        N
    }

    /// Returns the number of cells in the set.
    pub fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns true if no cell is set.
    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Returns true if every cell of the board is set.
    pub fn is_full(&self) -> bool {
        self.bits == Self::mask()
    }

    /// Whether `(x, y)` is in the set. Cells outside the board never are.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        match Self::index(x, y) {
            Some(idx) => ((self.bits >> idx) & T::one()) != T::zero(),
            None => false,
        }
    }

    /// Add `(x, y)` to the set. Returns `false` when the cell was already
    /// present or lies outside the board.
    pub fn insert(&mut self, x: usize, y: usize) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                let bit = T::one() << idx;
                let fresh = (self.bits & bit).is_zero();
                self.bits = self.bits | bit;
                fresh
            }
            None => false,
        }
    }

    /// Iterator over the cells of the set in row-major order.
    #[inline]
    pub fn iter(&self) -> Cells<'_, T, N> {
        Cells {
            board: self,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}>:", N)?;
        for y in 0..N {
            for x in 0..N {
                let mark = if self.contains(x, y) { '■' } else { '□' };
                write!(f, "{} ", mark)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the cells of a bitboard, yielding `(x, y)`.
#[derive(Clone, Copy)]
pub struct Cells<'a, T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    board: &'a BitBoard<T, N>,
    idx: usize,
}

impl<T, const N: usize> Iterator for Cells<'_, T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if ((self.board.bits >> idx) & T::one()) != T::zero() {
                return Some((idx % N, idx / N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard {
            bits: self.bits & rhs.bits,
        }
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard {
            bits: self.bits | rhs.bits,
        }
    }
}

/// Complement within the board bounds.
impl<T, const N: usize> Not for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        BitBoard {
            bits: !self.bits & Self::mask(),
        }
    }
}
