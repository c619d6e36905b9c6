//! Bit-packed boolean grids.
//!
//! Rows are stored as runs of `u32` words, most significant bit first, so a
//! sprite can be tested against the canvas 32 cells at a time.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct BitGrid {
    width: u32,
    height: u32,
    stride: usize, // u32 words per row
    data: Vec<u32>,
}

impl BitGrid {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let stride = ((width + 31) >> 5) as usize;
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height as usize],
        }
    }

    /// A grid for a whole canvas: the unused bits at the end of each row are
    /// set so nothing can be placed past the right edge.
    pub(crate) fn canvas(width: u32, height: u32) -> Self {
        let mut grid = Self::new(width, height);
        let tail = width & 31;
        if tail != 0 {
            let pad = u32::MAX >> tail;
            for row in 0..height as usize {
                grid.data[row * grid.stride + grid.stride - 1] |= pad;
            }
        }
        grid
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn set(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32 {
            let row_idx = y as usize * self.stride;
            let col_idx = (x as usize) >> 5;
            let bit_idx = 31 - (x & 31);
            self.data[row_idx + col_idx] |= 1 << bit_idx;
        }
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.data[y as usize * self.stride + (x as usize >> 5)];
        word & (1 << (31 - (x & 31))) != 0
    }

    /// Set cells in row-major order.
    pub(crate) fn ones(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.get(x, y).then_some((x, y)))
        })
    }

    pub(crate) fn count_ones(&self) -> usize {
        self.ones().count()
    }

    fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// True if any set cell of `sprite`, placed with its top-left corner at
    /// `(x, y)`, hits a set cell here or falls off the grid.
    pub(crate) fn collides(&self, sprite: &BitGrid, x: i32, y: i32) -> bool {
        let shift = (x & 31) as u32;
        let first_col = (x >> 5) as isize;

        (0..sprite.height).any(|sy| {
            let row = sprite.row(sy);
            let gy = y + sy as i32;
            if gy < 0 || gy >= self.height as i32 {
                return row.iter().any(|&word| word != 0);
            }
            let base = gy as usize * self.stride;
            shifted_row(row, shift).any(|(i, bits)| {
                if bits == 0 {
                    return false;
                }
                let col = first_col + i as isize;
                col < 0 || col >= self.stride as isize || self.data[base + col as usize] & bits != 0
            })
        })
    }

    /// Sets every cell covered by `sprite` at `(x, y)`. Cells falling off the
    /// grid are ignored.
    pub(crate) fn stamp(&mut self, sprite: &BitGrid, x: i32, y: i32) {
        let shift = (x & 31) as u32;
        let first_col = (x >> 5) as isize;

        for sy in 0..sprite.height {
            let gy = y + sy as i32;
            if gy < 0 || gy >= self.height as i32 {
                continue;
            }
            let base = gy as usize * self.stride;
            for (i, bits) in shifted_row(sprite.row(sy), shift) {
                let col = first_col + i as isize;
                if bits != 0 && (0..self.stride as isize).contains(&col) {
                    self.data[base + col as usize] |= bits;
                }
            }
        }
    }
}

/// One packed row moved right by `shift` bits, as `(word offset, bits)`
/// pairs. There is one more word than in `row` to hold what spills off its
/// end.
fn shifted_row(row: &[u32], shift: u32) -> impl Iterator<Item = (usize, u32)> + '_ {
    let mut carry = 0u32;
    row.iter()
        .copied()
        .chain(std::iter::once(0))
        .enumerate()
        .map(move |(i, word)| {
            // a full-width shift overflows, and there is nothing to carry anyway
            let bits = if shift == 0 {
                word
            } else {
                (carry << (32 - shift)) | (word >> shift)
            };
            carry = word;
            (i, bits)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(w: u32, h: u32) -> BitGrid {
        let mut sprite = BitGrid::new(w, h);
        for y in 0..h {
            for x in 0..w {
                sprite.set(x as i32, y as i32);
            }
        }
        sprite
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = BitGrid::new(70, 3);
        grid.set(0, 0);
        grid.set(33, 1);
        grid.set(69, 2);
        grid.set(70, 2); // out of range, ignored
        assert!(grid.get(0, 0));
        assert!(grid.get(33, 1));
        assert!(grid.get(69, 2));
        assert!(!grid.get(1, 0));
        assert_eq!(grid.count_ones(), 3);
    }

    #[test]
    fn test_shifted_row_carries_into_next_word() {
        let row = [0x8000_0001, 0xF000_0000];
        let shifted: Vec<_> = shifted_row(&row, 4).collect();
        assert_eq!(shifted, vec![(0, 0x0800_0000), (1, 0x1F00_0000), (2, 0)]);

        let unshifted: Vec<_> = shifted_row(&row, 0).collect();
        assert_eq!(unshifted, vec![(0, 0x8000_0001), (1, 0xF000_0000), (2, 0)]);
    }

    #[test]
    fn test_collision_across_word_boundary() {
        let mut grid = BitGrid::canvas(100, 20);
        let sprite = block(5, 5);

        assert!(!grid.collides(&sprite, 30, 2));
        grid.stamp(&sprite, 30, 2);

        // cells 30..35 are now taken, straddling the first word boundary
        assert!(grid.get(31, 2) && grid.get(34, 6));
        assert!(grid.collides(&sprite, 33, 4));
        assert!(grid.collides(&sprite, 26, 2));
        assert!(!grid.collides(&sprite, 35, 2));
        assert!(!grid.collides(&sprite, 25, 2));
        assert!(!grid.collides(&sprite, 30, 7));
    }

    #[test]
    fn test_off_canvas_collides() {
        let grid = BitGrid::canvas(40, 40);
        let sprite = block(4, 4);
        assert!(grid.collides(&sprite, -1, 0));
        assert!(grid.collides(&sprite, 0, -1));
        assert!(grid.collides(&sprite, 37, 0));
        assert!(grid.collides(&sprite, 0, 37));
        assert!(!grid.collides(&sprite, 36, 36));
    }

    #[test]
    fn test_empty_sprite_rows_off_canvas_are_ignored() {
        let grid = BitGrid::canvas(10, 10);
        let mut sprite = BitGrid::new(3, 3);
        sprite.set(1, 2);
        // only the bottom row has ink; the top two hang above the canvas
        assert!(!grid.collides(&sprite, 0, -2));
    }
}
