//! VM Memory Model
//!
//! The tape: byte cells growing to the right, addressed by one cursor.
//! Invariant: `cursor < cells.len()`, and the tape never shrinks.

/// Memory tape
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// One zero cell, cursor at 0
    pub fn new() -> Self {
        Tape {
            cells: vec![0],
            cursor: 0,
        }
    }

    pub fn read(&self) -> u8 {
        self.cells[self.cursor]
    }

    pub fn write(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    pub fn increment(&mut self, amount: u8) {
        let cell = &mut self.cells[self.cursor];
        *cell = cell.wrapping_add(amount);
    }

    pub fn decrement(&mut self, amount: u8) {
        let cell = &mut self.cells[self.cursor];
        *cell = cell.wrapping_sub(amount);
    }

    /// Clamped at cell 0
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Appends a zero cell when already at the right edge
    pub fn move_right(&mut self) {
        if self.cursor + 1 == self.cells.len() {
            self.cells.push(0);
        }
        self.cursor += 1;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn reset(&mut self) {
        self.cells.clear();
        self.cells.push(0);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_zero_cell() {
        let tape = Tape::new();
        assert_eq!(tape.cells(), &[0]);
        assert_eq!(tape.cursor(), 0);
    }

    #[test]
    fn left_at_origin_is_noop() {
        let mut tape = Tape::new();
        tape.move_left();
        tape.move_left();
        assert_eq!(tape.cursor(), 0);
        assert_eq!(tape.len(), 1);
    }

    #[test]
    fn right_grows_only_at_edge() {
        let mut tape = Tape::new();
        tape.move_right();
        tape.move_right();
        assert_eq!(tape.len(), 3);
        tape.move_left();
        tape.move_right();
        assert_eq!(tape.len(), 3);
        assert_eq!(tape.cursor(), 2);
    }

    #[test]
    fn cursor_stays_in_bounds_for_any_walk() {
        // deterministic pseudo-random walk
        let mut tape = Tape::new();
        let mut state: u32 = 0x9E37_79B9;
        let mut last_len = tape.len();
        for _ in 0..5000 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state & 1 == 0 {
                tape.move_left();
            } else {
                tape.move_right();
            }
            assert!(tape.cursor() < tape.len());
            assert!(tape.len() >= last_len);
            last_len = tape.len();
        }
    }

    #[test]
    fn arithmetic_wraps() {
        let mut tape = Tape::new();
        tape.decrement(1);
        assert_eq!(tape.read(), 0xFF);
        tape.increment(1);
        assert_eq!(tape.read(), 0x00);
        tape.write(250);
        tape.increment(10);
        assert_eq!(tape.read(), 4);
        tape.decrement(5);
        assert_eq!(tape.read(), 255);
    }

    #[test]
    fn reset_restores_initial_tape() {
        let mut tape = Tape::new();
        tape.write(7);
        tape.move_right();
        tape.reset();
        assert_eq!(tape.cells(), &[0]);
        assert_eq!(tape.cursor(), 0);
    }
}
