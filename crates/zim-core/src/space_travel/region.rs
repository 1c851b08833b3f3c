/// Directions accepted by the move commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Whether this direction narrows the line axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// The navigable region during space travel.
///
/// `x` is a character column, `y` is a line offset from the top of the
/// viewport. Both ranges are inclusive, so a box always covers at least one
/// cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TravelBox {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl TravelBox {
    pub fn new(min_x: usize, max_x: usize, min_y: usize, max_y: usize) -> Self {
        debug_assert!(min_x <= max_x, "min_x {min_x} > max_x {max_x}");
        debug_assert!(min_y <= max_y, "min_y {min_y} > max_y {max_y}");
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Number of columns covered.
    pub fn count_x(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    /// Number of lines covered.
    pub fn count_y(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// First column of the right half.
    pub fn mid_x(&self) -> usize {
        (self.min_x + self.max_x + 1) / 2
    }

    /// First line of the lower half.
    pub fn mid_y(&self) -> usize {
        (self.min_y + self.max_y + 1) / 2
    }

    /// The half of this box lying in `direction`, or `None` when the axis
    /// has a single cell left and can't be split.
    pub fn bisect(&self, direction: Direction) -> Option<TravelBox> {
        let mut next = *self;
        match direction {
            Direction::Up if self.count_y() > 1 => next.max_y = self.mid_y() - 1,
            Direction::Down if self.count_y() > 1 => next.min_y = self.mid_y(),
            Direction::Left if self.count_x() > 1 => next.max_x = self.mid_x() - 1,
            Direction::Right if self.count_x() > 1 => next.min_x = self.mid_x(),
            _ => return None,
        }
        Some(next)
    }

    pub fn clamp_column(&self, column: usize) -> usize {
        column.clamp(self.min_x, self.max_x)
    }

    /// Clamp an absolute line number, given the line the viewport starts at.
    pub fn clamp_line(&self, line: usize, first_line: usize) -> usize {
        line.clamp(self.min_y + first_line, self.max_y + first_line)
    }

    pub fn contains(&self, line: usize, column: usize, first_line: usize) -> bool {
        (self.min_x..=self.max_x).contains(&column)
            && (self.min_y + first_line..=self.max_y + first_line).contains(&line)
    }
}

impl std::fmt::Display for TravelBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{x: {}..={}, y: {}..={}}}",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_midpoints() {
        let b = TravelBox::new(0, 20, 0, 9);
        assert_eq!(b.count_x(), 21);
        assert_eq!(b.count_y(), 10);
        assert_eq!(b.mid_x(), 10);
        assert_eq!(b.mid_y(), 5);
    }

    #[test]
    fn test_odd_count_split() {
        // Three lines: the upper half keeps one, the lower half keeps two.
        let b = TravelBox::new(0, 0, 4, 6);
        assert_eq!(b.bisect(Direction::Up), Some(TravelBox::new(0, 0, 4, 4)));
        assert_eq!(b.bisect(Direction::Down), Some(TravelBox::new(0, 0, 5, 6)));
    }

    #[test]
    fn test_two_cells_split_into_singles() {
        let b = TravelBox::new(3, 4, 0, 0);
        assert_eq!(b.bisect(Direction::Left), Some(TravelBox::new(3, 3, 0, 0)));
        assert_eq!(b.bisect(Direction::Right), Some(TravelBox::new(4, 4, 0, 0)));
    }

    #[test]
    fn test_degenerate_axis() {
        let b = TravelBox::new(0, 20, 0, 0);
        assert_eq!(b.bisect(Direction::Up), None);
        assert_eq!(b.bisect(Direction::Down), None);
        assert!(b.bisect(Direction::Left).is_some());

        let column = TravelBox::new(7, 7, 0, 9);
        assert_eq!(column.bisect(Direction::Left), None);
        assert_eq!(column.bisect(Direction::Right), None);
    }

    #[test]
    fn test_clamp_relative_to_viewport() {
        let b = TravelBox::new(2, 5, 3, 4);
        assert_eq!(b.clamp_column(0), 2);
        assert_eq!(b.clamp_column(9), 5);
        assert_eq!(b.clamp_line(0, 100), 103);
        assert_eq!(b.clamp_line(200, 100), 104);
        assert!(b.contains(104, 5, 100));
        assert!(!b.contains(4, 5, 100));
    }
}
