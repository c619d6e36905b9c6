//! Rectangular spiral used to walk candidate positions outward from a start
//! point.

/// Unit moves in turning order for a clockwise walk (y grows downwards).
const HEADINGS: [(f64, f64); 4] = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

/// Walks legs of 1, 1, 2, 2, 3, 3, ... steps, turning after each leg, so the
/// rings widen by one step per turn pair.
pub(crate) struct Spiral {
    step_x: f64,
    step_y: f64,
    turn: i32,
    heading: i32,
    leg_len: u32,
    leg_pos: u32,
    legs: u32,
    x: f64,
    y: f64,
    started: bool,
    limit_x: f64,
    limit_y: f64,
}

impl Spiral {
    /// `turn` is `1` or `-1` and picks the turning direction.
    ///
    /// Steps are at most four cells on either axis. On a lopsided canvas the
    /// short axis takes proportionally smaller steps (never under one cell),
    /// so the rings keep the canvas's aspect without skipping columns. The
    /// walk ends once it has moved more than a full canvas away in both
    /// axes, which is past any cell reachable from a start point on the
    /// canvas.
    pub(crate) fn new(width: u32, height: u32, turn: i32) -> Self {
        const STEP: f64 = 4.0;
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        let step_x = STEP.min(STEP * w / h).max(1.0);
        let step_y = STEP.min(STEP * h / w).max(1.0);
        Self {
            step_x,
            step_y,
            turn: turn.signum(),
            heading: 0,
            leg_len: 1,
            leg_pos: 0,
            legs: 0,
            x: 0.0,
            y: 0.0,
            started: false,
            limit_x: w + step_x,
            limit_y: h + step_y,
        }
    }
}

impl Iterator for Spiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some((0, 0));
        }
        if self.x.abs() > self.limit_x && self.y.abs() > self.limit_y {
            return None;
        }

        let (hx, hy) = HEADINGS[self.heading as usize];
        self.x += hx * self.step_x;
        self.y += hy * self.step_y;

        self.leg_pos += 1;
        if self.leg_pos == self.leg_len {
            self.leg_pos = 0;
            self.heading = (self.heading + self.turn).rem_euclid(4);
            self.legs += 1;
            if self.legs % 2 == 0 {
                self.leg_len += 1;
            }
        }

        Some((self.x.round() as i32, self.y.round() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_origin() {
        let mut spiral = Spiral::new(100, 100, 1);
        assert_eq!(spiral.next(), Some((0, 0)));
        assert_eq!(spiral.next(), Some((4, 0)));
        assert_eq!(spiral.next(), Some((4, 4)));
        assert_eq!(spiral.next(), Some((0, 4)));
        assert_eq!(spiral.next(), Some((-4, 4)));
    }

    #[test]
    fn test_terminates_past_canvas() {
        for turn in [1, -1] {
            let points: Vec<_> = Spiral::new(64, 48, turn).collect();
            assert!(points.len() > 100);
            let (max_x, max_y) = points
                .iter()
                .fold((0, 0), |(mx, my), (x, y)| (mx.max(x.abs()), my.max(y.abs())));
            assert!(max_x >= 64);
            assert!(max_y >= 48);
        }
    }

    #[test]
    fn test_turn_direction_mirrors() {
        let cw: Vec<_> = Spiral::new(50, 50, 1).take(20).collect();
        let ccw: Vec<_> = Spiral::new(50, 50, -1).take(20).collect();
        assert_ne!(cw, ccw);
        for (&(x1, y1), &(x2, y2)) in cw.iter().zip(&ccw) {
            assert_eq!((x1, y1), (x2, -y2));
        }
    }

    #[test]
    fn test_steps_stay_small_on_a_banner() {
        let points: Vec<_> = Spiral::new(1000, 40, 1).collect();
        for pair in points.windows(2) {
            let (dx, dy) = (pair[1].0 - pair[0].0, pair[1].1 - pair[0].1);
            assert!(dx.abs() <= 4 && dy.abs() <= 4, "jump {pair:?}");
        }
        // every fourth column right of the start is visited on the start row
        for x in (200..=500).step_by(4) {
            assert!(points.contains(&(x, 0)), "column {x} never visited");
        }
    }
}
