//! Deferred draw queue
//!
//! The generator fills a [`Drawer`] up front; the host then replays `step`
//! actions per frame so the picture appears to be sketched progressively.

use tracing::debug;

use super::action::DrawAction;
use crate::display::PixelBuffer;

/// Where the queue is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Empty,
    Populated,
    Playing,
    Exhausted,
}

/// Outcome of one `call`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replay {
    /// Actions remain for later frames
    Continue,
    /// This call ran the last action; no more frames are needed
    Exhausted,
    /// Nothing ran (not started, or already exhausted)
    Idle,
}

#[derive(Debug, Clone)]
pub struct Drawer {
    actions: Vec<DrawAction>,
    curr: usize,
    step: usize,
    state: QueueState,
}

impl Drawer {
    pub fn new(step: usize) -> Self {
        Self {
            actions: Vec::new(),
            curr: 0,
            step: step.max(1),
            state: QueueState::Empty,
        }
    }

    pub fn push(&mut self, action: DrawAction) {
        self.actions.push(action);
        if self.state == QueueState::Empty {
            self.state = QueueState::Populated;
        }
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = DrawAction>) {
        for action in actions {
            self.push(action);
        }
    }

    /// Batch size for the following calls. Zero is treated as one.
    pub fn set_step(&mut self, step: usize) {
        self.step = step.max(1);
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Rewind to the first action
    pub fn start(&mut self) {
        self.curr = 0;
        self.state = if self.actions.is_empty() {
            QueueState::Exhausted
        } else {
            QueueState::Playing
        };
    }

    /// Hand up to `step` pending actions to `f`, in insertion order
    pub fn call_with(&mut self, mut f: impl FnMut(&DrawAction)) -> Replay {
        if self.state != QueueState::Playing {
            return Replay::Idle;
        }

        let end = self.curr.saturating_add(self.step).min(self.actions.len());
        for action in &self.actions[self.curr..end] {
            f(action);
        }
        self.curr = end;

        if self.curr == self.actions.len() {
            self.state = QueueState::Exhausted;
            debug!(actions = self.actions.len(), "draw queue exhausted");
            Replay::Exhausted
        } else {
            Replay::Continue
        }
    }

    /// Draw the next batch into `buffer`
    pub fn call(&mut self, buffer: &mut PixelBuffer) -> Replay {
        self.call_with(|action| action.draw(buffer))
    }

    pub fn actions(&self) -> &[DrawAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Index of the next action to run
    pub fn cursor(&self) -> usize {
        self.curr
    }

    pub fn state(&self) -> QueueState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::action::Segment;
    use crate::math3d::Vec2;

    /// Action tagged with its insertion index in the x coordinate
    fn tagged(i: usize) -> DrawAction {
        DrawAction::Line {
            segment: Segment::new(Vec2::new(i as f32, 0.0), Vec2::zero()),
            color: (0, 0, 0),
        }
    }

    fn tag(action: &DrawAction) -> usize {
        match action {
            DrawAction::Line { segment, .. } => segment.from.x as usize,
            _ => usize::MAX,
        }
    }

    fn loaded(k: usize, step: usize) -> Drawer {
        let mut drawer = Drawer::new(step);
        drawer.extend((0..k).map(tagged));
        drawer.start();
        drawer
    }

    fn run(drawer: &mut Drawer) -> (Vec<usize>, Replay) {
        let mut seen = Vec::new();
        let replay = drawer.call_with(|a| seen.push(tag(a)));
        (seen, replay)
    }

    #[test]
    fn test_ten_actions_in_batches_of_three() {
        let mut drawer = loaded(10, 3);

        assert_eq!(run(&mut drawer), (vec![0, 1, 2], Replay::Continue));
        assert_eq!(run(&mut drawer), (vec![3, 4, 5], Replay::Continue));
        assert_eq!(run(&mut drawer), (vec![6, 7, 8], Replay::Continue));
        assert_eq!(run(&mut drawer), (vec![9], Replay::Exhausted));
        assert_eq!(run(&mut drawer), (vec![], Replay::Idle));
        assert_eq!(drawer.state(), QueueState::Exhausted);
    }

    #[test]
    fn test_huge_step_mid_replay_drains_the_rest() {
        let mut drawer = loaded(3, 1);
        assert_eq!(run(&mut drawer), (vec![0], Replay::Continue));
        drawer.set_step(usize::MAX);
        assert_eq!(run(&mut drawer), (vec![1, 2], Replay::Exhausted));
        assert_eq!(run(&mut drawer), (vec![], Replay::Idle));
    }

    #[test]
    fn test_exhausts_after_ceil_k_over_s_calls() {
        for k in 1..20 {
            for s in 1..7 {
                let mut drawer = loaded(k, s);
                let mut calls = 0;
                let mut order = Vec::new();
                loop {
                    let (seen, replay) = run(&mut drawer);
                    calls += 1;
                    order.extend(seen);
                    if replay == Replay::Exhausted {
                        break;
                    }
                    assert_eq!(replay, Replay::Continue);
                }
                assert_eq!(calls, k.div_ceil(s), "k={} s={}", k, s);
                assert_eq!(order, (0..k).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_start_after_exhaustion_replays_from_first() {
        let mut drawer = loaded(4, 4);
        assert_eq!(run(&mut drawer).1, Replay::Exhausted);
        drawer.start();
        assert_eq!(drawer.cursor(), 0);
        assert_eq!(run(&mut drawer), (vec![0, 1, 2, 3], Replay::Exhausted));
    }

    #[test]
    fn test_set_step_applies_to_next_call() {
        let mut drawer = loaded(10, 2);
        assert_eq!(run(&mut drawer).0, vec![0, 1]);
        drawer.set_step(5);
        assert_eq!(run(&mut drawer).0, vec![2, 3, 4, 5, 6]);
        drawer.set_step(0);
        assert_eq!(run(&mut drawer).0, vec![7]);
    }

    #[test]
    fn test_lifecycle_states() {
        let mut drawer = Drawer::new(3);
        assert_eq!(drawer.state(), QueueState::Empty);
        assert_eq!(run(&mut drawer).1, Replay::Idle);

        drawer.push(tagged(0));
        assert_eq!(drawer.state(), QueueState::Populated);
        // Not started yet
        assert_eq!(run(&mut drawer).1, Replay::Idle);

        drawer.start();
        assert_eq!(drawer.state(), QueueState::Playing);
    }

    #[test]
    fn test_call_draws_into_buffer() {
        let mut drawer = Drawer::new(1);
        drawer.push(DrawAction::Line {
            segment: Segment::new(Vec2::new(0.0, 2.0), Vec2::new(4.0, 2.0)),
            color: (255, 255, 255),
        });
        drawer.start();
        let mut buffer = PixelBuffer::with_size(5, 5);
        assert_eq!(drawer.call(&mut buffer), Replay::Exhausted);
        assert_eq!(buffer.get_pixel(2, 2), Some((255, 255, 255)));
    }
}
