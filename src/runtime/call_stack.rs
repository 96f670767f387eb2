//! The frame stack for nested calls
//!
//! The stack is never empty while a run is in progress: the top-level frame
//! is created with the stack and cannot be popped. Only the active (top)
//! frame is reachable; suspended callers are restored strictly LIFO.
//!
//! Popped frames can be handed back with [`FrameStack::recycle`] and reused
//! by later calls, so a run's arena grows with call depth rather than with
//! the number of calls made.

use super::{frame::Frame, RuntimeError};
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

/// LIFO chain of frames; the topmost frame is active
#[derive(Debug)]
pub struct FrameStack<'bump> {
    active: Frame<'bump>,
    suspended: BumpVec<'bump, Frame<'bump>>,
    spare: BumpVec<'bump, Frame<'bump>>,
    max_depth: usize,
}

impl<'bump> FrameStack<'bump> {
    /// Create a frame stack whose bottom frame is `root`
    ///
    /// At most `max_depth` frames (including `root`) may be live at once.
    pub fn new_in(root: Frame<'bump>, max_depth: usize, arena: &'bump Bump) -> Self {
        FrameStack {
            active: root,
            suspended: BumpVec::new_in(arena),
            spare: BumpVec::new_in(arena),
            max_depth,
        }
    }

    /// Make `frame` the active frame, suspending the current one
    ///
    /// # Errors
    /// Returns `CallStackOverflow` if the stack is already `max_depth` deep
    pub fn push(&mut self, frame: Frame<'bump>) -> Result<(), RuntimeError> {
        if self.depth() >= self.max_depth {
            return Err(RuntimeError::CallStackOverflow(self.max_depth));
        }
        let caller = std::mem::replace(&mut self.active, frame);
        self.suspended.push(caller);
        Ok(())
    }

    /// Remove the active frame and resume its caller
    ///
    /// # Errors
    /// Returns `FrameStackUnderflow` if the active frame is the top-level one
    pub fn pop(&mut self) -> Result<Frame<'bump>, RuntimeError> {
        let caller = self.suspended.pop().ok_or(RuntimeError::FrameStackUnderflow)?;
        Ok(std::mem::replace(&mut self.active, caller))
    }

    /// Keep a popped frame for reuse by a later call
    pub fn recycle(&mut self, frame: Frame<'bump>) {
        self.spare.push(frame);
    }

    /// A previously recycled frame, if any; its contents are stale
    pub fn take_spare(&mut self) -> Option<Frame<'bump>> {
        self.spare.pop()
    }

    pub fn active(&self) -> &Frame<'bump> {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut Frame<'bump> {
        &mut self.active
    }

    /// Number of live frames, including the active one
    pub fn depth(&self) -> usize {
        self.suspended.len() + 1
    }

    /// True when only the top-level frame is live
    pub fn is_root(&self) -> bool {
        self.suspended.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::frame::Locals;
    use crate::runtime::Value;

    fn frame_at(pc: usize, arena: &Bump) -> Frame<'_> {
        Frame::new_in(&[], &[], Locals::new_in(0, arena), pc, arena)
    }

    #[test]
    fn test_push_pop_restores_caller() {
        let arena = Bump::new();
        let mut frames = FrameStack::new_in(frame_at(0, &arena), 8, &arena);
        assert!(frames.is_root());

        frames.active_mut().stack_mut().push(Value::Integer(1));
        frames.push(frame_at(10, &arena)).unwrap();

        assert_eq!(frames.depth(), 2);
        assert_eq!(frames.active().pc(), 10);
        assert!(frames.active().stack().is_empty());

        let callee = frames.pop().unwrap();
        assert_eq!(callee.pc(), 10);
        assert_eq!(frames.active().pc(), 0);
        assert_eq!(frames.active().stack().as_slice(), &[Value::Integer(1)]);
        assert!(frames.is_root());
    }

    #[test]
    fn test_root_cannot_be_popped() {
        let arena = Bump::new();
        let mut frames = FrameStack::new_in(frame_at(0, &arena), 8, &arena);

        assert!(matches!(frames.pop(), Err(RuntimeError::FrameStackUnderflow)));
        assert_eq!(frames.depth(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let arena = Bump::new();
        let mut frames = FrameStack::new_in(frame_at(0, &arena), 3, &arena);

        frames.push(frame_at(1, &arena)).unwrap();
        frames.push(frame_at(2, &arena)).unwrap();
        assert!(matches!(
            frames.push(frame_at(3, &arena)),
            Err(RuntimeError::CallStackOverflow(3))
        ));
        assert_eq!(frames.depth(), 3);
        assert_eq!(frames.active().pc(), 2);
    }

    #[test]
    fn test_recycled_frames_are_reused() {
        let arena = Bump::new();
        let mut frames = FrameStack::new_in(frame_at(0, &arena), 4, &arena);
        assert!(frames.take_spare().is_none());

        frames.push(frame_at(5, &arena)).unwrap();
        let callee = frames.pop().unwrap();
        frames.recycle(callee);

        let mut reused = frames.take_spare().unwrap();
        assert_eq!(reused.pc(), 5);
        reused.enter(&[Value::Integer(2)], 1);
        frames.push(reused).unwrap();
        assert_eq!(frames.active().arguments(), &[Value::Integer(2)]);
        assert!(frames.take_spare().is_none());
    }

    #[test]
    fn test_lifo_order() {
        let arena = Bump::new();
        let mut frames = FrameStack::new_in(frame_at(0, &arena), 16, &arena);
        for pc in 1..=4 {
            frames.push(frame_at(pc, &arena)).unwrap();
        }
        for expected in (1..=4).rev() {
            assert_eq!(frames.pop().unwrap().pc(), expected);
        }
        assert_eq!(frames.active().pc(), 0);
    }
}
