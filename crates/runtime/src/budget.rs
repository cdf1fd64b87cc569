/// Deterministic slot budget for greedy placement passes.
///
/// A budget counts abstract slots (one per accepted item) rather than time,
/// so the outcome of a pass depends only on its inputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Budget {
    remaining: Option<u32>,
}

impl Budget {
    pub fn new(slots: u32) -> Self {
        Self {
            remaining: Some(slots),
        }
    }

    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    /// `None` means unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Attempts to consume one slot.
    ///
    /// Returns `true` if a slot was available.
    pub fn try_consume(&mut self) -> bool {
        match &mut self.remaining {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }
}
