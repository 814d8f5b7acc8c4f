use std::collections::VecDeque;

/// Values consumed front-first by `in`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputQueue(VecDeque<i64>);

impl InputQueue {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.0.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.0.len()
    }
}

/// Values appended by `out`, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSequence(Vec<i64>);

impl OutputSequence {
    pub fn push(&mut self, value: i64) {
        self.0.push(value);
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }
}
