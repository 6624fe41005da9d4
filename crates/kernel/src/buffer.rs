/// Two storage slots that alternate roles every tick.
///
/// A tick reads only from [`DoubleBuffer::current`] and writes only into the
/// back slot handed out by [`DoubleBuffer::split`]; [`DoubleBuffer::swap`]
/// publishes the back slot. No slot is ever both read and written in the
/// same stage.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    front: usize,
}

impl<T: Clone> DoubleBuffer<T> {
    /// Both slots start as copies of `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            slots: [initial.clone(), initial],
            front: 0,
        }
    }
}

impl<T> DoubleBuffer<T> {
    pub fn current(&self) -> &T {
        &self.slots[self.front]
    }

    /// Mutable access to the published slot. Only for setup while no tick runs.
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.slots[self.front]
    }

    /// Read view of the current slot and write view of the back slot.
    pub fn split(&mut self) -> (&T, &mut T) {
        let (a, b) = self.slots.split_at_mut(1);
        if self.front == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    pub fn swap(&mut self) {
        self.front ^= 1;
    }
}
