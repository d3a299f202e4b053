//! Observer trait: the consumer side of the subject substrate.

/// Receives values pushed by an observable.
///
/// Any `FnMut(T)` closure is an observer that ignores completion.
pub trait Observer<T> {
    /// Receive the next value.
    fn next(&mut self, value: T);

    /// Called once when the source completes. No values follow.
    fn complete(&mut self) {}
}

impl<T, F> Observer<T> for F
where
    F: FnMut(T),
{
    fn next(&mut self, value: T) {
        self(value)
    }
}

/// Type-erased observer as stored by subjects and operators.
pub type BoxedObserver<T> = Box<dyn Observer<T>>;
