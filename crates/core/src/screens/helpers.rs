//! Optimistic list removal.

/// A row taken out of a list ahead of a remote delete.
///
/// Either [`commit`](Removal::commit) once the remote call succeeds, or
/// [`rollback`](Removal::rollback) to put the row back where it was.
#[derive(Debug)]
#[must_use = "a removal must be committed or rolled back"]
pub struct Removal<T> {
    index: usize,
    item: T,
}

impl<T> Removal<T> {
    /// Removes the first element matching `pred`, or returns `None` when there is none.
    pub fn take(list: &mut Vec<T>, pred: impl FnMut(&T) -> bool) -> Option<Self> {
        let index = list.iter().position(pred)?;
        let item = list.remove(index);
        Some(Self { index, item })
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn commit(self) -> T {
        self.item
    }

    /// Reinserts the element at its original position, or at the end if the list has shrunk.
    pub fn rollback(self, list: &mut Vec<T>) {
        let index = self.index.min(list.len());
        list.insert(index, self.item);
    }
}
