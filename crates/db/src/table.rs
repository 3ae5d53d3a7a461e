use parking_lot::RwLock;

/// Append-only table of rows kept in insertion order.
#[derive(Debug)]
pub struct MemoryTable<T> {
    name: &'static str,
    rows: RwLock<Vec<T>>,
}

impl<T: Clone> MemoryTable<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn insert(&self, row: T) {
        let mut rows = self.rows.write();
        rows.push(row);
        tracing::trace!(target: "quill-db", table = self.name, rows = rows.len(), "row inserted");
    }

    /// Clone every row matching `predicate`, in insertion order.
    pub fn select<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().iter().filter(|row| predicate(row)).count()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}
