use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table is full ({0} slots)")]
    Full(usize),
    #[error("index {0} out of range")]
    OutOfRange(usize),
    #[error("no item at index {0}")]
    Vacant(usize),
}

/// A table with a fixed number of slots. New items always take the lowest
/// vacant slot, the way file descriptor numbers are handed out.
#[derive(Debug)]
pub struct FixedSizeTable<T> {
    table: Vec<Option<T>>,
    amount: usize,
}

impl<T> FixedSizeTable<T> {
    pub fn new(size: usize) -> Self {
        let mut table = Vec::with_capacity(size);
        table.resize_with(size, || None);
        Self { table, amount: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn is_full(&self) -> bool {
        self.amount == self.table.len()
    }

    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn len(&self) -> usize {
        self.amount
    }

    pub fn add(&mut self, item: T) -> Result<usize, (TableError, T)> {
        match self.table.iter().position(Option::is_none) {
            Some(index) => {
                self.table[index] = Some(item);
                self.amount += 1;
                Ok(index)
            }
            None => Err((TableError::Full(self.size()), item)),
        }
    }

    /// Puts `item` at `index`, returning whatever the slot held before.
    pub fn insert(&mut self, index: usize, item: T) -> Result<Option<T>, (TableError, T)> {
        if index >= self.size() {
            return Err((TableError::OutOfRange(index), item));
        }

        let previous = self.table[index].replace(item);
        if previous.is_none() {
            self.amount += 1;
        }
        Ok(previous)
    }

    pub fn remove(&mut self, index: usize) -> Result<T, TableError> {
        let slot = self
            .table
            .get_mut(index)
            .ok_or(TableError::OutOfRange(index))?;

        match slot.take() {
            Some(item) => {
                self.amount -= 1;
                Ok(item)
            }
            None => Err(TableError::Vacant(index)),
        }
    }

    pub fn get(&self, index: usize) -> Result<&T, TableError> {
        match self.table.get(index) {
            Some(Some(item)) => Ok(item),
            Some(None) => Err(TableError::Vacant(index)),
            None => Err(TableError::OutOfRange(index)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    /// Empties the table, returning the items with the slots they held.
    pub fn drain(&mut self) -> Vec<(usize, T)> {
        self.amount = 0;
        self.table
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.take().map(|item| (index, item)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_takes_lowest_vacant_slot() {
        let mut table = FixedSizeTable::new(4);
        assert_eq!(table.add("a"), Ok(0));
        assert_eq!(table.add("b"), Ok(1));
        assert_eq!(table.add("c"), Ok(2));
        assert_eq!(table.remove(1), Ok("b"));
        assert_eq!(table.add("d"), Ok(1));
        assert_eq!(table.add("e"), Ok(3));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn add_hands_item_back_when_full() {
        let mut table = FixedSizeTable::new(1);
        table.add(1).unwrap();
        assert!(table.is_full());
        assert_eq!(table.add(2), Err((TableError::Full(1), 2)));
    }

    #[test]
    fn insert_replaces_and_counts() {
        let mut table = FixedSizeTable::new(3);
        assert_eq!(table.insert(2, 'x'), Ok(None));
        assert_eq!(table.len(), 1);
        assert_eq!(table.insert(2, 'y'), Ok(Some('x')));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(2), Ok(&'y'));
        assert_eq!(table.insert(3, 'z'), Err((TableError::OutOfRange(3), 'z')));
    }

    #[test]
    fn remove_and_get_report_vacant_or_out_of_range() {
        let mut table: FixedSizeTable<u8> = FixedSizeTable::new(2);
        assert_eq!(table.get(0), Err(TableError::Vacant(0)));
        assert_eq!(table.get(7), Err(TableError::OutOfRange(7)));
        assert_eq!(table.remove(1), Err(TableError::Vacant(1)));
        assert_eq!(table.remove(2), Err(TableError::OutOfRange(2)));
        assert!(table.is_empty());
    }

    #[test]
    fn iter_and_drain_skip_vacant_slots() {
        let mut table = FixedSizeTable::new(4);
        table.insert(1, 10).unwrap();
        table.insert(3, 30).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(1, &10), (3, &30)]);
        assert_eq!(table.drain(), vec![(1, 10), (3, 30)]);
        assert!(table.is_empty());
        assert_eq!(table.get(1), Err(TableError::Vacant(1)));
    }
}
