//! Merge-join differ for the rows of one table
//!
//! Both row sequences are scanned once, in their stored order. Dump exporters
//! write rows in a stable order (usually by primary key), so a row that is
//! neither unchanged nor updated in place is taken to have been deleted. When
//! the order is not stable the result contains a delete/insert pair where an
//! update would have been possible; that approximation is accepted.

use dumpdelta_core::{PrimaryKeyExtractor, Row, RowSequencer, Table};

/// One classified row difference, borrowed from the snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOperation<'a> {
    /// Row only present in the current snapshot
    Insert(&'a Row),

    /// Same key, different content
    Update { old: &'a Row, new: &'a Row },

    /// Row only present in the previous snapshot
    Delete(&'a Row),
}

/// Lazily produces the operations turning `previous` rows into `current` rows
///
/// Operations come out in scan order: updates and deletes interleaved while
/// both sides have rows, then the remaining deletes, then the remaining
/// inserts. Unchanged rows produce nothing.
pub struct RowDiffer<'a> {
    current: RowSequencer<'a>,
    previous: RowSequencer<'a>,
    current_key: PrimaryKeyExtractor<'a>,
    previous_key: PrimaryKeyExtractor<'a>,
    pending_current: Option<&'a Row>,
    pending_previous: Option<&'a Row>,
}

impl<'a> RowDiffer<'a> {
    /// Differ over all rows of two versions of a table
    ///
    /// Each side's rows are keyed with that side's declared primary key.
    /// Schemas are not checked here; see `ChangeSet::compare`.
    pub fn new(current: &'a Table, previous: &'a Table) -> Self {
        Self::from_sequences(
            current.rows(),
            current.key_extractor(),
            previous.rows(),
            previous.key_extractor(),
        )
    }

    pub fn from_sequences(
        mut current: RowSequencer<'a>,
        current_key: PrimaryKeyExtractor<'a>,
        mut previous: RowSequencer<'a>,
        previous_key: PrimaryKeyExtractor<'a>,
    ) -> Self {
        let pending_current = current.next();
        let pending_previous = previous.next();

        Self {
            current,
            previous,
            current_key,
            previous_key,
            pending_current,
            pending_previous,
        }
    }

    fn advance_current(&mut self) {
        self.pending_current = self.current.next();
    }

    fn advance_previous(&mut self) {
        self.pending_previous = self.previous.next();
    }
}

impl<'a> Iterator for RowDiffer<'a> {
    type Item = RowOperation<'a>;

    fn next(&mut self) -> Option<RowOperation<'a>> {
        loop {
            match (self.pending_current, self.pending_previous) {
                (Some(current), Some(previous)) => {
                    if current == previous {
                        self.advance_current();
                        self.advance_previous();
                        continue;
                    }

                    if self.current_key.extract(current) == self.previous_key.extract(previous) {
                        self.advance_current();
                        self.advance_previous();
                        return Some(RowOperation::Update { old: previous, new: current });
                    }

                    // misaligned: only the previous cursor moves
                    self.advance_previous();
                    return Some(RowOperation::Delete(previous));
                }
                (None, Some(previous)) => {
                    self.advance_previous();
                    return Some(RowOperation::Delete(previous));
                }
                (Some(current), None) => {
                    self.advance_current();
                    return Some(RowOperation::Insert(current));
                }
                (None, None) => return None,
            }
        }
    }
}

impl std::iter::FusedIterator for RowDiffer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use dumpdelta_core::{Column, Schema, Value};

    fn value(v: &str) -> Value {
        if v.chars().all(|c| c.is_ascii_digit()) {
            Value::number(v)
        } else {
            Value::text(v)
        }
    }

    fn row(values: &[&str]) -> Row {
        values.iter().map(|v| value(v)).collect()
    }

    fn table(primary_key: Vec<usize>, groups: &[&[&[&str]]]) -> Table {
        let schema = Schema::from_columns(vec![
            Column::new("id", "INT"),
            Column::new("name", "TEXT"),
        ]);
        Table::new("t", schema, primary_key).with_row_groups(
            groups
                .iter()
                .map(|rows| rows.iter().map(|r| row(r)).collect())
                .collect(),
        )
    }

    fn diff<'a>(current: &'a Table, previous: &'a Table) -> Vec<RowOperation<'a>> {
        RowDiffer::new(current, previous).collect()
    }

    fn position(table: &Table, target: &Row) -> usize {
        table
            .rows()
            .position(|r| std::ptr::eq(r, target))
            .expect("operation row belongs to the table")
    }

    /// Rows of `table` not referenced by any operation, in order
    fn untouched<'a>(table: &'a Table, touched: &[usize]) -> Vec<&'a Row> {
        table
            .rows()
            .enumerate()
            .filter(|(i, _)| !touched.contains(i))
            .map(|(_, r)| r)
            .collect()
    }

    #[test]
    fn update_delete_insert() {
        let previous = table(vec![0], &[&[&["1", "a"], &["2", "b"], &["3", "c"]]]);
        let current = table(vec![0], &[&[&["1", "a"], &["2", "B"], &["4", "d"]]]);

        let ops = diff(&current, &previous);
        assert_eq!(
            ops,
            vec![
                RowOperation::Update { old: &row(&["2", "b"]), new: &row(&["2", "B"]) },
                RowOperation::Delete(&row(&["3", "c"])),
                RowOperation::Insert(&row(&["4", "d"])),
            ]
        );
    }

    #[test]
    fn no_key_only_detects_new_rows() {
        let previous = table(vec![], &[&[&["1", "x"]]]);
        let current = table(vec![], &[&[&["1", "x"], &["2", "y"]]]);

        assert_eq!(diff(&current, &previous), vec![RowOperation::Insert(&row(&["2", "y"]))]);
    }

    #[test]
    fn no_key_changed_row_is_delete_plus_insert() {
        let previous = table(vec![], &[&[&["1", "x"]]]);
        let current = table(vec![], &[&[&["1", "y"]]]);

        assert_eq!(
            diff(&current, &previous),
            vec![
                RowOperation::Delete(&row(&["1", "x"])),
                RowOperation::Insert(&row(&["1", "y"])),
            ]
        );
    }

    #[test]
    fn identical_tables_produce_nothing() {
        let t = table(vec![0], &[&[&["1", "a"], &["2", "b"]], &[&["3", "c"]]]);
        assert!(diff(&t, &t).is_empty());
    }

    #[test]
    fn equal_rows_unchanged_with_or_without_key() {
        let keyed = table(vec![0], &[&[&["1", "a"]]]);
        let unkeyed = table(vec![], &[&[&["1", "a"]]]);
        assert!(diff(&keyed, &keyed).is_empty());
        assert!(diff(&unkeyed, &unkeyed).is_empty());
    }

    #[test]
    fn group_boundaries_do_not_matter() {
        let previous = table(vec![0], &[&[&["1", "a"]], &[&["2", "b"], &["3", "c"]]]);
        let current = table(vec![0], &[&[&["1", "a"], &["2", "b"]], &[], &[&["3", "c"]]]);
        assert!(diff(&current, &previous).is_empty());
    }

    #[test]
    fn empty_previous_is_all_inserts() {
        let previous = table(vec![0], &[]);
        let current = table(vec![0], &[&[&["1", "a"], &["2", "b"]]]);

        let ops = diff(&current, &previous);
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| matches!(op, RowOperation::Insert(_))));
    }

    #[test]
    fn empty_current_is_all_deletes() {
        let previous = table(vec![0], &[&[&["1", "a"], &["2", "b"]]]);
        let current = table(vec![0], &[]);

        let ops = diff(&current, &previous);
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| matches!(op, RowOperation::Delete(_))));
    }

    #[test]
    fn reordered_rows_are_not_matched() {
        // row 1 moved to the end: scan order is not repaired
        let previous = table(vec![0], &[&[&["1", "a"], &["2", "b"]]]);
        let current = table(vec![0], &[&[&["2", "b"], &["1", "a"]]]);

        assert_eq!(
            diff(&current, &previous),
            vec![
                RowOperation::Delete(&row(&["1", "a"])),
                RowOperation::Insert(&row(&["1", "a"])),
            ]
        );
    }

    #[test]
    fn keys_use_each_side_declaration() {
        let previous = table(vec![0], &[&[&["1", "a"]]]);
        let current = table(vec![1], &[&[&["2", "a"]]]);

        // keys are (1) and ('a'): not the same entity
        let ops = diff(&current, &previous);
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn operations_partition_both_sides() {
        let cases = [
            (
                table(vec![0], &[&[&["1", "a"], &["2", "b"], &["3", "c"], &["5", "e"]]]),
                table(vec![0], &[&[&["1", "a"], &["2", "B"]], &[&["4", "d"], &["5", "e"], &["6", "f"]]]),
            ),
            (
                table(vec![], &[&[&["1", "x"], &["2", "y"]]]),
                table(vec![], &[&[&["2", "y"], &["3", "z"], &["1", "x"]]]),
            ),
            (
                table(vec![0], &[&[&["1", "a"]], &[&["2", "b"]]]),
                table(vec![0], &[&[&["0", "z"], &["1", "a"], &["2", "c"]]]),
            ),
        ];

        for (previous, current) in &cases {
            let mut touched_old = Vec::new();
            let mut touched_new = Vec::new();
            for op in diff(current, previous) {
                match op {
                    RowOperation::Insert(new) => touched_new.push(position(current, new)),
                    RowOperation::Delete(old) => touched_old.push(position(previous, old)),
                    RowOperation::Update { old, new } => {
                        touched_old.push(position(previous, old));
                        touched_new.push(position(current, new));
                    }
                }
            }

            // each row is classified at most once, in scan order
            assert!(touched_old.windows(2).all(|w| w[0] < w[1]));
            assert!(touched_new.windows(2).all(|w| w[0] < w[1]));

            // whatever is left on both sides is the same unchanged sequence
            assert_eq!(untouched(previous, &touched_old), untouched(current, &touched_new));
        }
    }
}
