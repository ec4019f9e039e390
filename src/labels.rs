//! Tick label normalisation.

/// A tick label cell with more than one entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tick label cell {index} holds {count} entries, expected at most one")]
pub struct LabelError {
    pub index: usize,
    pub count: usize,
}

/// Flatten ragged tick label cells into one label per tick.
///
/// Every cell is either empty (no label at that tick) or holds exactly one
/// string:
///
/// ```text
/// [[], ["2010-10-11"], []]  =>  ["", "2010-10-11", ""]
/// ```
pub fn flatten_labels<S: AsRef<str>>(cells: &[Vec<S>]) -> Result<Vec<String>, LabelError> {
    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell.as_slice() {
            [] => Ok(String::new()),
            [label] => Ok(label.as_ref().to_string()),
            _ => Err(LabelError {
                index,
                count: cell.len(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_become_blank_labels() {
        let cells = vec![vec![], vec!["2010-10-11"], vec![]];
        assert_eq!(
            flatten_labels(&cells).unwrap(),
            vec!["", "2010-10-11", ""]
        );
    }

    #[test]
    fn no_cells() {
        let cells: Vec<Vec<String>> = Vec::new();
        assert!(flatten_labels(&cells).unwrap().is_empty());
    }

    #[test]
    fn crowded_cell_is_rejected() {
        let cells = vec![vec!["00:00"], vec!["03:00", "04:00"]];
        assert_eq!(
            flatten_labels(&cells),
            Err(LabelError { index: 1, count: 2 })
        );
    }
}
