//! Merge ordering.
//!
//! The order of a merge is an explicit list of unique display names owned
//! by the caller. It can be kept as given, sorted alphabetically, set from
//! 1-based positions, or reconciled with a previous order when the input
//! set changes.

use std::collections::{HashMap, HashSet};

use crate::config::OrderMode;
use crate::error::{PdfFuseError, Result};

/// Make display names unique by suffixing repeats with ` (2)`, ` (3)`, ...
///
/// The first occurrence keeps its name. Counting follows input order, and a
/// suffix is skipped when it is already taken, either by an earlier result
/// or by an input named that way.
///
/// # Examples
///
/// ```
/// use pdffuse::order::unique_display_names;
///
/// let names = ["a.pdf", "b.pdf", "a.pdf"].map(String::from);
/// assert_eq!(unique_display_names(&names), vec!["a.pdf", "b.pdf", "a.pdf (2)"]);
/// ```
pub fn unique_display_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let raw: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());

    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if taken.insert(name.to_string()) {
                return name.to_string();
            }

            let suffix = next_suffix.entry(name).or_insert(2);
            loop {
                let candidate = format!("{name} ({suffix})");
                *suffix += 1;
                if !raw.contains(candidate.as_str()) && taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

/// Check that `positions` is a permutation of `1..=len`.
///
/// # Errors
///
/// Returns `InvalidOrder` naming the first problem found.
pub fn check_positions(positions: &[usize], len: usize) -> Result<()> {
    if positions.len() != len {
        return Err(PdfFuseError::invalid_order(format!(
            "expected {len} positions, got {}",
            positions.len()
        )));
    }

    let mut used = vec![false; len];
    for &position in positions {
        if position == 0 || position > len {
            return Err(PdfFuseError::invalid_order(format!(
                "position {position} is out of range 1-{len}"
            )));
        }
        if std::mem::replace(&mut used[position - 1], true) {
            return Err(PdfFuseError::invalid_order(format!(
                "position {position} is used more than once"
            )));
        }
    }

    Ok(())
}

/// An ordered list of unique display names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOrder {
    names: Vec<String>,
}

impl MergeOrder {
    /// Use `names` in the order given.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Keep names from `previous` that are still in `current`, in their
    /// previous order, then append names new in `current` in their current
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdffuse::order::MergeOrder;
    ///
    /// let previous = ["c", "a", "b"].map(String::from);
    /// let current = ["a", "b", "d"].map(String::from);
    ///
    /// let order = MergeOrder::reconcile(&previous, &current);
    /// assert_eq!(order.names(), ["a", "b", "d"]);
    /// ```
    pub fn reconcile(previous: &[String], current: &[String]) -> Self {
        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();

        let kept = previous
            .iter()
            .filter(|name| current_set.contains(name.as_str()) && seen.insert(name.as_str()));
        let mut names: Vec<String> = kept.cloned().collect();

        for name in current {
            if seen.insert(name.as_str()) {
                names.push(name.clone());
            }
        }

        Self { names }
    }

    /// Sort `names` ignoring case. Names equal up to case keep their order.
    pub fn alphabetical(names: &[String]) -> Self {
        let mut names = names.to_vec();
        names.sort_by_key(|name| name.to_lowercase());
        Self { names }
    }

    /// Arrange `names` by 1-based `positions`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrder` unless `positions` is a permutation of
    /// `1..=names.len()`.
    pub fn from_positions(names: &[String], positions: &[usize]) -> Result<Self> {
        check_positions(positions, names.len())?;

        Ok(Self {
            names: positions.iter().map(|&p| names[p - 1].clone()).collect(),
        })
    }

    /// Build the order selected by `mode` for `names` in input order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrder` if an explicit order is not a permutation.
    pub fn resolve(mode: &OrderMode, names: &[String]) -> Result<Self> {
        match mode {
            OrderMode::AsGiven => Ok(Self::new(names.to_vec())),
            OrderMode::Alphabetical => Ok(Self::alphabetical(names)),
            OrderMode::Explicit(positions) => Self::from_positions(names, positions),
        }
    }

    /// Names in merge order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Numbered preview lines, `1. name`, `2. name`, ...
    pub fn preview(&self) -> Vec<String> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {name}", i + 1))
            .collect()
    }

    /// Reorder `items` to follow this order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrder` if the names of `items` and this order differ.
    pub fn arrange<T, F>(&self, items: Vec<T>, name_of: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> &str,
    {
        if items.len() != self.names.len() {
            return Err(PdfFuseError::invalid_order(format!(
                "order has {} entries but there are {} inputs",
                self.names.len(),
                items.len()
            )));
        }

        let index: HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (name_of(item).to_string(), i))
            .collect();
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();

        self.names
            .iter()
            .map(|name| {
                index
                    .get(name)
                    .and_then(|&i| slots[i].take())
                    .ok_or_else(|| PdfFuseError::invalid_order(format!("unknown input: {name}")))
            })
            .collect()
    }
}
