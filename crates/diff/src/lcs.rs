//! Longest-common-subsequence alignment of two arrays
//!
//! Builds the classic `(n+1) x (m+1)` length table over the part of the
//! arrays left after trimming a common prefix and suffix, then walks it from
//! the end of both arrays backward. The walk collects steps in reverse; the
//! result is returned in forward document order.

use serde_json::Value;

/// One step of an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `old[i]` and `new[j]` are aligned
    Matched(usize, usize),
    /// `old[i]` has no counterpart
    Removed(usize),
    /// `new[j]` has no counterpart
    Added(usize),
}

/// Number of table cells an alignment of these lengths would allocate
pub fn table_cells(old_len: usize, new_len: usize) -> usize {
    (old_len + 1).saturating_mul(new_len + 1)
}

/// Align `old` against `new` using `eq` as the match predicate
pub fn align<F>(old: &[Value], new: &[Value], eq: F) -> Vec<Step>
where
    F: Fn(&Value, &Value) -> bool,
{
    let shortest = old.len().min(new.len());
    let mut prefix = 0;
    while prefix < shortest && eq(&old[prefix], &new[prefix]) {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < shortest - prefix
        && eq(&old[old.len() - 1 - suffix], &new[new.len() - 1 - suffix])
    {
        suffix += 1;
    }

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];

    let mut steps = Vec::with_capacity(old.len().max(new.len()));
    steps.extend((0..prefix).map(|i| Step::Matched(i, i)));
    steps.extend(align_core(a, b, &eq).into_iter().map(|step| match step {
        Step::Matched(i, j) => Step::Matched(i + prefix, j + prefix),
        Step::Removed(i) => Step::Removed(i + prefix),
        Step::Added(j) => Step::Added(j + prefix),
    }));
    steps.extend(
        (0..suffix)
            .rev()
            .map(|k| Step::Matched(old.len() - 1 - k, new.len() - 1 - k)),
    );
    steps
}

fn align_core<F>(a: &[Value], b: &[Value], eq: &F) -> Vec<Step>
where
    F: Fn(&Value, &Value) -> bool,
{
    if a.is_empty() {
        return (0..b.len()).map(Step::Added).collect();
    }
    if b.is_empty() {
        return (0..a.len()).map(Step::Removed).collect();
    }

    // table[i * cols + j] = LCS length of a[..i] and b[..j]
    let cols = b.len() + 1;
    let mut table = vec![0u32; (a.len() + 1) * cols];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i * cols + j] = if eq(&a[i - 1], &b[j - 1]) {
                table[(i - 1) * cols + (j - 1)] + 1
            } else {
                table[(i - 1) * cols + j].max(table[i * cols + (j - 1)])
            };
        }
    }

    let mut reversed = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (a.len(), b.len());
    while i > 0 && j > 0 {
        if eq(&a[i - 1], &b[j - 1]) {
            reversed.push(Step::Matched(i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if table[(i - 1) * cols + j] >= table[i * cols + (j - 1)] {
            reversed.push(Step::Removed(i - 1));
            i -= 1;
        } else {
            reversed.push(Step::Added(j - 1));
            j -= 1;
        }
    }
    while i > 0 {
        reversed.push(Step::Removed(i - 1));
        i -= 1;
    }
    while j > 0 {
        reversed.push(Step::Added(j - 1));
        j -= 1;
    }
    reversed.reverse();
    reversed
}
