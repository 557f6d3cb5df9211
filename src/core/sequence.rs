//! Small sequence helpers used for strand resolution.

/// Reverse-complement a nucleotide string.
///
/// Both cases of `A`, `C`, `G`, `T` are complemented to upper case; any other
/// symbol (IUPAC ambiguity codes, `-`, `I`/`D`) passes through unchanged.
#[must_use]
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}

fn complement(base: char) -> char {
    match base {
        'A' | 'a' => 'T',
        'C' | 'c' => 'G',
        'G' | 'g' => 'C',
        'T' | 't' => 'A',
        other => other,
    }
}

/// Levenshtein edit distance over bytes.
///
/// Against an empty operand the distance is the length of the other operand.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    // Single rolling column over `a`
    let mut column: Vec<usize> = (0..=a.len()).collect();
    for (x, &bc) in b.iter().enumerate() {
        let mut diagonal = column[0];
        column[0] = x + 1;
        for (y, &ac) in a.iter().enumerate() {
            let above = column[y + 1];
            let substitution = diagonal + usize::from(ac != bc);
            column[y + 1] = (above + 1).min(column[y] + 1).min(substitution);
            diagonal = above;
        }
    }
    column[a.len()]
}

/// Fraction of G/C over all symbols in the flanking context.
///
/// Ambiguity codes count toward the total but not toward G/C. An empty
/// context yields 0.
#[must_use]
pub fn gc_fraction(before: &str, after: &str) -> f64 {
    let mut gc = 0usize;
    let mut total = 0usize;
    for base in before.chars().chain(after.chars()) {
        if matches!(base, 'C' | 'G' | 'c' | 'g') {
            gc += 1;
        }
        total += 1;
    }

    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        gc as f64 / total as f64
    }
}

/// Leading window of at most `n` bytes
#[must_use]
pub fn prefix(s: &str, n: usize) -> &str {
    s.get(..n.min(s.len())).unwrap_or(s)
}

/// Trailing window of at most `n` bytes
#[must_use]
pub fn suffix(s: &str, n: usize) -> &str {
    s.get(s.len().saturating_sub(n)..).unwrap_or(s)
}
