use crate::domain::model::Mutation;

/// Positional substitutions between `reference` and `candidate`.
///
/// Only the common prefix length is compared, so length differences never
/// show up as insertions or deletions. Positions are 1-based; a position is
/// reported when both characters are alphabetic and differ (case-sensitive).
pub fn find_mutations(reference: &str, candidate: &str) -> Vec<Mutation> {
    reference
        .chars()
        .zip(candidate.chars())
        .enumerate()
        .filter(|(_, (r, c))| r != c && r.is_alphabetic() && c.is_alphabetic())
        .map(|(i, (original_aa, new_aa))| Mutation {
            original_aa,
            position: i + 1,
            new_aa,
        })
        .collect()
}

/// One mutation per line, no trailing newline.
pub fn mutation_lines(mutations: &[Mutation]) -> String {
    mutations
        .iter()
        .map(Mutation::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
