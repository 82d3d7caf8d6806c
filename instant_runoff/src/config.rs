// ********* Input data structures ***********

use std::collections::btree_set;
use std::collections::BTreeSet;

/// One voter's ranked list of candidates, most preferred first.
///
/// The list is kept exactly as it was given: names are not reordered or
/// deduplicated, and eliminations never modify it. Which candidates are still
/// in contention is tracked separately by an [EliminationState].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    candidates: Vec<String>,
}

impl Ballot {
    pub fn new(candidates: Vec<String>) -> Ballot {
        Ballot { candidates }
    }

    /// The ranked choices, as written on the ballot.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The ranked choices that are still in contention, in rank order.
    ///
    /// Every call starts again from the first rank, so calling it after further
    /// eliminations skips more candidates.
    pub fn remaining_choices<'a>(
        &'a self,
        eliminated: &'a EliminationState,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.candidates
            .iter()
            .map(|name| name.as_str())
            .filter(move |name| !eliminated.is_eliminated(name))
    }

    /// The highest ranked candidate that has not been eliminated.
    ///
    /// Returns None for an exhausted ballot: every ranked candidate has been
    /// eliminated (or the ballot was empty to begin with).
    pub fn top_choice<'a>(&'a self, eliminated: &'a EliminationState) -> Option<&'a str> {
        self.remaining_choices(eliminated).next()
    }
}

impl<S: Into<String>> FromIterator<S> for Ballot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Ballot::new(iter.into_iter().map(|s| s.into()).collect())
    }
}

/// The candidates removed from contention during one tally.
///
/// A tally starts from an empty state and only ever adds to it.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct EliminationState {
    eliminated: BTreeSet<String>,
}

impl EliminationState {
    pub fn new() -> EliminationState {
        EliminationState::default()
    }

    /// Marks a candidate as eliminated.
    ///
    /// Returns false if the candidate was already eliminated, in which case the
    /// state is left unchanged.
    pub fn eliminate(&mut self, candidate: &str) -> bool {
        // Checked first to skip allocating the name.
        if self.eliminated.contains(candidate) {
            return false;
        }
        self.eliminated.insert(candidate.to_string())
    }

    pub fn is_eliminated(&self, candidate: &str) -> bool {
        self.eliminated.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.eliminated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eliminated.is_empty()
    }

    /// The eliminated candidates, sorted by name.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.eliminated.iter()
    }

    /// Puts every candidate back in contention.
    pub fn clear(&mut self) {
        self.eliminated.clear();
    }
}

// ******** Output data structures *********

/// Where the ballots of an eliminated candidate went in the following round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub name: String,
    pub transfers: Vec<(String, u64)>,
    pub exhausted: u64,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, u64)>,
    /// Ballots that did not count for anyone in this round.
    pub exhausted: u64,
    pub tally_results_elected: Vec<String>,
    pub tally_result_eliminated: Vec<EliminationStats>,
}

/// How a tally ended.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Outcome {
    Winner(String),
    /// All the remaining candidates hold the same number of votes and none of
    /// them has a majority. Eliminating the lowest candidates would eliminate
    /// everyone, so the tally stops here.
    Tie(Vec<String>),
    /// No candidate appears on any ballot.
    NoCandidates,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub outcome: Outcome,
    /// Number of votes needed for a strict majority of all the ballots cast.
    pub threshold: u64,
    /// Number of counting rounds that were run.
    pub rounds: u32,
    pub round_stats: Vec<RoundStats>,
}

impl VotingResult {
    pub fn winner(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Winner(name) => Some(name.as_str()),
            _ => None,
        }
    }
}
