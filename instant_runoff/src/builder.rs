pub use crate::config::*;
use crate::BallotBox;

/// A builder for collecting ballots from raw rankings.
///
/// ```
/// use instant_runoff::builder::Builder;
///
/// let mut builder = Builder::new();
/// builder.add_ballot_simple(&[" Anna ".to_string(), "Clara".to_string(), "".to_string()]);
/// builder.add_ballot_simple(&["Bob".to_string()]);
///
/// let ballot_box = builder.build();
/// assert_eq!(ballot_box.ballots()[0].candidates(), &["Anna", "Clara"]);
/// assert_eq!(ballot_box.candidate_names().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    _ballots: Vec<Ballot>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Adds a ballot from the names as they were read.
    ///
    /// Surrounding whitespace is removed and empty names are dropped. Nothing
    /// else is checked: a name may appear several times, and a ballot with no
    /// name at all is kept (it is exhausted from the first round).
    pub fn add_ballot_simple(&mut self, candidates: &[String]) {
        let ballot: Ballot = candidates
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        self.add_ballot(ballot);
    }

    pub fn add_ballot(&mut self, ballot: Ballot) {
        self._ballots.push(ballot);
    }

    pub fn len(&self) -> usize {
        self._ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self._ballots.is_empty()
    }

    pub fn build(self) -> BallotBox {
        BallotBox::new(self._ballots)
    }
}
