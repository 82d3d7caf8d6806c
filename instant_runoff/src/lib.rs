/*!
Instant-runoff voting tally engine.

Ballots are ranked lists of candidate names. Every round, each ballot counts
for its highest ranked candidate still in contention. If a candidate holds a
strict majority of all the ballots, it wins. Otherwise all the candidates tied
for the lowest count are eliminated together, and the votes are counted again.

```
use instant_runoff::{Ballot, BallotBox};

let ballots: Vec<Ballot> = vec![
    ["Anna", "Bob"].into_iter().collect(),
    ["Anna"].into_iter().collect(),
    ["Bob", "Anna"].into_iter().collect(),
    ["Bob"].into_iter().collect(),
    ["Clara", "Anna"].into_iter().collect(),
];
let mut ballot_box = BallotBox::new(ballots);
ballot_box.identify_winner();

assert_eq!(ballot_box.winner(), Some("Anna"));
assert_eq!(ballot_box.number_rounds(), Some(2));
```
*/
mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::AddAssign,
};

pub use crate::config::*;

// **** Private structures ****

type RoundId = u32;

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

/// The candidates sharing the lowest or the highest count of a round.
///
/// `candidates` is never empty and is sorted by name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Extreme {
    pub count: u64,
    pub candidates: Vec<String>,
}

/// The vote counts of one round.
///
/// Only the candidates still in contention appear in a tally, including the
/// ones that did not receive any vote.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Tally {
    counts: BTreeMap<String, VoteCount>,
    exhausted: VoteCount,
}

impl Tally {
    /// The number of votes of a candidate, or None if the candidate is not in
    /// contention.
    pub fn get(&self, candidate: &str) -> Option<u64> {
        self.counts.get(candidate).map(|vc| vc.0)
    }

    /// The number of candidates in contention.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The counts, sorted by candidate name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(name, vc)| (name.as_str(), vc.0))
    }

    /// The number of ballots that counted for a candidate.
    pub fn total(&self) -> u64 {
        self.counts.values().cloned().sum::<VoteCount>().0
    }

    /// The number of ballots that did not count for anyone.
    pub fn exhausted(&self) -> u64 {
        self.exhausted.0
    }

    /// All the candidates with the lowest count.
    pub fn find_minimum(&self) -> Option<Extreme> {
        let min_count = *self.counts.values().min()?;
        Some(self.all_with_count(min_count))
    }

    /// All the candidates with the highest count.
    pub fn find_maximum(&self) -> Option<Extreme> {
        let max_count = *self.counts.values().max()?;
        Some(self.all_with_count(max_count))
    }

    fn all_with_count(&self, count: VoteCount) -> Extreme {
        let candidates = self
            .counts
            .iter()
            .filter_map(|(name, vc)| if *vc == count { Some(name.clone()) } else { None })
            .collect();
        Extreme {
            count: count.0,
            candidates,
        }
    }
}

// What to do at the end of a round.
#[derive(Eq, PartialEq, Debug, Clone)]
enum RoundDecision {
    Elected(String),
    Eliminated(Vec<String>),
    Tie(Vec<String>),
    NoCandidates,
}

/// All the ballots of one election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotBox {
    ballots: Vec<Ballot>,
    candidate_names: BTreeSet<String>,
    result: Option<VotingResult>,
}

impl BallotBox {
    /// Collects the ballots of an election.
    ///
    /// The candidates are all the names that appear on at least one ballot, at
    /// any rank.
    pub fn new(ballots: Vec<Ballot>) -> BallotBox {
        let candidate_names: BTreeSet<String> = ballots
            .iter()
            .flat_map(|b| b.candidates().iter().cloned())
            .collect();
        BallotBox {
            ballots,
            candidate_names,
            result: None,
        }
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    /// All the candidates, eliminated or not, sorted by name.
    pub fn candidate_names(&self) -> &BTreeSet<String> {
        &self.candidate_names
    }

    /// The number of votes needed to win: a strict majority of all the ballots,
    /// including the ones that get exhausted later.
    pub fn winning_threshold(&self) -> u64 {
        (self.ballots.len() as u64) / 2 + 1
    }

    /// Counts the votes of each candidate still in contention.
    pub fn count_votes(&self, eliminated: &EliminationState) -> Tally {
        let mut tally = Tally {
            counts: self
                .candidate_names
                .iter()
                .filter(|name| !eliminated.is_eliminated(name))
                .map(|name| (name.clone(), VoteCount::EMPTY))
                .collect(),
            exhausted: VoteCount::EMPTY,
        };
        for ballot in self.ballots.iter() {
            match ballot
                .top_choice(eliminated)
                .and_then(|name| tally.counts.get_mut(name))
            {
                Some(vc) => *vc += VoteCount::ONE,
                None => tally.exhausted += VoteCount::ONE,
            }
        }
        tally
    }

    /// Runs the rounds of the election until a candidate wins or no further
    /// elimination is possible.
    ///
    /// Every call starts over from a fresh elimination state, so calling it
    /// again returns the same result.
    pub fn identify_winner(&mut self) -> &VotingResult {
        let result = self.run_rounds();
        self.result.insert(result)
    }

    /// The result of the last call to [BallotBox::identify_winner].
    pub fn result(&self) -> Option<&VotingResult> {
        self.result.as_ref()
    }

    /// The winner, if the election has been tallied and has a winner.
    pub fn winner(&self) -> Option<&str> {
        self.result.as_ref().and_then(|r| r.winner())
    }

    /// The number of rounds of the last tally, None before any tally.
    pub fn number_rounds(&self) -> Option<u32> {
        self.result.as_ref().map(|r| r.rounds)
    }

    fn run_rounds(&self) -> VotingResult {
        let threshold = VoteCount(self.winning_threshold());
        info!(
            "Processing {} ballots, {} candidates (winning threshold: {})",
            self.ballots.len(),
            self.candidate_names.len(),
            threshold.0
        );
        for name in self.candidate_names.iter() {
            info!("Candidate: {}", name);
        }

        let mut eliminated = EliminationState::new();
        let mut round_stats: Vec<RoundStats> = Vec::new();
        let mut round_id: RoundId = 0;

        loop {
            round_id += 1;
            let tally = self.count_votes(&eliminated);
            debug!("run_rounds: round {}: tally: {:?}", round_id, tally);

            let decision = decide_round(&tally, threshold);
            debug!("run_rounds: round {}: decision: {:?}", round_id, decision);

            let mut stats = RoundStats {
                round: round_id,
                tally: tally.iter().map(|(name, c)| (name.to_string(), c)).collect(),
                exhausted: tally.exhausted(),
                tally_results_elected: Vec::new(),
                tally_result_eliminated: Vec::new(),
            };

            let outcome = match decision {
                RoundDecision::Elected(name) => {
                    stats.tally_results_elected.push(name.clone());
                    Outcome::Winner(name)
                }
                RoundDecision::Tie(names) => Outcome::Tie(names),
                RoundDecision::NoCandidates => Outcome::NoCandidates,
                RoundDecision::Eliminated(losers) => {
                    let before = eliminated.clone();
                    for name in losers.iter() {
                        eliminated.eliminate(name);
                    }
                    stats.tally_result_eliminated =
                        self.transfer_stats(&losers, &before, &eliminated);
                    print_round_stats(&stats, threshold);
                    round_stats.push(stats);
                    continue;
                }
            };

            print_round_stats(&stats, threshold);
            round_stats.push(stats);
            info!("Outcome after {} rounds: {:?}", round_id, outcome);
            return VotingResult {
                outcome,
                threshold: threshold.0,
                rounds: round_id,
                round_stats,
            };
        }
    }

    // For every candidate eliminated in this round, where its ballots go next.
    fn transfer_stats(
        &self,
        losers: &[String],
        before: &EliminationState,
        after: &EliminationState,
    ) -> Vec<EliminationStats> {
        let mut transfers: BTreeMap<&str, (BTreeMap<&str, VoteCount>, VoteCount)> = losers
            .iter()
            .map(|name| (name.as_str(), (BTreeMap::new(), VoteCount::EMPTY)))
            .collect();
        for ballot in self.ballots.iter() {
            let entry = match ballot
                .top_choice(before)
                .and_then(|name| transfers.get_mut(name))
            {
                Some(e) => e,
                // Not a ballot of an eliminated candidate.
                None => continue,
            };
            match ballot.top_choice(after) {
                Some(next) => *entry.0.entry(next).or_default() += VoteCount::ONE,
                None => entry.1 += VoteCount::ONE,
            }
        }
        debug!("transfer_stats: {:?}", transfers);
        transfers
            .into_iter()
            .map(|(name, (to, exhausted))| EliminationStats {
                name: name.to_string(),
                transfers: to.into_iter().map(|(n, vc)| (n.to_string(), vc.0)).collect(),
                exhausted: exhausted.0,
            })
            .collect()
    }
}

fn decide_round(tally: &Tally, threshold: VoteCount) -> RoundDecision {
    let max = match tally.find_maximum() {
        Some(m) => m,
        None => return RoundDecision::NoCandidates,
    };
    // A strict majority can only be held by one candidate. The last candidate
    // standing wins even without a majority since it cannot be eliminated.
    if VoteCount(max.count) >= threshold || tally.len() == 1 {
        return RoundDecision::Elected(max.candidates[0].clone());
    }
    let min = match tally.find_minimum() {
        Some(m) => m,
        None => return RoundDecision::NoCandidates,
    };
    if min.candidates.len() == tally.len() {
        return RoundDecision::Tie(min.candidates);
    }
    RoundDecision::Eliminated(min.candidates)
}

fn print_round_stats(stats: &RoundStats, threshold: VoteCount) {
    info!("Round {} (winning threshold: {})", stats.round, threshold.0);
    let mut tally = stats.tally.clone();
    tally.sort_by(|(n1, c1), (n2, c2)| c2.cmp(c1).then_with(|| n1.cmp(n2)));
    for (name, count) in tally.iter() {
        if stats.tally_results_elected.contains(name) {
            info!("{:7} {} -> elected", count, name);
        } else if let Some(es) = stats
            .tally_result_eliminated
            .iter()
            .find(|es| es.name == *name)
        {
            info!("{:7} {} -> eliminated: {}", count, name, describe_transfers(es));
        } else {
            info!("{:7} {}", count, name);
        }
    }
    if stats.exhausted > 0 {
        info!("{:7} exhausted", stats.exhausted);
    }
}

fn describe_transfers(es: &EliminationStats) -> String {
    let mut parts: Vec<String> = es
        .transfers
        .iter()
        .map(|(to, c)| format!("{} {}", c, to))
        .collect();
    if es.exhausted > 0 {
        parts.push(format!("{} exhausted", es.exhausted));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ballot(names: &[&str]) -> Ballot {
        names.iter().cloned().collect()
    }

    fn sample_box() -> BallotBox {
        BallotBox::new(vec![
            ballot(&["Kaley", "Roxanne", "Aditya"]),
            ballot(&["Roxanne", "Kaley", "Aditya"]),
            ballot(&["Aditya", "Kaley", "Roxanne"]),
            ballot(&["Aditya", "Roxanne", "Kaley"]),
            ballot(&["Roxanne", "Aditya", "Kaley"]),
            ballot(&["Roxanne", "Aditya", "Michael"]),
        ])
    }

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ballot_keeps_its_candidates() {
        let b = ballot(&["Adam", "Bob", "Charles"]);
        assert_eq!(b.candidates(), names(&["Adam", "Bob", "Charles"]).as_slice());
    }

    #[test]
    fn top_choice_follows_eliminations() {
        let ranked = names(&[
            "Donald", "Edward", "Francis", "Greta", "Hilda", "Igor", "John", "Kathy",
        ]);
        let b = Ballot::new(ranked.clone());
        let mut state = EliminationState::new();
        for name in ranked.iter() {
            assert_eq!(b.top_choice(&state), Some(name.as_str()));
            state.eliminate(name);
        }
        assert_eq!(b.top_choice(&state), None);
        assert_eq!(b.candidates(), ranked.as_slice());
    }

    #[test]
    fn remaining_choices_skip_eliminated() {
        let b = ballot(&["Adam", "Bob", "Charles", "Donald"]);
        let mut state = EliminationState::new();
        state.eliminate("Bob");
        state.eliminate("Donald");
        state.eliminate("Zoe");
        let remaining: Vec<&str> = b.remaining_choices(&state).collect();
        assert_eq!(remaining, vec!["Adam", "Charles"]);
        for name in remaining {
            assert!(b.candidates().iter().any(|c| c == name));
            assert!(!state.is_eliminated(name));
        }
        // Restarting the sequence after a new elimination skips more names.
        state.eliminate("Adam");
        assert_eq!(b.remaining_choices(&state).collect::<Vec<_>>(), vec!["Charles"]);
    }

    #[test]
    fn eliminate_is_idempotent() {
        let mut once = EliminationState::new();
        assert!(once.eliminate("Adam"));
        let mut twice = once.clone();
        assert!(!twice.eliminate("Adam"));
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
        assert!(twice.eliminate("Bea"));
        assert_eq!(twice.iter().cloned().collect::<Vec<_>>(), names(&["Adam", "Bea"]));
        twice.clear();
        assert!(twice.is_empty());
    }

    #[test]
    fn transfers_description() {
        let es = EliminationStats {
            name: "Kaley".to_string(),
            transfers: vec![("Aditya".to_string(), 2), ("Roxanne".to_string(), 1)],
            exhausted: 1,
        };
        assert_eq!(describe_transfers(&es), "2 Aditya, 1 Roxanne, 1 exhausted");
        let es = EliminationStats {
            name: "Kaley".to_string(),
            transfers: vec![("Roxanne".to_string(), 1)],
            exhausted: 0,
        };
        assert_eq!(describe_transfers(&es), "1 Roxanne");
        let es = EliminationStats {
            name: "Michael".to_string(),
            transfers: vec![],
            exhausted: 0,
        };
        assert_eq!(describe_transfers(&es), "");
    }

    #[test]
    fn candidate_universe() {
        let bb = sample_box();
        let expected: BTreeSet<String> = names(&["Kaley", "Roxanne", "Aditya", "Michael"])
            .into_iter()
            .collect();
        assert_eq!(bb.candidate_names(), &expected);
        assert_eq!(bb.winning_threshold(), 4);
        assert_eq!(bb.winner(), None);
        assert_eq!(bb.number_rounds(), None);
    }

    #[test]
    fn eliminated_candidate_skipped_on_every_ballot() {
        let bb = sample_box();
        let mut state = EliminationState::new();
        state.eliminate("Aditya");
        for b in bb.ballots() {
            assert_ne!(b.top_choice(&state), Some("Aditya"));
            assert!(b.remaining_choices(&state).all(|n| n != "Aditya"));
        }
        let tally = bb.count_votes(&state);
        assert_eq!(tally.get("Aditya"), None);
        assert_eq!(tally.get("Kaley"), Some(2));
        assert_eq!(tally.get("Roxanne"), Some(4));
    }

    #[test]
    fn count_votes_first_round() {
        let bb = sample_box();
        let tally = bb.count_votes(&EliminationState::new());
        let counts: Vec<(&str, u64)> = tally.iter().collect();
        assert_eq!(
            counts,
            vec![("Aditya", 2), ("Kaley", 1), ("Michael", 0), ("Roxanne", 3)]
        );
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.exhausted(), 0);
    }

    #[test]
    fn find_extremes_first_round() {
        let bb = sample_box();
        let tally = bb.count_votes(&EliminationState::new());
        assert_eq!(
            tally.find_minimum(),
            Some(Extreme {
                count: 0,
                candidates: names(&["Michael"])
            })
        );
        assert_eq!(
            tally.find_maximum(),
            Some(Extreme {
                count: 3,
                candidates: names(&["Roxanne"])
            })
        );
        assert_eq!(Tally::default().find_minimum(), None);
        assert_eq!(Tally::default().find_maximum(), None);
    }

    #[test]
    fn identify_winner_sample() {
        init_logger();
        let mut bb = sample_box();
        let res = bb.identify_winner().clone();
        assert_eq!(res.outcome, Outcome::Winner("Roxanne".to_string()));
        assert_eq!(res.threshold, 4);
        assert_eq!(res.rounds, 3);
        assert_eq!(bb.winner(), Some("Roxanne"));
        assert_eq!(bb.number_rounds(), Some(3));

        let r1 = &res.round_stats[0];
        assert_eq!(r1.tally_result_eliminated.len(), 1);
        assert_eq!(r1.tally_result_eliminated[0].name, "Michael");
        assert!(r1.tally_result_eliminated[0].transfers.is_empty());

        let r2 = &res.round_stats[1];
        assert_eq!(
            r2.tally,
            vec![
                ("Aditya".to_string(), 2),
                ("Kaley".to_string(), 1),
                ("Roxanne".to_string(), 3)
            ]
        );
        assert_eq!(
            r2.tally_result_eliminated,
            vec![EliminationStats {
                name: "Kaley".to_string(),
                transfers: vec![("Roxanne".to_string(), 1)],
                exhausted: 0,
            }]
        );

        let r3 = &res.round_stats[2];
        assert_eq!(r3.tally_results_elected, names(&["Roxanne"]));
        assert!(r3.tally_result_eliminated.is_empty());
    }

    #[test]
    fn identify_winner_is_repeatable() {
        let mut bb = sample_box();
        let first = bb.identify_winner().clone();
        let second = bb.identify_winner().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn majority_in_first_round() {
        let mut bb = BallotBox::new(vec![
            ballot(&["A", "B"]),
            ballot(&["A", "C"]),
            ballot(&["B", "A"]),
        ]);
        let res = bb.identify_winner();
        assert_eq!(res.winner(), Some("A"));
        assert_eq!(res.rounds, 1);
    }

    #[test]
    fn tied_losers_eliminated_together() {
        init_logger();
        let mut bb = BallotBox::new(vec![
            ballot(&["A"]),
            ballot(&["A"]),
            ballot(&["A"]),
            ballot(&["B"]),
            ballot(&["B"]),
            ballot(&["C", "B"]),
            ballot(&["D", "B"]),
        ]);
        let res = bb.identify_winner().clone();
        let eliminated: Vec<&str> = res.round_stats[0]
            .tally_result_eliminated
            .iter()
            .map(|es| es.name.as_str())
            .collect();
        assert_eq!(eliminated, vec!["C", "D"]);
        // With a single elimination, B would only have 3 votes in round 2.
        assert_eq!(res.winner(), Some("B"));
        assert_eq!(res.rounds, 2);
        assert_eq!(res.round_stats[1].tally, vec![("A".to_string(), 3), ("B".to_string(), 4)]);
    }

    #[test]
    fn remaining_candidates_never_grow() {
        let mut bb = BallotBox::new(vec![
            ballot(&["A", "B", "C"]),
            ballot(&["B", "C"]),
            ballot(&["C", "D"]),
            ballot(&["D", "E", "A"]),
            ballot(&["E", "B"]),
            ballot(&["A"]),
            ballot(&["B", "A"]),
            ballot(&["A"]),
        ]);
        let res = bb.identify_winner();
        let sizes: Vec<usize> = res.round_stats.iter().map(|rs| rs.tally.len()).collect();
        assert!(sizes.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(sizes, vec![5, 2, 1]);
        assert_eq!(res.winner(), Some("A"));
    }

    #[test]
    fn exhausted_ballots_are_skipped() {
        let mut bb = BallotBox::new(vec![
            ballot(&["A"]),
            ballot(&["A"]),
            ballot(&["B"]),
            ballot(&["C"]),
            ballot(&["D"]),
        ]);
        let res = bb.identify_winner().clone();
        // A never reaches 3 votes but ends up as the last candidate standing.
        assert_eq!(res.winner(), Some("A"));
        assert_eq!(res.rounds, 2);
        assert_eq!(res.round_stats[1].exhausted, 3);
        assert_eq!(res.round_stats[0].tally_result_eliminated[0].exhausted, 1);
    }

    #[test]
    fn perfect_tie() {
        let mut bb = BallotBox::new(vec![ballot(&["A", "B"]), ballot(&["B", "A"])]);
        let res = bb.identify_winner();
        assert_eq!(res.outcome, Outcome::Tie(names(&["A", "B"])));
        assert_eq!(res.rounds, 1);
        assert_eq!(bb.winner(), None);
        assert_eq!(bb.number_rounds(), Some(1));
    }

    #[test]
    fn tie_after_elimination() {
        let mut bb = BallotBox::new(vec![
            ballot(&["A"]),
            ballot(&["A"]),
            ballot(&["B"]),
            ballot(&["B"]),
            ballot(&["C"]),
        ]);
        let res = bb.identify_winner();
        assert_eq!(res.outcome, Outcome::Tie(names(&["A", "B"])));
        assert_eq!(res.rounds, 2);
    }

    #[test]
    fn empty_elections() {
        let mut bb = BallotBox::new(vec![]);
        assert_eq!(bb.winning_threshold(), 1);
        let res = bb.identify_winner();
        assert_eq!(res.outcome, Outcome::NoCandidates);
        assert_eq!(res.rounds, 1);

        let mut bb = BallotBox::new(vec![Ballot::new(vec![])]);
        let res = bb.identify_winner();
        assert_eq!(res.outcome, Outcome::NoCandidates);
        assert_eq!(res.round_stats[0].exhausted, 1);
    }

    #[test]
    fn single_candidate() {
        let mut bb = BallotBox::new(vec![ballot(&["A"])]);
        let res = bb.identify_winner();
        assert_eq!(res.winner(), Some("A"));
        assert_eq!(res.rounds, 1);
    }

    #[test]
    fn duplicates_on_a_ballot_count_once() {
        let mut bb = BallotBox::new(vec![
            ballot(&["A", "A", "B"]),
            ballot(&["B", "B"]),
            ballot(&["C", "A"]),
        ]);
        let tally = bb.count_votes(&EliminationState::new());
        assert_eq!(tally.total(), 3);
        let res = bb.identify_winner();
        assert_eq!(res.round_stats[0].tally_result_eliminated.len(), 0);
        assert_eq!(res.outcome, Outcome::Tie(names(&["A", "B", "C"])));
    }
}
