/*
 * Weighted hole card ranges
 *
 * A range maps two card sets to the probability the player holds them.
 * Ranges are parsed from and formatted to the usual shorthand,
 * e.g. "JJ+,AQs-A9s:0.5,KsQh:0.25"
 */

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{Card, CardOrder, Rank, Suit};
use crate::card_set::CardSet;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HandRangeError {
    #[error("{0:?} is not a valid hand range segment")]
    InvalidSegment(String),
    #[error("{0:?} has an invalid probability")]
    InvalidProbability(String),
    #[error("{0} is not a card pair")]
    NotACardPair(CardSet),
    #[error("probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}

/// A hole card category, ignoring suits
///
/// Suited and offsuit pairs hold the high rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankPair {
    Pocket(Rank),
    Suited(Rank, Rank),
    Offsuit(Rank, Rank),
}

impl RankPair {
    /// Every explicit card pair of the category
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::card::Rank;
    /// use poker_equity::hand_range::RankPair;
    /// assert_eq!(RankPair::Pocket(Rank::Ace).card_pairs().len(), 6);
    /// assert_eq!(RankPair::Suited(Rank::Ace, Rank::King).card_pairs().len(), 4);
    /// assert_eq!(RankPair::Offsuit(Rank::Ace, Rank::King).card_pairs().len(), 12);
    /// ```
    pub fn card_pairs(self) -> Vec<CardSet> {
        let pair = |r1, s1, r2, s2| CardSet::from(Card::new(r1, s1)).added(Card::new(r2, s2));
        let mut pairs = Vec::new();
        match self {
            RankPair::Pocket(rank) => {
                for (i, &s1) in Suit::ALL.iter().enumerate() {
                    for &s2 in &Suit::ALL[i + 1..] {
                        pairs.push(pair(rank, s1, rank, s2));
                    }
                }
            }
            RankPair::Suited(high, kicker) => {
                for &suit in &Suit::ALL {
                    pairs.push(pair(high, suit, kicker, suit));
                }
            }
            RankPair::Offsuit(high, kicker) => {
                for &s1 in &Suit::ALL {
                    for &s2 in Suit::ALL.iter().filter(|&&s| s != s1) {
                        pairs.push(pair(high, s1, kicker, s2));
                    }
                }
            }
        }
        pairs
    }

    fn same_kind(self, other: RankPair) -> bool {
        matches!(
            (self, other),
            (RankPair::Pocket(_), RankPair::Pocket(_))
                | (RankPair::Suited(..), RankPair::Suited(..))
                | (RankPair::Offsuit(..), RankPair::Offsuit(..))
        )
    }

    fn with_kicker(self, kicker: Rank) -> RankPair {
        match self {
            RankPair::Pocket(_) => RankPair::Pocket(kicker),
            RankPair::Suited(high, _) => RankPair::Suited(high, kicker),
            RankPair::Offsuit(high, _) => RankPair::Offsuit(high, kicker),
        }
    }

    /// Rank that varies along a run ("XX-YY" or "XYs-XWs")
    fn kicker(self) -> Rank {
        match self {
            RankPair::Pocket(rank) => rank,
            RankPair::Suited(_, kicker) | RankPair::Offsuit(_, kicker) => kicker,
        }
    }

    fn high(self) -> Rank {
        match self {
            RankPair::Pocket(rank) | RankPair::Suited(rank, _) | RankPair::Offsuit(rank, _) => rank,
        }
    }

    /// Categories of a "+" segment, from the top of the axis down to self
    fn and_better(self) -> Vec<RankPair> {
        let top = match self {
            RankPair::Pocket(_) => Rank::Ace,
            RankPair::Suited(high, _) | RankPair::Offsuit(high, _) => {
                Rank::POWER_ORDER[usize::from(high.power_index()) + 1]
            }
        };
        ranks_between(top, self.kicker())
            .map(|rank| self.with_kicker(rank))
            .collect()
    }

    /// Categories of a "-" segment, `None` when the ends do not share an axis
    fn run_to(self, other: RankPair) -> Option<Vec<RankPair>> {
        let same_axis = match self {
            RankPair::Pocket(_) => true,
            _ => self.high() == other.high(),
        };
        if !self.same_kind(other) || !same_axis {
            return None;
        }
        Some(
            ranks_between(self.kicker(), other.kicker())
                .map(|rank| self.with_kicker(rank))
                .collect(),
        )
    }
}

impl fmt::Display for RankPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankPair::Pocket(rank) => write!(f, "{}{}", rank, rank),
            RankPair::Suited(high, kicker) => write!(f, "{}{}s", high, kicker),
            RankPair::Offsuit(high, kicker) => write!(f, "{}{}o", high, kicker),
        }
    }
}

/// Ranks from `a` to `b` inclusive in power order, either end first
fn ranks_between(a: Rank, b: Rank) -> impl Iterator<Item = Rank> {
    let (a, b) = (usize::from(a.power_index()), usize::from(b.power_index()));
    Rank::POWER_ORDER[a.min(b)..=a.max(b)].iter().copied()
}

/// Char cursor over one segment, without the probability suffix
struct SegmentParser {
    chars: Vec<char>,
    pos: usize,
}

impl SegmentParser {
    fn new(text: &str) -> Self {
        SegmentParser {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos == self.chars.len()
    }

    fn parse_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_rank(&mut self) -> Option<Rank> {
        let rank = Rank::parse(self.peek()?).ok()?;
        self.pos += 1;
        Some(rank)
    }

    fn parse_suit(&mut self) -> Option<Suit> {
        let suit = Suit::parse(self.peek()?).ok()?;
        self.pos += 1;
        Some(suit)
    }

    /// "AsKh" style literal pair
    fn parse_card_pair(&mut self) -> Option<CardSet> {
        let backtrack = self.pos;
        let mut cards = CardSet::empty();
        for _ in 0..2 {
            match (self.parse_rank(), self.parse_suit()) {
                (Some(rank), Some(suit)) => cards += Card::new(rank, suit),
                _ => {
                    self.pos = backtrack;
                    return None;
                }
            }
        }
        Some(cards)
    }

    /// "QQ", "AKs" or "AKo"
    fn parse_rank_pair(&mut self) -> Option<RankPair> {
        let r1 = self.parse_rank()?;
        let r2 = self.parse_rank()?;
        if r1 == r2 {
            return Some(RankPair::Pocket(r1));
        }
        if r1.compare(r2) != Ordering::Less {
            return None;
        }
        if self.parse_char('s') {
            Some(RankPair::Suited(r1, r2))
        } else if self.parse_char('o') {
            Some(RankPair::Offsuit(r1, r2))
        } else {
            None
        }
    }

    /// Card pairs the whole segment expands to
    fn parse_hand(&mut self) -> Option<Vec<CardSet>> {
        if let Some(cards) = self.parse_card_pair() {
            return if self.at_end() && cards.size() == 2 {
                Some(vec![cards])
            } else {
                None
            };
        }
        let first = self.parse_rank_pair()?;
        let categories = if self.parse_char('+') {
            first.and_better()
        } else if self.parse_char('-') {
            let last = self.parse_rank_pair()?;
            first.run_to(last)?
        } else {
            vec![first]
        };
        if !self.at_end() {
            return None;
        }
        Some(categories.into_iter().flat_map(RankPair::card_pairs).collect())
    }
}

/// Accepts `0`, `1`, or either followed by a decimal part
fn parse_probability(text: &str, segment: &str) -> Result<f64, HandRangeError> {
    let invalid = || HandRangeError::InvalidProbability(segment.to_string());
    let mut chars = text.chars();
    match chars.next() {
        Some('0') | Some('1') => {}
        _ => return Err(invalid()),
    }
    match chars.next() {
        None => {}
        Some('.') => {
            let decimals = chars.as_str();
            if decimals.is_empty() || !decimals.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
        }
        Some(_) => return Err(invalid()),
    }
    let probability: f64 = text.parse().map_err(|_| invalid())?;
    if probability > 1.0 {
        return Err(HandRangeError::ProbabilityOutOfRange(probability));
    }
    Ok(probability)
}

/// Prints up to 3 decimals, a nonzero probability never prints as 0
fn format_probability(probability: f64) -> String {
    let probability = if probability > 0.0 {
        probability.max(0.001)
    } else {
        probability
    };
    let fixed = format!("{:.3}", probability);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Consecutive positions sharing one probability, as (first, last, probability)
fn probability_runs(probabilities: &[Option<f64>]) -> Vec<(usize, usize, f64)> {
    let mut runs = Vec::new();
    let mut current: Option<(usize, f64)> = None;
    for (i, probability) in probabilities.iter().enumerate() {
        if let Some((start, p)) = current {
            if *probability != Some(p) {
                runs.push((start, i - 1, p));
                current = None;
            }
        }
        if current.is_none() {
            current = probability.map(|p| (i, p));
        }
    }
    if let Some((start, p)) = current {
        runs.push((start, probabilities.len() - 1, p));
    }
    runs
}

fn compare_power(a: CardSet, b: CardSet) -> Ordering {
    let sorted = |cards: CardSet| {
        let mut v: Vec<Card> = cards.iter().collect();
        v.sort_by(|x, y| x.compare(*y));
        v
    };
    let (a, b) = (sorted(a), sorted(b));
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.compare(*y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// A weighted set of hole card pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandRange {
    pairs: BTreeMap<CardSet, f64>,
}

impl HandRange {
    pub fn empty() -> HandRange {
        HandRange::default()
    }

    /// Parses a comma separated range string
    ///
    /// Whitespace is ignored. Each segment may end with `:probability`,
    /// which defaults to 1. A later segment overwrites the probability of
    /// pairs already present, a segment with probability 0 adds nothing.
    ///
    /// # Arguments
    ///
    /// * `text` - range shorthand such as `"88-66:0.66,JJ+:0.5,44,AQs-A9s:0.2,KsQh"`
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::hand_range::HandRange;
    /// let range = HandRange::parse("JJ+,AKs:0.5").unwrap();
    /// assert_eq!(range.len(), 28);
    /// assert!(HandRange::parse("AKx").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<HandRange, HandRangeError> {
        let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut range = HandRange::empty();
        if text.is_empty() {
            return Ok(range);
        }
        for segment in text.split(',') {
            let (hand, probability) = match segment.find(':') {
                Some(i) => (&segment[..i], parse_probability(&segment[i + 1..], segment)?),
                None => (segment, 1.0),
            };
            let pairs = SegmentParser::new(hand)
                .parse_hand()
                .ok_or_else(|| HandRangeError::InvalidSegment(segment.to_string()))?;
            if probability == 0.0 {
                continue;
            }
            for pair in pairs {
                range.pairs.insert(pair, probability);
            }
        }
        Ok(range)
    }

    /// Builds a range from explicit entries
    ///
    /// Every key must hold exactly two cards. Later entries overwrite
    /// earlier ones, zero probability entries are skipped.
    pub fn from_entries<I>(entries: I) -> Result<HandRange, HandRangeError>
    where
        I: IntoIterator<Item = (CardSet, f64)>,
    {
        let mut range = HandRange::empty();
        for (cards, probability) in entries {
            if cards.size() != 2 {
                return Err(HandRangeError::NotACardPair(cards));
            }
            if !(0.0..=1.0).contains(&probability) {
                return Err(HandRangeError::ProbabilityOutOfRange(probability));
            }
            if probability > 0.0 {
                range.pairs.insert(cards, probability);
            }
        }
        Ok(range)
    }

    pub fn get(&self, pair: CardSet) -> Option<f64> {
        self.pairs.get(&pair).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates (card pair, probability) in card set order
    pub fn iter(&self) -> impl Iterator<Item = (CardSet, f64)> + '_ {
        self.pairs.iter().map(|(&cards, &p)| (cards, p))
    }

    /// Union of both ranges, `other` wins on shared pairs
    pub fn added(&self, other: &HandRange) -> HandRange {
        let mut pairs = self.pairs.clone();
        pairs.extend(other.iter());
        HandRange { pairs }
    }

    /// Drops every pair present in `other`
    pub fn removed(&self, other: &HandRange) -> HandRange {
        HandRange {
            pairs: self
                .iter()
                .filter(|(cards, _)| other.get(*cards).is_none())
                .collect(),
        }
    }

    /// Drops pairs sharing a card with `board`
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::card_set::CardSet;
    /// use poker_equity::hand_range::HandRange;
    /// let range = HandRange::parse("AA").unwrap();
    /// let board: CardSet = "As7d2c".parse().unwrap();
    /// assert_eq!(range.without_conflicts(board).len(), 3);
    /// ```
    pub fn without_conflicts(&self, board: CardSet) -> HandRange {
        HandRange {
            pairs: self
                .iter()
                .filter(|(cards, _)| !cards.intersects(board))
                .collect(),
        }
    }

    /// Probability shared by all of `pairs`, if all are present with one value
    fn uniform_probability(&self, pairs: &[CardSet]) -> Option<f64> {
        let first = self.get(*pairs.first()?)?;
        if pairs.iter().all(|&pair| self.get(pair) == Some(first)) {
            Some(first)
        } else {
            None
        }
    }

    /// Categories fully present with a single probability
    ///
    /// Pockets come first in power order, then suited and offsuit pairs
    /// grouped by high rank.
    pub fn rank_pairs(&self) -> Vec<(RankPair, f64)> {
        let mut rank_pairs = Vec::new();
        for &rank in &Rank::POWER_ORDER {
            let pocket = RankPair::Pocket(rank);
            if let Some(p) = self.uniform_probability(&pocket.card_pairs()) {
                rank_pairs.push((pocket, p));
            }
        }
        for (i, &high) in Rank::POWER_ORDER.iter().enumerate() {
            for &kicker in &Rank::POWER_ORDER[i + 1..] {
                for &category in &[RankPair::Suited(high, kicker), RankPair::Offsuit(high, kicker)] {
                    if let Some(p) = self.uniform_probability(&category.card_pairs()) {
                        rank_pairs.push((category, p));
                    }
                }
            }
        }
        rank_pairs
    }

    /// Writes the range in its most compact shorthand
    ///
    /// Every token carries its probability, rounded to 3 decimals. Positive
    /// probabilities below 0.001 are written as 0.001 so they survive a
    /// round trip. Pairs that do not complete a category are written as
    /// explicit cards.
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::hand_range::HandRange;
    /// let range = HandRange::parse("AsKs,AhKh,AdKd,AcKc,QQ:0.5,KK:0.5").unwrap();
    /// assert_eq!(range.format(), "KK-QQ:0.5,AKs:1");
    /// ```
    pub fn format(&self) -> String {
        let categories = self.rank_pairs();
        let probability_of = |category: RankPair| {
            categories
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, p)| *p)
        };
        let mut tokens: Vec<(String, f64)> = Vec::new();

        let pockets: Vec<Option<f64>> = Rank::POWER_ORDER
            .iter()
            .map(|&rank| probability_of(RankPair::Pocket(rank)))
            .collect();
        for (start, end, p) in probability_runs(&pockets) {
            let (first, last) = (Rank::POWER_ORDER[start], Rank::POWER_ORDER[end]);
            let token = if start == 0 && end != 0 {
                format!("{}+", RankPair::Pocket(last))
            } else if start == end {
                RankPair::Pocket(first).to_string()
            } else {
                format!("{}-{}", RankPair::Pocket(first), RankPair::Pocket(last))
            };
            tokens.push((token, p));
        }

        for (i, &high) in Rank::POWER_ORDER.iter().enumerate() {
            let kickers = &Rank::POWER_ORDER[i + 1..];
            let kinds: [fn(Rank, Rank) -> RankPair; 2] = [RankPair::Suited, RankPair::Offsuit];
            for kind in kinds.iter() {
                let probabilities: Vec<Option<f64>> = kickers
                    .iter()
                    .map(|&kicker| probability_of(kind(high, kicker)))
                    .collect();
                for (start, end, p) in probability_runs(&probabilities) {
                    let first = kind(high, kickers[start]);
                    let last = kind(high, kickers[end]);
                    let token = if start == 0 && end != 0 {
                        format!("{}+", last)
                    } else if start == end {
                        first.to_string()
                    } else {
                        format!("{}-{}", first, last)
                    };
                    tokens.push((token, p));
                }
            }
        }

        let absorbed: BTreeSet<CardSet> = categories
            .iter()
            .flat_map(|(category, _)| category.card_pairs())
            .collect();
        let mut detached: Vec<(CardSet, f64)> = self
            .iter()
            .filter(|(cards, _)| !absorbed.contains(cards))
            .collect();
        detached.sort_by(|a, b| compare_power(a.0, b.0));
        for (cards, p) in detached {
            tokens.push((cards.format(CardOrder::Power), p));
        }

        tokens
            .iter()
            .map(|(token, p)| format!("{}:{}", token, format_probability(*p)))
            .collect::<Vec<String>>()
            .join(",")
    }
}

impl FromStr for HandRange {
    type Err = HandRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandRange::parse(s)
    }
}

impl fmt::Display for HandRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl TryFrom<String> for HandRange {
    type Error = HandRangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HandRange::parse(&value)
    }
}

impl From<HandRange> for String {
    fn from(range: HandRange) -> String {
        range.format()
    }
}
