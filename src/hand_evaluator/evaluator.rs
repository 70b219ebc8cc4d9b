use crate::card_set::CardSet;
use crate::constants::*;

const MIN_CARDS: u8 = 5;
const MAX_CARDS: u8 = 7;

// one bit per rank present in the flush suit, deuce = bit 0
const FLUSH_TABLE_SIZE: usize = 8192;
// number of 7 card rank multisets with at most 4 cards per rank
const RANK_TABLE_SIZE: usize = 49205;

/// `HASH_REFERENCE[count][rank][remaining]`
type HashReference = [[[u32; MAX_CARDS as usize + 1]; RANK_COUNT as usize]; 5];

/// Power index of a 7 card set
///
/// The caller guarantees exactly seven cards.
pub(crate) fn evaluate(cards: CardSet) -> u16 {
    LOOKUP_TABLE.evaluate(cards)
}

// create global static evaluator
lazy_static! {
    static ref LOOKUP_TABLE: Evaluator = Evaluator::init();
}

struct Evaluator {
    rank_table: Vec<u16>,
    flush_table: Vec<u16>,
    hash_reference: HashReference,
}

impl Evaluator {
    fn init() -> Self {
        let mut eval = Evaluator {
            rank_table: vec![0; RANK_TABLE_SIZE],
            flush_table: vec![0; FLUSH_TABLE_SIZE],
            hash_reference: build_hash_reference(),
        };

        let hand_classes = eval.static_init();
        debug_assert_eq!(hand_classes, HAND_CLASS_COUNT);
        log::debug!(
            "initialized hand evaluator: {} hand classes, {} rank entries, {} flush entries",
            hand_classes,
            eval.rank_table.len(),
            eval.flush_table.len()
        );

        eval
    }

    fn evaluate(&self, cards: CardSet) -> u16 {
        for suit in 0..SUIT_COUNT {
            let suit_mask = cards.suit_mask(suit);
            if suit_mask.count_ones() >= MIN_CARDS as u32 {
                return self.flush_table[flush_key(suit_mask)];
            }
        }

        // 4 bits per rank, deuce in the lowest nibble
        let mut ranks = 0u64;
        for card in cards {
            ranks += 1u64 << (4 * card.rank().strength());
        }
        self.rank_table[self.rank_hash(ranks)]
    }

    /// Perfect hash of a 7 card rank multiset
    ///
    /// Ranks are folded from deuce to ace. Each rank adds the number of
    /// multisets that share the ranks seen so far but hold fewer cards of it.
    fn rank_hash(&self, ranks: u64) -> usize {
        let mut remaining = MAX_CARDS as usize;
        let mut hash = 0usize;
        for r in 0..usize::from(RANK_COUNT) {
            let count = ((ranks >> (4 * r)) & 0xf) as usize;
            if count == 0 {
                continue;
            }
            hash += self.hash_reference[count][r][remaining] as usize;
            remaining -= count;
            if remaining == 0 {
                break;
            }
        }
        hash
    }

    /// Walks every hand class from weakest to strongest
    ///
    /// Returns the number of 5 card hand classes seen.
    fn static_init(&mut self) -> u16 {
        let rc = RANK_COUNT;

        let mut hand_value: u16 = 0;
        self.populate(0, 0, &mut hand_value, rc, 0, 0, 0, false);

        for r in 0..rc {
            // 2u64 << 4 * rank, means pair for each rank
            self.populate(2u64 << (4 * r), 2, &mut hand_value, rc, 0, 0, 0, false);
        }

        for r1 in 0..rc {
            for r2 in 0..r1 {
                // each two pair combination
                self.populate(
                    (2u64 << (4 * r1)) + (2u64 << (4 * r2)),
                    4,
                    &mut hand_value,
                    rc,
                    r2,
                    0,
                    0,
                    false,
                );
            }
        }

        for r in 0..rc {
            // each three of a kind combo
            self.populate(3u64 << (4 * r), 3, &mut hand_value, rc, 0, r, 0, false);
        }

        // A-5
        self.populate(0x1000000001111u64, 5, &mut hand_value, rc, rc, rc, 3, false);
        for r in 4..rc {
            // every other straight
            self.populate(0x11111u64 << (4 * (r - 4)), 5, &mut hand_value, rc, rc, rc, r, false);
        }

        self.populate(0, 0, &mut hand_value, rc, 0, 0, 0, true);

        for r1 in 0..rc {
            for r2 in 0..rc {
                if r2 != r1 {
                    // r1's full of r2
                    self.populate(
                        (3u64 << (4 * r1)) + (2u64 << (4 * r2)),
                        5,
                        &mut hand_value,
                        rc,
                        r2,
                        r1,
                        rc,
                        false,
                    );
                }
            }
        }

        for r in 0..rc {
            self.populate(4u64 << (4 * r), 4, &mut hand_value, rc, rc, rc, rc, false);
        }

        // A-5
        self.populate(0x1000000001111u64, 5, &mut hand_value, rc, 0, 0, 3, true);
        for r in 4..rc {
            self.populate(0x11111u64 << (4 * (r - 4)), 5, &mut hand_value, rc, 0, 0, r, true);
        }

        hand_value
    }

    /// Extends `ranks` one card at a time without improving the hand
    ///
    /// `hand_value` counts 5 card classes, so the power index written is
    /// `HAND_CLASS_COUNT + 1 - hand_value` (1 is the royal flush).
    #[allow(clippy::too_many_arguments)]
    fn populate(
        &mut self,
        ranks: u64,
        n_cards: u8,
        hand_value: &mut u16,
        end_rank: u8,
        max_pair: u8,
        max_trips: u8,
        max_straight: u8,
        flush: bool,
    ) {
        if n_cards == MIN_CARDS {
            *hand_value += 1;
        }

        if n_cards >= MIN_CARDS {
            let power = HAND_CLASS_COUNT + 1 - *hand_value;
            if flush {
                self.flush_table[flush_key_from_ranks(ranks)] = power;
            } else if n_cards == MAX_CARDS {
                let hash = self.rank_hash(ranks);
                self.rank_table[hash] = power;
            }

            if n_cards == MAX_CARDS {
                return;
            }
        }

        // iterate next card rank
        for r in 0..end_rank {
            let new_ranks = ranks + (1u64 << (4 * r));
            // check that hand doesn't improve
            let rank_count = (new_ranks >> (r * 4)) & 0xf;

            if (rank_count == 2) && (r >= max_pair) {
                continue;
            }
            if (rank_count == 3) && (r >= max_trips) {
                continue;
            }
            if rank_count >= 4 {
                // quads only come from their own seed
                continue;
            }
            if get_biggest_straight(new_ranks) > max_straight {
                continue;
            }

            self.populate(
                new_ranks,
                n_cards + 1,
                hand_value,
                r + 1,
                max_pair,
                max_trips,
                max_straight,
                flush,
            );
        }
    }
}

/// Converts a card set suit mask (ace = bit 0) to a flush key (deuce = bit 0, ace = bit 12)
fn flush_key(suit_mask: u16) -> usize {
    usize::from((suit_mask >> 1) | ((suit_mask & 1) << 12))
}

fn flush_key_from_ranks(ranks: u64) -> usize {
    let mut key = 0usize;
    for r in 0..RANK_COUNT {
        if (ranks >> (4 * r)) & 0xf != 0 {
            key |= 1 << r;
        }
    }
    key
}

// return index of highest straight card or 0 when no straight
fn get_biggest_straight(ranks: u64) -> u8 {
    let rank_mask: u64 =
        (0x1111111111111 & ranks) | (0x2222222222222 & ranks) >> 1 | (0x4444444444444 & ranks) >> 2;
    for i in (0..9).rev() {
        if ((rank_mask >> (4 * i)) & 0x11111u64) == 0x11111u64 {
            return i + 4;
        }
    }
    if (rank_mask & 0x1000000001111) == 0x1000000001111 {
        return 3;
    }
    0
}

/// `ways[r][n]`: number of ways to spread `n` cards over ranks `r..13`, at most 4 each
fn build_hash_reference() -> HashReference {
    let max = usize::from(MAX_CARDS);
    let rc = usize::from(RANK_COUNT);
    let mut ways = vec![vec![0u32; max + 1]; rc + 1];
    ways[rc][0] = 1;
    for r in (0..rc).rev() {
        for n in 0..=max {
            ways[r][n] = (0..=n.min(4)).map(|c| ways[r + 1][n - c]).sum();
        }
    }

    let mut reference = [[[0u32; MAX_CARDS as usize + 1]; RANK_COUNT as usize]; 5];
    for count in 1..5 {
        for r in 0..rc {
            for n in count..=max {
                reference[count][r][n] = (0..count).map(|j| ways[r + 1][n - j]).sum();
            }
        }
    }
    debug_assert_eq!(ways[0][max] as usize, RANK_TABLE_SIZE);
    reference
}
