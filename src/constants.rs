/// Number of cards in standard deck
pub const CARD_COUNT: u8 = 52;

/// Number of ranks in a standard deck
pub const RANK_COUNT: u8 = 13;

/// Number of suits in a standard deck
pub const SUIT_COUNT: u8 = 4;

/// Number of community cards at showdown
pub const BOARD_CARDS: u32 = 5;

/// Number of cards a made hand is evaluated from
pub const HAND_CARDS: u32 = 7;

/// rank chars in index order (A, 2 -> K)
pub const RANK_TO_CHAR: &[char; 13] = &[
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

/// suit chars in index order
pub const SUIT_TO_CHAR: &[char; 4] = &['s', 'h', 'd', 'c'];

/// Bit mask of a full deck
pub const FULL_MASK: u64 = (1u64 << CARD_COUNT) - 1;

/// Copies of a card pair per unit of probability in monte carlo sampling
pub const DEFAULT_PROBABILITY_RESOLUTION: u32 = 12;

/// Card pairs tried before giving up on finding a legal monte carlo deal
pub const SATISFIABILITY_SEARCH_BUDGET: u64 = 1_000_000;

/// Number of distinct 5 card hand classes
pub const HAND_CLASS_COUNT: u16 = 7462;

// Upper bounds (inclusive) of the power index for each hand category
pub const STRAIGHT_FLUSH_MAX: u16 = 10;
pub const FOUR_OF_A_KIND_MAX: u16 = 166;
pub const FULL_HOUSE_MAX: u16 = 322;
pub const FLUSH_MAX: u16 = 1599;
pub const STRAIGHT_MAX: u16 = 1609;
pub const THREE_OF_A_KIND_MAX: u16 = 2467;
pub const TWO_PAIR_MAX: u16 = 3325;
pub const PAIR_MAX: u16 = 6185;
