use poker_equity::card_set::CardSet;
use poker_equity::equity_calculator::{approx_equity, exact_equity, MontecarloEvaluator};
use poker_equity::hand_evaluator::MadeHand;
use poker_equity::hand_range::HandRange;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        evaluating_seven_cards,
        parsing_hand_ranges,
        exhausting_river_equity,
        exhausting_turn_equity,
        sampling_preflop_matchups,
        sampling_preflop_equity,
}

fn ranges(specs: &[&str]) -> Vec<HandRange> {
    specs
        .iter()
        .map(|s| HandRange::parse(s).expect("valid range"))
        .collect()
}

fn evaluating_seven_cards(c: &mut criterion::Criterion) {
    let cards: CardSet = "AsKhQd7c5s3h2d".parse().expect("valid cards");
    c.bench_function("evaluate a 7-card hand", |b| {
        b.iter(|| MadeHand::find_best_from(criterion::black_box(cards)))
    });
}

fn parsing_hand_ranges(c: &mut criterion::Criterion) {
    c.bench_function("parse and format a hand range", |b| {
        b.iter(|| {
            HandRange::parse(criterion::black_box("22+,A2s+,K9s+,QTs+,JTs,ATo+,KJo+:0.5"))
                .map(|range| range.format())
        })
    });
}

fn exhausting_river_equity(c: &mut criterion::Criterion) {
    let board: CardSet = "4s5hQhTd2c".parse().expect("valid board");
    let ranges = ranges(&["JJ+,AKs,AQs", "99-66,KQs:0.5"]);
    c.bench_function("exact River equity", |b| {
        b.iter(|| exact_equity(board, &ranges))
    });
}

fn exhausting_turn_equity(c: &mut criterion::Criterion) {
    let board: CardSet = "4s5hQhTd".parse().expect("valid board");
    let ranges = ranges(&["AKs", "Th9h", "6s6h"]);
    c.bench_function("exact Turn equity", |b| {
        b.iter(|| exact_equity(board, &ranges))
    });
}

fn sampling_preflop_matchups(c: &mut criterion::Criterion) {
    let ranges = ranges(&["JJ+,AKs", "QQ:0.5,AQo+"]);
    c.bench_function("sample 1000 Preflop matchups", |b| {
        let evaluator = MontecarloEvaluator::new(CardSet::empty(), &ranges, 12)
            .expect("satisfiable ranges");
        b.iter(|| evaluator.clone().take(1000).count())
    });
}

fn sampling_preflop_equity(c: &mut criterion::Criterion) {
    let ranges = ranges(&["JJ+,AKs", "QQ:0.5,AQo+"]);
    c.bench_function("approximate Preflop equity on 4 threads", |b| {
        b.iter(|| approx_equity(CardSet::empty(), &ranges, 4, 10_000))
    });
}
