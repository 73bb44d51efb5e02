//! Benchmarks for `hand_eval`: pocket cards, a full seven-card hand, and a
//! batch pass over a hundred distinct hands.

use criterion::{criterion_group, criterion_main, Criterion};
use tablehub_engine::cards::{Card, Suit};
use tablehub_engine::hand_eval::evaluate_best_hand;

fn bench_hand_eval_2_cards(c: &mut Criterion) {
    let cards = vec![Card::new(14, Suit::Spades), Card::new(13, Suit::Spades)];
    c.bench_function("hand_eval_2_cards", |b| {
        b.iter(|| evaluate_best_hand(&cards));
    });
}

fn bench_hand_eval_7_cards(c: &mut Criterion) {
    let cards = vec![
        Card::new(14, Suit::Spades),
        Card::new(13, Suit::Spades),
        Card::new(12, Suit::Spades),
        Card::new(11, Suit::Spades),
        Card::new(10, Suit::Spades),
        Card::new(2, Suit::Hearts),
        Card::new(3, Suit::Diamonds),
    ];
    c.bench_function("hand_eval_7_cards", |b| {
        b.iter(|| evaluate_best_hand(&cards));
    });
}

fn bench_hand_eval_100_hands(c: &mut Criterion) {
    let mut hands = Vec::new();
    for i in 0..100u8 {
        let base = (i % 13) + 1;
        hands.push(vec![
            Card::new(base, Suit::Spades),
            Card::new((base + 1).min(13), Suit::Hearts),
            Card::new((base + 2).min(13), Suit::Diamonds),
            Card::new((base + 3).min(13), Suit::Clubs),
            Card::new((base + 4).min(13), Suit::Spades),
            Card::new((base + 5).min(13), Suit::Hearts),
            Card::new((base + 6).min(13), Suit::Diamonds),
        ]);
    }

    c.bench_function("hand_eval_100_hands", |b| {
        b.iter(|| {
            for hand in &hands {
                let _ = evaluate_best_hand(hand);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_hand_eval_2_cards,
    bench_hand_eval_7_cards,
    bench_hand_eval_100_hands
);
criterion_main!(benches);
