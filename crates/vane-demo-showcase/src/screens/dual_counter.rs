#![forbid(unsafe_code)]

//! Counter screen: field-level selectors over one shared cell.
//!
//! A single [`Observable`] holds a two-field model. Selectors narrow it per
//! field, so a listener on one field stays quiet while the other changes,
//! and a write that leaves the whole model unchanged reaches nobody at all.

use vane_reactive::{Observable, Selector};

use crate::cli::Opts;

/// Two independent tallies behind one state cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterPair {
    pub number1: i64,
    pub number2: i64,
}

/// The counter model: one cell plus field-targeted mutators.
#[derive(Debug, Clone, Default)]
pub struct CounterModel {
    state: Observable<CounterPair>,
}

impl CounterModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the first tally.
    pub fn add_to_1(&self, amount: i64) {
        self.state.update(|pair| pair.number1 += amount);
    }

    /// Add `amount` to the second tally.
    pub fn add_to_2(&self, amount: i64) {
        self.state.update(|pair| pair.number2 += amount);
    }

    pub fn snapshot(&self) -> CounterPair {
        self.state.get()
    }

    /// Selector over the first tally only.
    pub fn number1(&self) -> Selector<i64> {
        self.state.select(|pair| pair.number1)
    }

    /// Selector over the second tally only.
    pub fn number2(&self) -> Selector<i64> {
        self.state.select(|pair| pair.number2)
    }
}

pub fn run(_opts: &Opts) {
    let model = CounterModel::new();
    let number1 = model.number1();
    let number2 = model.number2();
    let _tap1 = number1.subscribe(|value| println!("  number1 -> {value}"));
    let _tap2 = number2.subscribe(|value| println!("  number2 -> {value}"));

    println!("add_to_1(5): only the number1 listener fires");
    model.add_to_1(5);

    println!("add_to_2(3): only the number2 listener fires");
    model.add_to_2(3);

    println!("add_to_1(0): the model is unchanged, nobody fires");
    model.add_to_1(0);

    println!("add_to_2(-3) then add_to_2(3): number2 fires twice, number1 never");
    model.add_to_2(-3);
    model.add_to_2(3);

    let snapshot = model.snapshot();
    println!();
    println!(
        "Final tallies: number1 = {}, number2 = {}",
        snapshot.number1, snapshot.number2
    );
}
