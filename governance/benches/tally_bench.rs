use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use referendum_governance::tally::{run_tally, tally_day};
use referendum_governance::{Ballot, ReferendumParams, ReferendumState};
use referendum_types::{AccountName, VoteSide};

/// Encode `n` as a valid account name using the digits 1-5.
fn voter_name(mut n: usize) -> AccountName {
    let mut name = String::from("v");
    loop {
        name.push((b'1' + (n % 5) as u8) as char);
        n /= 5;
        if n == 0 {
            break;
        }
    }
    AccountName::new(name)
}

fn make_electorate(n: usize) -> (Vec<Ballot>, HashMap<AccountName, u64>) {
    let mut ballots = Vec::with_capacity(n);
    let mut stakes = HashMap::with_capacity(n);
    for i in 0..n {
        let voter = voter_name(i);
        let side = if i % 3 == 0 { VoteSide::No } else { VoteSide::Yes };
        // Every tenth voter has unstaked since voting.
        if i % 10 != 0 {
            stakes.insert(voter.clone(), 1_000 + i as u64);
        }
        ballots.push(Ballot::new(voter, side));
    }
    ballots.sort_by(|a, b| a.voter.cmp(&b.voter));
    (ballots, stakes)
}

fn bench_tally_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("tally_day");
    let params = ReferendumParams::default();

    for voters in [10, 1_000, 100_000] {
        let (ballots, stakes) = make_electorate(voters);
        group.bench_with_input(BenchmarkId::new("ballots", voters), &voters, |b, _| {
            b.iter(|| black_box(tally_day(black_box(&params), black_box(&ballots), &stakes)));
        });
    }

    group.finish();
}

fn bench_run_tally(c: &mut Criterion) {
    let params = ReferendumParams::default();
    let prior = ReferendumState::initial();
    let contract = AccountName::new("referendum");
    let (ballots, stakes) = make_electorate(10_000);

    c.bench_function("run_tally_10k", |b| {
        b.iter(|| black_box(run_tally(&params, &prior, black_box(&ballots), &stakes, &contract)));
    });
}

criterion_group!(benches, bench_tally_day, bench_run_tally);
criterion_main!(benches);
