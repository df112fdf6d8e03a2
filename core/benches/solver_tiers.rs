use criterion::{Criterion, criterion_group, criterion_main};
use nummatch_core::{Value, parse_board, solve};

fn board(digits: &str) -> Vec<Option<Value>> {
    parse_board(digits, 9)
        .unwrap()
        .into_iter()
        .map(Some)
        .collect()
}

fn bench_solver_shallow(c: &mut Criterion) {
    // a single adjacent pair reaches the goal
    let cells = board("551234678912346789");
    c.bench_function("solve_2x9_shallow", |b| {
        b.iter(|| solve(&cells, 9, Value::Five, 10));
    });
}

fn bench_solver_deep(c: &mut Criterion) {
    // fives spread over three rows force a longer search
    let cells = board("512345678234567891345255178");
    c.bench_function("solve_3x9_deep", |b| {
        b.iter(|| solve(&cells, 9, Value::Five, 10));
    });
}

criterion_group!(benches, bench_solver_shallow, bench_solver_deep);
criterion_main!(benches);
