use approx::assert_relative_eq;
use revmat::tape::{Tape, TapeGuard};
use revmat::{grad, vjp, Var};

#[test]
fn output_is_its_own_input() {
    let mut tape = Tape::new();
    let x = tape.new_variable(3.0);
    assert_eq!(tape.gradient(x, &[x]), vec![1.0]);
}

#[test]
fn unrelated_leaf_has_zero_gradient() {
    let mut tape = Tape::new();
    let x = tape.new_variable(3.0);
    let y = tape.new_variable(4.0);
    let z = {
        let _guard = TapeGuard::new(&mut tape);
        x * 2.0
    };
    assert_eq!(tape.gradient(z, &[x, y]), vec![2.0, 0.0]);
}

#[test]
fn constant_input_reads_zero() {
    let mut tape = Tape::new();
    let x = tape.new_variable(3.0);
    let c = Var::constant(5.0);
    let z = {
        let _guard = TapeGuard::new(&mut tape);
        x * c
    };
    assert_eq!(tape.gradient(z, &[x, c]), vec![5.0, 0.0]);
}

#[test]
fn diamond_pattern() {
    // z = x² + x³, dz/dx = 2x + 3x²
    let g = grad(|x| x[0] * x[0] + x[0] * x[0] * x[0], &[2.0]);
    assert_relative_eq!(g[0], 16.0, max_relative = 1e-12);
}

#[test]
fn quotient_and_difference() {
    // f = (x - y) / (x + y)
    let g = grad(|v| (v[0] - v[1]) / (v[0] + v[1]), &[3.0, 1.0]);
    // df/dx = 2y / (x + y)², df/dy = -2x / (x + y)²
    assert_relative_eq!(g[0], 2.0 / 16.0, max_relative = 1e-12);
    assert_relative_eq!(g[1], -6.0 / 16.0, max_relative = 1e-12);
}

#[test]
fn repeated_gradients_are_independent() {
    let mut tape = Tape::new();
    let x = tape.new_variable(3.0);
    let z = {
        let _guard = TapeGuard::new(&mut tape);
        x * x
    };
    let first = tape.gradient(z, &[x]);
    let second = tape.gradient(z, &[x]);
    assert_eq!(first, second);
    assert_eq!(first, vec![6.0]);
}

#[test]
fn vjp_weights_outputs() {
    let (values, g) = vjp(
        |x| vec![x[0] * x[1], x[0] + x[1]],
        &[2.0, 5.0],
        &[1.0, 2.0],
    );
    assert_eq!(values, vec![10.0, 7.0]);
    // 1 * (x1, x0) + 2 * (1, 1)
    assert_relative_eq!(g[0], 7.0, max_relative = 1e-12);
    assert_relative_eq!(g[1], 4.0, max_relative = 1e-12);
}

#[test]
#[should_panic(expected = "No active tape")]
fn arithmetic_without_tape_panics() {
    let mut tape = Tape::new();
    let x = tape.new_variable(1.0);
    let _ = x + 1.0;
}

#[test]
fn guard_restores_previous_tape() {
    let mut outer = Tape::new();
    let mut inner = Tape::new();
    let _outer_guard = TapeGuard::new(&mut outer);
    {
        let _inner_guard = TapeGuard::new(&mut inner);
        revmat::tape::with_active_tape(|t| t.new_variable(1.0));
    }
    revmat::tape::with_active_tape(|t| {
        t.new_variable(2.0);
        t.new_variable(3.0);
    });
    drop(_outer_guard);
    assert!(!revmat::tape::is_active());
    assert_eq!(inner.len(), 1);
    assert_eq!(outer.len(), 2);
}
