use approx::assert_relative_eq;
use nalgebra::DMatrix;
use revmat::matrix::{self, dot_self, mdivide_left_const_b};
use revmat::tape::{with_active_tape, Nested, Tape, TapeGuard};
use revmat::TapeConfig;

#[test]
fn nested_guard_rolls_back_nodes_and_arena() {
    let mut tape = Tape::new();
    let x = tape.new_variables(&[1.0, 2.0, 3.0]);
    let outer_len = tape.len();
    let outer_bytes = tape.arena().bytes_used();

    {
        let _guard = TapeGuard::new(&mut tape);
        let scope = Nested::enter();
        let d = dot_self(&x);
        let g = with_active_tape(|t| t.gradient_since(scope.mark(), d, &x));
        assert_eq!(g, vec![2.0, 4.0, 6.0]);
        assert!(with_active_tape(|t| t.len()) > outer_len);
    }

    assert_eq!(tape.len(), outer_len);
    assert_eq!(tape.arena().bytes_used(), outer_bytes);
}

#[test]
fn gradient_since_stops_at_the_mark() {
    let mut tape = Tape::new();
    let x = tape.new_variable(2.0);
    let y = {
        let _guard = TapeGuard::new(&mut tape);
        x * x
    };
    let mark = tape.mark();
    let z = {
        let _guard = TapeGuard::new(&mut tape);
        y * 3.0
    };
    // Only the scaling is swept; the square is older than the mark.
    assert_eq!(tape.gradient_since(mark, z, &[y, x]), vec![3.0, 0.0]);
    // A full sweep goes all the way back.
    assert_eq!(tape.gradient(z, &[x]), vec![12.0]);
}

#[test]
fn tape_nested_evaluates_matrix_work_in_a_scope() {
    let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
    let b = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);

    let mut tape = Tape::with_config(&TapeConfig::for_inputs(4));
    let av = tape.variable_matrix(&a);
    let before = tape.mark();

    let run = |t: &mut Tape| {
        let out = {
            let _guard = TapeGuard::new(t);
            dot_self(mdivide_left_const_b(&av, &b).unwrap().as_slice())
        };
        t.gradient_matrix(out, &av)
    };
    let first = tape.nested(&run);
    let second = tape.nested(&run);
    assert_relative_eq!(first, second, epsilon = 1e-15);
    assert_eq!(tape.mark(), before);
    assert_eq!(matrix::values(&av), a);
}

#[test]
fn config_presizes_without_changing_results() {
    let config = TapeConfig {
        nodes: 8,
        indices: 8,
        values: 8,
    };
    let mut small = Tape::with_config(&config);
    let mut large = Tape::with_config(&TapeConfig::default());
    let xs = small.new_variables(&[1.0, 2.0]);
    let xl = large.new_variables(&[1.0, 2.0]);
    let ds = {
        let _guard = TapeGuard::new(&mut small);
        dot_self(&xs)
    };
    let dl = {
        let _guard = TapeGuard::new(&mut large);
        dot_self(&xl)
    };
    assert_eq!(small.gradient(ds, &xs), large.gradient(dl, &xl));
}

#[test]
fn nested_scope_only_rolls_back_its_own_tape() {
    let mut outer = Tape::new();
    let mut inner = Tape::new();
    let x = outer.new_variable(1.0);
    let y = inner.new_variables(&[1.0, 2.0]);

    let _outer_guard = TapeGuard::new(&mut outer);
    let scope = Nested::enter();
    let _ = x * 2.0;
    let outer_len = with_active_tape(|t| t.len());

    let inner_guard = TapeGuard::new(&mut inner);
    let d = dot_self(&y);
    let inner_len = with_active_tape(|t| t.len());
    drop(scope);
    assert_eq!(with_active_tape(|t| t.len()), inner_len);
    assert_eq!(with_active_tape(|t| t.gradient(d, &y)), vec![2.0, 4.0]);

    drop(inner_guard);
    assert_eq!(with_active_tape(|t| t.len()), outer_len);
}
