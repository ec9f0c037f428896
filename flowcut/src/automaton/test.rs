use crate::fixtures::eventually;
use crate::{Error, Set};

use super::{AcceptanceStructure, AutStateId, Guard, Role};

fn ap(n: usize) -> Guard {
    Guard::Ap(n)
}

fn not(g: Guard) -> Guard {
    Guard::Not(Box::new(g))
}

#[test]
fn guard_eval() {
    let g = Guard::Or(vec![Guard::And(vec![ap(0), not(ap(1))]), ap(2)]);

    assert!(g.holds(&[true, false, false]));
    assert!(g.holds(&[false, true, true]));
    assert!(!g.holds(&[true, true, false]));
    assert!(!g.holds(&[]));

    assert!(Guard::TRUE.holds(&[]));
    assert!(!Guard::FALSE.holds(&[true]));
    assert_eq!(g.max_ap(), Some(2));
    assert_eq!(Guard::TRUE.max_ap(), None);
}

#[test]
fn guard_satisfiability() {
    assert!(Guard::TRUE.is_satisfiable());
    assert!(!Guard::FALSE.is_satisfiable());
    assert!(!Guard::And(vec![ap(3), not(ap(3))]).is_satisfiable());
    assert!(Guard::And(vec![ap(3), not(ap(5))]).is_satisfiable());
    assert!(!Guard::And(vec![Guard::Or(vec![ap(0), ap(1)]), not(ap(0)), not(ap(1))]).is_satisfiable());
}

#[test]
fn guard_satisfiability_many_propositions() {
    let all = (0..80).map(ap).collect::<Vec<_>>();
    assert!(Guard::And(all.clone()).is_satisfiable());

    let mut contradiction = all.clone();
    contradiction.push(not(ap(79)));
    assert!(!Guard::And(contradiction).is_satisfiable());

    // Only the valuation with 70 true and everything else false satisfies it.
    let mut only_70 = (0..80).filter(|&i| i != 70).map(|i| not(ap(i))).collect::<Vec<_>>();
    only_70.push(ap(70));
    assert!(Guard::And(only_70).is_satisfiable());
}

#[test]
fn guard_display() {
    let g = Guard::And(vec![ap(0), not(Guard::Or(vec![ap(1), Guard::TRUE]))]);
    assert_eq!(g.to_string(), "(0 & !(1 | t))");
    assert_eq!(Guard::FALSE.to_string(), "f");
}

#[test]
fn single_objective() {
    let aut = AcceptanceStructure::single(eventually("goal"), Role::Sys);

    assert_eq!(aut.accepting(Role::Sys), &Set::from_iter([AutStateId(0)]));
    assert!(aut.accepting(Role::Test).is_empty());
    assert_eq!(aut.state_count(), 2);

    let goal = aut.valuation(["goal", "other"]);
    assert_eq!(goal, vec![true]);
    assert_eq!(aut.successors(AutStateId(1), &goal).collect::<Vec<_>>(), vec![AutStateId(0)]);
    assert_eq!(aut.successors(AutStateId(1), &[false]).collect::<Vec<_>>(), vec![AutStateId(1)]);
}

#[test]
fn product_accepting_sets() {
    let sys = eventually("goal");
    let test = eventually("int");
    let aut = AcceptanceStructure::product(&sys, &test).unwrap();

    assert_eq!(aut.aps, vec!["goal".to_string(), "int".to_string()]);
    assert_eq!(aut.init, AutStateId(0));
    // (1, 1), (0, 0), (0, 1), (1, 0) in discovery order.
    assert_eq!(aut.state_count(), 4);
    assert_eq!(aut.sys, Set::from_iter([AutStateId(1), AutStateId(2)]));
    assert_eq!(aut.test, Set::from_iter([AutStateId(1), AutStateId(3)]));

    let step = |q: usize, label: &[&str]| {
        let valuation = aut.valuation(label.iter().copied());
        aut.successors(AutStateId(q), &valuation).collect::<Vec<_>>()
    };
    assert_eq!(step(0, &[]), vec![AutStateId(0)]);
    assert_eq!(step(0, &["int"]), vec![AutStateId(3)]);
    assert_eq!(step(0, &["goal", "int"]), vec![AutStateId(1)]);
    assert_eq!(step(3, &["goal"]), vec![AutStateId(1)]);
}

#[test]
fn product_shares_propositions() {
    let sys = eventually("goal");
    let test = eventually("goal");
    let aut = AcceptanceStructure::product(&sys, &test).unwrap();

    assert_eq!(aut.aps, vec!["goal".to_string()]);
    // Both components read the same proposition, so they move together.
    assert_eq!(aut.state_count(), 2);
    assert_eq!(aut.sys, aut.test);
}

#[test]
fn product_requires_both_objectives() {
    let mut test = eventually("int");
    test.accepting.clear();

    let err = AcceptanceStructure::product(&eventually("goal"), &test).unwrap_err();
    assert!(matches!(err, Error::MissingAcceptingStates(Role::Test)));

    let err = AcceptanceStructure::product(&test, &eventually("goal")).unwrap_err();
    assert!(matches!(err, Error::MissingAcceptingStates(Role::Sys)));
}
