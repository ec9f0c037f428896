use chumsky::error::Simple;
use chumsky::primitive::{choice, end, just};
use chumsky::recursive::recursive;
use chumsky::text::{self, TextParser};
use chumsky::Parser;
use flowcut::automaton::Guard;

// <Atom> ::= `t' | `f' | <Int> | `(' <Guard> `)'
// <Unary> ::= `!'* <Atom>
// <Conjunction> ::= <Unary> (`&' <Unary>)*
// <Guard> ::= <Conjunction> (`|' <Conjunction>)*
pub fn parse_guard(source: &str) -> Result<Guard, Vec<Simple<char>>> {
    let guard = recursive(|guard| {
        let tt = just('t').to(Guard::TRUE);
        let ff = just('f').to(Guard::FALSE);
        let ap = text::int(10).try_map(|n: String, span| {
            n.parse::<usize>().map(Guard::Ap).map_err(|e| Simple::custom(span, e.to_string()))
        });
        let group = guard.delimited_by(just('('), just(')'));
        let atom = choice((tt, ff, ap, group)).padded().boxed();

        let not = just('!').padded().repeated().then(atom).foldr(|_, g| Guard::Not(Box::new(g)));

        let and = not.separated_by(just('&').padded()).at_least(1).map(|gs| flatten(gs, Guard::And));
        let or = and.separated_by(just('|').padded()).at_least(1).map(|gs| flatten(gs, Guard::Or));

        or.padded().boxed()
    });

    guard.then_ignore(end()).parse(source)
}

fn flatten(mut gs: Vec<Guard>, join: fn(Vec<Guard>) -> Guard) -> Guard {
    match gs.len() {
        1 => gs.remove(0),
        _ => join(gs),
    }
}
