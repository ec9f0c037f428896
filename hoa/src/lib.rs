//! Reading automata in the Hanoi Omega-Automata format, restricted to the
//! state-based Büchi automata that `ltl2tgba -B -S -C` emits.

mod compiler;
mod guard;


use anyhow::{anyhow, bail, ensure, Context, Result};
use flowcut::automaton::{AutStateId, Automaton};
use flowcut::index::IndexedVec;
use flowcut::Set;

pub use compiler::{Compiler, Ltl2tgba};
pub use guard::parse_guard;

pub fn parse_hoa(source: &str) -> Result<Automaton> {
    let mut lines = source.lines().map(str::trim).filter(|line| !line.is_empty());

    let first = lines.next().context("File is empty")?;
    let version = first.strip_prefix("HOA:").context("Expected 'HOA:'")?.trim();
    ensure!(version == "v1", "Unsupported HOA version {version}");

    let mut state_count = None;
    let mut start = None;
    let mut aps = None;

    loop {
        let line = lines.next().context("Expected '--BODY--'")?;
        if line == "--BODY--" {
            break;
        }

        let (key, value) = line.split_once(':').with_context(|| format!("Expected header, got '{line}'"))?;
        let value = value.trim();
        match key.trim() {
            "States" => state_count = Some(value.parse::<usize>().context("States is not a number")?),
            "Start" => {
                ensure!(start.is_none(), "Multiple initial states are not supported");
                let s = value.parse::<usize>().context("Start is not a single state")?;
                start = Some(s);
            }
            "AP" => aps = Some(parse_aps(value)?),
            "Acceptance" => {
                let acceptance = value.split_whitespace().collect::<Vec<_>>().join(" ");
                ensure!(acceptance == "1 Inf(0)", "Only Büchi acceptance is supported, got '{value}'");
            }
            _ => {}
        }
    }

    let state_count = state_count.context("Missing 'States' header")?;
    let start = start.context("Missing 'Start' header")?;
    let aps = aps.unwrap_or_default();
    if start >= state_count {
        bail!("Start state {start} doesn't exist")
    }

    let mut transitions = IndexedVec::from(vec![Vec::new(); state_count]);
    let mut accepting = Set::default();
    let mut current = None;
    let mut ended = false;

    for line in lines.by_ref() {
        if line == "--END--" {
            ended = true;
            break;
        }

        if let Some(state) = line.strip_prefix("State:") {
            let (state, is_accepting) = parse_state(state)?;
            if state >= state_count {
                bail!("State {state} doesn't exist")
            }
            if is_accepting {
                accepting.insert(AutStateId(state));
            }
            current = Some(AutStateId(state));
            continue;
        }

        let from = current.with_context(|| format!("Edge '{line}' outside of a state"))?;
        let line = line.strip_prefix('[').context("Expected an explicit label '['")?;
        let (label, dest) = line.split_once(']').context("Expected ']'")?;
        let dest = dest.trim();
        if dest.contains('{') {
            bail!("Transition-based acceptance is not supported")
        }

        let guard = parse_guard(label)
            .map_err(|errs| anyhow!("{}", errs.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")))
            .with_context(|| format!("Invalid label '{label}'"))?;
        if let Some(ap) = guard.max_ap() {
            ensure!(ap < aps.len(), "Proposition {ap} doesn't exist");
        }

        let dest = dest.parse::<usize>().context("Destination is not a single state")?;
        if dest >= state_count {
            bail!("Destination state {dest} doesn't exist")
        }

        transitions[from].push((guard, AutStateId(dest)));
    }

    ensure!(ended, "Expected '--END--'");

    Ok(Automaton { aps, init: AutStateId(start), transitions, accepting })
}

/// `AP: 2 "a" "b"`
fn parse_aps(value: &str) -> Result<Vec<String>> {
    let (count, mut rest) = value.split_once(char::is_whitespace).unwrap_or((value, ""));
    let count = count.parse::<usize>().context("AP count is not a number")?;

    let mut aps = Vec::with_capacity(count);
    while let Some(quoted) = rest.trim_start().strip_prefix('"') {
        let (ap, tail) = quoted.split_once('"').context("Unterminated proposition name")?;
        aps.push(ap.to_string());
        rest = tail;
    }

    ensure!(rest.trim().is_empty(), "Unexpected '{}' in AP header", rest.trim());
    ensure!(aps.len() == count, "Expected {count} propositions, got {}", aps.len());
    Ok(aps)
}

/// `State: 0 "name" {0}`, returning the state and whether it is accepting.
fn parse_state(header: &str) -> Result<(usize, bool)> {
    let header = header.trim();
    let (id, mut rest) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
    let id = id.parse::<usize>().context("State is not a number")?;

    rest = rest.trim_start();
    if let Some(named) = rest.strip_prefix('"') {
        let (_, tail) = named.split_once('"').context("Unterminated state name")?;
        rest = tail.trim_start();
    }

    let accepting = match rest.strip_prefix('{') {
        Some(sets) => {
            let sets = sets.strip_suffix('}').context("Expected '}'")?;
            !sets.trim().is_empty()
        }
        None if rest.is_empty() => false,
        None => bail!("Unexpected '{rest}' after state {id}"),
    };

    Ok((id, accepting))
}
