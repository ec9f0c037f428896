use std::fmt;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use flowcut::env::EnvironmentInput;
use flowcut::model::Mode;
use indexmap::IndexMap;
use serde::Deserialize;

/// States may be written as JSON numbers or strings; both end up as names.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StateName {
    Int(i64),
    Str(String),
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateName::Int(n) => write!(f, "{n}"),
            StateName::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Problem {
    pub states: Option<Vec<StateName>>,
    pub transitions: Option<IndexMap<String, Vec<StateName>>>,
    /// A grid given inline, or the path of a file holding one.
    #[serde(alias = "mazefile")]
    pub maze: Option<String>,
    #[serde(default)]
    pub labels: IndexMap<String, Vec<String>>,
    pub init: Vec<StateName>,
    pub sysformula: String,
    pub testformula: String,
    #[serde(rename = "type")]
    pub mode: Mode,
}

impl Problem {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Invalid problem description")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut problem = Self::from_json(&source).with_context(|| format!("In {}", path.display()))?;

        // Maze files are looked up next to the problem file.
        if let Some(maze) = &problem.maze {
            if !maze.contains('\n') {
                let dir = path.parent().unwrap_or(Path::new("."));
                let maze_path = dir.join(maze);
                let grid = std::fs::read_to_string(&maze_path)
                    .with_context(|| format!("Failed to read maze {}", maze_path.display()))?;
                problem.maze = Some(grid);
            }
        }

        Ok(problem)
    }

    /// The environment described by this problem. Names are checked later, when
    /// the environment model is built from it.
    pub fn environment(&self) -> Result<EnvironmentInput> {
        let (states, transitions) = match (&self.maze, &self.states) {
            (Some(_), Some(_)) => bail!("Give either 'maze' or 'states', not both"),
            (Some(grid), None) => {
                ensure!(self.transitions.is_none(), "A maze already defines the transitions");
                parse_maze(grid)?
            }
            (None, Some(states)) => {
                let states = states.iter().map(StateName::to_string).collect();
                let transitions = self
                    .transitions
                    .iter()
                    .flatten()
                    .map(|(s, succs)| (s.clone(), succs.iter().map(StateName::to_string).collect()))
                    .collect();
                (states, transitions)
            }
            (None, None) => bail!("Missing 'states' or 'maze'"),
        };

        Ok(EnvironmentInput {
            states,
            transitions,
            labels: self.labels.iter().map(|(s, props)| (s.clone(), props.clone())).collect(),
            init: self.init.iter().map(StateName::to_string).collect(),
        })
    }
}

fn cell_name(row: usize, col: usize) -> String {
    format!("({row}, {col})")
}

/// Reads a grid where `#` is a wall. Every free cell becomes a state named
/// `(row, col)` that moves to its free neighbours, in the order up, down, left, right.
pub fn parse_maze(grid: &str) -> Result<(Vec<String>, Vec<(String, Vec<String>)>)> {
    let cells = grid
        .lines()
        .map(|line| line.trim_end().chars().map(|c| c != '#').collect::<Vec<bool>>())
        .collect::<Vec<_>>();

    let free = |row: usize, col: usize| cells.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false);

    let mut states = Vec::new();
    let mut transitions = Vec::new();
    for (row, line) in cells.iter().enumerate() {
        for col in (0..line.len()).filter(|&col| line[col]) {
            let mut succs = Vec::new();
            if row > 0 && free(row - 1, col) {
                succs.push(cell_name(row - 1, col));
            }
            if free(row + 1, col) {
                succs.push(cell_name(row + 1, col));
            }
            if col > 0 && free(row, col - 1) {
                succs.push(cell_name(row, col - 1));
            }
            if free(row, col + 1) {
                succs.push(cell_name(row, col + 1));
            }

            states.push(cell_name(row, col));
            transitions.push((cell_name(row, col), succs));
        }
    }

    ensure!(!states.is_empty(), "The maze has no free cells");
    Ok((states, transitions))
}
