// src/demo.rs

//! Sample statistics graph used by the `depgraph` binary.
//!
//! ```text
//! n        <- xs
//! sum      <- xs
//! mean     <- sum, n
//! variance <- xs, mean   (parallel)
//! stddev   <- variance
//! max      <- xs         (parallel)
//! ```

use std::fmt;

use anyhow::{Result, bail};

use crate::dag::{Graph, Node};

/// Values flowing through the statistics graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    Series(Vec<f64>),
    Scalar(f64),
}

impl Stat {
    pub fn as_series(&self) -> Result<&[f64]> {
        match self {
            Stat::Series(xs) => Ok(xs),
            Stat::Scalar(_) => bail!("expected a series, got a scalar"),
        }
    }

    pub fn as_scalar(&self) -> Result<f64> {
        match self {
            Stat::Scalar(x) => Ok(*x),
            Stat::Series(_) => bail!("expected a scalar, got a series"),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Scalar(x) => write!(f, "{x}"),
            Stat::Series(xs) if xs.len() <= 8 => write!(f, "{xs:?}"),
            Stat::Series(xs) => write!(
                f,
                "[{}, {}, .., {}] ({} values)",
                xs[0],
                xs[1],
                xs[xs.len() - 1],
                xs.len()
            ),
        }
    }
}

/// The statistics graph. `xs` must be supplied as an initial value.
pub fn statistics_graph() -> Graph<Stat> {
    Graph::new()
        .with(
            "n",
            Node::function(["xs"], |args: &[Stat]| {
                Ok(Stat::Scalar(args[0].as_series()?.len() as f64))
            }),
        )
        .with(
            "sum",
            Node::function(["xs"], |args: &[Stat]| {
                Ok(Stat::Scalar(args[0].as_series()?.iter().sum()))
            }),
        )
        .with(
            "mean",
            Node::function(["sum", "n"], |args: &[Stat]| {
                let n = args[1].as_scalar()?;
                if n == 0.0 {
                    bail!("mean of an empty series");
                }
                Ok(Stat::Scalar(args[0].as_scalar()? / n))
            }),
        )
        .with(
            "variance",
            Node::function(["xs", "mean"], |args: &[Stat]| {
                let xs = args[0].as_series()?;
                let mean = args[1].as_scalar()?;
                let ss: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();
                Ok(Stat::Scalar(ss / xs.len() as f64))
            })
            .parallel(),
        )
        .with(
            "stddev",
            Node::function(["variance"], |args: &[Stat]| {
                Ok(Stat::Scalar(args[0].as_scalar()?.sqrt()))
            }),
        )
        .with(
            "max",
            Node::function(["xs"], |args: &[Stat]| {
                let xs = args[0].as_series()?;
                match xs.iter().copied().reduce(f64::max) {
                    Some(max) => Ok(Stat::Scalar(max)),
                    None => bail!("max of an empty series"),
                }
            })
            .parallel(),
        )
}

/// `0.0, 1.0, .., (size - 1)`.
pub fn sample_series(size: usize) -> Stat {
    Stat::Series((0..size).map(|i| i as f64).collect())
}
