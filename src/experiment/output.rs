//! Tab-separated rendering of solution lists.

use crate::core::{Solution, Variable};
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the objectives (FUN) and variables (VAR) of a solution list, one
/// solution per line, values separated by `separator` (tab by default).
///
/// ```
/// use u_moea::core::{Bounds, Solution};
/// use u_moea::experiment::SolutionListOutput;
///
/// let bounds = vec![Bounds::new(0.0, 1.0); 2].into();
/// let mut s = Solution::new(vec![0.25, 0.5], bounds, 2);
/// s.set_objective(0, 1.0);
/// s.set_objective(1, 2.5);
///
/// let mut fun = Vec::new();
/// SolutionListOutput::new(&[s]).write_objectives(&mut fun).unwrap();
/// assert_eq!(String::from_utf8(fun).unwrap(), "1\t2.5\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SolutionListOutput<'a, V> {
    solutions: &'a [Solution<V>],
    separator: &'a str,
}

impl<'a, V: Variable> SolutionListOutput<'a, V> {
    /// Renders `solutions` with tab separators.
    pub fn new(solutions: &'a [Solution<V>]) -> Self {
        Self {
            solutions,
            separator: "\t",
        }
    }

    /// Uses another separator.
    pub fn with_separator(mut self, separator: &'a str) -> Self {
        self.separator = separator;
        self
    }

    /// Writes one line of objective values per solution.
    pub fn write_objectives(&self, mut writer: impl Write) -> Result<()> {
        for s in self.solutions {
            write_line(&mut writer, s.objectives().iter().copied(), self.separator)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes one line of variable values per solution.
    pub fn write_variables(&self, mut writer: impl Write) -> Result<()> {
        for s in self.solutions {
            write_line(
                &mut writer,
                s.variables().iter().map(|v| v.to_f64()),
                self.separator,
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Creates (or truncates) the FUN and VAR files and writes both.
    ///
    /// # Errors
    /// [`Error::Io`](crate::error::Error::Io) if a file cannot be created
    /// or written.
    pub fn write_files(&self, fun: impl AsRef<Path>, var: impl AsRef<Path>) -> Result<()> {
        self.write_objectives(BufWriter::new(File::create(fun)?))?;
        self.write_variables(BufWriter::new(File::create(var)?))?;
        Ok(())
    }
}

fn write_line(
    writer: &mut impl Write,
    values: impl Iterator<Item = f64>,
    separator: &str,
) -> std::io::Result<()> {
    for (i, v) in values.enumerate() {
        if i > 0 {
            writer.write_all(separator.as_bytes())?;
        }
        write!(writer, "{v}")?;
    }
    writeln!(writer)
}
