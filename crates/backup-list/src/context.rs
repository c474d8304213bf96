use core::fmt::Display;

/// Holds the context for the current stage. Used for prefixing logs.
#[derive(Default, Debug)]
pub struct Context {
    /// The input line being handled.
    pub line: Option<usize>,
    /// The current context
    pub current_context: &'static str,
}

impl Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(line) = &self.line {
            write!(f, "[line {line}] ")?;
        }

        write!(f, "[{}] ", self.current_context)?;

        Ok(())
    }
}
