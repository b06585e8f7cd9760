use std::fmt;

/// Per-solve warning sink. Parser and solvers push notices here instead of
/// into any process-wide logging state; the report renders them at the end.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("solve: {message}");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Diagnostics;

    #[test]
    fn warnings_accumulate_in_order() {
        let mut diag = Diagnostics::new();
        diag.warn("first");
        diag.warn("second");
        assert_eq!(diag.warnings(), ["first", "second"]);
    }

    #[test]
    fn merge_appends_the_other_sink() {
        let mut a = Diagnostics::new();
        a.warn("a");
        let mut b = Diagnostics::new();
        b.warn("b");
        a.merge(b);
        assert_eq!(a.warnings(), ["a", "b"]);
    }

    #[test]
    fn display_renders_one_line_per_warning() {
        let mut diag = Diagnostics::new();
        diag.warn("skipped link line 4");
        assert_eq!(diag.to_string(), "warning: skipped link line 4\n");
    }
}
