pub(crate) const NEW_LINE: &str = "\n";

pub trait Printer {
    fn print(&self) {
        print!("{}", self.buffer());
    }

    fn buffer(&self) -> String;
}

pub mod decorator {
    /// Markdown bullet line, newline-terminated.
    pub fn bullet(s: &str) -> String {
        format!("- {}{}", s, super::NEW_LINE)
    }

    pub fn heading(level: usize, s: &str) -> String {
        format!("{} {}{}", "#".repeat(level), s, super::NEW_LINE)
    }
}
