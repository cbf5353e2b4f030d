use std::fmt;

pub enum Icon {
    Yes,
    No,
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Icon::Yes => f.write_str("✔"),
            Icon::No => f.write_str("✘"),
        }
    }
}
