use std::fmt;

/// Render output of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Empty,
    Heading(String),
    Text(String),
    Field { label: String, value: String },
    Button(String),
    Panel {
        title: Option<String>,
        children: Vec<View>,
    },
}

impl View {
    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading(text.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::Button(label.into())
    }

    pub fn panel(children: Vec<View>) -> Self {
        Self::Panel {
            title: None,
            children,
        }
    }

    pub fn titled(title: impl Into<String>, children: Vec<View>) -> Self {
        Self::Panel {
            title: Some(title.into()),
            children,
        }
    }

    /// Static view shown by a failed boundary.
    pub fn fallback() -> Self {
        Self::panel(vec![
            Self::heading("Something went wrong."),
            Self::text("Please try refreshing the page."),
        ])
    }

    /// Whether any text in this tree contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Self::Empty => false,
            Self::Heading(text) | Self::Text(text) | Self::Button(text) => text.contains(needle),
            Self::Field { label, value } => label.contains(needle) || value.contains(needle),
            Self::Panel { title, children } => {
                title.as_deref().is_some_and(|t| t.contains(needle))
                    || children.iter().any(|child| child.contains_text(needle))
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Self::Empty => Ok(()),
            Self::Heading(text) => writeln!(f, "{pad}# {text}"),
            Self::Text(text) => writeln!(f, "{pad}{text}"),
            Self::Field { label, value } => writeln!(f, "{pad}{label}: {value}"),
            Self::Button(label) => writeln!(f, "{pad}[ {label} ]"),
            Self::Panel { title, children } => {
                if let Some(title) = title {
                    writeln!(f, "{pad}== {title} ==")?;
                }
                for child in children {
                    child.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
