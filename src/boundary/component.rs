use super::View;
use std::fmt;
use thiserror::Error;

/// Failure raised while a component renders.
///
/// `component_stack` lists the components the failure passed through,
/// innermost first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
    pub component_stack: Vec<String>,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            component_stack: Vec::new(),
        }
    }

    /// Records that the failure propagated out of `component`.
    pub fn within(mut self, component: impl Into<String>) -> Self {
        let component = component.into();
        if self.component_stack.last() != Some(&component) {
            self.component_stack.push(component);
        }
        self
    }

    pub fn trace(&self) -> ComponentTrace<'_> {
        ComponentTrace(&self.component_stack)
    }
}

/// Display adapter printing one `in <Component>` line per frame.
pub struct ComponentTrace<'a>(&'a [String]);

impl fmt::Display for ComponentTrace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.0 {
            write!(f, "\n    in {frame}")?;
        }
        Ok(())
    }
}

/// Something that renders a subtree.
pub trait Component {
    /// Name used in component traces.
    fn name(&self) -> &str;

    fn render(&self) -> Result<View, RenderError>;
}

impl<C: Component + ?Sized> Component for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(&self) -> Result<View, RenderError> {
        (**self).render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_builds_innermost_first_stack() {
        let err = RenderError::new("boom")
            .within("ProfileCard")
            .within("ProfilePage")
            .within("ProfilePage");

        assert_eq!(err.component_stack, vec!["ProfileCard", "ProfilePage"]);
        assert_eq!(
            err.trace().to_string(),
            "\n    in ProfileCard\n    in ProfilePage"
        );
        assert_eq!(err.to_string(), "boom");
    }
}
