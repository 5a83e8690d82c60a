//! Errors reported by a [`SceneRenderer`](crate::SceneRenderer)

/// Failure of a renderer call
#[derive(Clone, Debug, PartialEq)]
pub enum RenderError {
    /// Offscreen target rejected (bad size, over device limits)
    Allocation(String),
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Allocation(msg) => write!(f, "Target allocation failed: {}", msg),
            RenderError::Other(msg) => write!(f, "Renderer failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            RenderError::Allocation("8192x8192 exceeds limit".into()).to_string(),
            "Target allocation failed: 8192x8192 exceeds limit"
        );
        assert_eq!(
            RenderError::Other("device lost".into()).to_string(),
            "Renderer failed: device lost"
        );
    }
}
