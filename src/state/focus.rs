//! Focus Module - the node that receives key events.
//!
//! Focus is a weak reference: obliterating the focused node clears it.

use crate::engine::NodeId;
use crate::environment::Environment;
use crate::error::Result;

impl Environment {
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn has_focus(&self, id: NodeId) -> bool {
        self.focus == Some(id)
    }

    /// Give keyboard focus to `id`. Dead or foreign nodes are rejected and
    /// the current focus is kept.
    pub fn set_focus(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        self.focus = Some(id);
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Configuration;
    use crate::environment::Environment;
    use crate::error::FrameError;
    use crate::logger::MemoryLogger;

    #[test]
    fn test_set_and_clear_focus() {
        let mut env = Environment::new();
        let root = env.root();
        let a = env.create_frame(root, "a").unwrap();

        env.set_focus(a).unwrap();
        assert_eq!(env.focus(), Some(a));
        assert!(env.has_focus(a));

        env.clear_focus();
        assert_eq!(env.focus(), None);
    }

    #[test]
    fn test_foreign_focus_rejected() {
        let logger = MemoryLogger::new();
        let mut env = Environment::with_config(Configuration::new().with_logger(logger.clone()));
        let root = env.root();
        let mine = env.create_frame(root, "mine").unwrap();
        env.set_focus(mine).unwrap();

        let mut other = Environment::new();
        let theirs = other.create_frame(other.root(), "theirs").unwrap();

        assert_eq!(env.set_focus(theirs), Err(FrameError::ForeignEnvironment(theirs)));
        assert_eq!(env.focus(), Some(mine));
        assert_eq!(logger.errors().len(), 1);
    }

    #[test]
    fn test_obliterate_clears_focus() {
        let mut env = Environment::new();
        let root = env.root();
        let a = env.create_frame(root, "a").unwrap();
        let child = env.create_frame(a, "child").unwrap();
        env.set_focus(child).unwrap();

        env.obliterate(a).unwrap();
        assert_eq!(env.focus(), None);
        assert!(!env.key_down(crate::state::keyboard::Key::Escape));
    }
}
