//! Pre-scheduled user commands

use crate::traits::{Command, CommandSource};
use std::collections::BTreeSet;

/// Issues resets and a quit at fixed frame indices.
///
/// A quit scheduled on the same frame as a reset wins.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommands {
    reset_at: BTreeSet<u64>,
    quit_at: Option<u64>,
}

impl ScriptedCommands {
    pub fn new<I: IntoIterator<Item = u64>>(reset_at: I, quit_at: Option<u64>) -> Self {
        Self {
            reset_at: reset_at.into_iter().collect(),
            quit_at,
        }
    }
}

impl CommandSource for ScriptedCommands {
    fn poll(&mut self, frame_index: u64) -> Option<Command> {
        if self.quit_at == Some(frame_index) {
            return Some(Command::Quit);
        }
        self.reset_at
            .remove(&frame_index)
            .then_some(Command::ResetTracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule() {
        let mut commands = ScriptedCommands::new([2, 5], Some(5));
        let issued: Vec<_> = (0..7).map(|i| commands.poll(i)).collect();
        assert_eq!(
            issued,
            vec![
                None,
                None,
                Some(Command::ResetTracks),
                None,
                None,
                Some(Command::Quit),
                None,
            ]
        );
    }

    #[test]
    fn test_reset_fires_once() {
        let mut commands = ScriptedCommands::new([1], None);
        assert_eq!(commands.poll(1), Some(Command::ResetTracks));
        assert_eq!(commands.poll(1), None);
    }
}
