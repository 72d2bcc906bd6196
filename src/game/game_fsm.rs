use std::fmt;

use rust_fsm::state_machine;

/*
 * Created
 * Started
 *    Questions are cycled with Next while the game is Started
 * Finished
 */
state_machine! {
    derive(Debug, Clone, Copy, PartialEq)
    pub GameFsm(Created)

    Created => {
        Start => Started
    },
    Started => {
        Finish => Finished
    }
}

impl fmt::Display for GameFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
