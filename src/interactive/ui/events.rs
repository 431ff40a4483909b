use crate::catalog::OperationOutput;
use crate::error::EngineResult;
use crossterm::event::KeyEvent;

/// Everything the interaction loop reacts to, delivered through one queue.
#[derive(Clone, Debug)]
pub enum Message {
    Key(KeyEvent),
    /// Posted exactly once per dispatched command.
    Completed(EngineResult<OperationOutput>),
    Resize,
    /// The input reader stopped; nothing else can reach the loop.
    InputClosed,
}
