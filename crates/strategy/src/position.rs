use common::{Action, Error, Position, PositionSide, Result};

/// Owns the strategy's position across bars.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    position: Position,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side(&self) -> PositionSide {
        self.position.side
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_flat()
    }

    /// Apply a filled action. Entries require a flat position and exits an
    /// open one; anything else leaves the position untouched.
    pub fn apply_action(&mut self, action: Action, price: f64, size: f64) -> Result<()> {
        let side = self.position.side;
        self.position = match (action, side) {
            (Action::Hold, _) => return Ok(()),
            (Action::EnterLong, PositionSide::Flat) => Position::long(price, size),
            (Action::EnterShort, PositionSide::Flat) => Position::short(price, size),
            (Action::Exit, PositionSide::Long | PositionSide::Short) => Position::flat(),
            (Action::EnterLong | Action::EnterShort | Action::Exit, _) => {
                return Err(Error::InvalidTransition { action, side });
            }
        };
        Ok(())
    }
}
