//! Cooldown tracking — the only cross-trade coupling in the engine.
//!
//! After a losing exit, entries are blocked for `duration` bars past the
//! exit index. Winning trades never arm the cooldown. State is owned by the
//! scan that created it; nothing here is global.

/// Run-scoped cooldown state.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    duration: usize,
    last_loss_exit: Option<usize>,
}

impl CooldownTracker {
    pub fn new(duration: usize) -> Self {
        Self {
            duration,
            last_loss_exit: None,
        }
    }

    /// True while `index` falls inside the blocked span `(exit, exit + duration]`.
    ///
    /// Before the first losing exit nothing is ever blocked.
    pub fn is_blocked(&self, index: usize) -> bool {
        match self.last_loss_exit {
            Some(exit) => index <= exit + self.duration,
            None => false,
        }
    }

    /// Feed a completed trade back into the tracker.
    ///
    /// Only losing trades arm the cooldown; the blocked span starts at the
    /// exit bar `entry_index + duration_candles`.
    pub fn on_trade_closed(
        &mut self,
        entry_index: usize,
        duration_candles: usize,
        was_profitable: bool,
    ) {
        if !was_profitable {
            self.last_loss_exit = Some(entry_index + duration_candles);
        }
    }

    /// Exit index of the most recent losing trade, if any.
    pub fn last_loss_exit(&self) -> Option<usize> {
        self.last_loss_exit
    }
}
