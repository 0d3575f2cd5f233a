use omx_model::{ComponentHandle, OmxState, PortCommand, PortIndex};

/// Multiset of `(component_handle, target_state)` pairs the last
/// `do_*2*` operation is waiting to see acknowledged. Monotonically filled by
/// `record`, drained one entry at a time by `ack`.
#[derive(Default, Debug)]
pub struct TransitionLedger {
    pending: Vec<(ComponentHandle, OmxState)>,
}

impl TransitionLedger {
    pub fn record(&mut self, handle: ComponentHandle, state: OmxState) {
        self.pending.push((handle, state));
    }

    /// Removes one matching entry, if present. Returns whether the whole
    /// ledger is empty *after* the removal, i.e. whether the transition this
    /// ledger was tracking is now complete.
    pub fn ack(&mut self, handle: ComponentHandle, state: OmxState) -> bool {
        if let Some(idx) = self
            .pending
            .iter()
            .position(|(h, s)| *h == handle && *s == state)
        {
            self.pending.remove(idx);
        }
        self.pending.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Analogous ledger for outstanding port disable/enable acknowledgements.
#[derive(Default, Debug)]
pub struct PortTransitionLedger {
    pending: Vec<(ComponentHandle, PortIndex, PortCommand)>,
}

impl PortTransitionLedger {
    pub fn record(&mut self, handle: ComponentHandle, port: PortIndex, command: PortCommand) {
        self.pending.push((handle, port, command));
    }

    pub fn ack(&mut self, handle: ComponentHandle, port: PortIndex, command: PortCommand) -> bool {
        if let Some(idx) = self
            .pending
            .iter()
            .position(|(h, p, c)| *h == handle && *p == port && *c == command)
        {
            self.pending.remove(idx);
        }
        !self
            .pending
            .iter()
            .any(|(_, _, c)| *c == command)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omx_model::ComponentHandle;

    #[test]
    fn transition_ledger_completes_only_when_fully_drained() {
        let mut ledger = TransitionLedger::default();
        let a = ComponentHandle::from_raw(1);
        let b = ComponentHandle::from_raw(2);
        ledger.record(a, OmxState::Idle);
        ledger.record(b, OmxState::Idle);
        assert!(!ledger.ack(a, OmxState::Idle));
        assert!(ledger.ack(b, OmxState::Idle));
    }

    #[test]
    fn port_ledger_tracks_disable_and_enable_independently() {
        let mut ledger = PortTransitionLedger::default();
        let a = ComponentHandle::from_raw(1);
        ledger.record(a, 0, PortCommand::Disable);
        ledger.record(a, 1, PortCommand::Disable);
        assert!(!ledger.ack(a, 0, PortCommand::Disable));
        assert!(ledger.ack(a, 1, PortCommand::Disable));
    }
}
