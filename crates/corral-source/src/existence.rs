/// One monotone bit of knowledge about where a source can be found:
/// whether it's been looked for (`searched`) and, if so, whether it was
/// there (`found`). Once `searched` is set, a negative answer is
/// remembered rather than re-checked on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ExistenceBit {
    searched: bool,
    found: bool,
}

impl ExistenceBit {
    pub(crate) fn record(&mut self, found: bool) {
        self.searched = true;
        self.found = found;
    }

    pub(crate) fn searched(&self) -> bool {
        self.searched
    }

    pub(crate) fn found(&self) -> Option<bool> {
        self.searched.then_some(self.found)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The three places a project's source can live, tracked independently.
/// `syncLocal` forcing an upgrade from cached-only to upstream-confirmed
/// is just a reset-then-recheck of the `upstream` bit.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExistenceLevels {
    pub(crate) in_vendor_root: ExistenceBit,
    pub(crate) in_cache: ExistenceBit,
    pub(crate) upstream: ExistenceBit,
}

impl ExistenceLevels {
    pub(crate) fn force_upstream_recheck(&mut self) {
        self.upstream.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsearched_bit_has_no_answer() {
        let bit = ExistenceBit::default();
        assert!(!bit.searched());
        assert_eq!(bit.found(), None);
    }

    #[test]
    fn negative_answer_is_remembered() {
        let mut bit = ExistenceBit::default();
        bit.record(false);
        assert_eq!(bit.found(), Some(false));
    }

    #[test]
    fn force_recheck_clears_only_upstream() {
        let mut levels = ExistenceLevels::default();
        levels.in_cache.record(true);
        levels.upstream.record(false);
        levels.force_upstream_recheck();
        assert_eq!(levels.in_cache.found(), Some(true));
        assert_eq!(levels.upstream.found(), None);
    }
}
