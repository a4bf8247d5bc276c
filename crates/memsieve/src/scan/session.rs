//! Cheat-search workflow over successive scans.
//!
//! A session starts from the universal set and narrows it with each scan:
//!
//! ```ignore
//! let mut session = ScanSession::new();
//! session.snapshot(&wram)?;
//! // ... lose a life ...
//! session.refine_against_previous(&wram, ScanFilter::parse("<", "ub")?)?;
//! session.refine(&wram, ScanFilter::parse("==", "ub")?, Operand::Constant(2))?;
//! for addr in session.candidates_in(&wram).elements() { /* ... */ }
//! ```

use tracing::info;

use crate::error::{Error, Result};
use crate::memory::{MemoryRegion, Snapshot};
use crate::scan::{Operand, ScanFilter};
use crate::set::CandidateSet;

/// Record of one refinement
#[derive(Debug, Clone)]
pub struct ScanStep {
    pub region_id: String,
    pub filter: ScanFilter,
    /// `None` for a comparison against the previous snapshot or a region
    pub constant: Option<u64>,
    /// Members of the running set inside the scanned region afterwards
    pub remaining: u64,
}

#[derive(Debug, Clone)]
pub struct ScanSession {
    current: CandidateSet,
    history: Vec<CandidateSet>,
    steps: Vec<ScanStep>,
    previous: Option<Snapshot>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            current: CandidateSet::universal(),
            history: Vec::new(),
            steps: Vec::new(),
            previous: None,
        }
    }

    /// Running candidate set
    pub fn current(&self) -> &CandidateSet {
        &self.current
    }

    pub fn steps(&self) -> &[ScanStep] {
        &self.steps
    }

    /// Snapshot used by [`ScanSession::refine_against_previous`]
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Take a new comparison anchor from `region`.
    pub fn snapshot(&mut self, region: &dyn MemoryRegion) -> Result<&Snapshot> {
        Ok(self.previous.insert(Snapshot::capture(region)?))
    }

    /// Intersect the running set with a fresh scan of `region`.
    pub fn refine(
        &mut self,
        region: &dyn MemoryRegion,
        filter: ScanFilter,
        operand: Operand<'_>,
    ) -> Result<&CandidateSet> {
        let matches = filter.scan(region, operand)?;
        let constant = match operand {
            Operand::Constant(value) => Some(value),
            Operand::Region(_) => None,
        };
        self.push(region, filter, constant, matches);
        Ok(&self.current)
    }

    /// Compare `region` against the last snapshot, then re-anchor on the
    /// current contents so chained "changed since last time" scans work.
    pub fn refine_against_previous(
        &mut self,
        region: &dyn MemoryRegion,
        filter: ScanFilter,
    ) -> Result<&CandidateSet> {
        let previous = self.previous.as_ref().ok_or(Error::NoSnapshot)?;
        let matches = filter.scan(region, Operand::Region(previous))?;
        self.previous = Some(Snapshot::capture(region)?);
        self.push(region, filter, None, matches);
        Ok(&self.current)
    }

    fn push(
        &mut self,
        region: &dyn MemoryRegion,
        filter: ScanFilter,
        constant: Option<u64>,
        matches: CandidateSet,
    ) {
        let next = self.current.intersection(&matches);
        let remaining = next.elements_in(region.base(), region.size()).count() as u64;
        info!(
            "Scan #{} on {} ({} {}): {} candidate(s) remain",
            self.steps.len() + 1,
            region.id(),
            filter.operator,
            filter.spec,
            remaining
        );

        self.history.push(std::mem::replace(&mut self.current, next));
        self.steps.push(ScanStep {
            region_id: region.id().to_string(),
            filter,
            constant,
            remaining,
        });
    }

    /// Drop the last refinement. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                self.steps.pop();
                true
            }
            None => false,
        }
    }

    /// Start over from the universal set, keeping the snapshot.
    pub fn reset(&mut self) {
        self.current = CandidateSet::universal();
        self.history.clear();
        self.steps.clear();
    }

    /// Concrete candidates inside `region`, as a plain set.
    pub fn candidates_in(&self, region: &dyn MemoryRegion) -> CandidateSet {
        self.current.restrict(region.base(), region.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BufferRegion;

    fn lives_region() -> BufferRegion {
        BufferRegion::new("wram", "Work RAM", 0x0300, vec![3, 3, 9, 3, 0, 1])
    }

    #[test]
    fn test_starts_universal() {
        let session = ScanSession::new();
        assert!(session.current().is_universal());
        assert!(session.steps().is_empty());
        assert!(session.previous().is_none());
    }

    #[test]
    fn test_refine_narrows_running_set() {
        let mut wram = lives_region();
        let mut session = ScanSession::new();
        let eq = ScanFilter::parse("==", "ub").unwrap();

        session.refine(&wram, eq, Operand::Constant(3)).unwrap();
        assert_eq!(
            session.candidates_in(&wram).as_table().unwrap(),
            vec![0x300, 0x301, 0x303]
        );

        wram.poke(0x301, 2).unwrap();
        wram.poke(0x303, 2).unwrap();
        session.refine(&wram, eq, Operand::Constant(2)).unwrap();
        assert_eq!(
            session.candidates_in(&wram).as_table().unwrap(),
            vec![0x301, 0x303]
        );
        assert_eq!(session.steps().len(), 2);
        assert_eq!(session.steps()[1].remaining, 2);
        assert_eq!(session.steps()[1].constant, Some(2));
    }

    #[test]
    fn test_refine_against_previous() {
        let mut wram = lives_region();
        let mut session = ScanSession::new();
        let decreased = ScanFilter::parse("<", "ub").unwrap();

        assert!(matches!(
            session.refine_against_previous(&wram, decreased),
            Err(Error::NoSnapshot)
        ));

        session.snapshot(&wram).unwrap();
        wram.poke(0x300, 2).unwrap();
        wram.poke(0x302, 8).unwrap();
        session.refine_against_previous(&wram, decreased).unwrap();
        assert_eq!(
            session.candidates_in(&wram).as_table().unwrap(),
            vec![0x300, 0x302]
        );

        // Re-anchored: only the next decrease counts
        wram.poke(0x300, 1).unwrap();
        session.refine_against_previous(&wram, decreased).unwrap();
        assert_eq!(session.candidates_in(&wram).as_table().unwrap(), vec![0x300]);
        assert_eq!(session.previous().unwrap().peek(0x300).unwrap(), 1);
    }

    #[test]
    fn test_undo_and_reset() {
        let wram = lives_region();
        let mut session = ScanSession::new();
        let eq = ScanFilter::parse("==", "ub").unwrap();

        session.refine(&wram, eq, Operand::Constant(3)).unwrap();
        session.refine(&wram, eq, Operand::Constant(9)).unwrap();
        assert!(session.candidates_in(&wram).is_empty());

        assert!(session.undo());
        assert_eq!(session.candidates_in(&wram).size(0), 3);
        assert!(session.undo());
        assert!(session.current().is_universal());
        assert!(!session.undo());

        session.refine(&wram, eq, Operand::Constant(0)).unwrap();
        session.reset();
        assert!(session.current().is_universal());
        assert!(session.steps().is_empty());
    }

    #[test]
    fn test_failed_scan_leaves_session_untouched() {
        let wram = lives_region();
        let other = BufferRegion::zeroed("sram", "Save RAM", 0x6000, 6);
        let mut session = ScanSession::new();
        let eq = ScanFilter::parse("==", "ub").unwrap();

        assert!(session.refine(&wram, eq, Operand::Region(&other)).is_err());
        assert!(session.current().is_universal());
        assert!(session.steps().is_empty());
    }
}
