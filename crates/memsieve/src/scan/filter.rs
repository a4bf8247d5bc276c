use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::MemoryRegion;
use crate::scan::decode::{ByteSource, RollingWindow};
use crate::scan::{OperandSpec, ScanOperator};
use crate::set::CandidateSet;

/// Right-hand side of a scan comparison.
#[derive(Clone, Copy)]
pub enum Operand<'a> {
    /// Truncated to the operand width before comparing.
    Constant(u64),
    /// Must have the same base and size as the scanned region.
    Region(&'a dyn MemoryRegion),
}

impl Operand<'_> {
    /// Constant from a signed value (two's-complement bit pattern)
    pub fn signed(value: i64) -> Self {
        Operand::Constant(value as u64)
    }
}

impl std::fmt::Debug for Operand<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Operand::Region(region) => f.debug_tuple("Region").field(&region.id()).finish(),
        }
    }
}

impl<'a, R: MemoryRegion> From<&'a R> for Operand<'a> {
    fn from(region: &'a R) -> Self {
        Operand::Region(region)
    }
}

impl From<u64> for Operand<'_> {
    fn from(value: u64) -> Self {
        Operand::Constant(value)
    }
}

impl From<i64> for Operand<'_> {
    fn from(value: i64) -> Self {
        Operand::signed(value)
    }
}

enum Rhs<'a> {
    Constant(u64),
    Window(ByteSource<'a>, RollingWindow),
}

/// One comparison pass: an operator plus how operands are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanFilter {
    pub operator: ScanOperator,
    pub spec: OperandSpec,
}

impl ScanFilter {
    pub fn new(operator: ScanOperator, spec: OperandSpec) -> Self {
        Self { operator, spec }
    }

    /// Parse the script-facing operator and spec strings.
    pub fn parse(operator: &str, spec: &str) -> Result<Self> {
        Ok(Self::new(ScanOperator::parse(operator)?, spec.parse()?))
    }

    /// Compare every address of `region` against `operand`.
    ///
    /// Visits `[base, base + size - width]` in ascending order, so the
    /// result needs no sorting. A region smaller than the operand width
    /// yields the empty set.
    pub fn scan(&self, region: &dyn MemoryRegion, operand: Operand<'_>) -> Result<CandidateSet> {
        if let Operand::Region(other) = operand
            && (other.base() != region.base() || other.size() != region.size())
        {
            return Err(Error::IncompatibleRegions {
                left_base: region.base(),
                left_size: region.size(),
                right_base: other.base(),
                right_size: other.size(),
            });
        }

        let base = region.base();
        let width = self.spec.width_bytes() as u64;
        if region.size() < width {
            debug!(
                "Region {} (0x{:X} bytes) is smaller than {}, nothing to scan",
                region.id(),
                region.size(),
                self.spec
            );
            return Ok(CandidateSet::empty());
        }
        let last = base + (region.size() - width);

        debug!(
            "Scanning {} 0x{:X}..=0x{:X}: {} {:?} ({})",
            region.id(),
            base,
            last,
            self.operator,
            operand,
            self.spec
        );

        let source = ByteSource::new(region);
        let mut lhs = RollingWindow::prime(&source, base, self.spec)?;
        let mut rhs = match operand {
            Operand::Constant(value) => Rhs::Constant(self.spec.truncate(value)),
            Operand::Region(other) => {
                let other = ByteSource::new(other);
                let window = RollingWindow::prime(&other, base, self.spec)?;
                Rhs::Window(other, window)
            }
        };

        let mut matches = Vec::new();
        let mut address = base;
        loop {
            let rhs_value = match &rhs {
                Rhs::Constant(value) => *value,
                Rhs::Window(_, window) => window.value(),
            };
            if self.spec.compare(self.operator, lhs.value(), rhs_value) {
                matches.push(address);
            }

            if address == last {
                break;
            }

            let incoming = address + width;
            lhs.advance(source.byte(incoming)?);
            if let Rhs::Window(other, window) = &mut rhs {
                window.advance(other.byte(incoming)?);
            }
            address += 1;
        }

        debug!("Scan of {} matched {} address(es)", region.id(), matches.len());
        Ok(CandidateSet::from_sorted(matches))
    }
}

/// Script-facing scan entry point: `filter(region, "==", 5, "ub")`.
pub fn filter<'a>(
    region: &dyn MemoryRegion,
    operator: &str,
    operand: impl Into<Operand<'a>>,
    spec: &str,
) -> Result<CandidateSet> {
    ScanFilter::parse(operator, spec)?.scan(region, operand.into())
}
