//! Scan engine.
//!
//! A scan walks every address of a region, decodes the operand there
//! (signedness, width, byte order from an [`OperandSpec`]), compares it
//! against a constant or the same address of a second region, and returns
//! the matching addresses as a [`CandidateSet`](crate::set::CandidateSet).
//!
//! ## Example
//!
//! ```
//! use memsieve::memory::BufferRegion;
//! use memsieve::scan::filter;
//!
//! let wram = BufferRegion::new("wram", "Work RAM", 0x1000, vec![0x05, 0x00, 0x10, 0x00]);
//! let hits = filter(&wram, "==", 5u64, "ub").unwrap();
//! assert_eq!(hits.as_table().unwrap(), vec![0x1000]);
//! ```

mod decode;
mod filter;
mod operand;
mod session;

pub use decode::decode_at;
pub use filter::{Operand, ScanFilter, filter};
pub use operand::{Endianness, OperandSpec, ScanOperator, Width};
pub use session::{ScanSession, ScanStep};
