//! Deferred back-filling of offsets whose value is only known once the code
//! they skip has been emitted.
//!
//! A placeholder is written as zeroes and recorded together with the label it
//! measures up to. Labels are bound to code positions as generation reaches
//! them. Once the walk is done, [`PatchList::resolve`] overwrites every
//! placeholder in the order it was deferred.

use crate::bytecode::Emit;

use super::Error;

/// A code position that may not be known yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Label(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Width {
    U16,
    U32,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }

    fn max(self) -> u64 {
        match self {
            Width::U16 => u64::from(u16::MAX),
            Width::U32 => u64::from(u32::MAX),
        }
    }
}

/// The point an offset is measured from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Base {
    /// The first byte of the placeholder itself.
    Start,
    /// The byte right after the placeholder.
    End,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    /// Offset of the placeholder in the code.
    pub at: usize,
    pub width: Width,
    /// Offset the value is measured from.
    pub base: usize,
    pub target: Label,
}

#[derive(Debug, Default)]
pub struct PatchList {
    labels: Vec<Option<usize>>,
    patches: Vec<Patch>,
}

impl PatchList {
    pub fn new() -> PatchList {
        PatchList::default()
    }

    /// Creates a label that is yet to be bound.
    pub fn label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Binds `label` to the current end of `code`.
    pub fn bind(&mut self, label: Label, code: &[u8]) {
        debug_assert!(self.labels[label.0].is_none(), "{label:?} bound twice");
        self.labels[label.0] = Some(code.len());
    }

    /// Writes a zeroed placeholder of `width` bytes, to be filled with the
    /// distance from `base` to `target`.
    pub fn defer(&mut self, code: &mut Vec<u8>, width: Width, base: Base, target: Label) {
        let at = code.len();
        match width {
            Width::U16 => code.u16(0),
            Width::U32 => code.u32(0),
        }
        let base = match base {
            Base::Start => at,
            Base::End => at + width.bytes(),
        };
        self.patches.push(Patch {
            at,
            width,
            base,
            target,
        });
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Fills every placeholder. Offsets only ever point forward.
    pub fn resolve(self, code: &mut [u8]) -> Result<(), Error> {
        for patch in &self.patches {
            let target = self.labels[patch.target.0].ok_or(Error::UnboundLabel)?;
            let value = target as i64 - patch.base as i64;
            let out_of_range = || Error::PatchOutOfRange {
                offset: patch.at,
                width: patch.width.bytes(),
                value,
            };
            let value = u64::try_from(value).map_err(|_| out_of_range())?;
            if value > patch.width.max() {
                return Err(out_of_range());
            }
            let slot = &mut code[patch.at..patch.at + patch.width.bytes()];
            match patch.width {
                Width::U16 => slot.copy_from_slice(&(value as u16).to_le_bytes()),
                Width::U32 => slot.copy_from_slice(&(value as u32).to_le_bytes()),
            }
            log::trace!(
                "patched {} bytes at {:#x} with {value} (to {target:#x})",
                patch.width.bytes(),
                patch.at,
            );
        }
        Ok(())
    }
}
