use bitflags::bitflags;

bitflags! {
    /// Settings that change what "same" means or which roots get compared
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompareFlags: u32 {
        /// Pair entries whose names only differ in case
        const IGNORE_CASE = 0b0001;
        /// Compare text files with normalized line terminators
        const TEXT = 0b0010;
        /// Realign unforced roots before comparing
        const AUTO_ALIGN = 0b0100;
    }
}

impl Default for CompareFlags {
    fn default() -> Self {
        CompareFlags::AUTO_ALIGN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn auto_alignment_is_on_by_default() {
        assert_eq!(CompareFlags::default(), CompareFlags::AUTO_ALIGN);
        assert!(!CompareFlags::default().contains(CompareFlags::IGNORE_CASE));
    }
}
