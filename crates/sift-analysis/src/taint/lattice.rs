//! The taint value lattice.
//!
//! A [`Taint`] is a fixed-width bitset. The three low bits hold the
//! built-in kinds; every remaining bit is a configurable sanitizer
//! category, allocated by name when the behavior table is loaded.
//! [`Taint::SAFE`] is the complement of the built-in bits, so a value
//! carrying any sanitizer bit also tests as safe, and the generic safe
//! value satisfies every sanitizer requirement.

/// Taint classification of a value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Taint(u64);

impl Taint {
    /// No information yet. Identity element of [`Taint::merge`].
    pub const UNSET: Taint = Taint(0);
    /// Literal or otherwise hardcoded value.
    pub const CONSTANT: Taint = Taint(1);
    /// Value from an unrecognized source; suspicious but distinguished
    /// from [`Taint::TAINTED`] for diagnostics.
    pub const UNKNOWN: Taint = Taint(1 << 1);
    /// Definitively untrusted input.
    pub const TAINTED: Taint = Taint(1 << 2);
    /// Sanitized or independently verified safe: all sanitizer bits set.
    pub const SAFE: Taint = Taint(!0b111);

    const SUSPECT_MASK: u64 = Self::UNKNOWN.0 | Self::TAINTED.0;
    const BUILTIN_MASK: u64 = Self::CONSTANT.0 | Self::SUSPECT_MASK;

    /// Bit index of the first custom sanitizer category.
    pub const FIRST_CUSTOM_BIT: u32 = 3;
    /// How many custom sanitizer categories fit in the bitset.
    pub const MAX_CUSTOM_TYPES: usize = 61;

    /// The taint bit for custom sanitizer category `index`.
    ///
    /// Callers must keep `index < MAX_CUSTOM_TYPES`; the behavior table
    /// enforces this at load time.
    pub fn custom(index: usize) -> Taint {
        debug_assert!(index < Self::MAX_CUSTOM_TYPES);
        Taint(1 << (Self::FIRST_CUSTOM_BIT + index as u32))
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn is_unset(self) -> bool {
        self.0 == 0
    }

    pub fn is_constant(self) -> bool {
        self == Self::CONSTANT
    }

    pub fn is_tainted(self) -> bool {
        self.0 & Self::TAINTED.0 != 0
    }

    pub fn is_unknown(self) -> bool {
        self.0 & Self::UNKNOWN.0 != 0
    }

    /// Tainted or unknown: dangerous enough to report at a sink.
    pub fn is_suspect(self) -> bool {
        self.0 & Self::SUSPECT_MASK != 0
    }

    /// Carries at least one sanitizer bit and none of the suspect bits.
    pub fn is_safe(self) -> bool {
        self.0 & !Self::BUILTIN_MASK != 0 && self.0 & Self::SUSPECT_MASK == 0
    }

    pub fn intersects(self, other: Taint) -> bool {
        self.0 & other.0 != 0
    }

    /// Lattice join. Precedence: Tainted over Unknown over Safe over
    /// Constant; Unset is the identity. Merging two safe values keeps the
    /// sanitizer bits common to both; if they share none the result
    /// degrades to Unknown.
    #[must_use]
    pub fn merge(self, other: Taint) -> Taint {
        if self.is_unset() {
            return other;
        }
        if other.is_unset() {
            return self;
        }
        if self.is_tainted() || other.is_tainted() {
            return Self::TAINTED;
        }
        if self.is_unknown() || other.is_unknown() {
            return Self::UNKNOWN;
        }
        match (self.is_safe(), other.is_safe()) {
            (true, true) => {
                let common = self.0 & other.0 & Self::SAFE.0;
                if common == 0 {
                    Self::UNKNOWN
                } else {
                    Taint(common)
                }
            }
            (true, false) => self,
            (false, true) => other,
            (false, false) => Self::CONSTANT,
        }
    }

    /// Whether this value satisfies a sink that requires specific sanitizer
    /// bits. Constants always satisfy; suspect values never do. When
    /// `required` is unset, any safe value passes. `negated` inverts the
    /// bit test for sinks that exclude a particular sanitizer.
    pub fn satisfies(self, required: Taint, negated: bool) -> bool {
        if self.is_constant() {
            return true;
        }
        if !self.is_safe() {
            return false;
        }
        if required.is_unset() {
            return true;
        }
        let present = self.intersects(required);
        if negated {
            !present
        } else {
            present
        }
    }
}

impl std::ops::BitOr for Taint {
    type Output = Taint;

    /// Bit union, for building masks. Not the lattice join; use
    /// [`Taint::merge`] for that.
    fn bitor(self, rhs: Taint) -> Taint {
        Taint(self.0 | rhs.0)
    }
}

impl std::fmt::Debug for Taint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unset() {
            write!(f, "Unset")
        } else if self.is_tainted() {
            write!(f, "Tainted")
        } else if self.is_unknown() {
            write!(f, "Unknown")
        } else if self.is_constant() {
            write!(f, "Constant")
        } else if *self == Self::SAFE {
            write!(f, "Safe")
        } else {
            write!(f, "Safe({:#x})", self.0)
        }
    }
}
