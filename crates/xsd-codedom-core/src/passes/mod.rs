//! Transformation pass modules.
//!
//! Each pass is a self-contained rewrite of the code model. Passes are
//! executed in order (0-6) and each assumes the output of previous passes:
//! nullable synthesis relies on the naming pass's conventions, ordering
//! relies on annotation inference, and reference fixup runs last so every
//! rename is final before it repairs dangling names.

pub mod p0_naming;
pub mod p1_nullable;
pub mod p2_collections;
pub mod p3_mixed_content;
pub mod p4_annotate;
pub mod p5_prune;
pub mod p6_fixup;
