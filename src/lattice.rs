//! Lattice traits for abstract dataflow values.
//!
//! A client analysis supplies its abstract domain as a type implementing
//! [`MeetSemiLattice`]. The solver only ever manipulates values through this
//! trait: it starts per-node values at [`top`](MeetSemiLattice::top), combines
//! converging control flow edges with [`meet`](MeetSemiLattice::meet), and
//! detects convergence through `PartialEq`.
//!
//! # Contract
//!
//! The solver relies on the client honoring the semi-lattice laws; it cannot
//! check them. In particular, equality must be *structural* over the abstract
//! value — fixpoint detection compares recomputed values against stored ones,
//! and an identity-based or otherwise inconsistent equality either spins the
//! solver forever or stops it early. Termination additionally requires a
//! finite-height domain and monotone flow functions; neither is verified, only
//! backstopped by the configurable iteration cap.

use std::fmt::Debug;

/// A meet semi-lattice: the abstract value domain of an analysis.
///
/// The meet operation combines information from multiple control flow paths,
/// and is also used to force monotone accumulation of a node's output across
/// re-computations. It must satisfy:
///
/// - **Idempotent**: `x.meet(x) = x`
/// - **Commutative**: `x.meet(y) = y.meet(x)`
/// - **Associative**: `x.meet(y.meet(z)) = (x.meet(y)).meet(z)`
/// - **Identity**: `x.meet(top) = x`
///
/// `Clone` is the copy contract: a clone must be an independent duplicate,
/// because values stored at one node are meet inputs at others and mutation
/// must never alias. `PartialEq` must be structural equality.
///
/// # Examples
///
/// ```rust
/// use interflow::lattice::MeetSemiLattice;
///
/// /// A flat constant lattice: unknown (top), a known value, or conflicting.
/// #[derive(Debug, Clone, PartialEq)]
/// enum Constant {
///     Top,
///     Value(i64),
///     NotConstant,
/// }
///
/// impl MeetSemiLattice for Constant {
///     fn top() -> Self {
///         Constant::Top
///     }
///
///     fn meet(&self, other: &Self) -> Self {
///         match (self, other) {
///             (Constant::Top, x) | (x, Constant::Top) => x.clone(),
///             (Constant::Value(a), Constant::Value(b)) if a == b => Constant::Value(*a),
///             _ => Constant::NotConstant,
///         }
///     }
/// }
/// ```
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Returns the top (⊤) element: no information, the identity for meet.
    ///
    /// Every per-node value starts at top before its node is first processed.
    #[must_use]
    fn top() -> Self;

    /// Computes the meet (greatest lower bound) of two lattice elements.
    ///
    /// Inputs must be treated as immutable; the result is freshly owned.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;
}

/// A paired forward/backward abstract value for bidirectional analyses.
///
/// The bidirectional solver stores one `Paired` value per program point; the
/// forward passes update only the [`forward`](Self::forward) component and the
/// backward passes only the [`backward`](Self::backward) component. The meet is
/// componentwise, so `Paired` composes with everything that is generic over
/// [`MeetSemiLattice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paired<F, B> {
    /// The forward-direction component.
    pub forward: F,
    /// The backward-direction component.
    pub backward: B,
}

impl<F, B> Paired<F, B> {
    /// Creates a paired value from its two components.
    #[must_use]
    pub const fn new(forward: F, backward: B) -> Self {
        Self { forward, backward }
    }
}

impl<F: MeetSemiLattice, B: MeetSemiLattice> MeetSemiLattice for Paired<F, B> {
    fn top() -> Self {
        Self::new(F::top(), B::top())
    }

    fn meet(&self, other: &Self) -> Self {
        Self::new(
            self.forward.meet(&other.forward),
            self.backward.meet(&other.backward),
        )
    }
}
