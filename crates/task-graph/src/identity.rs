//! Content-addressed task identity.
//!
//! Every task carries a `(id, context)` pair. The pair is digested to a
//! 256-bit content hash, and *all* identity comparisons in the system route
//! through that hash: two identifiers are equal iff their digests match,
//! map lookups key on the digest, and the string form of an identity is
//! derived from the digest rather than the raw fields. This keeps equality
//! stable when identifiers round-trip through message payloads or cross
//! worker boundaries.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The 256-bit content hash of a task identifier.
///
/// Computed as SHA-256 over the minimal big-endian encoding of the numeric
/// id followed by the UTF-8 bytes of the context. Collisions are treated as
/// impossible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHash([u8; 32]);

impl TaskHash {
    /// Digest an `(id, context)` pair.
    #[must_use]
    pub fn compute(id: u64, context: &str) -> Self {
        let mut hasher = Sha256::new();
        let be = id.to_be_bytes();
        let leading = be.iter().take_while(|b| **b == 0).count();
        // Minimal encoding: no leading zero bytes, zero encodes as empty.
        hasher.update(&be[leading..]);
        hasher.update(context.as_bytes());
        Self(hasher.finalize().into())
    }

    /// The raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering of the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TaskHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TaskHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskHash({})", self.to_hex())
    }
}

/// Serde mirror of [`TaskIdentifier`]; the digest is recomputed on the way in.
#[derive(Serialize, Deserialize)]
struct RawIdentifier {
    id: u64,
    context: String,
}

/// Identity of a task: a numeric family id plus a context string.
///
/// The `id` groups a family of related tasks (a kind code, for instance)
/// while `context` distinguishes instances within the family (a target
/// name). The digest is computed eagerly on construction; equality and
/// hashing delegate to it.
///
/// ```
/// use strata_task_graph::TaskIdentifier;
///
/// let a = TaskIdentifier::new(1, "build");
/// let b = TaskIdentifier::new(1, "build");
/// assert_eq!(a, b);
/// assert_eq!(a.hash(), b.hash());
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "RawIdentifier", into = "RawIdentifier")]
pub struct TaskIdentifier {
    id: u64,
    context: String,
    hash: TaskHash,
}

impl TaskIdentifier {
    /// Create an identifier and digest it.
    pub fn new(id: u64, context: impl Into<String>) -> Self {
        let context = context.into();
        let hash = TaskHash::compute(id, &context);
        Self { id, context, hash }
    }

    /// The numeric family id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The instance context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The content hash identity comparisons route through.
    #[must_use]
    pub fn hash(&self) -> TaskHash {
        self.hash
    }

    /// Hash-form identity as a hex string.
    #[must_use]
    pub fn as_digest_str(&self) -> String {
        self.hash.to_hex()
    }
}

impl PartialEq for TaskIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TaskIdentifier {}

impl Hash for TaskIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl From<RawIdentifier> for TaskIdentifier {
    fn from(raw: RawIdentifier) -> Self {
        Self::new(raw.id, raw.context)
    }
}

impl From<TaskIdentifier> for RawIdentifier {
    fn from(identifier: TaskIdentifier) -> Self {
        Self {
            id: identifier.id,
            context: identifier.context,
        }
    }
}

impl From<(u64, &str)> for TaskIdentifier {
    fn from((id, context): (u64, &str)) -> Self {
        Self::new(id, context)
    }
}

impl From<(u64, String)> for TaskIdentifier {
    fn from((id, context): (u64, String)) -> Self {
        Self::new(id, context)
    }
}

impl fmt::Display for TaskIdentifier {
    /// Renders as `id: context`, or just `id` when the context is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}: {}", self.id, self.context)
        }
    }
}

impl fmt::Debug for TaskIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskIdentifier")
            .field("id", &self.id)
            .field("context", &self.context)
            .finish()
    }
}
