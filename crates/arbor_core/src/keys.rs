//! Opaque handles for assets owned by an external loader.
//!
//! The scene core never dereferences these; it only forwards them to the
//! renderer inside draw submissions.

use slotmap::new_key_type;

new_key_type! {
    pub struct MeshKey;
    pub struct MaterialKey;
}
