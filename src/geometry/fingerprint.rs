use crate::document::Document;
use sha2::{Digest, Sha256};

/// Content hash of the diagram topology.
///
/// Covers which symbols exist, what element each depicts and how they are
/// connected, but not where they are drawn: moving a symbol keeps the
/// fingerprint, adding or rewiring one changes it.
pub fn topology_fingerprint(document: &Document) -> String {
    let mut hasher = Sha256::new();
    for symbol in document.symbols() {
        hasher.update(symbol.id.as_bytes());
        hasher.update([0x1f]);
        hasher.update(symbol.element_id.as_bytes());
        hasher.update([0x1f]);
        hasher.update(symbol.element_type().id_prefix().as_bytes());
        for (role, target) in symbol.connections() {
            hasher.update([0x1f]);
            hasher.update(format!("{role:?}={target}").as_bytes());
        }
        hasher.update([0x1e]);
    }
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
