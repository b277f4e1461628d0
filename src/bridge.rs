// Host-facing boundary around the synchronous resolver
use crate::catalog::CatalogStore;
use crate::matcher::resolve;
use crate::model::Resolution;
use std::borrow::Cow;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Decodes a NUL-terminated name handed over by the host.
/// Stops at the first NUL; invalid UTF-8 becomes U+FFFD.
pub fn read_name(bytes: &[u8]) -> Cow<'_, str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
}

/// Writes `text` into `buf` followed by a NUL terminator, truncating on a
/// character boundary when it does not fit. Returns the number of text bytes
/// written. A zero-length buffer is left untouched.
pub fn write_with_capacity(text: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };
    let mut end = text.len().min(room);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    buf[..end].copy_from_slice(&text.as_bytes()[..end]);
    buf[end] = 0;
    end
}

/// Runs one resolution off the async executor against the current snapshot
/// and yields exactly one outcome. If the caller stops waiting, the
/// computation still finishes and its result is dropped.
pub async fn resolve_async(store: &CatalogStore, raw: &str, threshold: f64) -> Resolution {
    let snapshot = store.snapshot();
    let name = raw.to_string();
    let (tx, rx) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        let resolution = resolve(&name, &snapshot.catalog, threshold);
        let _ = tx.send(resolution);
    });

    match rx.await {
        Ok(resolution) => resolution,
        Err(_) => {
            error!("Resolver worker for '{}' exited without a result", raw);
            Resolution::NoMatch
        }
    }
}

/// Resolves `raw` and writes the profile name ("" for no match) into `buf`.
/// Returns the number of bytes written.
pub async fn find_auto_input_config_name(
    store: &CatalogStore,
    raw: &str,
    buf: &mut [u8],
    threshold: f64,
) -> usize {
    let resolution = resolve_async(store, raw, threshold).await;
    match &resolution {
        Resolution::Match(m) => info!(
            "Found auto input config '{}' for '{}' (score {:.3})",
            m.name,
            raw,
            resolution.score()
        ),
        Resolution::NoMatch => info!("No auto input config for '{}'", raw),
    }

    let name = resolution.name();
    let written = write_with_capacity(name, buf);
    if written < name.len() {
        warn!(
            "Profile name '{}' truncated to {} bytes (buffer of {})",
            name,
            written,
            buf.len()
        );
    }
    written
}
