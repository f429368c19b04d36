use gloo::console;
use web_sys::Storage;

pub(crate) const AVATAR_KEY: &str = "studentkort.avatar";
pub(crate) const DEFAULT_AVATAR_SRC: &str = "img/default-avatar.jpg";

fn storage() -> Option<Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

/// Persisted avatar, if any. An empty value counts as absent.
pub(crate) fn load_saved() -> Option<String> {
    let storage = storage()?;
    let raw = storage.get_item(AVATAR_KEY).ok()??;
    if raw.is_empty() {
        return None;
    }
    Some(raw)
}

/// Initial avatar for a fresh session: the persisted value when present,
/// otherwise the bundled placeholder portrait.
pub(crate) fn load_initial() -> Option<String> {
    Some(load_saved().unwrap_or_else(|| DEFAULT_AVATAR_SRC.to_string()))
}

/// Write-through: storage mirrors the in-memory value after every update.
/// Absent removes the entry entirely.
pub(crate) fn set_avatar(value: Option<&str>) {
    let Some(storage) = storage() else {
        console::warn!("avatar store: storage unavailable");
        return;
    };
    match value {
        Some(value) => {
            if storage.set_item(AVATAR_KEY, value).is_err() {
                console::warn!("avatar store: write failed");
            }
        }
        None => {
            let _ = storage.remove_item(AVATAR_KEY);
        }
    }
}
