use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Пул для повторного использования `Arc<str>` по одинаковым сегментам тем.
static SEGMENT_INTERN: Lazy<DashMap<Box<str>, Arc<str>>> = Lazy::new(DashMap::new);

/// Возвращает interned `Arc<str>` для данного сегмента.
///
/// При первом вызове для нового сегмента создаёт `Arc<str>` и сохраняет его в
/// пуле. Конкурентные вызовы для одной строки получают один и тот же `Arc`.
#[inline]
pub(crate) fn intern_segment<S: AsRef<str>>(segment: S) -> Arc<str> {
    let key = segment.as_ref();
    if let Some(existing) = SEGMENT_INTERN.get(key) {
        return existing.clone();
    }
    SEGMENT_INTERN
        .entry(Box::from(key))
        .or_insert_with(|| Arc::from(key))
        .clone()
}

/// Есть ли сегмент в пуле.
#[cfg(test)]
pub(crate) fn is_interned(segment: &str) -> bool {
    SEGMENT_INTERN.contains_key(segment)
}
