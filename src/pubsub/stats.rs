use std::sync::atomic::{AtomicU64, Ordering};

/// Счётчики брокера.
///
/// Пишет в них только цикл брокера, читать можно откуда угодно.
#[derive(Debug, Default)]
pub struct BrokerStats {
    /// Общее количество обработанных публикаций
    published: AtomicU64,
    /// Успешные доставки подписчикам
    delivered: AtomicU64,
    /// Доставки, отброшенные из-за заполненного или закрытого буфера
    dropped: AtomicU64,
    /// Успешные подписки
    subscribed: AtomicU64,
    /// Отклонённые повторные подписки
    duplicates: AtomicU64,
    /// Снятые подписки
    unsubscribed: AtomicU64,
}

/// Снимок счётчиков на момент вызова [`BrokerStats::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub subscribed: u64,
    pub duplicates: u64,
    pub unsubscribed: u64,
}

impl BrokerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_publish(
        &self,
        delivered: usize,
        dropped: usize,
    ) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_subscribe(&self) {
        self.subscribed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unsubscribe(&self) {
        self.unsubscribed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            subscribed: self.subscribed.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            unsubscribed: self.unsubscribed.load(Ordering::Relaxed),
        }
    }
}
