use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::sync::{mpsc, watch};

use crate::TryRecvError;

/// Источник уникальных идентификаторов обработчиков.
static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Результат одной попытки доставки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Буфер подписчика заполнен, значение отброшено.
    Full,
    /// Получатель уничтожен или обработчик закрыт.
    Closed,
}

/// Конечная точка, в которую роутер доставляет значения.
///
/// Равенство и хэш задают идентичность подписчика: по ним роутер находит
/// дубликаты и удаляет подписки.
pub trait Subscriber<T>: Clone + Eq + Hash {
    /// Неблокирующая доставка. Никогда не ждёт и не ставит значение в очередь
    /// повторно.
    fn try_deliver(
        &self,
        value: T,
    ) -> Delivery;

    /// Терминальное уведомление: значений больше не будет.
    fn close(&self);
}

/// Идентификатор обработчика подписчика.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    fn next() -> Self {
        Self(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandleId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Отправляющая сторона подписки.
///
/// Клоны разделяют один идентификатор: подписка, сделанная через клон,
/// снимается через оригинал и наоборот.
pub struct SubscriberHandle<T> {
    id: HandleId,
    tx: mpsc::Sender<T>,
    closed: Arc<watch::Sender<bool>>,
}

/// Принимающая сторона подписки.
///
/// Принадлежит вызывающему коду, брокер о ней ничего не знает.
pub struct Subscription<T> {
    id: HandleId,
    rx: mpsc::Receiver<T>,
    closed: watch::Receiver<bool>,
}

/// Создаёт связанную пару обработчик/подписка с буфером на `capacity`
/// значений (минимум одно).
pub fn subscription_channel<T>(capacity: usize) -> (SubscriberHandle<T>, Subscription<T>) {
    let id = HandleId::next();
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (closed_tx, closed_rx) = watch::channel(false);
    (
        SubscriberHandle {
            id,
            tx,
            closed: Arc::new(closed_tx),
        },
        Subscription {
            id,
            rx,
            closed: closed_rx,
        },
    )
}

impl<T> SubscriberHandle<T> {
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Был ли обработчик закрыт брокером.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl<T> Clone for SubscriberHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tx: self.tx.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> PartialEq for SubscriberHandle<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for SubscriberHandle<T> {}

impl<T> Hash for SubscriberHandle<T> {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for SubscriberHandle<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SubscriberHandle")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> Subscriber<T> for SubscriberHandle<T> {
    fn try_deliver(
        &self,
        value: T,
    ) -> Delivery {
        if self.is_closed() {
            return Delivery::Closed;
        }
        match self.tx.try_send(value) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    fn close(&self) {
        // watch хранит только последнее значение, повторное закрытие ничего не
        // меняет для получателя.
        self.closed.send_replace(true);
    }
}

impl<T> Subscription<T> {
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Ждёт следующее значение.
    ///
    /// Сначала отдаются уже буферизованные значения; `None` означает, что
    /// обработчик закрыт (или все его клоны уничтожены) и буфер пуст.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            if let Ok(value) = self.rx.try_recv() {
                return Some(value);
            }
            if *self.closed.borrow_and_update() {
                // Значение могло прийти между проверкой буфера и флага:
                // доставка всегда предшествует закрытию.
                return self.rx.try_recv().ok();
            }
            tokio::select! {
                biased;
                value = self.rx.recv() => return value,
                changed = self.closed.changed() => {
                    if changed.is_err() {
                        // Отправитель флага уничтожен вместе с последним
                        // обработчиком, дочитываем канал до конца.
                        return self.rx.recv().await;
                    }
                }
            }
        }
    }

    /// Забирает значение без ожидания.
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        match self.rx.try_recv() {
            Ok(value) => Ok(value),
            Err(mpsc::error::TryRecvError::Empty) if self.is_closed() => {
                self.rx.try_recv().map_err(|_| TryRecvError::Closed)
            }
            Err(mpsc::error::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TryRecvError::Closed),
        }
    }

    /// Пришло ли уведомление о закрытии.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Количество буферизованных значений.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("buffered", &self.rx.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
